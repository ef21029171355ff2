use crate::domain::{BookId, book::Book};
use serde::Serialize;
use std::collections::HashMap;

use super::errors::{LibraryApplicationError, Result};
use super::library_service::ServiceDependencies;

/// 在庫数の補正結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryCorrection {
    pub book_id: BookId,
    pub recorded_available: u32,
    pub corrected_available: u32,
}

/// 在庫数を貸出記録から再計算する（起動時に実行）
///
/// 貸出と在庫は別々にコミットされるため、その間でプロセスが落ちると
/// 両者が食い違う。貸出ストアを正として、
/// `available = total - 未返却の貸出数`（0未満は0）に揃える。
///
/// 補正があった場合のみ在庫ストアを1回コミットする。
///
/// # 戻り値
/// 補正した書籍の一覧（整合していれば空）
pub async fn reconcile_inventory(deps: &ServiceDependencies) -> Result<Vec<InventoryCorrection>> {
    let _lending = deps.lending_lock.lock().await;

    let books = deps
        .book_repository
        .find_all()
        .await
        .map_err(LibraryApplicationError::BookStoreError)?;

    let active_loans = deps
        .loan_repository
        .find_active()
        .await
        .map_err(LibraryApplicationError::LoanStoreError)?;

    let mut active_counts: HashMap<BookId, u32> = HashMap::new();
    for loan in &active_loans {
        *active_counts.entry(loan.book_id).or_default() += 1;
    }

    let mut corrections = Vec::new();

    for book in books {
        let active = active_counts.get(&book.id).copied().unwrap_or(0);
        let expected = book.total_copies.saturating_sub(active);

        if active > book.total_copies {
            tracing::warn!(
                book_id = %book.id,
                total = book.total_copies,
                active,
                "More active loans than copies"
            );
        }

        if book.available_copies == expected {
            continue;
        }

        tracing::warn!(
            book_id = %book.id,
            recorded = book.available_copies,
            corrected = expected,
            "Available copies out of sync with loans; correcting"
        );

        corrections.push(InventoryCorrection {
            book_id: book.id,
            recorded_available: book.available_copies,
            corrected_available: expected,
        });

        deps.book_repository
            .update(Book {
                available_copies: expected,
                ..book
            })
            .await
            .map_err(LibraryApplicationError::BookStoreError)?;
    }

    if !corrections.is_empty() {
        deps.book_repository
            .commit()
            .await
            .map_err(LibraryApplicationError::BookStoreError)?;
    }

    tracing::info!(corrected = corrections.len(), "Inventory reconciliation finished");
    Ok(corrections)
}
