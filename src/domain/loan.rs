use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, LoanId, OpenLoanError, ReturnLoanError, commands::BorrowBook};

/// 貸出期間（日数）のデフォルト
pub const LOAN_PERIOD_DAYS: u32 = 14;

/// 貸出ステータス
///
/// 保存はしない。`returned_at` と問い合わせ時刻から都度導出する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// 貸出中
    Active,
    /// 延滞中（貸出中かつ返却期限を過ぎている）
    Overdue,
    /// 返却済み
    Returned,
}

impl LoanStatus {
    /// 文字列表現を取得する
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Overdue => "overdue",
            LoanStatus::Returned => "returned",
        }
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(LoanStatus::Active),
            "overdue" => Ok(LoanStatus::Overdue),
            "returned" => Ok(LoanStatus::Returned),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

/// BookLoan集約 - 1冊の書籍の1回の貸出
///
/// 状態遷移は Active → Returned のみ。延滞は状態ではなく導出される述語。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLoan {
    pub id: LoanId,

    // 他の集約への参照（IDのみ）
    pub book_id: BookId,

    pub borrower_name: String,
    pub borrower_email: String,
    pub borrowed_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl BookLoan {
    pub fn is_returned(&self) -> bool {
        self.returned_at.is_some()
    }

    /// 未返却かつ `due_date < now`
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        is_overdue(self, now)
    }

    pub fn days_overdue(&self, now: DateTime<Utc>) -> i64 {
        days_overdue(self, now)
    }

    pub fn status(&self, now: DateTime<Utc>) -> LoanStatus {
        if self.is_returned() {
            LoanStatus::Returned
        } else if self.is_overdue(now) {
            LoanStatus::Overdue
        } else {
            LoanStatus::Active
        }
    }

    /// 借り手のメールアドレスが一致するか（大文字小文字を区別しない）
    pub fn is_borrowed_by(&self, email: &str) -> bool {
        self.borrower_email.to_lowercase() == email.to_lowercase()
    }
}

/// 純粋関数：貸出を開始する
///
/// ビジネスルール：
/// - 返却期限 = 貸出日時 + loan_days
/// - loan_days = 0 の場合、返却期限は貸出日時と同じ
/// - 返却期限が日時の範囲外になる貸出日数は受け付けない
pub fn open_loan(id: LoanId, cmd: &BorrowBook) -> Result<BookLoan, OpenLoanError> {
    let out_of_range = OpenLoanError::DueDateOutOfRange {
        loan_days: cmd.loan_days,
    };
    let due_date = TimeDelta::try_days(i64::from(cmd.loan_days))
        .and_then(|period| cmd.borrowed_at.checked_add_signed(period))
        .ok_or(out_of_range)?;

    Ok(BookLoan {
        id,
        book_id: cmd.book_id,
        borrower_name: cmd.borrower_name.clone(),
        borrower_email: cmd.borrower_email.clone(),
        borrowed_at: cmd.borrowed_at,
        due_date,
        returned_at: None,
    })
}

/// 純粋関数：貸出を返却済みにする
///
/// 延滞していても返却は受け付ける。
pub fn close_loan(
    loan: &BookLoan,
    returned_at: DateTime<Utc>,
) -> Result<BookLoan, ReturnLoanError> {
    if loan.is_returned() {
        return Err(ReturnLoanError::AlreadyReturned);
    }

    Ok(BookLoan {
        returned_at: Some(returned_at),
        ..loan.clone()
    })
}

/// 純粋関数：延滞判定
///
/// 返却期限ちょうどの時刻はまだ延滞ではない。
pub fn is_overdue(loan: &BookLoan, now: DateTime<Utc>) -> bool {
    !loan.is_returned() && loan.due_date < now
}

/// 純粋関数：延滞日数（切り捨て、延滞していなければ0）
pub fn days_overdue(loan: &BookLoan, now: DateTime<Utc>) -> i64 {
    if !is_overdue(loan, now) {
        return 0;
    }
    (now - loan.due_date).num_days()
}
