use crate::domain::{LoanId, NotificationId, notification::BookNotification};
use crate::ports::notification_repository::{
    NotificationRepository as NotificationRepositoryTrait, Result,
};
use async_trait::async_trait;
use std::path::PathBuf;

use super::collection::{JsonCollection, Record};
use super::error::JsonStoreError;

impl Record for BookNotification {
    fn record_id(&self) -> u32 {
        self.id.value()
    }
}

/// NotificationRepositoryのJSONファイル実装
pub struct NotificationRepository {
    notifications: JsonCollection<BookNotification>,
}

impl NotificationRepository {
    pub async fn open(path: impl Into<PathBuf>) -> std::result::Result<Self, JsonStoreError> {
        Ok(Self {
            notifications: JsonCollection::open(path).await?,
        })
    }
}

#[async_trait]
impl NotificationRepositoryTrait for NotificationRepository {
    async fn find_all(&self) -> Result<Vec<BookNotification>> {
        Ok(self.notifications.all())
    }

    async fn find_by_id(&self, id: NotificationId) -> Result<Option<BookNotification>> {
        Ok(self.notifications.find(id.value()))
    }

    async fn find_by_loan(&self, loan_id: LoanId) -> Result<Vec<BookNotification>> {
        Ok(self.notifications.filter(|n| n.loan_id == loan_id))
    }

    async fn allocate_id(&self) -> Result<NotificationId> {
        Ok(NotificationId::new(self.notifications.allocate_id()?))
    }

    async fn add(&self, notification: BookNotification) -> Result<()> {
        self.notifications.insert(notification)?;
        Ok(())
    }

    async fn update(&self, notification: BookNotification) -> Result<bool> {
        Ok(self.notifications.replace(notification))
    }

    async fn delete(&self, id: NotificationId) -> Result<bool> {
        Ok(self.notifications.remove(id.value()))
    }

    async fn exists(&self, id: NotificationId) -> Result<bool> {
        Ok(self.notifications.contains(id.value()))
    }

    async fn commit(&self) -> Result<()> {
        self.notifications.commit().await?;
        Ok(())
    }
}
