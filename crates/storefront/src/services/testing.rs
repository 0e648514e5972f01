//! Test doubles shared by the service tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use bookshop_core::{Cart, CartItem, UserId};

use super::email::{EmailError, Mailer, OutgoingMail};
use crate::db::{CartStore, MemoryStore, RepositoryError};

/// Keeps every mail it is asked to send.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl RecordingMailer {
    pub async fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), EmailError> {
        self.sent.lock().await.push(mail);
        Ok(())
    }
}

/// Rejects every mail.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), EmailError> {
        Err(EmailError::InvalidAddress(mail.to))
    }
}

/// Cart store whose reads and appends work but whose clears fail.
pub struct FailingCartWrites {
    inner: Arc<MemoryStore>,
}

impl FailingCartWrites {
    pub const fn new(inner: Arc<MemoryStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl CartStore for FailingCartWrites {
    async fn push_item(&self, user_id: &UserId, item: CartItem) -> Result<(), RepositoryError> {
        self.inner.push_item(user_id, item).await
    }

    async fn find_cart(&self, user_id: &UserId) -> Result<Option<Cart>, RepositoryError> {
        self.inner.find_cart(user_id).await
    }

    async fn set_items(
        &self,
        _user_id: &UserId,
        _items: Vec<CartItem>,
    ) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("writes disabled".to_owned()))
    }

    async fn remove_front(
        &self,
        _user_id: &UserId,
        _count: usize,
        _revision: i64,
    ) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("writes disabled".to_owned()))
    }
}

/// Cart store where another request clears the cart and adds `intruder`
/// just before every trim.
pub struct ClearsBeforeTrim {
    inner: Arc<MemoryStore>,
    intruder: CartItem,
}

impl ClearsBeforeTrim {
    pub const fn new(inner: Arc<MemoryStore>, intruder: CartItem) -> Self {
        Self { inner, intruder }
    }
}

#[async_trait]
impl CartStore for ClearsBeforeTrim {
    async fn push_item(&self, user_id: &UserId, item: CartItem) -> Result<(), RepositoryError> {
        self.inner.push_item(user_id, item).await
    }

    async fn find_cart(&self, user_id: &UserId) -> Result<Option<Cart>, RepositoryError> {
        self.inner.find_cart(user_id).await
    }

    async fn set_items(
        &self,
        user_id: &UserId,
        items: Vec<CartItem>,
    ) -> Result<bool, RepositoryError> {
        self.inner.set_items(user_id, items).await
    }

    async fn remove_front(
        &self,
        user_id: &UserId,
        count: usize,
        revision: i64,
    ) -> Result<bool, RepositoryError> {
        self.inner.set_items(user_id, Vec::new()).await?;
        self.inner.push_item(user_id, self.intruder.clone()).await?;
        self.inner.remove_front(user_id, count, revision).await
    }
}
