use crate::domain::models::Reservation;
use crate::domain::user::{Account, Session};
use anyhow::Result;
use async_trait::async_trait;

/// Flat string store standing in for browser local storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn load_session(&self) -> Result<Option<Session>>;
    async fn save_session(&self, session: Session) -> Result<()>;
    async fn clear_session(&self) -> Result<()>;
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn list_accounts(&self) -> Result<Vec<Account>>;
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>>;
    async fn save_account(&self, account: Account) -> Result<()>;
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn load_reservation(&self) -> Result<Option<Reservation>>;
    async fn save_reservation(&self, reservation: Reservation) -> Result<()>;
    async fn clear_reservation(&self) -> Result<()>;
}
