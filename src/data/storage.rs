use crate::domain::error::DomainError;
use crate::domain::models::Reservation;
use crate::domain::repository::{
    AccountRepository, KeyValueStore, ReservationRepository, SessionRepository,
};
use crate::domain::user::{Account, Session, display_name};
use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, instrument, trace, warn};

pub const IS_AUTHENTICATED_KEY: &str = "isAuthenticated";
pub const USER_EMAIL_KEY: &str = "userEmail";
pub const USER_NAME_KEY: &str = "userName";
pub const USERS_KEY: &str = "users";
pub const REGISTRATION_DATA_KEY: &str = "registrationData";

/// Typed view over the raw key-value store, using the same key layout the
/// browser client writes to local storage.
pub struct LocalStorage<S: KeyValueStore + ?Sized> {
    store: Arc<S>,
}

impl<S: KeyValueStore + ?Sized> Clone for LocalStorage<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KeyValueStore + ?Sized> LocalStorage<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        let value = serde_json::from_str(&raw).map_err(|e| {
            warn!(key = key, error = %e, "Stored value failed to parse");
            DomainError::Storage(format!("{key} is malformed: {e}"))
        })?;
        Ok(Some(value))
    }
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> SessionRepository for LocalStorage<S> {
    #[instrument(skip(self))]
    async fn load_session(&self) -> Result<Option<Session>> {
        let flag = self.store.get(IS_AUTHENTICATED_KEY).await?;
        if flag.as_deref() != Some("true") {
            trace!("No authenticated session in storage");
            return Ok(None);
        }
        let user_email = self.store.get(USER_EMAIL_KEY).await?.unwrap_or_default();
        let user_name = match self.store.get(USER_NAME_KEY).await? {
            Some(name) => name,
            None => display_name(&user_email).to_string(),
        };
        Ok(Some(Session {
            user_email,
            user_name,
        }))
    }

    #[instrument(skip(self, session), fields(email = %session.user_email))]
    async fn save_session(&self, session: Session) -> Result<()> {
        self.store
            .set(IS_AUTHENTICATED_KEY, "true".to_string())
            .await?;
        self.store.set(USER_EMAIL_KEY, session.user_email).await?;
        self.store.set(USER_NAME_KEY, session.user_name).await?;
        debug!("Session stored");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear_session(&self) -> Result<()> {
        self.store.remove(IS_AUTHENTICATED_KEY).await?;
        self.store.remove(USER_EMAIL_KEY).await?;
        self.store.remove(USER_NAME_KEY).await?;
        debug!("Session cleared");
        Ok(())
    }
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> AccountRepository for LocalStorage<S> {
    #[instrument(skip(self))]
    async fn list_accounts(&self) -> Result<Vec<Account>> {
        Ok(self.read_json(USERS_KEY).await?.unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let accounts = self.list_accounts().await?;
        Ok(accounts.into_iter().find(|a| a.email == email))
    }

    #[instrument(skip(self, account), fields(email = %account.email))]
    async fn save_account(&self, account: Account) -> Result<()> {
        let mut accounts = self.list_accounts().await?;
        accounts.push(account);
        self.store
            .set(USERS_KEY, serde_json::to_string(&accounts)?)
            .await?;
        debug!(accounts = accounts.len(), "Account appended to registry");
        Ok(())
    }
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> ReservationRepository for LocalStorage<S> {
    #[instrument(skip(self))]
    async fn load_reservation(&self) -> Result<Option<Reservation>> {
        self.read_json(REGISTRATION_DATA_KEY).await
    }

    #[instrument(skip(self, reservation), fields(spot = %reservation.selected_spot))]
    async fn save_reservation(&self, reservation: Reservation) -> Result<()> {
        self.store
            .set(REGISTRATION_DATA_KEY, serde_json::to_string(&reservation)?)
            .await?;
        debug!("Reservation stored");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear_reservation(&self) -> Result<()> {
        self.store.remove(REGISTRATION_DATA_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::InMemoryKeyValueStore;
    use crate::domain::models::{Amount, CarType};
    use chrono::{TimeZone, Utc};

    fn storage() -> (LocalStorage<InMemoryKeyValueStore>, InMemoryKeyValueStore) {
        let store = InMemoryKeyValueStore::new();
        (LocalStorage::new(Arc::new(store.clone())), store)
    }

    fn account(email: &str) -> Account {
        Account {
            email: email.to_string(),
            password: "secret1".to_string(),
            name: "Test".to_string(),
            phone: "555".to_string(),
        }
    }

    #[tokio::test]
    async fn test_session_round_trip_uses_flat_keys() {
        let (storage, raw) = storage();
        storage
            .save_session(Session {
                user_email: "a@b.com".to_string(),
                user_name: "Ann".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(
            raw.get(IS_AUTHENTICATED_KEY).await.unwrap().as_deref(),
            Some("true")
        );
        let session = storage.load_session().await.unwrap().unwrap();
        assert_eq!(session.user_email, "a@b.com");
        assert_eq!(session.user_name, "Ann");
    }

    #[tokio::test]
    async fn test_clear_session_removes_all_keys() {
        let (storage, raw) = storage();
        storage
            .save_session(Session {
                user_email: "a@b.com".to_string(),
                user_name: "Ann".to_string(),
            })
            .await
            .unwrap();
        storage.clear_session().await.unwrap();

        assert!(storage.load_session().await.unwrap().is_none());
        assert!(raw.is_empty().await);
    }

    #[tokio::test]
    async fn test_flag_other_than_true_is_not_a_session() {
        let (storage, raw) = storage();
        raw.set(IS_AUTHENTICATED_KEY, "false".to_string())
            .await
            .unwrap();
        assert!(storage.load_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_user_name_falls_back_to_email_prefix() {
        let (storage, raw) = storage();
        raw.set(IS_AUTHENTICATED_KEY, "true".to_string())
            .await
            .unwrap();
        raw.set(USER_EMAIL_KEY, "bob@example.com".to_string())
            .await
            .unwrap();

        let session = storage.load_session().await.unwrap().unwrap();
        assert_eq!(session.user_name, "bob");
    }

    #[tokio::test]
    async fn test_accounts_append_and_find() {
        let (storage, _) = storage();
        storage.save_account(account("one@example.com")).await.unwrap();
        storage.save_account(account("two@example.com")).await.unwrap();

        assert_eq!(storage.list_accounts().await.unwrap().len(), 2);
        let found = storage
            .find_account_by_email("two@example.com")
            .await
            .unwrap();
        assert!(found.is_some());
        assert!(
            storage
                .find_account_by_email("TWO@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_malformed_users_is_a_storage_error() {
        let (storage, raw) = storage();
        raw.set(USERS_KEY, "{not a list".to_string()).await.unwrap();

        let err = storage.list_accounts().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn test_reservation_round_trip_and_clear() {
        let (storage, raw) = storage();
        let entry = Utc.with_ymd_and_hms(2026, 1, 2, 10, 0, 0).unwrap();
        let reservation = Reservation {
            owner_name: "Ann".to_string(),
            car_number: "KA01XY9999".to_string(),
            parking_hours: 2,
            car_type: CarType::Electric,
            selected_spot: "B1".to_string(),
            total_price: Amount::new(90),
            entry_time: entry,
            return_time: entry + chrono::Duration::hours(2),
            booking_reference: "PARK00000000".to_string(),
        };

        storage.save_reservation(reservation.clone()).await.unwrap();
        let raw_json = raw.get(REGISTRATION_DATA_KEY).await.unwrap().unwrap();
        assert!(raw_json.contains("\"selectedSpot\":\"B1\""));
        assert_eq!(storage.load_reservation().await.unwrap(), Some(reservation));

        storage.clear_reservation().await.unwrap();
        assert!(storage.load_reservation().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_untyped_reservation_payload_is_rejected() {
        let (storage, raw) = storage();
        raw.set(
            REGISTRATION_DATA_KEY,
            r#"{"ownerName":"Ann","parkingHours":"four"}"#.to_string(),
        )
        .await
        .unwrap();

        assert!(storage.load_reservation().await.is_err());
    }
}
