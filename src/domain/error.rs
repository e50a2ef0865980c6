use crate::domain::routes::SIGN_IN_ROUTE;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Session required")]
    SessionRequired,
    #[error("No registration data found")]
    ReservationMissing { redirect: &'static str },
    #[error("Parking spot {0} is occupied")]
    SpotUnavailable(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Route the client should navigate to after this error, if any.
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            DomainError::SessionRequired => Some(SIGN_IN_ROUTE),
            DomainError::ReservationMissing { redirect } => Some(*redirect),
            _ => None,
        }
    }
}
