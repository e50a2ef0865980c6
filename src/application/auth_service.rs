use crate::domain::error::DomainError;
use crate::domain::repository::{AccountRepository, SessionRepository};
use crate::domain::user::{
    Account, MIN_PASSWORD_LEN, Session, SignInRequest, SignUpRequest, display_name,
};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, instrument, trace, warn};

pub struct AuthService<R: SessionRepository + AccountRepository> {
    repository: Arc<R>,
}

impl<R: SessionRepository + AccountRepository> AuthService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Signs in against the account registry. Any password of at least
    /// six characters is also accepted without a matching account.
    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn sign_in(&self, req: SignInRequest) -> Result<Session> {
        trace!("Starting sign-in");

        if req.email.is_empty() || req.password.is_empty() {
            return Err(DomainError::validation("Please fill in all fields").into());
        }

        let account = self
            .repository
            .find_account_by_email(&req.email)
            .await?
            .filter(|a| a.password == req.password);

        let user_name = match account {
            Some(account) => account.name,
            None if req.password.chars().count() >= MIN_PASSWORD_LEN => {
                debug!("No matching account, accepting long password");
                display_name(&req.email).to_string()
            }
            None => {
                warn!("Invalid credentials during sign-in");
                return Err(DomainError::Unauthorized(
                    "Invalid credentials. Please check your email and password.".to_string(),
                )
                .into());
            }
        };

        let session = Session {
            user_email: req.email,
            user_name,
        };
        self.repository.save_session(session.clone()).await?;

        info!(email = %session.user_email, "Sign-in successful");
        Ok(session)
    }

    /// Registers an account and signs the new user in.
    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn sign_up(&self, req: SignUpRequest) -> Result<Session> {
        trace!("Starting sign-up");

        if [
            &req.name,
            &req.email,
            &req.phone,
            &req.password,
            &req.confirm_password,
        ]
        .iter()
        .any(|field| field.is_empty())
        {
            return Err(DomainError::validation("Please fill in all fields").into());
        }
        if req.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            ))
            .into());
        }
        if req.password != req.confirm_password {
            return Err(DomainError::validation("Passwords do not match").into());
        }
        if self
            .repository
            .find_account_by_email(&req.email)
            .await?
            .is_some()
        {
            warn!("User already exists");
            return Err(
                DomainError::validation("User with this email already exists").into(),
            );
        }

        let account = Account {
            email: req.email,
            password: req.password,
            name: req.name,
            phone: req.phone,
        };
        let session = Session {
            user_email: account.email.clone(),
            user_name: account.name.clone(),
        };

        self.repository.save_account(account).await?;
        self.repository.save_session(session.clone()).await?;

        info!(email = %session.user_email, "Account created and signed in");
        Ok(session)
    }

    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        self.repository.clear_session().await?;
        info!("Signed out");
        Ok(())
    }

    /// Gate for every page behind sign-in.
    #[instrument(skip(self))]
    pub async fn require_session(&self) -> Result<Session> {
        match self.repository.load_session().await? {
            Some(session) => Ok(session),
            None => {
                debug!("No session, redirecting to sign-in");
                Err(DomainError::SessionRequired.into())
            }
        }
    }
}
