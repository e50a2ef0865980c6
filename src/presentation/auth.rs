use crate::domain::routes::{DASHBOARD_ROUTE, SIGN_IN_ROUTE};
use crate::domain::user::{Session, SignInRequest, SignUpRequest};
use crate::presentation::handlers::{ApiError, AppState};
use crate::presentation::middleware::AuthenticatedUser;
use actix_web::{HttpResponse, web};
use serde::Serialize;
use tracing::{error, info, instrument};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user_email: String,
    pub user_name: String,
    pub message: String,
    pub redirect: &'static str,
}

impl SessionResponse {
    fn new(session: Session, message: &str) -> Self {
        Self {
            user_email: session.user_email,
            user_name: session.user_name,
            message: message.to_string(),
            redirect: DASHBOARD_ROUTE,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub user_email: String,
    pub user_name: String,
    pub display_name: String,
}

#[instrument(skip(state, req), fields(email = %req.email))]
pub async fn sign_in(
    state: web::Data<AppState>,
    req: web::Json<SignInRequest>,
) -> Result<HttpResponse, ApiError> {
    info!("Sign-in request received");

    let session = state
        .auth_service
        .sign_in(req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to sign in");
            ApiError::from(e)
        })?;

    Ok(HttpResponse::Ok().json(SessionResponse::new(session, "Login successful!")))
}

#[instrument(skip(state, req), fields(email = %req.email))]
pub async fn sign_up(
    state: web::Data<AppState>,
    req: web::Json<SignUpRequest>,
) -> Result<HttpResponse, ApiError> {
    info!("Sign-up request received");

    let session = state
        .auth_service
        .sign_up(req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to sign up");
            ApiError::from(e)
        })?;

    Ok(HttpResponse::Created().json(SessionResponse::new(session, "Welcome to ParkEasy!")))
}

#[instrument(skip(state))]
pub async fn logout(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    state.auth_service.logout().await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "redirect": SIGN_IN_ROUTE })))
}

#[instrument(skip(user))]
pub async fn dashboard(user: AuthenticatedUser) -> HttpResponse {
    let session = user.0;
    let user_email = if session.user_email.is_empty() {
        "User".to_string()
    } else {
        session.user_email.clone()
    };
    let display_name = crate::domain::user::display_name(&user_email).to_string();
    HttpResponse::Ok().json(DashboardResponse {
        user_email,
        user_name: session.user_name,
        display_name,
    })
}
