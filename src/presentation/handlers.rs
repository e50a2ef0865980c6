use crate::application::auth_service::AuthService;
use crate::application::catalog::SpotCatalog;
use crate::application::pricing::PricingPolicy;
use crate::application::service::BookingService;
use crate::data::storage::LocalStorage;
use crate::domain::catalog::{PricingPlan, pricing_plans};
use crate::domain::error::DomainError;
use crate::domain::models::{
    CarType, ParkingSpot, blank_car_type, blank_hours, PaymentMethod, PaymentReceipt, PriceQuote, Reservation,
    ReservationRequest,
};
use crate::domain::repository::KeyValueStore;
use crate::domain::routes::{CONFIRMATION_ROUTE, DASHBOARD_ROUTE, PAYMENT_ROUTE};
use crate::infrastructure::config::AppConfig;
use crate::presentation::middleware::AuthenticatedUser;
use actix_web::{HttpResponse, ResponseError, web};
use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

/// Typed storage over whichever backend the process was started with.
pub type AppStorage = LocalStorage<dyn KeyValueStore>;

pub struct AppState {
    pub auth_service: AuthService<AppStorage>,
    pub booking_service: BookingService<AppStorage>,
}

impl AppState {
    pub fn new(store: Arc<dyn KeyValueStore>, config: &AppConfig) -> Result<Self> {
        let storage = Arc::new(LocalStorage::new(store));
        let catalog = Arc::new(SpotCatalog::new(config.load_spots()?));
        Ok(Self {
            auth_service: AuthService::new(Arc::clone(&storage)),
            booking_service: BookingService::new(
                storage,
                catalog,
                PricingPolicy::new(&config.pricing),
                config.payment_delay,
            ),
        })
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    details: serde_json::Value,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Unauthorized: {message}")]
    Unauthorized {
        message: String,
        redirect: Option<&'static str>,
    },
    #[error("Not found: {message}")]
    NotFound {
        message: String,
        redirect: Option<&'static str>,
    },
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_msg = self.to_string();

        let details = match self {
            ApiError::Unauthorized { message, redirect }
            | ApiError::NotFound { message, redirect } => match redirect {
                Some(route) => serde_json::json!({ "message": message, "redirect": route }),
                None => serde_json::json!({ "message": message }),
            },
            ApiError::Validation(msg)
            | ApiError::Conflict(msg)
            | ApiError::Storage(msg)
            | ApiError::Internal(msg) => serde_json::json!({ "message": msg }),
        };

        if status.is_server_error() {
            error!(error = %error_msg, status = %status, "Request failed");
        } else {
            warn!(error = %error_msg, status = %status, "Request rejected");
        }

        HttpResponse::build(status).json(ErrorResponse {
            error: error_msg,
            details,
        })
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        let Some(domain) = err.downcast_ref::<DomainError>() else {
            return ApiError::Internal(err.to_string());
        };
        let redirect = domain.redirect();
        match domain {
            DomainError::Validation(msg) => ApiError::Validation(msg.clone()),
            DomainError::Unauthorized(msg) => ApiError::Unauthorized {
                message: msg.clone(),
                redirect,
            },
            DomainError::SessionRequired => ApiError::Unauthorized {
                message: "Please sign in to continue".to_string(),
                redirect,
            },
            DomainError::ReservationMissing { .. } => ApiError::NotFound {
                message: "No registration data found. Please register first.".to_string(),
                redirect,
            },
            DomainError::SpotUnavailable(_) => ApiError::Conflict(domain.to_string()),
            DomainError::Storage(msg) => ApiError::Storage(msg.clone()),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

#[instrument]
pub async fn health_check() -> HttpResponse {
    info!("Health check requested");
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotQuery {
    #[serde(default, deserialize_with = "blank_car_type")]
    pub car_type: Option<CarType>,
}

#[instrument(skip(state, _user))]
pub async fn list_spots(
    state: web::Data<AppState>,
    _user: AuthenticatedUser,
    query: web::Query<SpotQuery>,
) -> Result<HttpResponse, ApiError> {
    let spots: Vec<ParkingSpot> = state.booking_service.catalog().list(query.car_type);
    info!(count = spots.len(), "Listing parking spots");
    Ok(HttpResponse::Ok().json(spots))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingQuery {
    #[serde(default, deserialize_with = "blank_hours")]
    pub hours: Option<u32>,
    #[serde(default, deserialize_with = "blank_car_type")]
    pub car_type: Option<CarType>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PricingResponse {
    plans: Vec<PricingPlan>,
    discounted_car_type: CarType,
    #[serde(skip_serializing_if = "Option::is_none")]
    quote: Option<PriceQuote>,
}

/// Public plan table plus an optional live quote for the form.
#[instrument(skip(state))]
pub async fn pricing(
    state: web::Data<AppState>,
    query: web::Query<PricingQuery>,
) -> Result<HttpResponse, ApiError> {
    let policy = state.booking_service.pricing();
    let quote = match (query.hours, query.car_type) {
        (Some(hours), Some(car_type)) => Some(policy.quote(hours, car_type)?),
        _ => None,
    };
    Ok(HttpResponse::Ok().json(PricingResponse {
        plans: pricing_plans(),
        discounted_car_type: policy.discounted_car_type(),
        quote,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReservationResponse {
    reservation: Reservation,
    message: String,
    redirect: &'static str,
}

#[instrument(skip(state, user, req))]
pub async fn create_reservation(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<ReservationRequest>,
) -> Result<HttpResponse, ApiError> {
    info!(spot = %req.selected_spot, "Reservation form submitted");
    let reservation = state
        .booking_service
        .create_reservation(&user.0, req.into_inner())
        .await
        .map_err(|e| {
            warn!(error = %e, "Reservation rejected");
            e
        })?;
    Ok(HttpResponse::Created().json(ReservationResponse {
        reservation,
        message: "Proceeding to payment...".to_string(),
        redirect: PAYMENT_ROUTE,
    }))
}

#[instrument(skip(state, user))]
pub async fn get_reservation(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let reservation = state.booking_service.pending_reservation(&user.0).await?;
    Ok(HttpResponse::Ok().json(reservation))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentResponse {
    #[serde(flatten)]
    receipt: PaymentReceipt,
    redirect: &'static str,
}

#[instrument(skip(state, user, req))]
pub async fn pay(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<PaymentMethod>,
) -> Result<HttpResponse, ApiError> {
    let method = req.into_inner();
    info!(method = method.label(), "Payment submitted");
    let receipt = state
        .booking_service
        .pay(&user.0, method)
        .await
        .map_err(|e| {
            error!(error = %e, "Payment failed");
            e
        })?;
    Ok(HttpResponse::Ok().json(PaymentResponse {
        receipt,
        redirect: CONFIRMATION_ROUTE,
    }))
}

const ARRIVAL_NOTES: [&str; 3] = [
    "Please display this confirmation at the parking entrance",
    "Arrive within 15 minutes to claim your reserved spot",
    "Additional charges apply for extended duration",
];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmationResponse {
    #[serde(flatten)]
    reservation: Reservation,
    notes: Vec<&'static str>,
}

#[instrument(skip(state, user))]
pub async fn get_confirmation(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let reservation = state.booking_service.confirmation(&user.0).await?;
    info!(reference = %reservation.booking_reference, "Confirmation viewed");
    Ok(HttpResponse::Ok().json(ConfirmationResponse {
        reservation,
        notes: ARRIVAL_NOTES.to_vec(),
    }))
}

#[instrument(skip(state, user))]
pub async fn finish_confirmation(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    state.booking_service.finish(&user.0).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "redirect": DASHBOARD_ROUTE })))
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::Validation(format!("Invalid request body: {err}")).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        ApiError::Validation(format!("Invalid query string: {err}")).into()
    })
}

/// Mounts every API route under `/api`. Malformed bodies and query strings
/// are reported through `ApiError` like any other validation failure.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(json_config())
            .app_data(query_config())
            .route("/health", web::get().to(health_check))
            .route("/auth/sign-in", web::post().to(crate::presentation::auth::sign_in))
            .route("/auth/sign-up", web::post().to(crate::presentation::auth::sign_up))
            .route("/auth/logout", web::post().to(crate::presentation::auth::logout))
            .route("/dashboard", web::get().to(crate::presentation::auth::dashboard))
            .route("/spots", web::get().to(list_spots))
            .route("/pricing", web::get().to(pricing))
            .route("/reservation", web::post().to(create_reservation))
            .route("/reservation", web::get().to(get_reservation))
            .route("/payment", web::post().to(pay))
            .route("/confirmation", web::get().to(get_confirmation))
            .route("/confirmation", web::delete().to(finish_confirmation)),
    );
}
