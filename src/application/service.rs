use crate::application::catalog::SpotCatalog;
use crate::application::pricing::PricingPolicy;
use crate::domain::error::DomainError;
use crate::domain::models::{
    PaymentMethod, PaymentReceipt, Reservation, ReservationRequest,
};
use crate::domain::repository::ReservationRepository;
use crate::domain::routes::{DASHBOARD_ROUTE, REGISTER_ROUTE};
use crate::domain::user::Session;
use anyhow::Result;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Drives the form, payment and confirmation steps over the single
/// in-flight reservation record. Callers pass the gated `Session`.
pub struct BookingService<R: ReservationRepository> {
    repository: Arc<R>,
    catalog: Arc<SpotCatalog>,
    pricing: PricingPolicy,
    payment_delay: Duration,
}

impl<R: ReservationRepository> BookingService<R> {
    pub fn new(
        repository: Arc<R>,
        catalog: Arc<SpotCatalog>,
        pricing: PricingPolicy,
        payment_delay: Duration,
    ) -> Self {
        Self {
            repository,
            catalog,
            pricing,
            payment_delay,
        }
    }

    pub fn catalog(&self) -> &SpotCatalog {
        &self.catalog
    }

    pub fn pricing(&self) -> &PricingPolicy {
        &self.pricing
    }

    pub async fn create_reservation(
        &self,
        session: &Session,
        req: ReservationRequest,
    ) -> Result<Reservation> {
        self.create_reservation_at(session, req, Utc::now()).await
    }

    /// Validates the form, prices it and replaces the stored reservation.
    #[instrument(skip(self, session, req), fields(user = %session.user_email))]
    pub async fn create_reservation_at(
        &self,
        session: &Session,
        req: ReservationRequest,
        now: DateTime<Utc>,
    ) -> Result<Reservation> {
        let owner_name = req.owner_name.trim();
        let car_number = req.car_number.trim().to_uppercase();
        let selected_spot = req.selected_spot.trim();

        let (Some(hours), Some(car_type)) = (req.parking_hours, req.car_type) else {
            return Err(missing_fields());
        };
        if owner_name.is_empty() || car_number.is_empty() || selected_spot.is_empty() {
            return Err(missing_fields());
        }

        self.pricing.check_hours(hours)?;
        let spot = self.catalog.select(selected_spot, car_type)?;
        let total_price = self.pricing.total_price(hours, car_type);
        let return_time = now
            .checked_add_signed(ChronoDuration::hours(i64::from(hours)))
            .ok_or_else(|| DomainError::validation("Parking duration is too long"))?;

        let mut reservation = Reservation {
            owner_name: owner_name.to_string(),
            car_number,
            parking_hours: hours,
            car_type,
            selected_spot: spot.id.clone(),
            total_price,
            entry_time: now,
            return_time,
            booking_reference: String::new(),
        };
        reservation.booking_reference = reservation.derive_reference();

        self.repository.save_reservation(reservation.clone()).await?;

        info!(
            spot = %reservation.selected_spot,
            hours = hours,
            car_type = %car_type,
            total_price = total_price.inner(),
            reference = %reservation.booking_reference,
            "Reservation details saved"
        );
        Ok(reservation)
    }

    /// Order summary for the payment page.
    #[instrument(skip(self, session), fields(user = %session.user_email))]
    pub async fn pending_reservation(&self, session: &Session) -> Result<Reservation> {
        self.load_or_redirect(REGISTER_ROUTE).await
    }

    /// Mock payment: checks required fields, waits, then always succeeds.
    #[instrument(skip(self, session, method), fields(user = %session.user_email, method = method.label()))]
    pub async fn pay(&self, session: &Session, method: PaymentMethod) -> Result<PaymentReceipt> {
        let reservation = self.load_or_redirect(REGISTER_ROUTE).await?;
        validate_payment(&method)?;

        info!(
            amount = reservation.total_price.inner(),
            delay_ms = self.payment_delay.as_millis() as u64,
            "Processing payment"
        );
        tokio::time::sleep(self.payment_delay).await;

        let receipt = PaymentReceipt {
            method: method.label().to_string(),
            amount: reservation.total_price,
            booking_reference: reservation.booking_reference,
            message: format!(
                "Paid {} via {}",
                reservation.total_price,
                method.label()
            ),
        };
        info!(reference = %receipt.booking_reference, "Payment successful");
        Ok(receipt)
    }

    /// Receipt view. The reference is the one stored at creation.
    #[instrument(skip(self, session), fields(user = %session.user_email))]
    pub async fn confirmation(&self, session: &Session) -> Result<Reservation> {
        self.load_or_redirect(DASHBOARD_ROUTE).await
    }

    /// "Back to dashboard": drops the reservation record.
    #[instrument(skip(self, session), fields(user = %session.user_email))]
    pub async fn finish(&self, session: &Session) -> Result<()> {
        self.repository.clear_reservation().await?;
        info!("Reservation cleared");
        Ok(())
    }

    async fn load_or_redirect(&self, redirect: &'static str) -> Result<Reservation> {
        match self.repository.load_reservation().await? {
            Some(reservation) => Ok(reservation),
            None => {
                debug!(redirect, "No reservation in storage");
                Err(DomainError::ReservationMissing { redirect }.into())
            }
        }
    }
}

fn missing_fields() -> anyhow::Error {
    DomainError::validation("Please fill in all fields and select a parking spot").into()
}

fn validate_payment(method: &PaymentMethod) -> Result<()> {
    match method {
        PaymentMethod::Upi { upi_id } if upi_id.trim().is_empty() => {
            warn!("UPI id missing");
            Err(DomainError::validation("Please enter your UPI ID").into())
        }
        PaymentMethod::Card {
            card_number,
            expiry_date,
            cvv,
            name_on_card,
        } if [card_number, expiry_date, cvv, name_on_card]
            .iter()
            .any(|f| f.trim().is_empty()) =>
        {
            warn!("Card details incomplete");
            Err(DomainError::validation("Please fill in all card details").into())
        }
        _ => Ok(()),
    }
}
