use crate::domain::error::DomainError;
use crate::domain::models::{Amount, CarType, PriceQuote};
use crate::infrastructure::config::PricingConfig;
use anyhow::Result;

/// Four-wheeler hourly rate.
pub const HOURLY_RATE: u64 = 50;
/// Discount for the configured vehicle class, in percent.
pub const DISCOUNT_PERCENT: u64 = 10;

#[derive(Debug, Clone)]
pub struct PricingPolicy {
    discounted_car_type: CarType,
    max_hours: u32,
}

impl PricingPolicy {
    pub fn new(config: &PricingConfig) -> Self {
        Self {
            discounted_car_type: config.discounted_car_type,
            max_hours: config.max_hours,
        }
    }

    pub fn discounted_car_type(&self) -> CarType {
        self.discounted_car_type
    }

    pub fn is_discounted(&self, car_type: CarType) -> bool {
        car_type == self.discounted_car_type
    }

    /// `round(hours * 50 * factor)`, rounding half up in integer arithmetic.
    pub fn total_price(&self, hours: u32, car_type: CarType) -> Amount {
        let gross = u64::from(hours) * HOURLY_RATE;
        if self.is_discounted(car_type) {
            Amount::new((gross * (100 - DISCOUNT_PERCENT) + 50) / 100)
        } else {
            Amount::new(gross)
        }
    }

    pub fn check_hours(&self, hours: u32) -> Result<()> {
        if hours == 0 || hours > self.max_hours {
            return Err(DomainError::Validation(format!(
                "Parking duration must be between 1 and {} hours",
                self.max_hours
            ))
            .into());
        }
        Ok(())
    }

    pub fn quote(&self, hours: u32, car_type: CarType) -> Result<PriceQuote> {
        self.check_hours(hours)?;
        Ok(PriceQuote {
            parking_hours: hours,
            car_type,
            hourly_rate: Amount::new(HOURLY_RATE),
            discount_applied: self.is_discounted(car_type),
            total_price: self.total_price(hours, car_type),
        })
    }
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self::new(&PricingConfig::default())
    }
}
