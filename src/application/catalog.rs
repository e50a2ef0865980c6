use crate::domain::error::DomainError;
use crate::domain::models::{CarType, ParkingSpot};
use anyhow::Result;
use tracing::{debug, warn};

/// Read-only lot layout. Selection never changes occupancy.
#[derive(Debug, Clone)]
pub struct SpotCatalog {
    spots: Vec<ParkingSpot>,
}

impl SpotCatalog {
    pub fn new(spots: Vec<ParkingSpot>) -> Self {
        Self { spots }
    }

    pub fn spots(&self) -> &[ParkingSpot] {
        &self.spots
    }

    /// Spots offered for `car_type`; every spot when no type is chosen yet.
    pub fn list(&self, car_type: Option<CarType>) -> Vec<ParkingSpot> {
        self.spots
            .iter()
            .filter(|spot| car_type.is_none_or(|t| spot.accepts(t)))
            .cloned()
            .collect()
    }

    pub fn select(&self, id: &str, car_type: CarType) -> Result<&ParkingSpot> {
        let spot = self
            .spots
            .iter()
            .find(|spot| spot.id == id)
            .ok_or_else(|| DomainError::Validation(format!("Unknown parking spot: {id}")))?;

        if !spot.accepts(car_type) {
            warn!(spot = id, %car_type, "Spot reserved for another vehicle class");
            return Err(DomainError::Validation(format!(
                "Parking spot {id} is not available for {car_type} cars"
            ))
            .into());
        }
        if spot.occupied {
            warn!(spot = id, "Attempt to select an occupied spot");
            return Err(DomainError::SpotUnavailable(id.to_string()).into());
        }

        debug!(spot = id, "Spot selected");
        Ok(spot)
    }
}

impl Default for SpotCatalog {
    fn default() -> Self {
        Self::new(crate::domain::catalog::default_spots())
    }
}
