use crate::domain::models::ParkingSpot;
use serde::{Deserialize, Serialize};

/// Built-in lot layout: three rows of four, with A2, B3 and C4 taken.
pub fn default_spots() -> Vec<ParkingSpot> {
    [
        ("A1", false),
        ("A2", true),
        ("A3", false),
        ("A4", false),
        ("B1", false),
        ("B2", false),
        ("B3", true),
        ("B4", false),
        ("C1", false),
        ("C2", false),
        ("C3", false),
        ("C4", true),
    ]
    .into_iter()
    .map(|(id, occupied)| ParkingSpot::new(id, occupied))
    .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanFeature {
    pub text: String,
    pub included: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPlan {
    pub category: String,
    pub title: String,
    pub price_per_hour: u64,
    pub featured: bool,
    pub features: Vec<PlanFeature>,
}

fn plan(
    category: &str,
    title: &str,
    price_per_hour: u64,
    featured: bool,
    features: &[(&str, bool)],
) -> PricingPlan {
    PricingPlan {
        category: category.to_string(),
        title: title.to_string(),
        price_per_hour,
        featured,
        features: features
            .iter()
            .map(|(text, included)| PlanFeature {
                text: text.to_string(),
                included: *included,
            })
            .collect(),
    }
}

/// The public plan table. Only the four-wheeler rate feeds reservations.
pub fn pricing_plans() -> Vec<PricingPlan> {
    vec![
        plan(
            "TWO WHEELER",
            "BASIC",
            20,
            false,
            &[
                ("Covered parking spot", true),
                ("CCTV surveillance", true),
                ("Easy bike access", true),
                ("Valet service", false),
                ("Car wash facility", false),
            ],
        ),
        plan(
            "FOUR WHEELER",
            "MEDIUM",
            50,
            true,
            &[
                ("Premium parking spot", true),
                ("24/7 security guard", true),
                ("CCTV surveillance", true),
                ("Valet parking option", true),
                ("Car wash facility", true),
            ],
        ),
        plan(
            "HEAVY VEHICLE",
            "PRO",
            100,
            false,
            &[
                ("Spacious parking area", true),
                ("Loading/unloading zone", true),
                ("24/7 security", true),
                ("Driver rest area", true),
                ("Priority support", true),
            ],
        ),
    ]
}
