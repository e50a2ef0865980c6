use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(u64);

impl Amount {
    pub fn new(value: u64) -> Self {
        Amount(value)
    }

    pub fn inner(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{}", self.0)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CarType {
    Electric,
    Normal,
}

impl CarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarType::Electric => "electric",
            CarType::Normal => "normal",
        }
    }
}

impl fmt::Display for CarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CarType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "electric" => Ok(CarType::Electric),
            "normal" => Ok(CarType::Normal),
            other => Err(format!("unknown car type: {other}")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParkingSpot {
    pub id: String,
    pub occupied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_class: Option<CarType>,
}

impl ParkingSpot {
    pub fn new(id: &str, occupied: bool) -> Self {
        Self {
            id: id.to_string(),
            occupied,
            vehicle_class: None,
        }
    }

    pub fn with_class(mut self, class: CarType) -> Self {
        self.vehicle_class = Some(class);
        self
    }

    /// Untagged spots take any vehicle; tagged ones only their own class.
    pub fn accepts(&self, car_type: CarType) -> bool {
        self.vehicle_class.is_none_or(|class| class == car_type)
    }
}

/// Raw reservation form input. Empty strings count as missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReservationRequest {
    pub owner_name: String,
    pub car_number: String,
    #[serde(deserialize_with = "blank_hours")]
    pub parking_hours: Option<u32>,
    #[serde(deserialize_with = "blank_car_type")]
    pub car_type: Option<CarType>,
    pub selected_spot: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HoursInput {
    Number(u32),
    Text(String),
}

/// Form inputs arrive as strings; an empty one means the field was left blank.
pub fn blank_hours<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<HoursInput>::deserialize(deserializer)? {
        None => Ok(None),
        Some(HoursInput::Number(hours)) => Ok(Some(hours)),
        Some(HoursInput::Text(raw)) if raw.trim().is_empty() => Ok(None),
        Some(HoursInput::Text(raw)) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid parking hours: {raw:?}"))),
    }
}

pub fn blank_car_type<'de, D>(deserializer: D) -> Result<Option<CarType>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw.parse().map(Some).map_err(de::Error::custom),
        _ => Ok(None),
    }
}

/// The single in-flight booking, stored under `registrationData`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub owner_name: String,
    pub car_number: String,
    pub parking_hours: u32,
    pub car_type: CarType,
    pub selected_spot: String,
    pub total_price: Amount,
    pub entry_time: DateTime<Utc>,
    pub return_time: DateTime<Utc>,
    pub booking_reference: String,
}

impl Reservation {
    /// Derives `PARK` plus eight hex digits from the booking content and its
    /// entry time. Same input, same reference.
    pub fn derive_reference(&self) -> String {
        let name = format!(
            "{}|{}|{}|{}|{}|{}|{}",
            self.owner_name,
            self.car_number,
            self.parking_hours,
            self.car_type,
            self.selected_spot,
            self.total_price.inner(),
            self.entry_time.to_rfc3339(),
        );
        let id = Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes());
        let hex = id.simple().to_string();
        format!("PARK{}", hex[..8].to_uppercase())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum PaymentMethod {
    #[serde(rename_all = "camelCase")]
    Upi {
        #[serde(default)]
        upi_id: String,
    },
    #[serde(rename_all = "camelCase")]
    Card {
        #[serde(default)]
        card_number: String,
        #[serde(default)]
        expiry_date: String,
        #[serde(default)]
        cvv: String,
        #[serde(default)]
        name_on_card: String,
    },
}

impl PaymentMethod {
    /// Label shown in the payment success notification.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Upi { .. } => "PhonePe",
            PaymentMethod::Card { .. } => "Card",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub method: String,
    pub amount: Amount,
    pub booking_reference: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub parking_hours: u32,
    pub car_type: CarType,
    pub hourly_rate: Amount,
    pub discount_applied: bool,
    pub total_price: Amount,
}
