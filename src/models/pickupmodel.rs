// models/pickupmodel.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "pickup_waste_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PickupWasteType {
    General,
    Recyclable,
    Organic,
    Electronic,
    Hazardous,
    Bulky,
}

impl PickupWasteType {
    pub fn to_str(&self) -> &str {
        match self {
            PickupWasteType::General => "general",
            PickupWasteType::Recyclable => "recyclable",
            PickupWasteType::Organic => "organic",
            PickupWasteType::Electronic => "electronic",
            PickupWasteType::Hazardous => "hazardous",
            PickupWasteType::Bulky => "bulky",
        }
    }

    pub fn price_per_kg(&self) -> f64 {
        match self {
            PickupWasteType::General => 0.5,
            PickupWasteType::Recyclable => 0.3,
            PickupWasteType::Organic => 0.4,
            PickupWasteType::Electronic => 1.5,
            PickupWasteType::Hazardous => 2.0,
            PickupWasteType::Bulky => 0.8,
        }
    }

    pub fn co2_saved_per_kg(&self) -> f64 {
        match self {
            PickupWasteType::General => 0.1,
            PickupWasteType::Recyclable => 0.8,
            PickupWasteType::Organic => 0.5,
            PickupWasteType::Electronic => 2.5,
            PickupWasteType::Hazardous => 1.2,
            PickupWasteType::Bulky => 0.6,
        }
    }
}

pub const TIME_SLOTS: [&str; 5] = [
    "8:00 AM - 10:00 AM",
    "10:00 AM - 12:00 PM",
    "12:00 PM - 2:00 PM",
    "2:00 PM - 4:00 PM",
    "4:00 PM - 6:00 PM",
];

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "recurring_schedule", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RecurringSchedule {
    #[default]
    None,
    Weekly,
    Biweekly,
    Monthly,
}

impl RecurringSchedule {
    /// Discount in percent applied to the whole estimate.
    pub fn discount_percent(&self) -> f64 {
        match self {
            RecurringSchedule::None => 0.0,
            RecurringSchedule::Weekly => 10.0,
            RecurringSchedule::Biweekly => 8.0,
            RecurringSchedule::Monthly => 5.0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "pickup_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PickupStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Deserialize, Serialize, Clone, sqlx::FromRow)]
pub struct PickupRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address: String,
    pub waste_types: Vec<PickupWasteType>,
    pub preferred_date: NaiveDate,
    pub preferred_time_slot: String,
    pub special_instructions: Option<String>,
    pub driver_notes: Option<String>,
    pub estimated_weight: i32,
    pub recurring_schedule: RecurringSchedule,
    pub is_priority: bool,
    pub notification_email: bool,
    pub notification_sms: bool,
    pub estimated_price: f64,
    pub estimated_co2_saved: f64,
    pub status: PickupStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
