// dtos/pickupdtos.rs
use std::borrow::Cow;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::pickupmodel::{PickupRequest, PickupWasteType, RecurringSchedule, TIME_SLOTS};

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePickupDto {
    #[validate(custom = "validate_not_blank")]
    #[serde(default)]
    pub address: String,

    #[validate(required(message = "Pickup date is required"))]
    pub preferred_date: Option<NaiveDate>,

    #[validate(custom = "validate_time_slot")]
    #[serde(default)]
    pub time_slot: String,

    #[validate(length(min = 1, message = "Please select at least one waste type"))]
    #[serde(default)]
    pub waste_types: Vec<PickupWasteType>,

    #[validate(length(max = 500, message = "Special instructions must be at most 500 characters"))]
    pub special_instructions: Option<String>,

    #[validate(length(max = 500, message = "Driver notes must be at most 500 characters"))]
    pub driver_notes: Option<String>,

    #[validate(range(min = 1, max = 100, message = "Estimated weight must be between 1 and 100 kg"))]
    #[serde(default = "default_weight")]
    pub estimated_weight: i32,

    #[serde(default)]
    pub recurring: RecurringSchedule,

    #[serde(default)]
    pub priority: bool,

    #[serde(default = "default_true")]
    pub notification_email: bool,

    #[serde(default)]
    pub notification_sms: bool,
}

fn default_weight() -> i32 {
    10
}

fn default_true() -> bool {
    true
}

fn validate_not_blank(address: &str) -> Result<(), ValidationError> {
    if address.trim().is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some(Cow::from("Address is required"));
        return Err(error);
    }
    Ok(())
}

fn validate_time_slot(slot: &str) -> Result<(), ValidationError> {
    if slot.trim().is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some(Cow::from("Time slot is required"));
        return Err(error);
    }
    if !TIME_SLOTS.contains(&slot) {
        let mut error = ValidationError::new("invalid_time_slot");
        error.message = Some(Cow::from("Time slot must be one of the offered windows"));
        return Err(error);
    }
    Ok(())
}

impl SchedulePickupDto {
    /// Field rules plus the date rule, which depends on the caller's notion of today.
    /// A pickup can be booked for tomorrow at the earliest.
    pub fn validate_for(&self, today: NaiveDate) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if let Some(date) = self.preferred_date {
            if date <= today {
                let mut error = ValidationError::new("past_date");
                error.message = Some(Cow::from("Pickup date must be in the future"));
                errors.add("preferred_date", error);
            }
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PickupEstimateDto {
    pub estimated_price: f64,
    pub estimated_co2_saved: f64,
    pub discount_percent: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PickupResponseDto {
    pub status: String,
    pub data: PickupRequest,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PickupListResponseDto {
    pub status: String,
    pub results: usize,
    pub pickups: Vec<PickupRequest>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_dto() -> SchedulePickupDto {
        SchedulePickupDto {
            address: "12 Green Lane".to_string(),
            preferred_date: NaiveDate::from_ymd_opt(2026, 10, 21),
            time_slot: TIME_SLOTS[1].to_string(),
            waste_types: vec![PickupWasteType::Recyclable],
            estimated_weight: 10,
            ..Default::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn accepts_complete_request() {
        assert!(valid_dto().validate_for(today()).is_ok());
    }

    #[test]
    fn rejects_past_and_same_day_dates() {
        let mut dto = valid_dto();
        dto.preferred_date = NaiveDate::from_ymd_opt(2026, 10, 1);
        let errors = dto.validate_for(today()).unwrap_err();
        assert!(errors.field_errors().contains_key("preferred_date"));

        dto.preferred_date = Some(today());
        assert!(dto.validate_for(today()).is_err());
    }

    #[test]
    fn reports_every_missing_field() {
        let dto = SchedulePickupDto {
            address: "   ".to_string(),
            estimated_weight: 10,
            ..Default::default()
        };
        let errors = dto.validate_for(today()).unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("address"));
        assert!(fields.contains_key("preferred_date"));
        assert!(fields.contains_key("time_slot"));
        assert!(fields.contains_key("waste_types"));
    }

    #[test]
    fn rejects_unknown_time_slot_and_heavy_loads() {
        let mut dto = valid_dto();
        dto.time_slot = "midnight".to_string();
        dto.estimated_weight = 250;
        let errors = dto.validate_for(today()).unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("time_slot"));
        assert!(fields.contains_key("estimated_weight"));
    }

    #[test]
    fn deserializes_camel_case_body() {
        let dto: SchedulePickupDto = serde_json::from_str(
            r#"{
                "address": "5 Elm St",
                "preferredDate": "2026-11-02",
                "timeSlot": "8:00 AM - 10:00 AM",
                "wasteTypes": ["electronic", "bulky"],
                "recurring": "weekly",
                "priority": true
            }"#,
        )
        .unwrap();
        assert_eq!(dto.estimated_weight, 10);
        assert_eq!(dto.recurring, RecurringSchedule::Weekly);
        assert!(dto.notification_email);
        assert_eq!(dto.waste_types, vec![PickupWasteType::Electronic, PickupWasteType::Bulky]);
    }
}
