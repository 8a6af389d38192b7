// models/classificationmodel.rs
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use crate::service::response_parser::lenient_percent;

/// The seven material categories the basic classifier may answer with.
/// `Unknown` is where labels outside that set end up.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "waste_category")]
pub enum WasteCategory {
    #[sqlx(rename = "Plastic")]
    Plastic,
    #[sqlx(rename = "Glass")]
    Glass,
    #[sqlx(rename = "Metal")]
    Metal,
    #[sqlx(rename = "Paper")]
    Paper,
    #[sqlx(rename = "Organic")]
    Organic,
    #[serde(rename = "E-waste")]
    #[sqlx(rename = "E-waste")]
    EWaste,
    #[sqlx(rename = "Biomedical")]
    Biomedical,
    #[sqlx(rename = "Unknown")]
    Unknown,
}

impl WasteCategory {
    pub const ALL: [WasteCategory; 7] = [
        WasteCategory::Plastic,
        WasteCategory::Glass,
        WasteCategory::Metal,
        WasteCategory::Paper,
        WasteCategory::Organic,
        WasteCategory::EWaste,
        WasteCategory::Biomedical,
    ];

    pub fn to_str(&self) -> &str {
        match self {
            WasteCategory::Plastic => "Plastic",
            WasteCategory::Glass => "Glass",
            WasteCategory::Metal => "Metal",
            WasteCategory::Paper => "Paper",
            WasteCategory::Organic => "Organic",
            WasteCategory::EWaste => "E-waste",
            WasteCategory::Biomedical => "Biomedical",
            WasteCategory::Unknown => "Unknown",
        }
    }

    /// Lenient match against what a model tends to write back.
    pub fn from_label(label: &str) -> WasteCategory {
        let normalized: String = label
            .trim()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "plastic" | "plastics" => WasteCategory::Plastic,
            "glass" => WasteCategory::Glass,
            "metal" | "metals" => WasteCategory::Metal,
            "paper" | "cardboard" => WasteCategory::Paper,
            "organic" => WasteCategory::Organic,
            "ewaste" | "electronic" | "electronicwaste" => WasteCategory::EWaste,
            "biomedical" | "medical" => WasteCategory::Biomedical,
            _ => WasteCategory::Unknown,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, WasteCategory::Unknown)
    }
}

impl fmt::Display for WasteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Coarse bucket the multi-item classifier sorts every detected item into.
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ItemWasteType {
    Recyclable,
    Organic,
    Hazardous,
    #[default]
    #[serde(other)]
    General,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationItem {
    #[serde(default)]
    pub waste_type: ItemWasteType,
    #[serde(default, deserialize_with = "lenient_percent")]
    pub confidence: f64,
    #[serde(default)]
    pub disposal_instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

#[derive(Debug, Deserialize, Serialize, Clone, sqlx::FromRow)]
pub struct ClassificationRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_url: String,
    pub category: WasteCategory,
    pub confidence: i32,
    pub explanation: String,
    pub recycling_tips: Vec<String>,
    pub disposal_method: String,
    pub environmental_impact: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, Clone, sqlx::FromRow)]
pub struct EnhancedClassificationRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_url: String,
    pub waste_type: String,
    pub confidence: f64,
    pub disposal_instructions: String,
    pub items_detected: i32,
    pub explanation: String,
    pub ocr_text: Option<String>,
    pub context_tips: Vec<String>,
    pub multi_item_results: Option<Json<Vec<ClassificationItem>>>,
    pub carbon_impact: f64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_label_accepts_model_spellings() {
        assert_eq!(WasteCategory::from_label("Plastic"), WasteCategory::Plastic);
        assert_eq!(WasteCategory::from_label(" e-waste "), WasteCategory::EWaste);
        assert_eq!(WasteCategory::from_label("E-Waste"), WasteCategory::EWaste);
        assert_eq!(WasteCategory::from_label("BIOMEDICAL"), WasteCategory::Biomedical);
        assert_eq!(WasteCategory::from_label("Styrofoam"), WasteCategory::Unknown);
        assert_eq!(WasteCategory::from_label(""), WasteCategory::Unknown);
    }

    #[test]
    fn category_serializes_with_display_label() {
        let json = serde_json::to_string(&WasteCategory::EWaste).unwrap();
        assert_eq!(json, "\"E-waste\"");
        assert_eq!(WasteCategory::EWaste.to_string(), "E-waste");
    }

    #[test]
    fn unrecognised_item_type_falls_back_to_general() {
        let item: ClassificationItem = serde_json::from_str(
            r#"{"wasteType":"compost","confidence":80,"disposalInstructions":"bin it"}"#,
        )
        .unwrap();
        assert_eq!(item.waste_type, ItemWasteType::General);

        let item: ClassificationItem =
            serde_json::from_str(r#"{"wasteType":"recyclable"}"#).unwrap();
        assert_eq!(item.waste_type, ItemWasteType::Recyclable);
        assert_eq!(item.confidence, 0.0);
    }

    #[test]
    fn sparse_items_still_deserialize() {
        let items: Vec<ClassificationItem> = serde_json::from_str(
            r#"[{"wasteType":"recyclable"},{"confidence":"80%"},{"wasteType":"organic","confidence":null}]"#,
        )
        .unwrap();
        assert_eq!(items[0].waste_type, ItemWasteType::Recyclable);
        assert_eq!(items[1].waste_type, ItemWasteType::General);
        assert_eq!(items[1].confidence, 80.0);
        assert_eq!(items[2].confidence, 0.0);
    }

    #[test]
    fn item_confidence_is_a_whole_percentage() {
        let confidence = |raw: &str| {
            let json = format!(r#"{{"wasteType":"general","confidence":{}}}"#, raw);
            serde_json::from_str::<ClassificationItem>(&json).unwrap().confidence
        };
        assert_eq!(confidence("-5"), 0.0);
        assert_eq!(confidence("140"), 100.0);
        assert_eq!(confidence("72.6"), 73.0);
        assert_eq!(confidence(r#""101%""#), 100.0);
    }
}
