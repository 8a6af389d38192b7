// dtos/classifydtos.rs
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::classificationmodel::{ClassificationItem, ClassificationRecord, WasteCategory};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyWasteDto {
    #[validate(length(min = 1, message = "No image provided"))]
    #[serde(default)]
    pub image: String,
    pub api_key: Option<String>,
}

/// What the basic classifier returns to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResponseDto {
    pub category: WasteCategory,
    pub confidence: u8,
    pub explanation: String,
    pub recycling_tips: Vec<String>,
    pub disposal_method: String,
    pub environmental_impact: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedClassifyDto {
    #[validate(length(min = 1, message = "Image URL is required"))]
    #[serde(default)]
    pub image_url: String,
    pub enable_ocr: Option<bool>,
    pub enable_explanation: Option<bool>,
    pub user_location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedClassificationResult {
    pub items_detected: u32,
    pub items: Vec<ClassificationItem>,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_text: Option<String>,
    pub context_tips: Vec<String>,
    pub carbon_impact: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HistoryQueryDto {
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClassificationHistoryDto {
    pub status: String,
    pub results: usize,
    pub classifications: Vec<ClassificationRecord>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyCheckDto {
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyCheckResponseDto {
    pub ok: bool,
    pub message: String,
}
