// service/classifier.rs
use std::sync::Arc;

use reqwest::{header::CONTENT_TYPE, Client};
use serde::Deserialize;

use crate::{
    config::Config,
    dtos::classifydtos::{ClassificationResponseDto, EnhancedClassificationResult, EnhancedClassifyDto},
    models::classificationmodel::{ClassificationItem, WasteCategory},
    service::{
        error::ServiceError,
        gemini::{Content, GenerativeModel, Part},
        response_parser::{extract_json, parse_classification},
        waste_catalog,
    },
    utils::image_utils::{decode_data_url, encode_bytes, InlineImage, MAX_IMAGE_SIZE_MB},
};

pub const PING_PROMPT: &str = "ping";

/// Upper bound on `itemsDetected`; anything larger is a model glitch.
pub const MAX_ITEMS_PER_IMAGE: u32 = 100;

pub fn classification_prompt() -> String {
    let categories: Vec<&str> = WasteCategory::ALL.iter().map(|c| c.to_str()).collect();
    format!(
        r#"You are an expert waste classification AI. Analyze this image and classify the waste into one of these 7 categories: {}.

Please provide:
1. The most likely category from the 7 options
2. Confidence percentage (0-100)
3. Detailed explanation of your analysis
4. Consider material composition, shape, and visible recycling symbols
5. Handle unclear images by providing your best assessment

Respond in this exact JSON format:
{{
  "category": "category_name",
  "confidence": confidence_percentage,
  "explanation": "detailed_explanation_of_analysis"
}}

Focus on accuracy and provide educational explanations about why you classified the item as you did."#,
        categories.join(", ")
    )
}

/// Switches for the multi-item prompt. OCR and explanations are on unless turned off.
#[derive(Debug, Clone, PartialEq)]
pub struct EnhancedOptions {
    pub enable_ocr: bool,
    pub enable_explanation: bool,
    pub user_location: Option<String>,
}

impl Default for EnhancedOptions {
    fn default() -> Self {
        Self {
            enable_ocr: true,
            enable_explanation: true,
            user_location: None,
        }
    }
}

impl From<&EnhancedClassifyDto> for EnhancedOptions {
    fn from(dto: &EnhancedClassifyDto) -> Self {
        Self {
            enable_ocr: dto.enable_ocr != Some(false),
            enable_explanation: dto.enable_explanation != Some(false),
            user_location: dto
                .user_location
                .as_deref()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
        }
    }
}

pub fn enhanced_prompt(options: &EnhancedOptions) -> String {
    let ocr = if options.enable_ocr {
        "Extract any visible text from labels or packaging"
    } else {
        ""
    };
    let explanation = if options.enable_explanation {
        "Explain your reasoning for each classification in detail, including WHY each item belongs to its category"
    } else {
        ""
    };
    let location = match &options.user_location {
        Some(location) => format!("Consider local regulations for {}", location),
        None => "Provide general disposal guidelines".to_string(),
    };

    format!(
        r#"Analyze this waste image and provide a detailed classification in JSON format.

Instructions:
1. Detect ALL waste items in the image (multi-item detection)
2. For each item, classify as: recyclable, organic, hazardous, or general waste
3. Provide confidence scores (0-100) for each classification
4. {}
5. {}
6. Provide specific disposal instructions for each item
7. {}
8. Estimate CO2 impact if properly recycled (in kg)
9. Provide context-aware tips (e.g., 'Pizza box? If greasy → general waste. If clean → recyclable.')

Return ONLY a valid JSON object with this exact structure (no markdown, no code blocks):
{{
  "itemsDetected": <number>,
  "items": [
    {{
      "wasteType": "recyclable|organic|hazardous|general",
      "confidence": <number 0-100>,
      "disposalInstructions": "<detailed instructions>"
    }}
  ],
  "explanation": "<detailed reasoning with WHY for each classification>",
  "ocrText": "<extracted text from labels if any>",
  "contextTips": ["<practical tip 1>", "<practical tip 2>"],
  "carbonImpact": <number in kg>
}}"#,
        ocr, explanation, location
    )
}

/// The multi-item answer before defaults are filled in.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnhancedResult {
    #[serde(default)]
    items_detected: Option<f64>,
    #[serde(default)]
    items: Option<Vec<ClassificationItem>>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    ocr_text: Option<String>,
    #[serde(default)]
    context_tips: Option<Vec<String>>,
    #[serde(default)]
    carbon_impact: Option<f64>,
}

impl From<RawEnhancedResult> for EnhancedClassificationResult {
    fn from(raw: RawEnhancedResult) -> Self {
        let items_detected = raw
            .items_detected
            .filter(|n| n.is_finite() && *n >= 1.0)
            .map(|n| n.round().min(MAX_ITEMS_PER_IMAGE as f64) as u32)
            .unwrap_or(1);

        EnhancedClassificationResult {
            items_detected,
            items: raw.items.unwrap_or_default(),
            explanation: raw.explanation.unwrap_or_default(),
            ocr_text: raw.ocr_text.filter(|t| !t.trim().is_empty()),
            context_tips: raw.context_tips.unwrap_or_default(),
            carbon_impact: raw.carbon_impact.filter(|c| c.is_finite()).unwrap_or(0.0),
        }
    }
}

pub fn parse_enhanced(text: &str) -> Result<EnhancedClassificationResult, ServiceError> {
    let (raw, strategy) = extract_json::<RawEnhancedResult>(text)?;
    tracing::debug!(?strategy, "parsed multi-item response");
    Ok(raw.into())
}

#[derive(Debug, Clone)]
pub struct ClassificationService {
    model: Arc<dyn GenerativeModel>,
    http: Client,
    env: Config,
}

impl ClassificationService {
    pub fn new(model: Arc<dyn GenerativeModel>, env: Config) -> Self {
        Self {
            model,
            http: Client::new(),
            env,
        }
    }

    /// Single attempt against the model; no retry on any failure.
    pub async fn classify(
        &self,
        image: &str,
        api_key: Option<&str>,
    ) -> Result<ClassificationResponseDto, ServiceError> {
        if image.trim().is_empty() {
            return Err(ServiceError::Validation("No image provided".to_string()));
        }
        let key = self
            .env
            .resolve_api_key(api_key)
            .ok_or(ServiceError::MissingApiKey)?;

        let image = decode_data_url(image)?;
        tracing::debug!(mime_type = %image.mime_type, "classifying image");

        let text = self
            .model
            .generate_content(
                &key,
                vec![Content::user(vec![
                    Part::text(classification_prompt()),
                    Part::image(image.mime_type, image.base64_data),
                ])],
            )
            .await?;

        let raw = parse_classification(&text)?;
        Ok(waste_catalog::enrich(&raw))
    }

    /// Multi-item variant. Only the server key is used here.
    pub async fn enhanced_classify(
        &self,
        image_url: &str,
        options: &EnhancedOptions,
    ) -> Result<EnhancedClassificationResult, ServiceError> {
        let key = self.env.resolve_api_key(None).ok_or(ServiceError::MissingApiKey)?;
        let image = self.load_image(image_url).await?;

        let text = self
            .model
            .generate_content(
                &key,
                vec![Content::user(vec![
                    Part::text(enhanced_prompt(options)),
                    Part::image(image.mime_type, image.base64_data),
                ])],
            )
            .await?;

        let result = parse_enhanced(&text)?;
        tracing::info!(
            items_detected = result.items_detected,
            carbon_impact = result.carbon_impact,
            "multi-item classification complete"
        );
        Ok(result)
    }

    /// Cheap ping used by the settings page. A caller-supplied key is tried
    /// before the server one, since the point is to test that key.
    pub async fn check_api_key(&self, provided: Option<&str>) -> Result<(), ServiceError> {
        let key = provided
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .or_else(|| self.env.gemini_api_key.clone())
            .ok_or(ServiceError::MissingApiKey)?;

        self.model
            .generate_content(&key, vec![Content::user(vec![Part::text(PING_PROMPT)])])
            .await?;
        Ok(())
    }

    async fn load_image(&self, image_url: &str) -> Result<InlineImage, ServiceError> {
        let image_url = image_url.trim();
        if image_url.starts_with("data:") {
            return decode_data_url(image_url);
        }
        if !(image_url.starts_with("http://") || image_url.starts_with("https://")) {
            return Err(ServiceError::Validation(format!("Unsupported image URL: {}", image_url)));
        }

        let mut response = self.http.get(image_url).send().await?.error_for_status()?;
        let declared = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());

        let limit = MAX_IMAGE_SIZE_MB * 1024 * 1024;
        if let Some(length) = response.content_length() {
            check_download_size(usize::try_from(length).unwrap_or(usize::MAX), limit)?;
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            check_download_size(bytes.len() + chunk.len(), limit)?;
            bytes.extend_from_slice(&chunk);
        }

        encode_bytes(&bytes, declared.as_deref())
    }
}

fn check_download_size(size: usize, limit: usize) -> Result<(), ServiceError> {
    if size > limit {
        return Err(ServiceError::ImageDecode(format!(
            "image is larger than the {} MB limit",
            limit / (1024 * 1024)
        )));
    }
    Ok(())
}
