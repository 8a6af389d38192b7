// db/classificationdb.rs
use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use super::db::DBClient;

use crate::{
    dtos::classifydtos::{ClassificationResponseDto, EnhancedClassificationResult},
    models::classificationmodel::{ClassificationRecord, EnhancedClassificationRecord, ItemWasteType},
};

#[async_trait]
pub trait ClassificationExt {
    async fn save_classification(
        &self,
        user_id: Uuid,
        image_url: &str,
        result: &ClassificationResponseDto,
    ) -> Result<ClassificationRecord, sqlx::Error>;

    async fn save_enhanced_classification(
        &self,
        user_id: Uuid,
        image_url: &str,
        result: &EnhancedClassificationResult,
    ) -> Result<EnhancedClassificationRecord, sqlx::Error>;

    async fn get_user_classifications(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ClassificationRecord>, sqlx::Error>;
}

#[async_trait]
impl ClassificationExt for DBClient {
    async fn save_classification(
        &self,
        user_id: Uuid,
        image_url: &str,
        result: &ClassificationResponseDto,
    ) -> Result<ClassificationRecord, sqlx::Error> {
        sqlx::query_as::<_, ClassificationRecord>(
            r#"
            INSERT INTO waste_classifications
                (user_id, image_url, category, confidence, explanation,
                 recycling_tips, disposal_method, environmental_impact)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, image_url, category, confidence, explanation,
                recycling_tips, disposal_method, environmental_impact, created_at
            "#,
        )
        .bind(user_id)
        .bind(image_url)
        .bind(result.category)
        .bind(i32::from(result.confidence))
        .bind(&result.explanation)
        .bind(&result.recycling_tips)
        .bind(&result.disposal_method)
        .bind(&result.environmental_impact)
        .fetch_one(&self.pool)
        .await
    }

    async fn save_enhanced_classification(
        &self,
        user_id: Uuid,
        image_url: &str,
        result: &EnhancedClassificationResult,
    ) -> Result<EnhancedClassificationRecord, sqlx::Error> {
        let primary = result.items.first();
        let waste_type = primary.map(|i| i.waste_type).unwrap_or(ItemWasteType::General);
        let waste_type = serde_json::to_value(waste_type)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| "general".to_string());
        let multi_item_results = if result.items.len() > 1 {
            Some(Json(result.items.clone()))
        } else {
            None
        };

        sqlx::query_as::<_, EnhancedClassificationRecord>(
            r#"
            INSERT INTO enhanced_classifications
                (user_id, image_url, waste_type, confidence, disposal_instructions,
                 items_detected, explanation, ocr_text, context_tips,
                 multi_item_results, carbon_impact)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, user_id, image_url, waste_type, confidence, disposal_instructions,
                items_detected, explanation, ocr_text, context_tips,
                multi_item_results, carbon_impact, created_at
            "#,
        )
        .bind(user_id)
        .bind(image_url)
        .bind(waste_type)
        .bind(primary.map(|i| i.confidence).unwrap_or(0.0))
        .bind(primary.map(|i| i.disposal_instructions.clone()).unwrap_or_default())
        .bind(i32::try_from(result.items_detected).unwrap_or(i32::MAX))
        .bind(&result.explanation)
        .bind(&result.ocr_text)
        .bind(&result.context_tips)
        .bind(multi_item_results)
        .bind(result.carbon_impact)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_user_classifications(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ClassificationRecord>, sqlx::Error> {
        sqlx::query_as::<_, ClassificationRecord>(
            r#"
            SELECT id, user_id, image_url, category, confidence, explanation,
                recycling_tips, disposal_method, environmental_impact, created_at
            FROM waste_classifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}
