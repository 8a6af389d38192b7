// db/pickupdb.rs
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use super::db::DBClient;

use crate::{
    dtos::pickupdtos::{PickupEstimateDto, SchedulePickupDto},
    models::pickupmodel::{PickupRequest, PickupStatus},
};

const PICKUP_COLUMNS: &str = r#"
    id, user_id, address, waste_types, preferred_date, preferred_time_slot,
    special_instructions, driver_notes, estimated_weight, recurring_schedule,
    is_priority, notification_email, notification_sms, estimated_price,
    estimated_co2_saved, status, created_at, updated_at
"#;

#[async_trait]
pub trait PickupExt {
    async fn create_pickup(
        &self,
        user_id: Uuid,
        preferred_date: NaiveDate,
        request: &SchedulePickupDto,
        estimate: &PickupEstimateDto,
    ) -> Result<PickupRequest, sqlx::Error>;

    async fn get_user_pickups(&self, user_id: Uuid) -> Result<Vec<PickupRequest>, sqlx::Error>;

    async fn get_pickup(&self, user_id: Uuid, pickup_id: Uuid) -> Result<Option<PickupRequest>, sqlx::Error>;

    /// Pending and confirmed pickups across all users, soonest first.
    async fn get_open_pickups(&self, limit: i64) -> Result<Vec<PickupRequest>, sqlx::Error>;
}

#[async_trait]
impl PickupExt for DBClient {
    async fn create_pickup(
        &self,
        user_id: Uuid,
        preferred_date: NaiveDate,
        request: &SchedulePickupDto,
        estimate: &PickupEstimateDto,
    ) -> Result<PickupRequest, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO pickup_requests
                (user_id, address, waste_types, preferred_date, preferred_time_slot,
                 special_instructions, driver_notes, estimated_weight, recurring_schedule,
                 is_priority, notification_email, notification_sms, estimated_price,
                 estimated_co2_saved, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {}
            "#,
            PICKUP_COLUMNS
        );

        sqlx::query_as::<_, PickupRequest>(&query)
            .bind(user_id)
            .bind(request.address.trim())
            .bind(&request.waste_types)
            .bind(preferred_date)
            .bind(&request.time_slot)
            .bind(&request.special_instructions)
            .bind(&request.driver_notes)
            .bind(request.estimated_weight)
            .bind(request.recurring)
            .bind(request.priority)
            .bind(request.notification_email)
            .bind(request.notification_sms)
            .bind(estimate.estimated_price)
            .bind(estimate.estimated_co2_saved)
            .bind(PickupStatus::Pending)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_user_pickups(&self, user_id: Uuid) -> Result<Vec<PickupRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM pickup_requests WHERE user_id = $1 ORDER BY created_at DESC",
            PICKUP_COLUMNS
        );

        sqlx::query_as::<_, PickupRequest>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn get_pickup(&self, user_id: Uuid, pickup_id: Uuid) -> Result<Option<PickupRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM pickup_requests WHERE id = $1 AND user_id = $2",
            PICKUP_COLUMNS
        );

        sqlx::query_as::<_, PickupRequest>(&query)
            .bind(pickup_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_open_pickups(&self, limit: i64) -> Result<Vec<PickupRequest>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {} FROM pickup_requests
            WHERE status IN ('pending', 'confirmed')
            ORDER BY preferred_date ASC, is_priority DESC, created_at ASC
            LIMIT $1
            "#,
            PICKUP_COLUMNS
        );

        sqlx::query_as::<_, PickupRequest>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
    }
}
