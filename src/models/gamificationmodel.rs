// models/gamificationmodel.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, sqlx::FromRow)]
pub struct UserStats {
    pub user_id: Uuid,
    pub total_points: i32,
    pub level: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_date: Option<NaiveDate>,
    pub total_co2_saved: f64,
    pub total_items_classified: i32,
    pub total_items_recycled: i32,
}

impl UserStats {
    /// Row shape for a user who has never classified anything.
    pub fn empty(user_id: Uuid) -> Self {
        UserStats {
            user_id,
            total_points: 0,
            level: 1,
            current_streak: 0,
            longest_streak: 0,
            last_activity_date: None,
            total_co2_saved: 0.0,
            total_items_classified: 0,
            total_items_recycled: 0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "badge_requirement", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequirementType {
    Count,
    Streak,
    Co2,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, sqlx::FromRow)]
pub struct Badge {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: String,
    pub requirement_type: RequirementType,
    pub requirement_value: f64,
    pub points_reward: i32,
}

#[derive(Debug, Deserialize, Serialize, Clone, sqlx::FromRow)]
pub struct UserBadge {
    pub id: Uuid,
    pub user_id: Uuid,
    pub badge_id: Uuid,
    pub earned_at: DateTime<Utc>,
    pub badge: Json<Badge>,
}

#[derive(Debug, Deserialize, Serialize, Clone, sqlx::FromRow)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub user_id: Uuid,
    pub points: i32,
    pub username: String,
    pub avatar_url: Option<String>,
    pub level: i32,
}

#[derive(Debug, Deserialize, Serialize, Clone, sqlx::FromRow)]
pub struct Challenge {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub challenge_type: String,
    pub goal_type: String,
    pub goal_value: i32,
    pub points_reward: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize, Clone, sqlx::FromRow)]
pub struct UserChallenge {
    pub id: Uuid,
    pub user_id: Uuid,
    pub challenge_id: Uuid,
    pub current_progress: i32,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub challenge: Json<Challenge>,
}
