// db/gamificationdb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::db::DBClient;

use crate::{
    dtos::gamificationdtos::LeaderboardPeriod,
    models::gamificationmodel::{Badge, Challenge, LeaderboardEntry, UserBadge, UserChallenge, UserStats},
};

#[async_trait]
pub trait GamificationExt: Send + Sync + std::fmt::Debug {
    async fn get_user_stats(&self, user_id: Uuid) -> Result<Option<UserStats>, sqlx::Error>;

    async fn upsert_user_stats(&self, stats: &UserStats) -> Result<UserStats, sqlx::Error>;

    async fn get_all_badges(&self) -> Result<Vec<Badge>, sqlx::Error>;

    async fn get_earned_badge_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error>;

    /// Returns false when the user already held the badge.
    async fn award_badge(&self, user_id: Uuid, badge_id: Uuid) -> Result<bool, sqlx::Error>;

    async fn get_user_badges(&self, user_id: Uuid) -> Result<Vec<UserBadge>, sqlx::Error>;

    async fn get_leaderboard(
        &self,
        period: LeaderboardPeriod,
        since: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>, sqlx::Error>;

    async fn get_active_challenges(&self, now: DateTime<Utc>) -> Result<Vec<Challenge>, sqlx::Error>;

    async fn get_user_challenge_progress(&self, user_id: Uuid) -> Result<Vec<UserChallenge>, sqlx::Error>;
}

const USER_STATS_COLUMNS: &str = r#"
    user_id, total_points, level, current_streak, longest_streak,
    last_activity_date, total_co2_saved, total_items_classified, total_items_recycled
"#;

#[async_trait]
impl GamificationExt for DBClient {
    async fn get_user_stats(&self, user_id: Uuid) -> Result<Option<UserStats>, sqlx::Error> {
        let query = format!("SELECT {} FROM user_stats WHERE user_id = $1", USER_STATS_COLUMNS);

        sqlx::query_as::<_, UserStats>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn upsert_user_stats(&self, stats: &UserStats) -> Result<UserStats, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO user_stats
                (user_id, total_points, level, current_streak, longest_streak,
                 last_activity_date, total_co2_saved, total_items_classified,
                 total_items_recycled, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            ON CONFLICT (user_id) DO UPDATE SET
                total_points = EXCLUDED.total_points,
                level = EXCLUDED.level,
                current_streak = EXCLUDED.current_streak,
                longest_streak = EXCLUDED.longest_streak,
                last_activity_date = EXCLUDED.last_activity_date,
                total_co2_saved = EXCLUDED.total_co2_saved,
                total_items_classified = EXCLUDED.total_items_classified,
                total_items_recycled = EXCLUDED.total_items_recycled,
                updated_at = NOW()
            RETURNING {}
            "#,
            USER_STATS_COLUMNS
        );

        sqlx::query_as::<_, UserStats>(&query)
            .bind(stats.user_id)
            .bind(stats.total_points)
            .bind(stats.level)
            .bind(stats.current_streak)
            .bind(stats.longest_streak)
            .bind(stats.last_activity_date)
            .bind(stats.total_co2_saved)
            .bind(stats.total_items_classified)
            .bind(stats.total_items_recycled)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_all_badges(&self) -> Result<Vec<Badge>, sqlx::Error> {
        sqlx::query_as::<_, Badge>(
            r#"
            SELECT id, name, description, icon, category,
                requirement_type, requirement_value, points_reward
            FROM badges
            ORDER BY requirement_value ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn get_earned_badge_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>("SELECT badge_id FROM user_badges WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn award_badge(&self, user_id: Uuid, badge_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_badges (user_id, badge_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, badge_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(badge_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn get_user_badges(&self, user_id: Uuid) -> Result<Vec<UserBadge>, sqlx::Error> {
        sqlx::query_as::<_, UserBadge>(
            r#"
            SELECT ub.id, ub.user_id, ub.badge_id, ub.earned_at, to_jsonb(b.*) AS badge
            FROM user_badges ub
            JOIN badges b ON b.id = ub.badge_id
            WHERE ub.user_id = $1
            ORDER BY ub.earned_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_leaderboard(
        &self,
        period: LeaderboardPeriod,
        since: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
        match since {
            None => {
                sqlx::query_as::<_, LeaderboardEntry>(
                    r#"
                    SELECT ROW_NUMBER() OVER (ORDER BY s.total_points DESC) AS rank,
                        s.user_id,
                        s.total_points AS points,
                        COALESCE(p.username, 'Anonymous') AS username,
                        p.avatar_url,
                        s.level
                    FROM user_stats s
                    LEFT JOIN profiles p ON p.id = s.user_id
                    ORDER BY s.total_points DESC
                    LIMIT $1
                    "#,
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            Some(since) => {
                sqlx::query_as::<_, LeaderboardEntry>(
                    r#"
                    SELECT l.rank::BIGINT AS rank,
                        l.user_id,
                        l.points,
                        COALESCE(p.username, 'Anonymous') AS username,
                        p.avatar_url,
                        COALESCE(s.level, 1) AS level
                    FROM leaderboard_entries l
                    LEFT JOIN profiles p ON p.id = l.user_id
                    LEFT JOIN user_stats s ON s.user_id = l.user_id
                    WHERE l.period = $1 AND l.period_start >= $2
                    ORDER BY l.rank ASC
                    LIMIT $3
                    "#,
                )
                .bind(period.to_str())
                .bind(since)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
    }

    async fn get_active_challenges(&self, now: DateTime<Utc>) -> Result<Vec<Challenge>, sqlx::Error> {
        sqlx::query_as::<_, Challenge>(
            r#"
            SELECT id, title, description, challenge_type, goal_type, goal_value,
                points_reward, start_date, end_date, is_active, created_at
            FROM challenges
            WHERE is_active = true AND start_date <= $1 AND end_date >= $1
            ORDER BY end_date ASC
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_user_challenge_progress(&self, user_id: Uuid) -> Result<Vec<UserChallenge>, sqlx::Error> {
        sqlx::query_as::<_, UserChallenge>(
            r#"
            SELECT uc.id, uc.user_id, uc.challenge_id, uc.current_progress, uc.completed,
                uc.completed_at, uc.created_at, uc.updated_at, to_jsonb(c.*) AS challenge
            FROM user_challenges uc
            JOIN challenges c ON c.id = uc.challenge_id
            WHERE uc.user_id = $1
            ORDER BY uc.updated_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }
}

#[cfg(test)]
pub mod tests {
    use std::{
        collections::{HashMap, HashSet},
        sync::Mutex,
    };

    use super::*;

    /// In-memory stand-in used by service tests.
    #[derive(Debug, Default)]
    pub struct MemoryGamificationStore {
        stats: Mutex<HashMap<Uuid, UserStats>>,
        badges: Vec<Badge>,
        earned: Mutex<HashSet<(Uuid, Uuid)>>,
        fail_stats_writes: bool,
        fail_badge_awards: bool,
    }

    fn unavailable() -> sqlx::Error {
        sqlx::Error::Protocol("store unavailable".to_string())
    }

    impl MemoryGamificationStore {
        pub fn with_badges(badges: Vec<Badge>) -> Self {
            Self {
                badges,
                ..Default::default()
            }
        }

        pub fn failing_stats_writes(mut self) -> Self {
            self.fail_stats_writes = true;
            self
        }

        pub fn failing_badge_awards(mut self) -> Self {
            self.fail_badge_awards = true;
            self
        }

        pub fn awarded_count(&self, user_id: Uuid) -> usize {
            self.earned
                .lock()
                .unwrap()
                .iter()
                .filter(|(user, _)| *user == user_id)
                .count()
        }
    }

    #[async_trait]
    impl GamificationExt for MemoryGamificationStore {
        async fn get_user_stats(&self, user_id: Uuid) -> Result<Option<UserStats>, sqlx::Error> {
            Ok(self.stats.lock().unwrap().get(&user_id).cloned())
        }

        async fn upsert_user_stats(&self, stats: &UserStats) -> Result<UserStats, sqlx::Error> {
            if self.fail_stats_writes {
                return Err(unavailable());
            }
            self.stats.lock().unwrap().insert(stats.user_id, stats.clone());
            Ok(stats.clone())
        }

        async fn get_all_badges(&self) -> Result<Vec<Badge>, sqlx::Error> {
            Ok(self.badges.clone())
        }

        async fn get_earned_badge_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
            Ok(self
                .earned
                .lock()
                .unwrap()
                .iter()
                .filter(|(user, _)| *user == user_id)
                .map(|(_, badge)| *badge)
                .collect())
        }

        async fn award_badge(&self, user_id: Uuid, badge_id: Uuid) -> Result<bool, sqlx::Error> {
            if self.fail_badge_awards {
                return Err(unavailable());
            }
            Ok(self.earned.lock().unwrap().insert((user_id, badge_id)))
        }

        async fn get_user_badges(&self, _user_id: Uuid) -> Result<Vec<UserBadge>, sqlx::Error> {
            Ok(Vec::new())
        }

        async fn get_leaderboard(
            &self,
            _period: LeaderboardPeriod,
            _since: Option<DateTime<Utc>>,
            _limit: i64,
        ) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
            Ok(Vec::new())
        }

        async fn get_active_challenges(&self, _now: DateTime<Utc>) -> Result<Vec<Challenge>, sqlx::Error> {
            Ok(Vec::new())
        }

        async fn get_user_challenge_progress(&self, _user_id: Uuid) -> Result<Vec<UserChallenge>, sqlx::Error> {
            Ok(Vec::new())
        }
    }
}
