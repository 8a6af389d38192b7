// service/gamification.rs
use std::{collections::HashSet, sync::Arc};

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    db::gamificationdb::GamificationExt,
    dtos::{
        classifydtos::EnhancedClassificationResult,
        gamificationdtos::{ImpactSummaryDto, LeaderboardPeriod},
    },
    models::{
        classificationmodel::ItemWasteType,
        gamificationmodel::{Badge, RequirementType, UserStats},
    },
    service::error::ServiceError,
};

pub const POINTS_PER_ITEM: i32 = 10;
pub const MULTI_ITEM_BONUS: i32 = 20;
pub const POINTS_PER_LEVEL: i32 = 100;

/// What one classification contributes to a user's counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Activity {
    pub items_detected: u32,
    pub items_recycled: u32,
    pub co2_saved: f64,
}

impl From<&EnhancedClassificationResult> for Activity {
    fn from(result: &EnhancedClassificationResult) -> Self {
        Activity {
            items_detected: result.items_detected,
            items_recycled: result
                .items
                .iter()
                .filter(|item| item.waste_type == ItemWasteType::Recyclable)
                .count() as u32,
            co2_saved: result.carbon_impact,
        }
    }
}

/// Streak rule:
/// - no prior activity: 1
/// - last activity yesterday: +1
/// - gap of two days or more: back to 1
/// - same day (or a last date ahead of `today`): unchanged, but at least 1
pub fn next_streak(current_streak: i32, last_activity: Option<NaiveDate>, today: NaiveDate) -> i32 {
    let Some(last) = last_activity else {
        return 1;
    };

    match (today - last).num_days() {
        1 => current_streak.max(0) + 1,
        gap if gap > 1 => 1,
        _ => current_streak.max(1),
    }
}

/// Saturates rather than wraps, so the result is never negative.
pub fn points_for(items_detected: u32) -> i32 {
    let bonus = if items_detected > 1 { MULTI_ITEM_BONUS } else { 0 };
    to_i32(items_detected)
        .saturating_mul(POINTS_PER_ITEM)
        .saturating_add(bonus)
}

fn to_i32(count: u32) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

pub fn level_for(total_points: i32) -> i32 {
    total_points.max(0) / POINTS_PER_LEVEL + 1
}

pub fn points_for_next_level(level: i32) -> i32 {
    level * POINTS_PER_LEVEL
}

pub fn calculate_rank(points: i32) -> &'static str {
    match points {
        p if p < 100 => "Beginner",
        p if p < 500 => "Eco Explorer",
        p if p < 1000 => "Recycling Hero",
        p if p < 2500 => "Green Guardian",
        p if p < 5000 => "Sustainability Champion",
        p if p < 10000 => "Earth Protector",
        _ => "Eco Legend",
    }
}

/// Folds one activity into the prior row (or a fresh one).
pub fn apply_activity(user_id: Uuid, prior: Option<&UserStats>, activity: &Activity, today: NaiveDate) -> UserStats {
    let base = prior.cloned().unwrap_or_else(|| UserStats::empty(user_id));

    let current_streak = next_streak(base.current_streak, base.last_activity_date, today);
    let total_points = base.total_points.saturating_add(points_for(activity.items_detected));
    // a last date in the future must not move backwards
    let last_activity_date = match base.last_activity_date {
        Some(last) if last > today => Some(last),
        _ => Some(today),
    };

    UserStats {
        user_id,
        total_points,
        level: level_for(total_points),
        current_streak,
        longest_streak: base.longest_streak.max(current_streak),
        last_activity_date,
        total_co2_saved: base.total_co2_saved + activity.co2_saved.max(0.0),
        total_items_classified: base
            .total_items_classified
            .saturating_add(to_i32(activity.items_detected)),
        total_items_recycled: base
            .total_items_recycled
            .saturating_add(to_i32(activity.items_recycled)),
    }
}

pub fn meets_requirement(badge: &Badge, stats: &UserStats) -> bool {
    let value = match badge.requirement_type {
        RequirementType::Count => stats.total_items_classified as f64,
        RequirementType::Streak => stats.current_streak as f64,
        RequirementType::Co2 => stats.total_co2_saved,
    };
    value >= badge.requirement_value
}

/// Badges whose threshold the updated stats cross and that the user does not hold yet.
pub fn newly_earned<'a>(catalog: &'a [Badge], earned: &HashSet<Uuid>, stats: &UserStats) -> Vec<&'a Badge> {
    catalog
        .iter()
        .filter(|badge| !earned.contains(&badge.id))
        .filter(|badge| meets_requirement(badge, stats))
        .collect()
}

/// Start of the window a periodic leaderboard covers; weeks start on Sunday.
/// `None` means all-time.
pub fn period_start(period: LeaderboardPeriod, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let today = now.date_naive();
    let start = match period {
        LeaderboardPeriod::AllTime => return None,
        LeaderboardPeriod::Daily => today,
        LeaderboardPeriod::Weekly => today - Duration::days(today.weekday().num_days_from_sunday() as i64),
        LeaderboardPeriod::Monthly => today.with_day(1)?,
    };
    start.and_hms_opt(0, 0, 0).map(|dt| Utc.from_utc_datetime(&dt))
}

pub fn impact_summary(stats: &UserStats) -> ImpactSummaryDto {
    let co2 = stats.total_co2_saved.max(0.0);
    ImpactSummaryDto {
        co2_saved: co2,
        // one tree absorbs ~21 kg CO2 a year, a mile of driving emits ~0.411 kg
        trees_planted: (co2 / 21.0).floor() as i64,
        miles_not_driven: (co2 / 0.411).floor() as i64,
        water_bottles_saved: (stats.total_items_recycled.max(0) as f64 * 0.7).floor() as i64,
        items_recycled: stats.total_items_recycled,
        rank: calculate_rank(stats.total_points).to_string(),
        points_to_next_level: (points_for_next_level(stats.level) - stats.total_points).max(0),
    }
}

/// Result of the best-effort bookkeeping that follows a classification. Kept apart
/// from the classification result so failures here never reach the user.
#[derive(Debug, Clone)]
pub struct BookkeepingOutcome {
    pub stats: UserStats,
    pub badges_awarded: Vec<Badge>,
    pub badge_errors: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct GamificationService {
    store: Arc<dyn GamificationExt>,
}

impl GamificationService {
    pub fn new(store: Arc<dyn GamificationExt>) -> Self {
        Self { store }
    }

    pub async fn stats_or_default(&self, user_id: Uuid) -> Result<UserStats, ServiceError> {
        Ok(self
            .store
            .get_user_stats(user_id)
            .await?
            .unwrap_or_else(|| UserStats::empty(user_id)))
    }

    /// Loads the prior row, upserts the folded one, then inserts newly crossed badges.
    /// No locking: concurrent calls for the same user are last-write-wins.
    pub async fn record_activity(
        &self,
        user_id: Uuid,
        activity: Activity,
        today: NaiveDate,
    ) -> Result<BookkeepingOutcome, ServiceError> {
        let prior = self.store.get_user_stats(user_id).await?;
        let updated = apply_activity(user_id, prior.as_ref(), &activity, today);
        let stats = self.store.upsert_user_stats(&updated).await?;

        let catalog = self.store.get_all_badges().await?;
        let earned: HashSet<Uuid> = self.store.get_earned_badge_ids(user_id).await?.into_iter().collect();

        let mut badges_awarded = Vec::new();
        let mut badge_errors = Vec::new();
        for badge in newly_earned(&catalog, &earned, &stats) {
            match self.store.award_badge(user_id, badge.id).await {
                Ok(true) => {
                    tracing::info!(%user_id, badge = %badge.name, "badge awarded");
                    badges_awarded.push(badge.clone());
                }
                Ok(false) => {
                    tracing::debug!(%user_id, badge = %badge.name, "badge already held");
                }
                Err(e) => {
                    tracing::warn!(%user_id, badge = %badge.name, "failed to award badge: {}", e);
                    badge_errors.push(format!("{}: {}", badge.name, e));
                }
            }
        }

        Ok(BookkeepingOutcome {
            stats,
            badges_awarded,
            badge_errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::gamificationdb::tests::MemoryGamificationStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn single_item() -> Activity {
        Activity {
            items_detected: 1,
            items_recycled: 1,
            co2_saved: 0.5,
        }
    }

    fn badge(name: &str, requirement_type: RequirementType, requirement_value: f64) -> Badge {
        Badge {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            icon: String::new(),
            category: "classification".to_string(),
            requirement_type,
            requirement_value,
            points_reward: 10,
        }
    }

    #[test]
    fn first_single_item_classification() {
        let user = Uuid::new_v4();
        let stats = apply_activity(user, None, &single_item(), day(19));
        assert_eq!(stats.total_points, 10);
        assert_eq!(stats.level, 1);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.longest_streak, 1);
        assert_eq!(stats.last_activity_date, Some(day(19)));
        assert_eq!(stats.total_items_classified, 1);
    }

    #[test]
    fn multi_item_bonus() {
        assert_eq!(points_for(0), 0);
        assert_eq!(points_for(1), 10);
        assert_eq!(points_for(3), 50);

        let activity = Activity {
            items_detected: 3,
            items_recycled: 2,
            co2_saved: 1.25,
        };
        let stats = apply_activity(Uuid::new_v4(), None, &activity, day(19));
        assert_eq!(stats.total_points, 50);
        assert_eq!(stats.total_items_recycled, 2);
        assert_eq!(stats.total_co2_saved, 1.25);
    }

    #[test]
    fn points_never_wrap_negative() {
        assert_eq!(points_for(u32::MAX), i32::MAX);

        let mut prior = UserStats::empty(Uuid::new_v4());
        prior.total_points = i32::MAX - 5;
        prior.total_items_classified = 7;
        let activity = Activity {
            items_detected: u32::MAX,
            items_recycled: u32::MAX,
            co2_saved: 0.0,
        };
        let stats = apply_activity(prior.user_id, Some(&prior), &activity, day(19));
        assert_eq!(stats.total_points, i32::MAX);
        assert_eq!(stats.total_items_classified, i32::MAX);
        assert_eq!(stats.total_items_recycled, i32::MAX);
    }

    #[test]
    fn level_is_recomputed_from_points() {
        assert_eq!(level_for(0), 1);
        assert_eq!(level_for(99), 1);
        assert_eq!(level_for(100), 2);
        assert_eq!(level_for(1240), 13);

        let mut prior = UserStats::empty(Uuid::new_v4());
        prior.total_points = 95;
        prior.level = 7; // stale value must not be carried over
        let stats = apply_activity(prior.user_id, Some(&prior), &single_item(), day(19));
        assert_eq!(stats.total_points, 105);
        assert_eq!(stats.level, 2);
    }

    #[test]
    fn streak_rules() {
        assert_eq!(next_streak(0, None, day(19)), 1);
        assert_eq!(next_streak(4, Some(day(18)), day(19)), 5);
        assert_eq!(next_streak(4, Some(day(16)), day(19)), 1);
        assert_eq!(next_streak(4, Some(day(19)), day(19)), 4);
        assert_eq!(next_streak(0, Some(day(19)), day(19)), 1);
        assert_eq!(next_streak(4, Some(day(21)), day(19)), 4);
    }

    #[test]
    fn streak_carries_through_apply() {
        let mut prior = UserStats::empty(Uuid::new_v4());
        prior.current_streak = 6;
        prior.longest_streak = 6;
        prior.last_activity_date = Some(day(18));

        let stats = apply_activity(prior.user_id, Some(&prior), &single_item(), day(19));
        assert_eq!(stats.current_streak, 7);
        assert_eq!(stats.longest_streak, 7);

        prior.longest_streak = 12;
        prior.last_activity_date = Some(day(15));
        let stats = apply_activity(prior.user_id, Some(&prior), &single_item(), day(19));
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.longest_streak, 12);
    }

    #[test]
    fn future_last_activity_date_is_kept() {
        let mut prior = UserStats::empty(Uuid::new_v4());
        prior.current_streak = 2;
        prior.last_activity_date = Some(day(20));
        let stats = apply_activity(prior.user_id, Some(&prior), &single_item(), day(19));
        assert_eq!(stats.last_activity_date, Some(day(20)));
        assert_eq!(stats.current_streak, 2);
    }

    #[test]
    fn badge_thresholds_use_updated_stats() {
        let catalog = vec![
            badge("First Steps", RequirementType::Count, 1.0),
            badge("Getting Started", RequirementType::Count, 10.0),
            badge("Streak Starter", RequirementType::Streak, 3.0),
            badge("Carbon Saver", RequirementType::Co2, 10.0),
        ];
        let stats = apply_activity(Uuid::new_v4(), None, &single_item(), day(19));
        let names: Vec<&str> = newly_earned(&catalog, &HashSet::new(), &stats)
            .iter()
            .map(|b| b.name.as_str())
            .collect();
        assert_eq!(names, vec!["First Steps"]);
    }

    #[test]
    fn held_badges_are_never_returned() {
        let catalog = vec![badge("First Steps", RequirementType::Count, 1.0)];
        let stats = apply_activity(Uuid::new_v4(), None, &single_item(), day(19));
        let earned: HashSet<Uuid> = catalog.iter().map(|b| b.id).collect();
        assert!(newly_earned(&catalog, &earned, &stats).is_empty());
    }

    #[test]
    fn leaderboard_windows() {
        // 2026-10-22 is a Thursday
        let now = Utc.with_ymd_and_hms(2026, 10, 22, 15, 30, 0).unwrap();
        assert_eq!(period_start(LeaderboardPeriod::AllTime, now), None);
        assert_eq!(
            period_start(LeaderboardPeriod::Daily, now),
            Some(Utc.with_ymd_and_hms(2026, 10, 22, 0, 0, 0).unwrap())
        );
        assert_eq!(
            period_start(LeaderboardPeriod::Weekly, now),
            Some(Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap())
        );
        assert_eq!(
            period_start(LeaderboardPeriod::Monthly, now),
            Some(Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn impact_equivalents() {
        let mut stats = UserStats::empty(Uuid::new_v4());
        stats.total_co2_saved = 42.0;
        stats.total_items_recycled = 10;
        stats.total_points = 1240;
        stats.level = level_for(1240);
        let summary = impact_summary(&stats);
        assert_eq!(summary.trees_planted, 2);
        assert_eq!(summary.miles_not_driven, 102);
        assert_eq!(summary.water_bottles_saved, 7);
        assert_eq!(summary.rank, "Green Guardian");
        assert_eq!(summary.points_to_next_level, 60);
    }

    #[test]
    fn activity_counts_recyclable_items() {
        let result: EnhancedClassificationResult = serde_json::from_str(
            r#"{
                "itemsDetected": 3,
                "items": [
                    {"wasteType": "recyclable"},
                    {"wasteType": "organic"},
                    {"wasteType": "recyclable"}
                ],
                "explanation": "",
                "contextTips": [],
                "carbonImpact": 0.75
            }"#,
        )
        .unwrap();
        let activity = Activity::from(&result);
        assert_eq!(activity.items_detected, 3);
        assert_eq!(activity.items_recycled, 2);
        assert_eq!(activity.co2_saved, 0.75);
    }

    #[tokio::test]
    async fn record_activity_awards_each_badge_once() {
        let store = Arc::new(MemoryGamificationStore::with_badges(vec![
            badge("First Steps", RequirementType::Count, 1.0),
            badge("Streak Starter", RequirementType::Streak, 2.0),
        ]));
        let service = GamificationService::new(store.clone());
        let user = Uuid::new_v4();

        let first = service.record_activity(user, single_item(), day(18)).await.unwrap();
        assert_eq!(first.stats.total_points, 10);
        assert_eq!(first.badges_awarded.len(), 1);
        assert_eq!(first.badges_awarded[0].name, "First Steps");

        let second = service.record_activity(user, single_item(), day(19)).await.unwrap();
        assert_eq!(second.stats.current_streak, 2);
        let names: Vec<&str> = second.badges_awarded.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Streak Starter"]);

        let third = service.record_activity(user, single_item(), day(19)).await.unwrap();
        assert!(third.badges_awarded.is_empty());
        assert_eq!(store.awarded_count(user), 2);
    }

    #[tokio::test]
    async fn badge_failures_are_collected_not_raised() {
        let store = Arc::new(
            MemoryGamificationStore::with_badges(vec![
                badge("First Steps", RequirementType::Count, 1.0),
                badge("Tiny Saver", RequirementType::Co2, 0.1),
            ])
            .failing_badge_awards(),
        );
        let service = GamificationService::new(store.clone());
        let user = Uuid::new_v4();

        let outcome = service.record_activity(user, single_item(), day(19)).await.unwrap();
        assert_eq!(outcome.stats.total_points, 10);
        assert!(outcome.badges_awarded.is_empty());
        assert_eq!(outcome.badge_errors.len(), 2);
        assert!(outcome.badge_errors[0].starts_with("First Steps: "));
        assert_eq!(store.awarded_count(user), 0);
    }

    #[tokio::test]
    async fn stats_write_failure_is_reported() {
        let store = Arc::new(
            MemoryGamificationStore::with_badges(vec![badge("First Steps", RequirementType::Count, 1.0)])
                .failing_stats_writes(),
        );
        let service = GamificationService::new(store.clone());
        let user = Uuid::new_v4();

        let err = service.record_activity(user, single_item(), day(19)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Database(_)));
        assert_eq!(store.awarded_count(user), 0);
    }

    #[tokio::test]
    async fn stats_default_for_new_user() {
        let store = Arc::new(MemoryGamificationStore::with_badges(Vec::new()));
        let service = GamificationService::new(store);
        let stats = service.stats_or_default(Uuid::new_v4()).await.unwrap();
        assert_eq!(stats.total_points, 0);
        assert_eq!(stats.level, 1);
    }
}
