// dtos/gamificationdtos.rs
use serde::{Deserialize, Serialize};

/// Parsed from the `action` query string by hand; unknown values are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamificationAction {
    Stats,
    Badges,
    Leaderboard,
    AllBadges,
    Challenges,
    ChallengeProgress,
}

impl GamificationAction {
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "stats" => Some(GamificationAction::Stats),
            "badges" => Some(GamificationAction::Badges),
            "leaderboard" => Some(GamificationAction::Leaderboard),
            "all-badges" => Some(GamificationAction::AllBadges),
            "challenges" => Some(GamificationAction::Challenges),
            "challenge-progress" => Some(GamificationAction::ChallengeProgress),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LeaderboardPeriod {
    Daily,
    Weekly,
    Monthly,
    #[default]
    AllTime,
}

impl LeaderboardPeriod {
    pub fn parse(period: &str) -> Self {
        match period {
            "daily" => LeaderboardPeriod::Daily,
            "weekly" => LeaderboardPeriod::Weekly,
            "monthly" => LeaderboardPeriod::Monthly,
            _ => LeaderboardPeriod::AllTime,
        }
    }

    pub fn to_str(&self) -> &str {
        match self {
            LeaderboardPeriod::Daily => "daily",
            LeaderboardPeriod::Weekly => "weekly",
            LeaderboardPeriod::Monthly => "monthly",
            LeaderboardPeriod::AllTime => "all-time",
        }
    }
}

/// Raw query string; `action` is matched by hand so an unknown value is a 400
/// with our own message rather than an extractor rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GamificationQueryDto {
    pub action: Option<String>,
    pub period: Option<String>,
    pub limit: Option<String>,
}

impl GamificationQueryDto {
    pub fn leaderboard_limit(&self) -> i64 {
        self.limit
            .as_deref()
            .and_then(|l| l.trim().parse::<i64>().ok())
            .unwrap_or(10)
            .clamp(1, 100)
    }

    pub fn leaderboard_period(&self) -> LeaderboardPeriod {
        self.period
            .as_deref()
            .map(LeaderboardPeriod::parse)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImpactSummaryDto {
    pub co2_saved: f64,
    pub trees_planted: i64,
    pub miles_not_driven: i64,
    pub water_bottles_saved: i64,
    pub items_recycled: i32,
    pub rank: String,
    pub points_to_next_level: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_action() {
        assert_eq!(GamificationAction::parse("all-badges"), Some(GamificationAction::AllBadges));
        assert_eq!(
            GamificationAction::parse("challenge-progress"),
            Some(GamificationAction::ChallengeProgress)
        );
        assert_eq!(GamificationAction::parse("Stats"), None);
    }

    #[test]
    fn leaderboard_defaults() {
        let query = GamificationQueryDto::default();
        assert_eq!(query.leaderboard_limit(), 10);
        assert_eq!(query.leaderboard_period(), LeaderboardPeriod::AllTime);

        let query = GamificationQueryDto {
            limit: Some("5000".to_string()),
            period: Some("weekly".to_string()),
            ..Default::default()
        };
        assert_eq!(query.leaderboard_limit(), 100);
        assert_eq!(query.leaderboard_period(), LeaderboardPeriod::Weekly);

        let query = GamificationQueryDto {
            limit: Some("abc".to_string()),
            ..Default::default()
        };
        assert_eq!(query.leaderboard_limit(), 10);
    }
}
