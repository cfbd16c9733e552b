use crate::achievements::{self, GrantedAchievement};
use crate::models::{Discovery, DiscoveryType, PlayerState};

pub const POINTS_PER_LEVEL: u32 = 100;
pub const POINTS_PER_EXPLORATION_PERCENT: u32 = 500;

/// Awarded for clicking (or interacting with) a map feature.
pub const FEATURE_INTERACTION_POINTS: u32 = 5;

/// Awarded per feature each time a feature set is rendered.
pub const POINTS_PER_RENDERED_FEATURE: u32 = 2;

pub fn discovery_points(kind: &DiscoveryType) -> u32 {
    match kind {
        DiscoveryType::Building => 15,
        DiscoveryType::Road => 5,
        DiscoveryType::Point => 25,
        DiscoveryType::Area | DiscoveryType::Other(_) => 10,
    }
}

pub fn level_for_score(score: u32) -> u32 {
    score / POINTS_PER_LEVEL + 1
}

pub fn exploration_for_score(score: u32) -> u32 {
    (score / POINTS_PER_EXPLORATION_PERCENT).min(100)
}

pub fn render_points(feature_count: usize) -> u32 {
    u32::try_from(feature_count)
        .unwrap_or(u32::MAX)
        .saturating_mul(POINTS_PER_RENDERED_FEATURE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreUpdate {
    pub awarded: u32,
    pub score: u32,
    /// The new level, when this award pushed the player past the current one.
    pub level_up: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryOutcome {
    pub points: u32,
    pub score: ScoreUpdate,
    pub achievements: Vec<GrantedAchievement>,
}

impl PlayerState {
    /// Add points and re-derive level and exploration from the new score.
    /// Level never decreases.
    pub fn add_score(&mut self, points: u32) -> ScoreUpdate {
        self.score = self.score.saturating_add(points);
        self.exploration = exploration_for_score(self.score);

        let level = level_for_score(self.score);
        let level_up = if level > self.level {
            self.level = level;
            Some(level)
        } else {
            None
        };

        ScoreUpdate {
            awarded: points,
            score: self.score,
            level_up,
        }
    }

    /// Append a discovery, award its points and grant any achievements it unlocks.
    pub fn record_discovery(&mut self, discovery: Discovery) -> DiscoveryOutcome {
        let points = discovery_points(&discovery.kind);
        self.discovered_locations.push(discovery);
        let score = self.add_score(points);
        let achievements = achievements::evaluate(self);
        DiscoveryOutcome {
            points,
            score,
            achievements,
        }
    }
}
