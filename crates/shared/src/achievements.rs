use crate::models::{Discovery, DiscoveryType, PlayerState};
use crate::scoring::ScoreUpdate;

#[derive(Debug)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub points: u32,
    condition: fn(&[Discovery]) -> bool,
}

impl Achievement {
    pub fn is_satisfied(&self, discoveries: &[Discovery]) -> bool {
        (self.condition)(discoveries)
    }
}

impl PartialEq for Achievement {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

fn count_kind(discoveries: &[Discovery], kind: DiscoveryType) -> usize {
    discoveries.iter().filter(|d| d.kind == kind).count()
}

pub static CATALOG: [Achievement; 5] = [
    Achievement {
        id: "first_discovery",
        name: "First Discovery",
        description: "You discovered your first location!",
        points: 50,
        condition: |d| !d.is_empty(),
    },
    Achievement {
        id: "explorer_novice",
        name: "Novice Explorer",
        description: "You discovered 10 locations!",
        points: 100,
        condition: |d| d.len() >= 10,
    },
    Achievement {
        id: "road_master",
        name: "Road Master",
        description: "You discovered 5 roads!",
        points: 75,
        condition: |d| count_kind(d, DiscoveryType::Road) >= 5,
    },
    Achievement {
        id: "building_explorer",
        name: "Building Explorer",
        description: "You discovered 5 buildings!",
        points: 75,
        condition: |d| count_kind(d, DiscoveryType::Building) >= 5,
    },
    Achievement {
        id: "point_collector",
        name: "Point Collector",
        description: "You discovered 3 points of interest!",
        points: 100,
        condition: |d| count_kind(d, DiscoveryType::Point) >= 3,
    },
];

pub fn find(id: &str) -> Option<&'static Achievement> {
    CATALOG.iter().find(|a| a.id == id)
}

#[derive(Debug, Clone, PartialEq)]
pub struct GrantedAchievement {
    pub achievement: &'static Achievement,
    pub score: ScoreUpdate,
}

/// Grant every catalog entry whose condition now holds and which the player
/// does not have yet. Each grant records the id and awards its points.
pub fn evaluate(player: &mut PlayerState) -> Vec<GrantedAchievement> {
    let mut granted = Vec::new();
    for achievement in CATALOG.iter() {
        if player.achievements.contains(achievement.id)
            || !achievement.is_satisfied(&player.discovered_locations)
        {
            continue;
        }
        player.achievements.insert(achievement.id.to_string());
        let score = player.add_score(achievement.points);
        granted.push(GrantedAchievement { achievement, score });
    }
    granted
}
