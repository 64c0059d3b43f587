//! The catalog of playable game modes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad grouping used by listings and the admin dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameCategory {
    Sport,
    Competition,
    Racing,
    Challenge,
}

/// A playable game mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameKind {
    // Sport
    FootballMatch,
    PenaltyShootout,
    UltimateTeam,
    // Competition
    BuildFight,
    BoxFight,
    ZoneWars,
    Sniper1v1,
    Gunfight,
    // Racing
    AerialRace,
    DribbleChallenge,
    // Challenge
    AimChallenge,
    Clutch1v1,
    KnifeFight,
    Speedrun,
    Survival,
}

impl GameKind {
    pub fn category(&self) -> GameCategory {
        use GameKind::*;
        match self {
            FootballMatch | PenaltyShootout | UltimateTeam => GameCategory::Sport,
            BuildFight | BoxFight | ZoneWars | Sniper1v1 | Gunfight => GameCategory::Competition,
            AerialRace | DribbleChallenge => GameCategory::Racing,
            AimChallenge | Clutch1v1 | KnifeFight | Speedrun | Survival => GameCategory::Challenge,
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use GameKind::*;
        let s = match self {
            FootballMatch => "football_match",
            PenaltyShootout => "penalty_shootout",
            UltimateTeam => "ultimate_team",
            BuildFight => "build_fight",
            BoxFight => "box_fight",
            ZoneWars => "zone_wars",
            Sniper1v1 => "sniper_1v1",
            Gunfight => "gunfight",
            AerialRace => "aerial_race",
            DribbleChallenge => "dribble_challenge",
            AimChallenge => "aim_challenge",
            Clutch1v1 => "clutch_1v1",
            KnifeFight => "knife_fight",
            Speedrun => "speedrun",
            Survival => "survival",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_category() {
        assert_eq!(GameKind::BoxFight.category(), GameCategory::Competition);
        assert_eq!(GameKind::FootballMatch.category(), GameCategory::Sport);
        assert_eq!(GameKind::AerialRace.category(), GameCategory::Racing);
        assert_eq!(GameKind::Speedrun.category(), GameCategory::Challenge);
    }

    #[test]
    fn display_is_snake_case() {
        assert_eq!(GameKind::BoxFight.to_string(), "box_fight");
    }
}
