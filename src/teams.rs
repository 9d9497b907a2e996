use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// The closed set of league clubs, in registry order.
pub const TEAM_NAMES: [&str; 20] = [
    "Leeds",
    "Aston V",
    "Manchester Blue",
    "Liverpool",
    "London Blues",
    "Everton",
    "Brighton",
    "Sheffield U",
    "Tottenham",
    "Palace",
    "Newcastle",
    "West Ham",
    "Leicester",
    "West Brom",
    "Burnley",
    "London Reds",
    "Southampton",
    "Wolves",
    "Fulham",
    "Manchester Reds",
];

pub const TEAM_COUNT: usize = TEAM_NAMES.len();

static BY_NAME: Lazy<HashMap<&'static str, Team>> = Lazy::new(|| {
    TEAM_NAMES
        .iter()
        .enumerate()
        .map(|(idx, name)| (*name, Team(idx as u8)))
        .collect()
});

/// Handle to one registry club. Only obtainable through the registry, so any
/// `Team` in hand is a valid one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Team(u8);

impl Team {
    /// Exact, case-sensitive lookup.
    pub fn from_name(name: &str) -> Option<Team> {
        BY_NAME.get(name).copied()
    }

    pub fn name(self) -> &'static str {
        TEAM_NAMES[self.0 as usize]
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn all() -> impl Iterator<Item = Team> {
        (0..TEAM_COUNT).map(|idx| Team(idx as u8))
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Team {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Team {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Team::from_name(&raw).ok_or_else(|| de::Error::custom(format!("unknown team: {raw}")))
    }
}

pub fn is_valid_team(name: &str) -> bool {
    BY_NAME.contains_key(name)
}

/// First registry team whose name occurs somewhere inside `line`.
/// Registry order decides when a line mentions more than one club.
pub fn find_team_in(line: &str) -> Option<Team> {
    Team::all().find(|team| line.contains(team.name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_closed_and_case_sensitive() {
        assert_eq!(Team::all().count(), 20);
        assert!(is_valid_team("Aston V"));
        assert!(!is_valid_team("aston v"));
        assert!(!is_valid_team("Arsenal"));
    }

    #[test]
    fn names_round_trip_through_handles() {
        for name in TEAM_NAMES {
            let team = Team::from_name(name).expect("registry name");
            assert_eq!(team.name(), name);
        }
    }

    #[test]
    fn substring_recovery_prefers_registry_order() {
        assert_eq!(
            find_team_in("Southampton FC line").map(Team::name),
            Some("Southampton")
        );
        // Both clubs appear; Leeds is listed first in the registry.
        assert_eq!(find_team_in("Everton v Leeds").map(Team::name), Some("Leeds"));
        assert_eq!(find_team_in("no club here"), None);
    }
}
