//! Catalog players, their roles and the sport they belong to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog identifier of a player.
pub type PlayerId = u32;

/// Which sport a tournament (and its catalog) is played in.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
    #[default]
    Cricket,
    Kabaddi,
}

impl Sport {
    /// Role vocabulary for this sport.
    pub fn roles(self) -> &'static [Role] {
        match self {
            Sport::Cricket => &[
                Role::Batsman,
                Role::Bowler,
                Role::AllRounder,
                Role::WicketKeeper,
            ],
            Sport::Kabaddi => &[Role::Raider, Role::Defender, Role::AllRounder],
        }
    }

    pub fn has_role(self, role: Role) -> bool {
        self.roles().contains(&role)
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sport::Cricket => write!(f, "cricket"),
            Sport::Kabaddi => write!(f, "kabaddi"),
        }
    }
}

/// Playing role. Cricket and kabaddi share `AllRounder`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Batsman")]
    Batsman,
    #[serde(rename = "Bowler")]
    Bowler,
    #[serde(rename = "All-rounder")]
    AllRounder,
    #[serde(rename = "Wicket-Keeper")]
    WicketKeeper,
    #[serde(rename = "Raider")]
    Raider,
    #[serde(rename = "Defender")]
    Defender,
}

impl Role {
    /// Key used for this role in squad rules (`batsmen`, `allRounders`, ...).
    pub fn rule_key(self) -> &'static str {
        match self {
            Role::Batsman => "batsmen",
            Role::Bowler => "bowlers",
            Role::AllRounder => "allRounders",
            Role::WicketKeeper => "wicketKeepers",
            Role::Raider => "raiders",
            Role::Defender => "defenders",
        }
    }

    pub fn from_rule_key(key: &str) -> Option<Role> {
        match key {
            "batsmen" => Some(Role::Batsman),
            "bowlers" => Some(Role::Bowler),
            "allRounders" => Some(Role::AllRounder),
            "wicketKeepers" => Some(Role::WicketKeeper),
            "raiders" => Some(Role::Raider),
            "defenders" => Some(Role::Defender),
            _ => None,
        }
    }

    /// Human-readable label, identical to the serialized form.
    pub fn label(self) -> &'static str {
        match self {
            Role::Batsman => "Batsman",
            Role::Bowler => "Bowler",
            Role::AllRounder => "All-rounder",
            Role::WicketKeeper => "Wicket-Keeper",
            Role::Raider => "Raider",
            Role::Defender => "Defender",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A read-only catalog player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub role: Role,
    pub country: String,
    pub base_price: u64,
    pub rating: f64,
    /// Kabaddi only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raid_points: Option<u32>,
    /// Kabaddi only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tackle_points: Option<u32>,
}

impl Player {
    /// Create a player with no sport-specific stats.
    pub fn new(id: PlayerId, name: impl Into<String>, role: Role, base_price: u64) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            country: String::new(),
            base_price,
            rating: 0.0,
            raid_points: None,
            tackle_points: None,
        }
    }
}
