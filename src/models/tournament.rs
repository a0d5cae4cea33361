//! Tournament, its settings and the participants that joined it.

use crate::models::auction::RoomId;
use crate::models::player::{PlayerId, Role, Sport};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Short upper-case token, e.g. `3F9A1C2B`.
pub type TournamentId = String;

/// Unique identifier for a participant (one per user per tournament).
pub type ParticipantId = Uuid;

/// Identifier of the owning user, supplied by the client.
pub type UserId = String;

/// Money, in whole currency units.
pub type Amount = u64;

/// Upper bound accepted for `bidTimeout` (seconds).
pub const MAX_BID_TIMEOUT_SECS: u64 = 3600;

/// Remaining time at which an open lot is announced as closing.
pub const CLOSING_WARNING_SECS: u64 = 5;

/// Required count per role for a complete squad.
///
/// On the wire this is a flat map keyed by plural role name plus an optional
/// `totalPlayers`, e.g. `{"batsmen": 4, "bowlers": 4, "totalPlayers": 8}`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, u32>", into = "BTreeMap<String, u32>")]
pub struct SquadRules {
    quotas: BTreeMap<Role, u32>,
    declared_total: Option<u32>,
}

impl SquadRules {
    pub fn new(quotas: impl IntoIterator<Item = (Role, u32)>) -> Self {
        Self {
            quotas: quotas.into_iter().collect(),
            declared_total: None,
        }
    }

    /// Declare the total squad size explicitly (checked against the per-role sum).
    pub fn with_total(mut self, total: u32) -> Self {
        self.declared_total = Some(total);
        self
    }

    pub fn defaults_for(sport: Sport) -> Self {
        match sport {
            Sport::Cricket => Self::new([
                (Role::Batsman, 4),
                (Role::Bowler, 4),
                (Role::AllRounder, 2),
                (Role::WicketKeeper, 1),
            ]),
            Sport::Kabaddi => Self::new([
                (Role::Raider, 4),
                (Role::Defender, 4),
                (Role::AllRounder, 4),
            ]),
        }
    }

    /// Quota for a role; roles without a rule have quota 0.
    pub fn quota(&self, role: Role) -> u32 {
        self.quotas.get(&role).copied().unwrap_or(0)
    }

    /// Sum of per-role quotas, saturating at `u32::MAX`.
    pub fn total(&self) -> u32 {
        self.quotas
            .values()
            .fold(0u32, |acc, count| acc.saturating_add(*count))
    }

    pub fn declared_total(&self) -> Option<u32> {
        self.declared_total
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, u32)> + '_ {
        self.quotas.iter().map(|(role, count)| (*role, *count))
    }
}

impl TryFrom<BTreeMap<String, u32>> for SquadRules {
    type Error = String;

    fn try_from(raw: BTreeMap<String, u32>) -> Result<Self, Self::Error> {
        let mut rules = SquadRules::default();
        for (key, count) in raw {
            if key == "totalPlayers" {
                rules.declared_total = Some(count);
                continue;
            }
            let role =
                Role::from_rule_key(&key).ok_or_else(|| format!("unknown squad role `{key}`"))?;
            rules.quotas.insert(role, count);
        }
        Ok(rules)
    }
}

impl From<SquadRules> for BTreeMap<String, u32> {
    fn from(rules: SquadRules) -> Self {
        let total = rules.declared_total.unwrap_or_else(|| rules.total());
        let mut raw: BTreeMap<String, u32> = rules
            .quotas
            .into_iter()
            .map(|(role, count)| (role.rule_key().to_string(), count))
            .collect();
        raw.insert("totalPlayers".to_string(), total);
        raw
    }
}

fn default_minimum_bid() -> Amount {
    50_000
}

fn default_bid_increment() -> Amount {
    25_000
}

fn default_bid_timeout() -> u64 {
    30
}

fn default_max_relists() -> u32 {
    1
}

/// Bidding rules for every room of a tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionSettings {
    #[serde(default = "default_minimum_bid")]
    pub minimum_bid: Amount,
    #[serde(default = "default_bid_increment")]
    pub bid_increment: Amount,
    /// Seconds a lot stays open after opening or after an accepted bid.
    #[serde(default = "default_bid_timeout")]
    pub bid_timeout: u64,
    /// Seconds; a bid landing with less than this left resets the deadline.
    /// Defaults to `bid_timeout`, so every accepted bid grants a full window.
    #[serde(default)]
    pub anti_snipe_window: Option<u64>,
    /// How many times an unsold player is put back at the tail of the queue.
    #[serde(default = "default_max_relists")]
    pub max_relists: u32,
    /// Opening floor becomes `max(minimum_bid, player.base_price)`.
    #[serde(default)]
    pub base_price_floor: bool,
    /// Shuffle the player pool before dealing it into rooms.
    #[serde(default)]
    pub shuffle_lots: bool,
}

impl Default for AuctionSettings {
    fn default() -> Self {
        Self {
            minimum_bid: default_minimum_bid(),
            bid_increment: default_bid_increment(),
            bid_timeout: default_bid_timeout(),
            anti_snipe_window: None,
            max_relists: default_max_relists(),
            base_price_floor: false,
            shuffle_lots: false,
        }
    }
}

impl AuctionSettings {
    pub fn bid_timeout(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.bid_timeout.min(MAX_BID_TIMEOUT_SECS) as i64)
    }

    pub fn anti_snipe_window(&self) -> chrono::Duration {
        match self.anti_snipe_window {
            Some(secs) => chrono::Duration::seconds(secs.min(MAX_BID_TIMEOUT_SECS) as i64),
            None => self.bid_timeout(),
        }
    }

    pub fn closing_warning(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.bid_timeout.min(CLOSING_WARNING_SECS) as i64)
    }
}

/// Settings as submitted by a client; anything left out takes the sport default.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSettingsInput {
    pub name: Option<String>,
    pub real_tournament: Option<String>,
    pub entry_fee: Option<Amount>,
    pub max_participants: Option<usize>,
    pub budget: Option<Amount>,
    pub squad_rules: Option<SquadRules>,
    pub auction_settings: Option<AuctionSettings>,
    #[serde(alias = "tournamentStart")]
    pub start_date: Option<NaiveDate>,
    #[serde(alias = "tournamentEnd")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub selected_players: Vec<PlayerId>,
}

/// Validated tournament settings.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSettings {
    pub name: String,
    pub real_tournament: Option<String>,
    pub entry_fee: Amount,
    pub max_participants: usize,
    pub budget: Amount,
    pub squad_rules: SquadRules,
    pub auction_settings: AuctionSettings,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Player pool for the auction; empty means the whole sport catalog.
    pub selected_players: Vec<PlayerId>,
}

/// Lifecycle of a tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Created, accepting joins.
    #[default]
    Created,
    /// Registration explicitly opened, accepting joins.
    Open,
    /// Joins closed; auction rooms running.
    Auctioning,
    /// Every room closed; performance events are scored.
    Live,
    /// Ended by an explicit signal.
    Completed,
}

/// A player won at auction and the price paid.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SquadMember {
    pub player_id: PlayerId,
    pub price: Amount,
}

/// Players owned by a participant, grouped by role.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Squad {
    members: BTreeMap<Role, Vec<SquadMember>>,
}

impl Squad {
    pub fn count(&self, role: Role) -> u32 {
        self.members.get(&role).map_or(0, |m| m.len() as u32)
    }

    pub fn add(&mut self, role: Role, member: SquadMember) {
        self.members.entry(role).or_default().push(member);
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.iter().any(|(_, m)| m.player_id == player_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &SquadMember)> + '_ {
        self.members
            .iter()
            .flat_map(|(role, members)| members.iter().map(move |m| (*role, m)))
    }

    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.iter().map(|(_, m)| m.player_id)
    }

    /// Sum of purchase prices; `None` if it does not fit in an `Amount`.
    pub fn total_spent(&self) -> Option<Amount> {
        self.iter()
            .try_fold(0, |acc: Amount, (_, m)| acc.checked_add(m.price))
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }
}

/// A user's entry in a tournament: budget and owned squad.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    pub user_id: UserId,
    pub username: String,
    pub squad: Squad,
    pub budget_remaining: Amount,
    pub entry_fee_paid: bool,
    pub joined_at: DateTime<Utc>,
    /// 0-based position in join order; leaderboard tie-break.
    pub join_order: usize,
}

impl Participant {
    pub fn new(
        user_id: impl Into<UserId>,
        username: impl Into<String>,
        budget: Amount,
        join_order: usize,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            username: username.into(),
            squad: Squad::default(),
            budget_remaining: budget,
            entry_fee_paid: false,
            joined_at,
            join_order,
        }
    }
}

/// Auction room opened for a tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRef {
    pub id: RoomId,
    pub closed: bool,
}

/// Full tournament state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    pub admin_id: UserId,
    pub sport: Sport,
    pub settings: TournamentSettings,
    pub status: TournamentStatus,
    /// In join order.
    pub participants: Vec<Participant>,
    pub prize_pool: Amount,
    pub rooms: Vec<RoomRef>,
    pub created_at: DateTime<Utc>,
    /// Set when a core invariant was found violated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inconsistent: Option<String>,
}

impl Tournament {
    /// Create a tournament in `Created` state with no participants.
    pub fn new(
        id: TournamentId,
        admin_id: impl Into<UserId>,
        sport: Sport,
        settings: TournamentSettings,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            admin_id: admin_id.into(),
            sport,
            settings,
            status: TournamentStatus::Created,
            participants: Vec::new(),
            prize_pool: 0,
            rooms: Vec::new(),
            created_at,
            inconsistent: None,
        }
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn participant_mut(&mut self, id: ParticipantId) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.id == id)
    }

    pub fn participant_by_user(&self, user_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.user_id == user_id)
    }

    pub fn summary(&self) -> TournamentSummary {
        TournamentSummary {
            id: self.id.clone(),
            name: self.settings.name.clone(),
            sport: self.sport,
            real_tournament: self.settings.real_tournament.clone(),
            entry_fee: self.settings.entry_fee,
            prize_pool: self.prize_pool,
            participants: self.participants.len(),
            max_participants: self.settings.max_participants,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

/// Listing view of a tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSummary {
    pub id: TournamentId,
    pub name: String,
    pub sport: Sport,
    pub real_tournament: Option<String>,
    pub entry_fee: Amount,
    pub prize_pool: Amount,
    pub participants: usize,
    pub max_participants: usize,
    pub status: TournamentStatus,
    pub created_at: DateTime<Utc>,
}
