//! Setup: resolve and validate settings, create a tournament in `Created` state.

use crate::catalog::Catalog;
use crate::error::{FantasyError, Result};
use crate::logic::registration;
use crate::models::{
    AuctionSettings, Sport, SquadRules, Tournament, TournamentSettings,
    TournamentSettingsInput, MAX_BID_TIMEOUT_SECS,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Default budget per sport.
pub fn default_budget(sport: Sport) -> u64 {
    match sport {
        Sport::Cricket => 50_000_000,
        Sport::Kabaddi => 30_000_000,
    }
}

pub const DEFAULT_MAX_PARTICIPANTS: usize = 8;

/// New 8-character upper-case id (tournaments and rooms).
pub fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id.to_uppercase()
}

/// Fill in sport defaults and check the settings schema.
///
/// Every `selected_players` id must exist in `catalog`.
pub fn resolve_settings(
    sport: Sport,
    input: TournamentSettingsInput,
    catalog: &Catalog,
) -> Result<TournamentSettings> {
    let name = match input.name.as_deref().map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => format!("{sport} tournament"),
    };

    let budget = input.budget.unwrap_or_else(|| default_budget(sport));
    if budget == 0 {
        return Err(FantasyError::validation("budget", "must be greater than zero"));
    }

    let max_participants = input.max_participants.unwrap_or(DEFAULT_MAX_PARTICIPANTS);
    if max_participants == 0 {
        return Err(FantasyError::validation(
            "maxParticipants",
            "must be at least 1",
        ));
    }

    let entry_fee = input.entry_fee.unwrap_or(0);
    registration::prize_pool(max_participants, entry_fee)?;

    let squad_rules = input
        .squad_rules
        .unwrap_or_else(|| SquadRules::defaults_for(sport));
    validate_squad_rules(sport, &squad_rules)?;

    let auction_settings = input.auction_settings.unwrap_or_default();
    validate_auction_settings(&auction_settings)?;

    if let (Some(start), Some(end)) = (input.start_date, input.end_date) {
        if start >= end {
            return Err(FantasyError::validation(
                "endDate",
                format!("must be after startDate ({start})"),
            ));
        }
    }

    for &player_id in &input.selected_players {
        if catalog.get(player_id).is_none() {
            return Err(FantasyError::validation(
                "selectedPlayers",
                format!("unknown {sport} player {player_id}"),
            ));
        }
    }

    Ok(TournamentSettings {
        name,
        real_tournament: input.real_tournament,
        entry_fee,
        max_participants,
        budget,
        squad_rules,
        auction_settings,
        start_date: input.start_date,
        end_date: input.end_date,
        selected_players: input.selected_players,
    })
}

fn validate_squad_rules(sport: Sport, rules: &SquadRules) -> Result<()> {
    for (role, _) in rules.iter() {
        if !sport.has_role(role) {
            return Err(FantasyError::validation(
                "squadRules",
                format!("role `{}` is not part of {sport}", role.rule_key()),
            ));
        }
    }
    let total = rules
        .iter()
        .try_fold(0u32, |acc, (_, count)| acc.checked_add(count))
        .ok_or_else(|| FantasyError::validation("squadRules", "role counts overflow"))?;
    if total == 0 {
        return Err(FantasyError::validation(
            "squadRules",
            "at least one role must have a positive count",
        ));
    }
    if let Some(declared) = rules.declared_total() {
        if declared != total {
            return Err(FantasyError::validation(
                "squadRules.totalPlayers",
                format!("declared {declared} but role counts sum to {total}"),
            ));
        }
    }
    Ok(())
}

fn validate_auction_settings(settings: &AuctionSettings) -> Result<()> {
    if settings.minimum_bid == 0 {
        return Err(FantasyError::validation(
            "auctionSettings.minimumBid",
            "must be greater than zero",
        ));
    }
    if settings.bid_increment == 0 {
        return Err(FantasyError::validation(
            "auctionSettings.bidIncrement",
            "must be greater than zero",
        ));
    }
    if settings.bid_timeout == 0 || settings.bid_timeout > MAX_BID_TIMEOUT_SECS {
        return Err(FantasyError::validation(
            "auctionSettings.bidTimeout",
            format!("must be between 1 and {MAX_BID_TIMEOUT_SECS} seconds"),
        ));
    }
    if settings.anti_snipe_window == Some(0) {
        return Err(FantasyError::validation(
            "auctionSettings.antiSnipeWindow",
            "must be greater than zero",
        ));
    }
    Ok(())
}

/// Validate `input` and create a tournament with a fresh id in `Created` state.
pub fn create_tournament(
    admin_id: impl Into<String>,
    sport: Sport,
    input: TournamentSettingsInput,
    catalog: &Catalog,
    now: DateTime<Utc>,
) -> Result<Tournament> {
    let settings = resolve_settings(sport, input, catalog)?;
    Ok(Tournament::new(short_id(), admin_id, sport, settings, now))
}
