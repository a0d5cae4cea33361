//! Budget and owned-squad bookkeeping for participants.
//!
//! `settle_purchase` is the only function that debits a budget, and it is only
//! called from a room's settlement step (or from replay).

use crate::error::{FantasyError, Result};
use crate::models::{
    Amount, ParticipantId, PlayerId, Role, Squad, SquadMember, SquadRules, Tournament,
};
use std::collections::{BTreeMap, HashMap};

/// What the bid validator needs to know about a bidder.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LedgerSnapshot {
    pub participant_id: ParticipantId,
    pub budget_remaining: Amount,
    /// Players already owned in the lot's role.
    pub role_owned: u32,
    /// Quota for the lot's role.
    pub role_quota: u32,
}

impl LedgerSnapshot {
    pub fn role_full(&self) -> bool {
        self.role_owned >= self.role_quota
    }
}

/// Snapshot of `participant_id`'s ledger for a lot of the given role.
pub fn snapshot(
    tournament: &Tournament,
    participant_id: ParticipantId,
    role: Role,
) -> Result<LedgerSnapshot> {
    let participant = tournament
        .participant(participant_id)
        .ok_or_else(|| FantasyError::not_found("participant", participant_id))?;
    Ok(LedgerSnapshot {
        participant_id,
        budget_remaining: participant.budget_remaining,
        role_owned: participant.squad.count(role),
        role_quota: tournament.settings.squad_rules.quota(role),
    })
}

/// Debit the winner and add the player to their squad.
///
/// Budget and quota are re-checked here; nothing changes on error.
pub fn settle_purchase(
    tournament: &mut Tournament,
    winner: ParticipantId,
    player_id: PlayerId,
    role: Role,
    price: Amount,
) -> Result<()> {
    if let Some(owner) = tournament
        .participants
        .iter()
        .find(|p| p.squad.contains(player_id))
    {
        return Err(FantasyError::State(format!(
            "player {player_id} already owned by {}",
            owner.id
        )));
    }
    let quota = tournament.settings.squad_rules.quota(role);
    let participant = tournament
        .participant_mut(winner)
        .ok_or_else(|| FantasyError::not_found("participant", winner))?;
    if participant.squad.count(role) >= quota {
        return Err(FantasyError::Capacity(format!(
            "{} already holds {quota} {}",
            participant.username,
            role.rule_key()
        )));
    }
    let remaining = participant
        .budget_remaining
        .checked_sub(price)
        .ok_or_else(|| {
            FantasyError::validation(
                "amount",
                format!(
                    "{} cannot cover {price} (remaining {})",
                    participant.username, participant.budget_remaining
                ),
            )
        })?;
    participant.budget_remaining = remaining;
    participant.squad.add(role, SquadMember { player_id, price });
    Ok(())
}

/// Roles still short of their quota.
pub fn missing_roles(rules: &SquadRules, squad: &Squad) -> BTreeMap<Role, u32> {
    rules
        .iter()
        .filter_map(|(role, quota)| {
            let have = squad.count(role);
            (have < quota).then(|| (role, quota - have))
        })
        .collect()
}

pub fn squad_complete(rules: &SquadRules, squad: &Squad) -> bool {
    missing_roles(rules, squad).is_empty()
}

/// Whether any participant can still take a player of `role`.
pub fn role_in_demand(tournament: &Tournament, role: Role) -> bool {
    let quota = tournament.settings.squad_rules.quota(role);
    tournament
        .participants
        .iter()
        .any(|p| p.squad.count(role) < quota)
}

/// Reset every participant to a full budget and an empty squad.
pub fn reset(tournament: &mut Tournament) {
    let budget = tournament.settings.budget;
    for participant in &mut tournament.participants {
        participant.budget_remaining = budget;
        participant.squad.clear();
    }
}

/// Check the ledger invariants of every participant.
///
/// Returns a description of the first violation found.
pub fn check_invariants(tournament: &Tournament) -> std::result::Result<(), String> {
    let budget = tournament.settings.budget;
    let rules = &tournament.settings.squad_rules;
    let mut owners: HashMap<PlayerId, ParticipantId> = HashMap::new();

    if tournament.participants.len() > tournament.settings.max_participants {
        return Err(format!(
            "{} participants exceed the cap of {}",
            tournament.participants.len(),
            tournament.settings.max_participants
        ));
    }

    for p in &tournament.participants {
        let spent = p
            .squad
            .total_spent()
            .ok_or_else(|| format!("participant {} squad prices overflow", p.id))?;
        if spent > budget {
            return Err(format!(
                "participant {} spent {spent}, over the budget of {budget}",
                p.id
            ));
        }
        if p.budget_remaining.checked_add(spent) != Some(budget) {
            return Err(format!(
                "participant {} balance {} does not match budget {budget} minus spent {spent}",
                p.id, p.budget_remaining
            ));
        }
        for (role, quota) in rules.iter() {
            let owned = p.squad.count(role);
            if owned > quota {
                return Err(format!(
                    "participant {} owns {owned} {}, quota is {quota}",
                    p.id,
                    role.rule_key()
                ));
            }
        }
        for player_id in p.squad.player_ids() {
            if let Some(other) = owners.insert(player_id, p.id) {
                return Err(format!(
                    "player {player_id} owned by both {other} and {}",
                    p.id
                ));
            }
        }
    }
    Ok(())
}
