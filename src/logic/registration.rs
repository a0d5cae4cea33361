//! Join admission and entry fees.

use crate::error::{FantasyError, Result};
use crate::models::{Amount, Participant, Tournament, TournamentStatus};
use chrono::{DateTime, Utc};

/// Admit `user_id` to the tournament.
///
/// Check and append happen in one call; callers hold the tournament's
/// exclusive lock across it so concurrent joins can never overshoot
/// `max_participants`.
pub fn join(
    tournament: &mut Tournament,
    user_id: &str,
    username: &str,
    now: DateTime<Utc>,
) -> Result<Participant> {
    if !matches!(
        tournament.status,
        TournamentStatus::Created | TournamentStatus::Open
    ) {
        return Err(FantasyError::State(format!(
            "tournament {} is not accepting joins ({:?})",
            tournament.id, tournament.status
        )));
    }
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(FantasyError::validation("userId", "must not be empty"));
    }
    if tournament.participant_by_user(user_id).is_some() {
        return Err(FantasyError::validation(
            "userId",
            format!("user {user_id} already joined this tournament"),
        ));
    }
    if tournament.participants.len() >= tournament.settings.max_participants {
        return Err(FantasyError::Capacity(format!(
            "tournament {} is full ({} participants)",
            tournament.id, tournament.settings.max_participants
        )));
    }

    let username = match username.trim() {
        "" => user_id,
        name => name,
    };
    let participant = Participant::new(
        user_id,
        username,
        tournament.settings.budget,
        tournament.participants.len(),
        now,
    );
    tournament.participants.push(participant.clone());
    Ok(participant)
}

/// Mark a user's entry fee as paid and recompute the prize pool.
pub fn mark_entry_fee_paid(tournament: &mut Tournament, user_id: &str) -> Result<()> {
    let index = tournament
        .participants
        .iter()
        .position(|p| p.user_id == user_id)
        .ok_or_else(|| FantasyError::not_found("participant", user_id))?;
    let already_paid = tournament.participants[index].entry_fee_paid;
    let paid = tournament
        .participants
        .iter()
        .filter(|p| p.entry_fee_paid)
        .count()
        + usize::from(!already_paid);
    tournament.prize_pool = prize_pool(paid, tournament.settings.entry_fee)?;
    tournament.participants[index].entry_fee_paid = true;
    Ok(())
}

/// Prize pool = paid participants x entry fee.
pub fn prize_pool(paid: usize, entry_fee: Amount) -> Result<Amount> {
    (paid as u64).checked_mul(entry_fee).ok_or_else(|| {
        FantasyError::validation(
            "entryFee",
            format!("{paid} x {entry_fee} does not fit in a prize pool"),
        )
    })
}
