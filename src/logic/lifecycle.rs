//! Tournament status transitions: Created -> Open -> Auctioning -> Live -> Completed.

use crate::error::{FantasyError, Result};
use crate::models::{RoomId, RoomRef, Tournament, TournamentStatus};

/// Minimum participants needed before rooms can open.
pub const MIN_PARTICIPANTS_FOR_AUCTION: usize = 2;

fn invalid(tournament: &Tournament, action: &str) -> FantasyError {
    FantasyError::State(format!(
        "cannot {action} tournament {} while {:?}",
        tournament.id, tournament.status
    ))
}

/// Created -> Open.
pub fn open_registration(tournament: &mut Tournament) -> Result<()> {
    if tournament.status != TournamentStatus::Created {
        return Err(invalid(tournament, "open registration for"));
    }
    tournament.status = TournamentStatus::Open;
    Ok(())
}

/// Close admission and register the rooms that will run the auction.
pub fn begin_auction(tournament: &mut Tournament, rooms: Vec<RoomId>) -> Result<()> {
    if !matches!(
        tournament.status,
        TournamentStatus::Created | TournamentStatus::Open
    ) {
        return Err(invalid(tournament, "start the auction of"));
    }
    if tournament.participants.len() < MIN_PARTICIPANTS_FOR_AUCTION {
        return Err(FantasyError::State(format!(
            "need at least {MIN_PARTICIPANTS_FOR_AUCTION} participants to start the auction"
        )));
    }
    if rooms.is_empty() {
        return Err(FantasyError::validation("rooms", "at least one room is required"));
    }
    tournament.rooms = rooms
        .into_iter()
        .map(|id| RoomRef { id, closed: false })
        .collect();
    tournament.status = TournamentStatus::Auctioning;
    Ok(())
}

/// Record that a room closed. Returns true when this made the tournament Live.
pub fn mark_room_closed(tournament: &mut Tournament, room_id: &str) -> Result<bool> {
    let room = tournament
        .rooms
        .iter_mut()
        .find(|r| r.id == room_id)
        .ok_or_else(|| FantasyError::not_found("room", room_id))?;
    room.closed = true;
    if tournament.status == TournamentStatus::Auctioning && tournament.rooms.iter().all(|r| r.closed)
    {
        tournament.status = TournamentStatus::Live;
        return Ok(true);
    }
    Ok(false)
}

/// Live -> Completed.
pub fn complete(tournament: &mut Tournament) -> Result<()> {
    if tournament.status != TournamentStatus::Live {
        return Err(invalid(tournament, "complete"));
    }
    tournament.status = TournamentStatus::Completed;
    Ok(())
}
