//! In-memory registry of tournaments and running rooms.
//!
//! Tournaments are keyed by id, each behind its own `TournamentContext`; the
//! registry maps only ever hold their lock long enough to look a context up,
//! so work on one tournament never blocks another.

use crate::catalog::{Catalog, Catalogs};
use crate::clock::{Clock, SystemClock};
use crate::error::{FantasyError, Result};
use crate::logic::{
    lifecycle, registration, setup, AuctionRoom, ScoringRule, StandardScoring, TickOutcome,
};
use crate::models::{
    Amount, Bid, EventId, LeaderboardSnapshot, Participant, ParticipantId, Player, PlayerId,
    PerformanceEvent, RoomId, Sport, StatDelta, Tournament, TournamentId,
    TournamentSettingsInput, TournamentStatus, TournamentSummary,
};
use crate::runtime::context::TournamentContext;
use crate::runtime::room_actor::{spawn_room, RoomHandle, RoomView};
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

pub struct Registry {
    tournaments: RwLock<HashMap<TournamentId, Arc<TournamentContext>>>,
    rooms: RwLock<HashMap<RoomId, RoomHandle>>,
    catalogs: Catalogs,
    scoring: Arc<dyn ScoringRule>,
    clock: Arc<dyn Clock>,
}

impl Registry {
    pub fn new(catalogs: Catalogs, scoring: Arc<dyn ScoringRule>, clock: Arc<dyn Clock>) -> Self {
        Self {
            tournaments: RwLock::new(HashMap::new()),
            rooms: RwLock::new(HashMap::new()),
            catalogs,
            scoring,
            clock,
        }
    }

    /// Standard scoring tables and the system clock.
    pub fn with_catalogs(catalogs: Catalogs) -> Self {
        Self::new(catalogs, Arc::new(StandardScoring), Arc::new(SystemClock))
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    pub fn catalog(&self, sport: Sport) -> &Arc<Catalog> {
        self.catalogs.get(sport)
    }

    /// Summaries ordered by creation time.
    pub fn list_tournaments(&self) -> Vec<TournamentSummary> {
        let contexts: Vec<Arc<TournamentContext>> = self.read_tournaments().values().cloned().collect();
        let mut summaries: Vec<TournamentSummary> =
            contexts.iter().map(|ctx| ctx.lock().summary()).collect();
        summaries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        summaries
    }

    pub fn create_tournament(
        &self,
        admin_id: &str,
        sport: Sport,
        input: TournamentSettingsInput,
    ) -> Result<Tournament> {
        let now = self.clock.now();
        let mut tournament =
            setup::create_tournament(admin_id, sport, input, self.catalog(sport), now)?;
        let mut map = self.write_tournaments();
        while map.contains_key(&tournament.id) {
            tournament.id = setup::short_id();
        }
        let ctx = TournamentContext::new(tournament.clone(), self.scoring.clone(), now);
        map.insert(tournament.id.clone(), Arc::new(ctx));
        log::info!(
            "[TOURNAMENT {}] created: {} ({}) by {}",
            tournament.id,
            tournament.settings.name,
            sport,
            admin_id
        );
        Ok(tournament)
    }

    /// Register a previously persisted tournament. Its log is seeded from the
    /// squads it carries and its leaderboard recomputed.
    pub fn import_tournament(&self, tournament: Tournament) -> Result<Tournament> {
        if tournament.status == TournamentStatus::Auctioning {
            return Err(FantasyError::State(format!(
                "tournament {} cannot be imported mid-auction",
                tournament.id
            )));
        }
        let now = self.clock.now();
        let mut map = self.write_tournaments();
        if map.contains_key(&tournament.id) {
            return Err(FantasyError::validation(
                "id",
                format!("tournament {} already exists", tournament.id),
            ));
        }
        let ctx = Arc::new(TournamentContext::imported(tournament, self.scoring.clone(), now));
        let snapshot = ctx.snapshot();
        map.insert(snapshot.id.clone(), ctx);
        log::info!("[TOURNAMENT {}] imported ({:?})", snapshot.id, snapshot.status);
        Ok(snapshot)
    }

    pub fn context(&self, id: &str) -> Result<Arc<TournamentContext>> {
        let ctx = self
            .read_tournaments()
            .get(id)
            .cloned()
            .ok_or_else(|| FantasyError::not_found("tournament", id))?;
        ctx.touch(self.clock.now());
        Ok(ctx)
    }

    pub fn get_tournament(&self, id: &str) -> Result<Tournament> {
        Ok(self.context(id)?.snapshot())
    }

    pub fn participants(&self, id: &str) -> Result<Vec<Participant>> {
        Ok(self.context(id)?.lock().participants.clone())
    }

    /// Admit a user. Capacity check and append run under the tournament's
    /// own lock.
    pub fn join(&self, id: &str, user_id: &str, username: &str) -> Result<(Participant, Tournament)> {
        let ctx = self.context(id)?;
        let now = self.clock.now();
        let (participant, tournament) = {
            let mut tournament = ctx.lock();
            let participant = registration::join(&mut tournament, user_id, username, now)?;
            (participant, tournament.clone())
        };
        log::info!(
            "[TOURNAMENT {}] {} joined ({}/{})",
            id,
            participant.username,
            tournament.participants.len(),
            tournament.settings.max_participants
        );
        // Keeps the leaderboard listing every participant, even at zero.
        let _ = ctx.publish(now);
        Ok((participant, tournament))
    }

    pub fn open_registration(&self, id: &str) -> Result<Tournament> {
        let ctx = self.context(id)?;
        let mut tournament = ctx.lock();
        lifecycle::open_registration(&mut tournament)?;
        log::info!("[TOURNAMENT {id}] registration open");
        Ok(tournament.clone())
    }

    pub fn mark_entry_fee_paid(&self, id: &str, user_id: &str) -> Result<Tournament> {
        let ctx = self.context(id)?;
        let mut tournament = ctx.lock();
        registration::mark_entry_fee_paid(&mut tournament, user_id)?;
        Ok(tournament.clone())
    }

    /// Deal the player pool into `room_count` rooms and start one task per
    /// room. Must be called from within a tokio runtime.
    pub fn start_auction(&self, id: &str, room_count: usize) -> Result<(Tournament, Vec<RoomId>)> {
        if room_count == 0 {
            return Err(FantasyError::validation("roomCount", "must be at least 1"));
        }
        let ctx = self.context(id)?;
        let rooms = {
            let mut tournament = ctx.lock();
            let catalog = self.catalog(tournament.sport);
            let mut pool = player_pool(&tournament, catalog);
            if tournament.settings.auction_settings.shuffle_lots {
                pool.shuffle(&mut rand::thread_rng());
            }

            let room_ids: Vec<RoomId> = (1..=room_count).map(|n| format!("{id}-R{n}")).collect();
            lifecycle::begin_auction(&mut tournament, room_ids.clone())?;

            let mut dealt: Vec<Vec<&Player>> = vec![Vec::new(); room_count];
            for (i, player) in pool.into_iter().enumerate() {
                dealt[i % room_count].push(player);
            }
            room_ids
                .into_iter()
                .zip(dealt)
                .map(|(room_id, players)| {
                    AuctionRoom::with_players(
                        room_id,
                        tournament.id.clone(),
                        tournament.settings.auction_settings.clone(),
                        players,
                    )
                })
                .collect::<Vec<_>>()
        };
        log::info!("[TOURNAMENT {id}] auction started in {} room(s)", rooms.len());

        let catalog = self.catalog(ctx.lock().sport).clone();
        let mut room_ids = Vec::with_capacity(rooms.len());
        for room in rooms {
            let handle = spawn_room(room, ctx.clone(), catalog.clone(), self.clock.clone())?;
            room_ids.push(handle.id.clone());
            self.write_rooms().insert(handle.id.clone(), handle);
        }
        Ok((ctx.snapshot(), room_ids))
    }

    pub fn room(&self, room_id: &str) -> Result<RoomHandle> {
        self.rooms
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(room_id)
            .cloned()
            .ok_or_else(|| FantasyError::not_found("room", room_id))
    }

    pub fn room_view(&self, room_id: &str) -> Result<Arc<RoomView>> {
        Ok(self.room(room_id)?.view())
    }

    pub async fn place_bid(
        &self,
        room_id: &str,
        bidder: ParticipantId,
        amount: Amount,
    ) -> Result<Bid> {
        self.room(room_id)?.place_bid(bidder, amount).await
    }

    /// Run a room's countdown check now.
    pub async fn tick_room(&self, room_id: &str) -> Result<TickOutcome> {
        self.room(room_id)?.tick().await
    }

    /// Record a stat delta for a catalog player. A repeated `event_id` is
    /// acknowledged without being counted twice.
    pub fn record_performance(
        &self,
        id: &str,
        player_id: PlayerId,
        delta: StatDelta,
        event_id: Option<EventId>,
    ) -> Result<(bool, Arc<LeaderboardSnapshot>)> {
        let ctx = self.context(id)?;
        let sport = ctx.lock().sport;
        if delta.sport() != sport {
            return Err(FantasyError::validation(
                "performance",
                format!("{} stats sent to a {sport} tournament", delta.sport()),
            ));
        }
        if self.catalog(sport).get(player_id).is_none() {
            return Err(FantasyError::not_found("player", player_id));
        }
        delta.check_bounds()?;
        let now = self.clock.now();
        let mut event = PerformanceEvent::new(id, player_id, delta, now);
        if let Some(event_id) = event_id {
            event.id = event_id;
        }
        ctx.record_performance(event, now)
    }

    pub fn leaderboard(&self, id: &str) -> Result<Arc<LeaderboardSnapshot>> {
        self.context(id)?.leaderboard()
    }

    pub fn complete(&self, id: &str) -> Result<Tournament> {
        let ctx = self.context(id)?;
        let mut tournament = ctx.lock();
        lifecycle::complete(&mut tournament)?;
        log::info!("[TOURNAMENT {id}] completed");
        Ok(tournament.clone())
    }

    pub fn recover(&self, id: &str) -> Result<Arc<LeaderboardSnapshot>> {
        let ctx = self.context(id)?;
        ctx.recover(self.clock.now())
    }

    /// Drop completed tournaments idle for longer than `retention`, with
    /// their rooms. Returns how many were removed.
    pub fn prune_completed(&self, retention: chrono::Duration) -> usize {
        let now = self.clock.now();
        let mut map = self.write_tournaments();
        let expired: Vec<TournamentId> = map
            .iter()
            .filter(|(_, ctx)| {
                ctx.lock().status == TournamentStatus::Completed
                    && now - ctx.last_activity() >= retention
            })
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            map.remove(id);
        }
        drop(map);
        if !expired.is_empty() {
            self.write_rooms()
                .retain(|_, handle| !expired.contains(&handle.tournament_id));
        }
        expired.len()
    }

    fn read_tournaments(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<TournamentId, Arc<TournamentContext>>> {
        self.tournaments.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_tournaments(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<TournamentId, Arc<TournamentContext>>> {
        self.tournaments.write().unwrap_or_else(|e| e.into_inner())
    }

    fn write_rooms(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<RoomId, RoomHandle>> {
        self.rooms.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// `selected_players` in the order given, or the whole catalog.
fn player_pool<'a>(tournament: &Tournament, catalog: &'a Catalog) -> Vec<&'a Player> {
    let selected = &tournament.settings.selected_players;
    if selected.is_empty() {
        catalog.players().iter().collect()
    } else {
        selected.iter().filter_map(|id| catalog.get(*id)).collect()
    }
}
