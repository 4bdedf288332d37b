use crate::errors::MatchError;
use crate::game::{Match, MatchId};
use crate::ids::{AlphanumericIds, IdGenerator, UuidIds};
use crate::player::Seat;
use crate::rules::validate_move;
use crate::view::{project, PublicMatch, Visibility};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

/// Attempts at drawing an unused id before switching to UUIDs.
const MAX_ID_ATTEMPTS: usize = 16;

/// Behavior switches supplied by whoever hosts the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// Refuses deletions (production).
    pub restricted: bool,
    /// Creates a follow-up match whenever a match ends and links it through `nextId`.
    pub chain_next_match: bool,
}

/// Owner of every live match.
///
/// The map lock only guards membership. Each match sits behind its own mutex so moves
/// on different matches never wait on each other. The map lock is never held while
/// waiting for a match lock.
#[derive(Debug)]
pub struct MatchStore {
    matches: RwLock<HashMap<MatchId, Arc<Mutex<Match>>>>,
    ids: Arc<dyn IdGenerator>,
    config: StoreConfig,
}

impl Default for MatchStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl MatchStore {
    pub fn new(config: StoreConfig) -> Self {
        Self::with_id_generator(Arc::new(AlphanumericIds::default()), config)
    }

    pub fn with_id_generator(ids: Arc<dyn IdGenerator>, config: StoreConfig) -> Self {
        Self {
            matches: RwLock::new(HashMap::new()),
            ids,
            config,
        }
    }

    pub fn config(&self) -> StoreConfig {
        self.config
    }

    pub fn is_restricted(&self) -> bool {
        self.config.restricted
    }

    /// Creates a match and returns it with both player ids disclosed.
    ///
    /// This is the only view handed out unfiltered: the creator distributes the two
    /// player ids to the participants.
    pub fn create(&self) -> Result<PublicMatch, MatchError> {
        let game = self.insert_new()?;
        Ok(project(&game, Visibility::Full))
    }

    /// Returns the match as seen by `requester`, if it exists.
    pub fn read(&self, match_id: &str, requester: Option<&str>) -> Result<PublicMatch, MatchError> {
        let entry = self.entry(match_id)?;
        let game = lock(&entry)?;
        self.ensure_live(match_id, &entry)?;
        tracing::debug!(match_id = %match_id, "match read");
        Ok(project(&game, Visibility::Requester(requester)))
    }

    /// Validates and applies a move.
    ///
    /// A rejected move leaves the match untouched and reports every applicable reason.
    /// An accepted move returns the updated match as seen by the acting player.
    ///
    /// # Errors
    ///
    /// - [`MatchError::NotFound`] when no live match has `match_id`
    /// - [`MatchError::Rejected`] with the joined reasons when validation fails
    /// - [`MatchError::StoragePoisoned`] when a lock was poisoned
    pub fn accept_move(
        &self,
        match_id: &str,
        cell_to_claim: Option<i64>,
        player_id: Option<&str>,
    ) -> Result<PublicMatch, MatchError> {
        let entry = self.entry(match_id)?;
        let mut game = lock(&entry)?;
        self.ensure_live(match_id, &entry)?;

        let validated = match validate_move(&game, cell_to_claim, player_id) {
            Ok(validated) => validated,
            Err(rejections) => {
                tracing::warn!(
                    match_id = %match_id,
                    cell_to_claim = ?cell_to_claim,
                    player_id = ?player_id,
                    reasons = %rejections,
                    "move rejected"
                );
                return Err(MatchError::Rejected(rejections));
            }
        };

        let judgement = game.apply(validated);
        tracing::debug!(
            match_id = %match_id,
            cell = validated.cell,
            mark = validated.seat.mark().as_str(),
            "move accepted"
        );

        if judgement.has_ended {
            match judgement.winning_trio {
                Some(trio) => tracing::info!(
                    match_id = %match_id,
                    winner = validated.seat.mark().as_str(),
                    trio = ?trio,
                    "match won"
                ),
                None => tracing::info!(match_id = %match_id, "match drawn"),
            }

            if self.config.chain_next_match {
                let next = self.insert_new()?;
                game.chain_to(&next);
                tracing::debug!(
                    match_id = %match_id,
                    next_id = %next.id(),
                    "follow-up match chained"
                );
            }
        }

        Ok(project(&game, Visibility::Requester(player_id)))
    }

    /// Deletes a match. Returns whether one was removed.
    ///
    /// # Errors
    ///
    /// [`MatchError::Restricted`] when the store is restricted; nothing is removed.
    pub fn remove(&self, match_id: &str) -> Result<bool, MatchError> {
        if self.config.restricted {
            tracing::warn!(match_id = %match_id, "deletion refused in restricted mode");
            return Err(MatchError::Restricted);
        }

        let entry = match self.entry(match_id) {
            Ok(entry) => entry,
            Err(MatchError::NotFound(_)) => return Ok(false),
            Err(err) => return Err(err),
        };

        // Wait for any in-flight move on this match before dropping it.
        let _game = lock(&entry)?;
        let removed = {
            let mut guard = self
                .matches
                .write()
                .map_err(|_| MatchError::StoragePoisoned)?;
            match guard.get(match_id) {
                Some(current) if Arc::ptr_eq(current, &entry) => guard.remove(match_id).is_some(),
                _ => false,
            }
        };

        if removed {
            tracing::info!(match_id = %match_id, "match removed");
        }
        Ok(removed)
    }

    pub fn active_matches(&self) -> Vec<MatchId> {
        match self.matches.read() {
            Ok(guard) => guard.keys().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.matches.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert_new(&self) -> Result<Match, MatchError> {
        let mut guard = self
            .matches
            .write()
            .map_err(|_| MatchError::StoragePoisoned)?;

        let id = self.unique_id(|candidate| guard.contains_key(candidate));
        let first_player_id = self.ids.next_id();
        let second_player_id = self.unique_id(|candidate| candidate == first_player_id);

        let game = Match::new(id.clone(), first_player_id, second_player_id);
        guard.insert(id.clone(), Arc::new(Mutex::new(game.clone())));
        drop(guard);

        tracing::info!(
            match_id = %id,
            first_player = game.player(Seat::First).name(),
            "match created"
        );
        Ok(game)
    }

    fn unique_id(&self, taken: impl Fn(&str) -> bool) -> String {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = self.ids.next_id();
            if !taken(&candidate) {
                return candidate;
            }
        }

        tracing::warn!(
            attempts = MAX_ID_ATTEMPTS,
            "id space crowded, falling back to uuid"
        );
        loop {
            let candidate = UuidIds.next_id();
            if !taken(&candidate) {
                return candidate;
            }
        }
    }

    fn entry(&self, match_id: &str) -> Result<Arc<Mutex<Match>>, MatchError> {
        let guard = self
            .matches
            .read()
            .map_err(|_| MatchError::StoragePoisoned)?;
        guard
            .get(match_id)
            .cloned()
            .ok_or_else(|| MatchError::NotFound(match_id.to_string()))
    }

    /// Confirms, with the match lock held, that `entry` is still the stored record.
    ///
    /// A removal can slip in between looking the entry up and locking it; the record
    /// is then orphaned and must not be read or moved on.
    fn ensure_live(&self, match_id: &str, entry: &Arc<Mutex<Match>>) -> Result<(), MatchError> {
        let guard = self
            .matches
            .read()
            .map_err(|_| MatchError::StoragePoisoned)?;
        match guard.get(match_id) {
            Some(current) if Arc::ptr_eq(current, entry) => Ok(()),
            _ => {
                tracing::debug!(match_id = %match_id, "match removed while waiting for its lock");
                Err(MatchError::NotFound(match_id.to_string()))
            }
        }
    }
}

fn lock(entry: &Mutex<Match>) -> Result<MutexGuard<'_, Match>, MatchError> {
    entry.lock().map_err(|_| MatchError::StoragePoisoned)
}
