//! In-memory session store with optimistic concurrency
//!
//! Readers get cloned snapshots. Writers name the version they read; the
//! write lands only if nobody else got there first, so two players racing on
//! the same game can never both apply a move against the same state.

use crate::error::StoreError;
use crate::session::{GameId, Session};
use chrono::Utc;
use nonaga_core::{GameError, GameState, Motion, MoveRequest};
use rand::Rng;
use rustc_hash::FxHashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe map of live games
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<FxHashMap<GameId, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Ids of every stored game, sorted
    pub fn ids(&self) -> Vec<GameId> {
        let mut ids: Vec<GameId> = self.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Open a new game for `host`, waiting for an opponent
    pub fn create<R: Rng + ?Sized>(&self, host: &str, rng: &mut R) -> Session {
        let state = GameState::start(host, rng);
        let mut sessions = self.write();

        let mut id = GameId::random(rng);
        while sessions.contains_key(&id) {
            id = GameId::random(rng);
        }

        let session = Session::new(id.clone(), state);
        sessions.insert(id.clone(), session.clone());
        tracing::debug!(game = %id, host, "game created");
        session
    }

    pub fn get(&self, id: &GameId) -> Result<Session, StoreError> {
        self.read()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    /// Put back a session loaded from a snapshot, replacing any game with
    /// the same id
    pub fn restore(&self, session: Session) {
        self.write().insert(session.id.clone(), session);
    }

    pub fn remove(&self, id: &GameId) -> Option<Session> {
        self.write().remove(id)
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    pub fn join(&self, id: &GameId, expected: u64, guest: &str) -> Result<Session, StoreError> {
        self.update(id, expected, false, |state| Ok((state.join(guest)?, ())))
            .map(|(session, ())| session)
    }

    /// Apply one half-move. Returns the updated session and the cells the
    /// moved piece or tile travelled between.
    pub fn submit(
        &self,
        id: &GameId,
        expected: u64,
        request: &MoveRequest,
    ) -> Result<(Session, Motion), StoreError> {
        self.update(id, expected, true, |state| {
            let applied = state.apply(request)?;
            Ok((applied.state, applied.motion))
        })
    }

    pub fn abandon(&self, id: &GameId, expected: u64, actor: &str) -> Result<Session, StoreError> {
        self.update(id, expected, false, |state| Ok((state.abandon(actor)?, ())))
            .map(|(session, ())| session)
    }

    pub fn rematch<R: Rng + ?Sized>(
        &self,
        id: &GameId,
        expected: u64,
        actor: &str,
        rng: &mut R,
    ) -> Result<Session, StoreError> {
        self.update(id, expected, false, |state| Ok((state.rematch(actor, rng)?, ())))
            .map(|(session, ())| session)
    }

    /// Compare-and-swap core shared by every mutation. The engine call runs
    /// under the write lock so the version check and the write are atomic.
    /// `is_move` stamps `last_move_at`.
    fn update<T, F>(
        &self,
        id: &GameId,
        expected: u64,
        is_move: bool,
        step: F,
    ) -> Result<(Session, T), StoreError>
    where
        F: FnOnce(&GameState) -> Result<(GameState, T), GameError>,
    {
        let mut sessions = self.write();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        if session.version != expected {
            tracing::warn!(
                game = %id,
                expected,
                actual = session.version,
                "stale write rejected"
            );
            return Err(StoreError::VersionConflict {
                expected,
                actual: session.version,
            });
        }

        let (state, output) = step(&session.state).map_err(|err| {
            tracing::warn!(game = %id, kind = ?err.kind(), %err, "command rejected");
            err
        })?;
        debug_assert!(
            state.check_invariants().is_ok(),
            "engine produced an invalid position"
        );

        let now = Utc::now();
        session.state = state;
        session.version += 1;
        session.updated_at = now;
        if is_move {
            session.last_move_at = Some(now);
        }

        Ok((session.clone(), output))
    }

    fn read(&self) -> RwLockReadGuard<'_, FxHashMap<GameId, Session>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, FxHashMap<GameId, Session>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nonaga_core::{Color, Hex, Status};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn joined(store: &SessionStore, rng: &mut ChaCha8Rng) -> Session {
        let session = store.create("host", rng);
        store.join(&session.id, session.version, "guest").unwrap()
    }

    #[test]
    fn test_create_and_get() {
        let store = SessionStore::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let session = store.create("host", &mut rng);
        assert_eq!(session.version, 0);
        assert_eq!(session.state.status(), Status::Waiting);
        assert_eq!(store.get(&session.id).unwrap(), session);
        assert_eq!(store.len(), 1);

        let missing = GameId::from("nope");
        assert!(matches!(store.get(&missing), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_versions_advance() {
        let store = SessionStore::new();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let session = joined(&store, &mut rng);
        assert_eq!(session.version, 1);
        assert!(session.last_move_at.is_none());

        let red = session.state.player_for(Color::Red).unwrap().to_string();
        let request = MoveRequest::piece(red, "r1", Hex::new(1, -2));
        let (session, motion) = store.submit(&session.id, 1, &request).unwrap();
        assert_eq!(session.version, 2);
        assert_eq!(motion.to, Hex::new(1, -2));
        assert!(session.last_move_at.is_some());
    }

    #[test]
    fn test_stale_version_rejected() {
        let store = SessionStore::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let session = joined(&store, &mut rng);

        let err = store.abandon(&session.id, 0, "host").unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { expected: 0, actual: 1 }));
        assert!(err.is_retryable());
        assert_eq!(store.get(&session.id).unwrap(), session);
    }

    #[test]
    fn test_engine_rejection_keeps_version() {
        let store = SessionStore::new();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let session = joined(&store, &mut rng);

        let blue = session.state.player_for(Color::Blue).unwrap().to_string();
        let request = MoveRequest::piece(blue, "b1", Hex::new(1, 0));
        let err = store.submit(&session.id, session.version, &request).unwrap_err();
        assert!(matches!(err, StoreError::Game(GameError::NotYourTurn { .. })));
        assert_eq!(store.get(&session.id).unwrap().version, session.version);
    }

    #[test]
    fn test_rematch_after_abandon() {
        let store = SessionStore::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let session = joined(&store, &mut rng);

        let session = store.abandon(&session.id, session.version, "guest").unwrap();
        assert_eq!(session.state.status(), Status::Abandoned);

        let session = store.rematch(&session.id, session.version, "host", &mut rng).unwrap();
        assert_eq!(session.state.status(), Status::Playing);
        assert_eq!(session.version, 3);
    }

    #[test]
    fn test_restore_and_remove() {
        let store = SessionStore::new();
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let session = store.create("host", &mut rng);
        let json = session.to_json().unwrap();

        assert!(store.remove(&session.id).is_some());
        assert!(store.is_empty());

        store.restore(Session::from_json(&json).unwrap());
        assert_eq!(store.ids(), vec![session.id.clone()]);
    }
}
