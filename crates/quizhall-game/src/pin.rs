//! PIN allocation.
//!
//! PINs are drawn uniformly from 100000..=999999 and checked against the
//! session store. The store's `create` is the final arbiter: if two
//! allocations race to the same PIN, the loser sees `DuplicatePin` and
//! draws again. Attempts are capped so a misbehaving store cannot hang the
//! caller.

use std::fmt;

use rand::Rng;

use quizhall_protocol::{HostId, Pin, QuizId, SessionId};
use quizhall_store::{Session, SessionStore, StoreError};

use crate::GameError;

type Source = Box<dyn Fn() -> u32 + Send + Sync>;

/// Issues PINs unique among stored sessions.
pub struct PinAllocator {
    attempts: u32,
    source: Source,
}

impl fmt::Debug for PinAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinAllocator")
            .field("attempts", &self.attempts)
            .finish_non_exhaustive()
    }
}

impl PinAllocator {
    /// Draws from the thread-local RNG.
    pub fn new(attempts: u32) -> Self {
        Self::with_source(attempts, || rand::rng().random_range(Pin::MIN..=Pin::MAX))
    }

    /// Draws from `source` instead. Values outside the PIN range are
    /// discarded and count as a failed attempt.
    pub fn with_source(attempts: u32, source: impl Fn() -> u32 + Send + Sync + 'static) -> Self {
        Self {
            attempts: attempts.max(1),
            source: Box::new(source),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Returns a PIN no stored session currently holds.
    ///
    /// The PIN is not reserved; use [`create_session`](Self::create_session)
    /// to allocate and insert atomically with respect to the store.
    ///
    /// # Errors
    /// [`GameError::ResourceExhausted`] after `attempts` collisions,
    /// [`GameError::Internal`] if the store fails.
    pub async fn allocate<S: SessionStore>(&self, store: &S) -> Result<Pin, GameError> {
        for _ in 0..self.attempts {
            if let Some(pin) = self.candidate(store).await? {
                return Ok(pin);
            }
        }
        Err(self.exhausted())
    }

    /// Allocates a PIN and creates a fresh `PENDING` session holding it.
    ///
    /// # Errors
    /// As [`allocate`](Self::allocate).
    pub async fn create_session<S: SessionStore>(
        &self,
        store: &S,
        quiz_id: &QuizId,
        host_id: &HostId,
    ) -> Result<Session, GameError> {
        for attempt in 1..=self.attempts {
            let Some(pin) = self.candidate(store).await? else {
                continue;
            };
            let session = Session::new(SessionId::generate(), quiz_id.clone(), host_id.clone(), pin);
            match store.create(session).await {
                Ok(session) => return Ok(session),
                Err(StoreError::DuplicatePin(pin)) => {
                    tracing::debug!(%pin, attempt, "pin taken during create, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(self.exhausted())
    }

    /// One draw. `None` on a collision or an out-of-range value.
    async fn candidate<S: SessionStore>(&self, store: &S) -> Result<Option<Pin>, GameError> {
        let Some(pin) = Pin::from_number((self.source)()) else {
            return Ok(None);
        };
        if store.find_by_pin(&pin).await?.is_some() {
            tracing::debug!(%pin, "pin collision");
            return Ok(None);
        }
        Ok(Some(pin))
    }

    fn exhausted(&self) -> GameError {
        tracing::warn!(attempts = self.attempts, "pin allocation exhausted");
        GameError::ResourceExhausted("could not allocate a session pin".into())
    }
}

impl Default for PinAllocator {
    fn default() -> Self {
        Self::new(20)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use quizhall_store::MemorySessionStore;

    use super::*;

    /// Yields `values` in order, then repeats the last one.
    fn scripted(values: Vec<u32>) -> impl Fn() -> u32 + Send + Sync + 'static {
        let next = AtomicUsize::new(0);
        move || {
            let i = next.fetch_add(1, Ordering::SeqCst).min(values.len() - 1);
            values[i]
        }
    }

    async fn seed(store: &MemorySessionStore, pin: &str) {
        let session = Session::new(
            SessionId::generate(),
            QuizId::from("q"),
            HostId::from("h"),
            Pin::new_unchecked(pin),
        );
        store.create(session).await.unwrap();
    }

    #[tokio::test]
    async fn test_allocate_returns_six_digit_pin() {
        let store = MemorySessionStore::new();
        let pin = PinAllocator::default().allocate(&store).await.unwrap();
        assert!(pin.is_well_formed());
        assert!(pin.as_str().as_bytes()[0] != b'0');
    }

    #[tokio::test]
    async fn test_allocate_skips_taken_pin() {
        let store = MemorySessionStore::new();
        seed(&store, "111111").await;
        let pins = PinAllocator::with_source(5, scripted(vec![111_111, 222_222]));
        assert_eq!(pins.allocate(&store).await.unwrap().as_str(), "222222");
    }

    #[tokio::test]
    async fn test_allocate_all_collisions_returns_resource_exhausted() {
        let store = MemorySessionStore::new();
        seed(&store, "111111").await;
        let pins = PinAllocator::with_source(20, scripted(vec![111_111]));
        let err = pins.allocate(&store).await.unwrap_err();
        assert!(matches!(err, GameError::ResourceExhausted(_)));
    }

    #[tokio::test]
    async fn test_allocate_counts_out_of_range_draw_as_attempt() {
        let store = MemorySessionStore::new();
        let pins = PinAllocator::with_source(3, scripted(vec![42]));
        assert!(matches!(
            pins.allocate(&store).await,
            Err(GameError::ResourceExhausted(_))
        ));
    }

    #[tokio::test]
    async fn test_allocate_store_failure_returns_internal() {
        let store = MemorySessionStore::new();
        store.set_unavailable(true);
        let err = PinAllocator::default().allocate(&store).await.unwrap_err();
        assert!(matches!(err, GameError::Internal(_)));
    }

    #[tokio::test]
    async fn test_create_session_persists_pending_session() {
        let store = MemorySessionStore::new();
        let pins = PinAllocator::with_source(5, scripted(vec![345_678]));
        let session = pins
            .create_session(&store, &QuizId::from("q"), &HostId::from("h"))
            .await
            .unwrap();
        assert_eq!(session.pin.as_str(), "345678");
        assert_eq!(session.current_question, None);
        let stored = store.find_by_pin(&session.pin).await.unwrap().unwrap();
        assert_eq!(stored.id, session.id);
    }

    #[tokio::test]
    async fn test_create_session_concurrent_pins_are_distinct() {
        let store = Arc::new(MemorySessionStore::new());
        let pins = Arc::new(PinAllocator::default());

        let mut tasks = Vec::new();
        for _ in 0..50 {
            let store = Arc::clone(&store);
            let pins = Arc::clone(&pins);
            tasks.push(tokio::spawn(async move {
                pins.create_session(&*store, &QuizId::from("q"), &HostId::from("h"))
                    .await
                    .unwrap()
                    .pin
            }));
        }

        let mut seen = std::collections::HashSet::new();
        for task in tasks {
            assert!(seen.insert(task.await.unwrap()));
        }
        assert_eq!(seen.len(), 50);
    }
}
