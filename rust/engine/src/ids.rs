use rand::distr::{Alphanumeric, SampleString};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::fmt;
use std::sync::Mutex;
use uuid::Uuid;

/// Length used by the alphanumeric scheme when nothing else is configured.
pub const DEFAULT_ID_LENGTH: usize = 5;

/// Longest alphanumeric id accepted by [`AlphanumericIds`].
pub const MAX_ID_LENGTH: usize = 64;

/// Source of opaque identifiers for matches and players.
///
/// Implementations only produce values; checking them against the live set is the
/// store's job.
pub trait IdGenerator: Send + Sync + fmt::Debug {
    fn next_id(&self) -> String;
}

/// Fixed-length codes drawn from `[A-Za-z0-9]`.
#[derive(Debug)]
pub struct AlphanumericIds {
    length: usize,
    rng: Mutex<ChaCha20Rng>,
}

impl AlphanumericIds {
    /// Seeds from the operating system. `length` is clamped to `1..=MAX_ID_LENGTH`.
    pub fn new(length: usize) -> Self {
        let mut seeder = StdRng::from_os_rng();
        Self::with_rng(length, ChaCha20Rng::from_rng(&mut seeder))
    }

    /// Deterministic sequence, for tests and reproducible runs.
    pub fn with_seed(length: usize, seed: u64) -> Self {
        Self::with_rng(length, ChaCha20Rng::seed_from_u64(seed))
    }

    fn with_rng(length: usize, rng: ChaCha20Rng) -> Self {
        Self {
            length: length.clamp(1, MAX_ID_LENGTH),
            rng: Mutex::new(rng),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for AlphanumericIds {
    fn default() -> Self {
        Self::new(DEFAULT_ID_LENGTH)
    }
}

impl IdGenerator for AlphanumericIds {
    fn next_id(&self) -> String {
        // A poisoned rng is still a valid rng.
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Alphanumeric.sample_string(&mut *rng, self.length)
    }
}

/// Random v4 UUIDs in hyphenated form.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
