//! Seeded random streams for a pull session.
//!
//! Each concern draws from its own stream so that, for example, buying a
//! truck (which names nothing) never shifts the rolls of the next pull.
use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use sha2::Sha256;

/// Deterministic RNG streams derived from one user-visible seed.
#[derive(Debug, Clone)]
pub struct RngBundle {
    course: CountingRng<SmallRng>,
    run: CountingRng<SmallRng>,
    roster: CountingRng<SmallRng>,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            course: CountingRng::new(derive_stream_seed(seed, b"course")),
            run: CountingRng::new(derive_stream_seed(seed, b"run")),
            roster: CountingRng::new(derive_stream_seed(seed, b"roster")),
        }
    }

    /// Location and weather selection.
    pub const fn course(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.course
    }

    /// Wear, performance variance, and distance jitter.
    pub const fn run(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.run
    }

    /// AI truck names and teams.
    pub const fn roster(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.roster
    }

    /// Total draws across all streams.
    #[must_use]
    pub const fn total_draws(&self) -> u64 {
        self.course
            .draws()
            .saturating_add(self.run.draws())
            .saturating_add(self.roster.draws())
    }
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: rand::RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    // HMAC accepts keys of any length, so keying never fails in practice.
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}
