use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use truckpull_game::{ComponentKind, PullSession};

/// Cash a greedy shopper keeps back for the next month.
const GREEDY_RESERVE: i64 = 5_000;

/// Upgrade request returned by an [`UpgradePolicy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeDecision {
    pub kind: ComponentKind,
    pub level: u8,
}

/// Policy interface for automated shopping between pulls.
pub trait UpgradePolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Next upgrade to buy before the coming pull, or `None` to stop shopping.
    ///
    /// Called repeatedly until it returns `None`.
    fn pick_upgrade(&mut self, session: &PullSession) -> Option<UpgradeDecision>;
}

/// Built-in shopping strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShoppingStrategy {
    /// Never buys anything
    Stock,
    /// One cheapest affordable upgrade per pull, keeping a cash reserve
    Greedy,
    /// Spends every dollar on the cheapest upgrades available
    Rush,
    /// Seeded coin flips over random component kinds
    Random,
}

impl ShoppingStrategy {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Stock => "Stock",
            Self::Greedy => "Greedy",
            Self::Rush => "Upgrade Rush",
            Self::Random => "Random",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn UpgradePolicy + Send> {
        match self {
            Self::Stock => Box::new(StockPolicy),
            Self::Greedy => Box::new(GreedyPolicy::default()),
            Self::Rush => Box::new(RushPolicy),
            Self::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl fmt::Display for ShoppingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Cheapest next-tier upgrade the session can afford while keeping `reserve`.
fn cheapest_affordable(session: &PullSession, reserve: i64) -> Option<UpgradeDecision> {
    ComponentKind::ALL
        .into_iter()
        .filter_map(|kind| session.next_upgrade(kind).map(|tier| (kind, tier)))
        .filter(|(_, tier)| session.cash() - tier.cost >= reserve)
        .min_by_key(|(_, tier)| tier.cost)
        .map(|(kind, tier)| UpgradeDecision {
            kind,
            level: tier.level,
        })
}

struct StockPolicy;

impl UpgradePolicy for StockPolicy {
    fn name(&self) -> &'static str {
        "stock"
    }

    fn pick_upgrade(&mut self, _session: &PullSession) -> Option<UpgradeDecision> {
        None
    }
}

#[derive(Default)]
struct GreedyPolicy {
    last_shopped: Option<(u32, u32)>,
}

impl UpgradePolicy for GreedyPolicy {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn pick_upgrade(&mut self, session: &PullSession) -> Option<UpgradeDecision> {
        let season = session.season();
        let slot = (season.current_month, season.current_pull);
        if self.last_shopped == Some(slot) {
            return None;
        }
        self.last_shopped = Some(slot);
        cheapest_affordable(session, GREEDY_RESERVE)
    }
}

struct RushPolicy;

impl UpgradePolicy for RushPolicy {
    fn name(&self) -> &'static str {
        "rush"
    }

    fn pick_upgrade(&mut self, session: &PullSession) -> Option<UpgradeDecision> {
        cheapest_affordable(session, 0)
    }
}

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl UpgradePolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn pick_upgrade(&mut self, session: &PullSession) -> Option<UpgradeDecision> {
        if !self.rng.gen_bool(0.5) {
            return None;
        }
        let kind = ComponentKind::ALL[self.rng.gen_range(0..ComponentKind::ALL.len())];
        let tier = session.next_upgrade(kind)?;
        (tier.cost <= session.cash()).then_some(UpgradeDecision {
            kind,
            level: tier.level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use truckpull_game::{BundledCatalog, GameEngine};

    fn session() -> PullSession {
        GameEngine::new(BundledCatalog).create_session(5).unwrap()
    }

    #[test]
    fn stock_never_shops() {
        let mut policy = ShoppingStrategy::Stock.create_policy(1);
        assert_eq!(policy.pick_upgrade(&session()), None);
    }

    #[test]
    fn greedy_buys_cheapest_once_per_pull() {
        let session = session();
        let mut policy = ShoppingStrategy::Greedy.create_policy(1);
        let decision = policy.pick_upgrade(&session).unwrap();
        assert_eq!(
            decision,
            UpgradeDecision {
                kind: ComponentKind::Transfer,
                level: 2
            }
        );
        assert_eq!(policy.pick_upgrade(&session), None);
    }

    #[test]
    fn rush_spends_down_to_what_it_cannot_afford() {
        let mut session = session();
        let mut policy = ShoppingStrategy::Rush.create_policy(1);
        let mut bought = 0;
        while let Some(decision) = policy.pick_upgrade(&session) {
            assert!(session.buy_upgrade(decision.kind, decision.level).success);
            bought += 1;
        }
        assert_eq!(bought, 8);
        assert_eq!(session.cash(), 1_000);
    }

    #[test]
    fn random_policy_is_seeded() {
        let session = session();
        let mut a = ShoppingStrategy::Random.create_policy(9);
        let mut b = ShoppingStrategy::Random.create_policy(9);
        for _ in 0..16 {
            assert_eq!(a.pick_upgrade(&session), b.pick_upgrade(&session));
        }
    }
}
