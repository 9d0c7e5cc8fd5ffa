use anyhow::{Context, Result};
use colored::Colorize;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use truckpull_game::constants::{PULLS_PER_MONTH, WEAR_MAX};
use truckpull_game::numbers::usize_to_f64;
use truckpull_game::{
    BundledCatalog, Catalog, CatalogLoader, PullReport, PullSession, SessionConfig, TruckId,
    calculate_prize, points_for_rank,
};

use crate::logic::policy::ShoppingStrategy;

/// Upper bound on purchases per shopping window, so a misbehaving policy
/// cannot stall a run.
const MAX_PURCHASES_PER_WINDOW: usize = 32;

/// What to run for one iteration.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub strategy: ShoppingStrategy,
    pub pulls: u32,
    pub config: SessionConfig,
    pub setup: Option<fn(&mut PullSession)>,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(strategy: ShoppingStrategy, pulls: u32) -> Self {
        Self {
            strategy,
            pulls,
            config: SessionConfig::default(),
            setup: None,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_setup(mut self, setup: fn(&mut PullSession)) -> Self {
        self.setup = Some(setup);
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// Player-facing numbers gathered over one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub pulls_run: u32,
    pub wins: u32,
    pub podiums: u32,
    pub mean_placement: f64,
    pub best_placement: Option<usize>,
    pub prize_total: i64,
    /// Player components that blew during the run
    pub blowouts: usize,
    /// Blowouts across the whole division
    pub division_blowouts: usize,
    pub upgrades_bought: u32,
    pub final_cash: i64,
}

/// Complete record of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub strategy: ShoppingStrategy,
    pub reports: Vec<PullReport>,
    /// Engine invariant breaches, one line each
    pub violations: Vec<String>,
    pub metrics: RunMetrics,
    pub final_session: PullSession,
}

/// Headless deterministic runner for the engine.
#[derive(Clone)]
pub struct GameTester {
    verbose: bool,
    catalog: Arc<Catalog>,
}

impl GameTester {
    pub const fn new(catalog: Arc<Catalog>, verbose: bool) -> Self {
        Self { verbose, catalog }
    }

    /// Tester over the bundled catalog.
    pub fn try_new(verbose: bool) -> Result<Self> {
        let catalog = BundledCatalog
            .load_catalog()
            .context("failed to load bundled catalog")?;
        Ok(Self::new(Arc::new(catalog), verbose))
    }

    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    /// Play `plan` from `seed`, checking invariants after every pull.
    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> Result<SimulationSummary> {
        let mut session = PullSession::new((*self.catalog).clone(), plan.config.clone(), seed)
            .context("invalid session configuration")?;
        if let Some(setup) = plan.setup {
            setup(&mut session);
        }

        let mut policy = plan.strategy.create_policy(seed);
        let mut reports = Vec::with_capacity(usize::try_from(plan.pulls).unwrap_or_default());
        let mut violations = Vec::new();
        let mut metrics = RunMetrics::default();
        let mut placement_sum = 0_usize;

        for _ in 0..plan.pulls {
            for _ in 0..MAX_PURCHASES_PER_WINDOW {
                let Some(decision) = policy.pick_upgrade(&session) else {
                    break;
                };
                match session.try_buy_upgrade(decision.kind, decision.level) {
                    Ok(()) => metrics.upgrades_bought += 1,
                    Err(err) => {
                        debug!("{} policy purchase rejected: {err}", policy.name());
                        break;
                    }
                }
            }

            let before = PullSnapshot::capture(&session);
            let report = session.run_pull();
            violations.extend(
                check_pull_invariants(&before, &report, &session)
                    .into_iter()
                    .map(|v| format!("month {} pull {}: {v}", before.month, before.pull)),
            );

            let player = &report.your_truck;
            metrics.pulls_run += 1;
            placement_sum += player.placement;
            metrics.prize_total += player.prize;
            metrics.blowouts += player.component_failures.len();
            metrics.division_blowouts += report.results.iter().map(|e| e.failures.len()).sum::<usize>();
            if player.placement == 1 {
                metrics.wins += 1;
            }
            if player.placement <= 3 {
                metrics.podiums += 1;
            }
            metrics.best_placement = Some(
                metrics
                    .best_placement
                    .map_or(player.placement, |best| best.min(player.placement)),
            );

            if self.verbose {
                println!(
                    "   🚜 M{} P{} {} ({}): {} placed {} for ${}",
                    report.month,
                    report.pull,
                    report.location.name,
                    report.weather,
                    player.name,
                    player.placement,
                    player.prize
                );
                for failure in &player.component_failures {
                    println!("      💥 {}", failure.yellow());
                }
            }
            reports.push(report);
        }

        if metrics.pulls_run > 0 {
            metrics.mean_placement = usize_to_f64(placement_sum) / f64::from(metrics.pulls_run);
        }
        metrics.final_cash = session.cash();

        Ok(SimulationSummary {
            seed,
            strategy: plan.strategy,
            reports,
            violations,
            metrics,
            final_session: session,
        })
    }
}

/// Session values a pull is checked against.
#[derive(Debug, Clone)]
struct PullSnapshot {
    month: u32,
    pull: u32,
    cash: i64,
    total_pulls: Vec<(TruckId, u32)>,
}

impl PullSnapshot {
    fn capture(session: &PullSession) -> Self {
        Self {
            month: session.season().current_month,
            pull: session.season().current_pull,
            cash: session.cash(),
            total_pulls: session
                .division()
                .iter()
                .map(|truck| (truck.id, truck.total_pulls))
                .collect(),
        }
    }
}

/// Check one resolved pull against the engine's invariants.
fn check_pull_invariants(
    before: &PullSnapshot,
    report: &PullReport,
    session: &PullSession,
) -> Vec<String> {
    let mut violations = Vec::new();
    let division = session.division();

    if report.results.len() != division.len() {
        violations.push(format!(
            "{} results for {} trucks",
            report.results.len(),
            division.len()
        ));
    }
    if (report.month, report.pull) != (before.month, before.pull) {
        violations.push(format!(
            "report labelled M{} P{}, expected M{} P{}",
            report.month, report.pull, before.month, before.pull
        ));
    }

    for (position, entry) in report.results.iter().enumerate() {
        if entry.rank != position + 1 {
            violations.push(format!("{} has rank {} at position {}", entry.truck_name, entry.rank, position + 1));
        }
        if entry.points != points_for_rank(entry.rank) || entry.points > 5 {
            violations.push(format!("{} got {} points at rank {}", entry.truck_name, entry.points, entry.rank));
        }
        if entry.distance < 50.0 {
            violations.push(format!("{} pulled {:.1} ft, below the floor", entry.truck_name, entry.distance));
        }
        if !entry.is_player && entry.prize != 0 {
            violations.push(format!("AI truck {} was paid ${}", entry.truck_name, entry.prize));
        }
    }
    for pair in report.results.windows(2) {
        if pair[0].distance < pair[1].distance {
            violations.push(format!(
                "{} ranked above {} with a shorter pull",
                pair[0].truck_name, pair[1].truck_name
            ));
        }
    }

    let player = &report.your_truck;
    if player.prize != calculate_prize(player.placement) {
        violations.push(format!(
            "player paid ${} for placement {}",
            player.prize, player.placement
        ));
    }
    if session.cash() != before.cash + player.prize {
        violations.push(format!(
            "cash moved from ${} to ${} with a ${} prize",
            before.cash,
            session.cash(),
            player.prize
        ));
    }

    let season = session.season();
    if before.pull == PULLS_PER_MONTH {
        if !report.month_completed || season.current_pull != 1 || season.current_month != before.month + 1 {
            violations.push("month did not roll over after the last pull".to_string());
        }
        if division.iter().any(|truck| truck.points != 0 || truck.wins != 0) {
            violations.push("standings not reset at month end".to_string());
        }
    } else {
        if report.month_completed || season.current_pull != before.pull + 1 {
            violations.push(format!("pull counter went from {} to {}", before.pull, season.current_pull));
        }
        if let Some(winner) = report.winner()
            && division.get(winner.truck_id).is_none_or(|truck| truck.wins == 0)
        {
            violations.push(format!("winner {} has no recorded win", winner.truck_name));
        }
    }

    for truck in division.iter() {
        let slots = truck.components.iter().count();
        if slots != 4 {
            violations.push(format!("{} has {slots} component slots", truck.name));
        }
        for (kind, component) in truck.components.iter() {
            if !(0.0..=WEAR_MAX).contains(&component.wear) {
                violations.push(format!("{} {kind} wear {:.1} out of range", truck.name, component.wear));
            }
        }
        let previous = before
            .total_pulls
            .iter()
            .find(|(id, _)| *id == truck.id)
            .map(|(_, count)| *count);
        if previous.map(|count| count + 1) != Some(truck.total_pulls) {
            violations.push(format!("{} total pulls not advanced by one", truck.name));
        }
    }

    violations
}
