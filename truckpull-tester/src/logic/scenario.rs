use anyhow::{Result, ensure};
use truckpull_game::{PullSession, SessionConfig};

use crate::logic::game_tester::{GameTester, SimulationPlan, SimulationSummary};
use crate::logic::policy::ShoppingStrategy;

// Logic test scenario
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

fn ran_every_pull(summary: &SimulationSummary, expected: u32) -> Result<()> {
    ensure!(
        summary.metrics.pulls_run == expected,
        "expected {expected} pulls, ran {}",
        summary.metrics.pulls_run
    );
    Ok(())
}

fn smoke_expectation(summary: &SimulationSummary) -> Result<()> {
    ran_every_pull(summary, 1)?;
    let report = summary
        .reports
        .first()
        .ok_or_else(|| anyhow::anyhow!("no pull report"))?;
    ensure!(report.results.len() == 5, "division should field five trucks");
    Ok(())
}

fn month_expectation(summary: &SimulationSummary) -> Result<()> {
    ran_every_pull(summary, 10)?;
    let season = summary.final_session.season();
    ensure!(
        (season.current_month, season.current_pull) == (2, 1),
        "expected month 2 pull 1, found month {} pull {}",
        season.current_month,
        season.current_pull
    );
    ensure!(
        summary.final_session.standings().iter().all(|t| t.points == 0),
        "standings should be reset after the month"
    );
    Ok(())
}

fn season_expectation(summary: &SimulationSummary) -> Result<()> {
    ran_every_pull(summary, 30)?;
    ensure!(
        summary.final_session.season().current_month == 4,
        "three months should have elapsed"
    );
    ensure!(
        summary.metrics.upgrades_bought > 0,
        "greedy shopper never bought an upgrade"
    );
    ensure!(
        summary.metrics.final_cash >= 0,
        "cash went negative: {}",
        summary.metrics.final_cash
    );
    Ok(())
}

fn upgrade_rush_expectation(summary: &SimulationSummary) -> Result<()> {
    ran_every_pull(summary, 10)?;
    ensure!(
        summary.metrics.upgrades_bought >= 8,
        "starting cash should fund at least eight upgrades, bought {}",
        summary.metrics.upgrades_bought
    );
    Ok(())
}

fn fill_garage(session: &mut PullSession) {
    while session.buy_truck().success {}
}

fn garage_expectation(summary: &SimulationSummary) -> Result<()> {
    ran_every_pull(summary, 3)?;
    let session = &summary.final_session;
    let limit = session.config().garage_limit;
    ensure!(
        session.garage().len() + 1 == limit,
        "garage holds {} trucks with limit {limit}",
        session.garage().len()
    );
    ensure!(
        session.division().len() == 5,
        "bought trucks must not join the division"
    );
    ensure!(
        session.garage().iter().all(|t| t.total_pulls == 0),
        "garage trucks should never race"
    );
    Ok(())
}

fn deterministic_expectation(summary: &SimulationSummary) -> Result<()> {
    let plan = SimulationPlan::new(summary.strategy, summary.metrics.pulls_run);
    let replay = GameTester::try_new(false)?.run_plan(&plan, summary.seed)?;
    ensure!(
        replay.reports == summary.reports,
        "seed {} produced a different season on replay",
        summary.seed
    );
    ensure!(
        replay.metrics == summary.metrics,
        "seed {} produced different metrics on replay",
        summary.seed
    );
    Ok(())
}

fn smoke_scenario() -> TestScenario {
    TestScenario::simulation(
        "Smoke Test",
        SimulationPlan::new(ShoppingStrategy::Stock, 1).with_expectation(smoke_expectation),
    )
}

fn month_scenario() -> TestScenario {
    TestScenario::simulation(
        "Full Month",
        SimulationPlan::new(ShoppingStrategy::Stock, 10).with_expectation(month_expectation),
    )
}

fn season_scenario() -> TestScenario {
    TestScenario::simulation(
        "Three Month Season - Greedy Upgrades",
        SimulationPlan::new(ShoppingStrategy::Greedy, 30).with_expectation(season_expectation),
    )
}

fn upgrade_rush_scenario() -> TestScenario {
    TestScenario::simulation(
        "Upgrade Rush",
        SimulationPlan::new(ShoppingStrategy::Rush, 10).with_expectation(upgrade_rush_expectation),
    )
}

fn garage_scenario() -> TestScenario {
    TestScenario::simulation(
        "Garage Purchases",
        SimulationPlan::new(ShoppingStrategy::Stock, 3)
            .with_config(SessionConfig {
                starting_cash: 60_000,
                ..SessionConfig::default()
            })
            .with_setup(fill_garage)
            .with_expectation(garage_expectation),
    )
}

fn deterministic_scenario() -> TestScenario {
    TestScenario::simulation(
        "Deterministic Replay",
        SimulationPlan::new(ShoppingStrategy::Random, 20)
            .with_expectation(deterministic_expectation),
    )
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    match name.to_lowercase().as_str() {
        "smoke" => Some(smoke_scenario()),
        "month" | "full-month" => Some(month_scenario()),
        "season" | "greedy-season" => Some(season_scenario()),
        "upgrade-rush" | "rush" => Some(upgrade_rush_scenario()),
        "garage" => Some(garage_scenario()),
        "deterministic" | "replay" => Some(deterministic_scenario()),
        _ => None,
    }
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    vec![
        ("smoke", "Smoke Test"),
        ("month", "Full Month"),
        ("season", "Three Month Season - Greedy Upgrades"),
        ("upgrade-rush", "Upgrade Rush"),
        ("garage", "Garage Purchases"),
        ("deterministic", "Deterministic Replay"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_scenario_resolves() {
        for (key, description) in list_scenarios() {
            let scenario = get_scenario(key).unwrap();
            assert_eq!(scenario.name, description);
        }
        assert!(get_scenario("SMOKE").is_some());
        assert!(get_scenario("tractor-ballet").is_none());
    }

    #[test]
    fn scenarios_pass_on_a_fixed_seed() {
        let tester = GameTester::try_new(false).unwrap();
        for (key, _) in list_scenarios() {
            let scenario = get_scenario(key).unwrap();
            let summary = tester.run_plan(&scenario.plan, 2024).unwrap();
            assert!(summary.violations.is_empty(), "{key}: {:?}", summary.violations);
            for expectation in &scenario.plan.expectations {
                expectation.evaluate(&summary).unwrap();
            }
        }
    }
}
