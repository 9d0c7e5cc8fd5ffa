//! Season standings controller: one pull across the whole division.
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{ComponentCatalog, Location, LocationCatalog};
use crate::constants::{
    FIRST_MONTH, FIRST_PULL, POINTS_CEILING, PRIZE_CONSOLATION, PRIZE_TABLE, PULLS_PER_MONTH,
};
use crate::division::Division;
use crate::numbers::rank_to_u32;
use crate::pull::{FailureList, PullOutcome, resolve_pull};
use crate::truck::TruckId;
use crate::weather::Weather;

/// Calendar position and bank balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonState {
    pub current_month: u32,
    /// 1..=10 within the month
    pub current_pull: u32,
    pub cash: i64,
}

impl SeasonState {
    #[must_use]
    pub const fn new(cash: i64) -> Self {
        Self {
            current_month: FIRST_MONTH,
            current_pull: FIRST_PULL,
            cash,
        }
    }

    /// Move to the next pull. Returns true when a month boundary was crossed.
    pub const fn advance_pull(&mut self) -> bool {
        self.current_pull += 1;
        if self.current_pull > PULLS_PER_MONTH {
            self.current_pull = FIRST_PULL;
            self.current_month += 1;
            return true;
        }
        false
    }
}

/// Standings points for a 1-based rank: 5, 4, 3, 2, 1, then 0.
#[must_use]
pub fn points_for_rank(rank: usize) -> u32 {
    POINTS_CEILING.saturating_sub(rank_to_u32(rank))
}

/// Player payout for a 1-based rank.
#[must_use]
pub fn calculate_prize(rank: usize) -> i64 {
    rank.checked_sub(1)
        .and_then(|idx| PRIZE_TABLE.get(idx))
        .copied()
        .unwrap_or(PRIZE_CONSOLATION)
}

/// A pull's conditions, shared by every truck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullConditions {
    pub location: Location,
    pub weather: Weather,
}

impl PullConditions {
    /// Uniformly random venue and weather.
    pub fn draw<R: Rng + ?Sized>(locations: &LocationCatalog, rng: &mut R) -> Self {
        let location = locations.random(rng).clone();
        let weather = Weather::random(rng);
        Self { location, weather }
    }
}

/// One truck's line in the ranked results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullEntry {
    pub truck_id: TruckId,
    pub truck_name: String,
    pub team_name: String,
    pub is_player: bool,
    /// 1-based
    pub rank: usize,
    pub distance: f64,
    pub performance: f64,
    pub points: u32,
    pub prize: i64,
    pub failures: FailureList,
}

/// What the presentation layer shows for the player's truck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPullResult {
    pub name: String,
    pub placement: usize,
    pub prize: i64,
    pub distance: f64,
    pub component_failures: Vec<String>,
}

/// Summary of one resolved pull.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullReport {
    pub location: Location,
    pub weather: Weather,
    pub your_truck: PlayerPullResult,
    /// Full field, best distance first
    pub results: Vec<PullEntry>,
    /// Calendar position of the pull that was just run
    pub month: u32,
    pub pull: u32,
    /// True when this pull closed out the month and standings were reset
    pub month_completed: bool,
}

impl PullReport {
    #[must_use]
    pub fn winner(&self) -> Option<&PullEntry> {
        self.results.first()
    }
}

/// Order `(division index, outcome)` pairs by descending distance.
///
/// Stable: trucks with equal distance keep division order.
pub fn rank_outcomes(outcomes: &mut [(usize, PullOutcome)]) {
    outcomes.sort_by(|(_, a), (_, b)| b.distance.total_cmp(&a.distance));
}

/// Resolve one pull for every truck, award points and prize money, and
/// advance the calendar.
///
/// The player's prize is credited to `season.cash`. When the pull closes a
/// month, every truck's points and wins are reset after the report is built.
pub fn run_division_pull<R: Rng + ?Sized>(
    division: &mut Division,
    season: &mut SeasonState,
    catalog: &ComponentCatalog,
    conditions: PullConditions,
    rng: &mut R,
) -> PullReport {
    let PullConditions { location, weather } = conditions;
    debug!(
        "month {} pull {}: {} ({}), {weather}",
        season.current_month, season.current_pull, location.name, location.country
    );

    let player_outcome = resolve_pull(division.player_mut(), &location, weather, catalog, rng);
    let mut outcomes: Vec<(usize, PullOutcome)> = division
        .iter_mut()
        .enumerate()
        .skip(1)
        .map(|(idx, truck)| (idx, resolve_pull(truck, &location, weather, catalog, rng)))
        .collect();

    // The player is first in division order, so ties go its way.
    let placement = 1 + outcomes
        .iter()
        .filter(|(_, outcome)| outcome.distance > player_outcome.distance)
        .count();
    let your_truck = PlayerPullResult {
        name: division.player().name.clone(),
        placement,
        prize: calculate_prize(placement),
        distance: player_outcome.distance,
        component_failures: player_outcome
            .failures
            .iter()
            .map(ToString::to_string)
            .collect(),
    };
    season.cash += your_truck.prize;

    outcomes.insert(0, (0, player_outcome));
    rank_outcomes(&mut outcomes);

    let mut results = Vec::with_capacity(outcomes.len());
    for (position, (idx, outcome)) in outcomes.into_iter().enumerate() {
        let rank = position + 1;
        let Some(truck) = division.get_mut(idx) else {
            continue;
        };
        let points = points_for_rank(rank);
        truck.points += points;
        truck.total_pulls += 1;
        if rank == 1 {
            truck.wins += 1;
        }
        let prize = if idx == 0 { your_truck.prize } else { 0 };
        results.push(PullEntry {
            truck_id: truck.id,
            truck_name: truck.name.clone(),
            team_name: truck.team_name.clone(),
            is_player: truck.is_player,
            rank,
            distance: outcome.distance,
            performance: outcome.performance,
            points,
            prize,
            failures: outcome.failures,
        });
    }

    let month = season.current_month;
    let pull = season.current_pull;
    let month_completed = season.advance_pull();
    if month_completed {
        info!("month {month} complete; standings reset for month {}", season.current_month);
        division.reset_month_totals();
    }

    PullReport {
        location,
        weather,
        your_truck,
        results,
        month,
        pull,
        month_completed,
    }
}
