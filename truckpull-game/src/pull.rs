//! Per-truck pull resolution: wear, performance, distance, and blowouts.
//!
//! Every random roll is drawn as a unit float in `[0, 1)`. The `*_with_roll`
//! helpers expose the exact formulas for a given roll so callers and tests
//! can reason about bounds without an RNG.
use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::catalog::{ComponentCatalog, ComponentKind, Location};
use crate::constants::{
    COMPONENT_COUNT, DISTANCE_BASE, DISTANCE_DIFFICULTY_FACTOR, DISTANCE_FLOOR,
    DISTANCE_JITTER_HALF, DISTANCE_JITTER_SPAN, DISTANCE_PERFORMANCE_DIVISOR,
    PERFORMANCE_VARIANCE_BASE, PERFORMANCE_VARIANCE_SPAN, RATIO_PENALTY_FLOOR,
    RATIO_PENALTY_PER_UNIT, WEAR_ROLL_BASE, WEAR_ROLL_SPAN,
};
use crate::truck::{InstalledComponent, Truck};
use crate::weather::Weather;

/// A component that hit maximum wear and was swapped for its base tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentFailure {
    pub kind: ComponentKind,
    /// Name of the part that blew, not its replacement
    pub component: String,
}

impl fmt::Display for ComponentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} blew up!", self.component)
    }
}

/// At most one failure per slot.
pub type FailureList = SmallVec<[ComponentFailure; 4]>;

/// Result of one truck's run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullOutcome {
    pub distance: f64,
    pub performance: f64,
    #[serde(default)]
    pub failures: FailureList,
}

/// Wear added to one component for a roll in `[0, 1)`: `[1, 5)`.
#[must_use]
pub fn wear_with_roll(roll: f64) -> f64 {
    WEAR_ROLL_BASE + roll * WEAR_ROLL_SPAN
}

/// Add a random `[1, 5)` wear to every installed component, clamped at 100.
pub fn apply_wear<R: Rng + ?Sized>(truck: &mut Truck, rng: &mut R) {
    for (_, component) in truck.components.iter_mut() {
        component.add_wear(wear_with_roll(rng.r#gen::<f64>()));
    }
}

/// Transfer-case power multiplier for a ratio mismatch, floored at 0.7.
#[must_use]
pub fn ratio_penalty(ratio: f64, optimal_ratio: f64) -> f64 {
    (1.0 - (ratio - optimal_ratio).abs() * RATIO_PENALTY_PER_UNIT).max(RATIO_PENALTY_FLOOR)
}

/// Wear-adjusted power of one slot, including tire grip and gearing penalties.
#[must_use]
pub fn effective_power(
    kind: ComponentKind,
    component: &InstalledComponent,
    location: &Location,
    weather: Weather,
) -> f64 {
    let power = component.tier.power * component.wear_factor();
    match kind {
        ComponentKind::Tires => component
            .tier
            .weather_preference
            .as_ref()
            .map_or(power, |pref| power * pref.multiplier(weather)),
        ComponentKind::Transfer => component.tier.ratio.map_or(power, |ratio| {
            power * ratio_penalty(ratio, location.optimal_ratio)
        }),
        ComponentKind::Engine | ComponentKind::Chassis => power,
    }
}

/// Wear-adjusted reliability of one slot.
#[must_use]
pub fn effective_reliability(component: &InstalledComponent) -> f64 {
    component.tier.reliability * component.wear_factor()
}

/// Mean of summed effective power and reliability across the four slots,
/// before run-to-run variance.
#[must_use]
pub fn base_performance(truck: &Truck, location: &Location, weather: Weather) -> f64 {
    let (power, reliability) = truck.components.iter().fold(
        (0.0, 0.0),
        |(power, reliability), (kind, component)| {
            (
                power + effective_power(kind, component, location, weather),
                reliability + effective_reliability(component),
            )
        },
    );
    (power + reliability) / COMPONENT_COUNT
}

/// Apply the `[0.9, 1.1)` variance multiplier for a roll in `[0, 1)`.
#[must_use]
pub fn performance_with_roll(base: f64, roll: f64) -> f64 {
    base * (PERFORMANCE_VARIANCE_BASE + roll * PERFORMANCE_VARIANCE_SPAN)
}

pub fn calculate_performance<R: Rng + ?Sized>(
    truck: &Truck,
    location: &Location,
    weather: Weather,
    rng: &mut R,
) -> f64 {
    performance_with_roll(base_performance(truck, location, weather), rng.r#gen::<f64>())
}

/// Distance before the floor and jitter: `200 + performance/3 - difficulty*50`.
#[must_use]
pub fn expected_distance(performance: f64, location: &Location) -> f64 {
    DISTANCE_BASE + performance / DISTANCE_PERFORMANCE_DIVISOR
        - location.difficulty * DISTANCE_DIFFICULTY_FACTOR
}

/// Distance for a jitter roll in `[0, 1)`, never below 50.
#[must_use]
pub fn distance_with_roll(performance: f64, location: &Location, roll: f64) -> f64 {
    let jitter = roll * DISTANCE_JITTER_SPAN - DISTANCE_JITTER_HALF;
    (expected_distance(performance, location) + jitter).max(DISTANCE_FLOOR)
}

pub fn calculate_distance<R: Rng + ?Sized>(
    performance: f64,
    location: &Location,
    rng: &mut R,
) -> f64 {
    distance_with_roll(performance, location, rng.r#gen::<f64>())
}

/// Replace every fully worn component with a fresh base tier.
///
/// Failures are reported in slot order; several slots can blow in one pull.
pub fn check_component_failures(truck: &mut Truck, catalog: &ComponentCatalog) -> FailureList {
    let mut failures = FailureList::new();
    for (kind, component) in truck.components.iter_mut() {
        if !component.is_blown() {
            continue;
        }
        let failure = ComponentFailure {
            kind,
            component: component.name().to_string(),
        };
        warn!("{} ({}) on truck {}", failure, kind, truck.id);
        *component = InstalledComponent::from_tier(catalog.base_tier(kind));
        failures.push(failure);
    }
    failures
}

/// Resolve one truck's pull.
///
/// Wear is applied first and mutates the truck; scoring uses the worn state;
/// blowouts are checked last. Draw order on `rng`: four wear rolls, one
/// variance roll, one distance roll.
pub fn resolve_pull<R: Rng + ?Sized>(
    truck: &mut Truck,
    location: &Location,
    weather: Weather,
    catalog: &ComponentCatalog,
    rng: &mut R,
) -> PullOutcome {
    apply_wear(truck, rng);
    let performance = calculate_performance(truck, location, weather, rng);
    let distance = calculate_distance(performance, location, rng);
    let failures = check_component_failures(truck, catalog);
    debug!(
        "truck {} '{}' at {} ({weather}): performance {performance:.1}, distance {distance:.1} ft, {} failure(s)",
        truck.id,
        truck.name,
        location.name,
        failures.len()
    );
    PullOutcome {
        distance,
        performance,
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::constants::WEAR_MAX;
    use crate::truck::TruckId;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn catalog() -> ComponentCatalog {
        Catalog::default_config().unwrap().components
    }

    fn stock_truck() -> Truck {
        Truck::player_default(TruckId(1), "Player Team", &catalog())
    }

    fn track(optimal_ratio: f64, difficulty: f64) -> Location {
        Location {
            name: "Test Track".to_string(),
            country: "USA".to_string(),
            optimal_ratio,
            difficulty,
        }
    }

    #[test]
    fn ratio_penalty_is_floored() {
        assert!((ratio_penalty(2.5, 2.5) - 1.0).abs() < f64::EPSILON);
        assert!((ratio_penalty(2.5, 3.0) - 0.95).abs() < 1e-12);
        assert!((ratio_penalty(2.5, 9.0) - RATIO_PENALTY_FLOOR).abs() < f64::EPSILON);
    }

    #[test]
    fn base_performance_of_fresh_stock_truck() {
        let truck = stock_truck();
        let location = track(2.5, 0.5);
        // power: 450 + 60*0.8 + 40 + 35 = 573; reliability: 70 + 80 + 85 + 90 = 325
        let expected = (573.0 + 325.0) / 4.0;
        let base = base_performance(&truck, &location, Weather::Sunny);
        assert!((base - expected).abs() < 1e-9, "{base}");
    }

    #[test]
    fn rain_and_gearing_mismatch_reduce_power() {
        let truck = stock_truck();
        let sunny = base_performance(&truck, &track(2.5, 0.5), Weather::Sunny);
        let rainy = base_performance(&truck, &track(2.5, 0.5), Weather::Rainy);
        let mismatched = base_performance(&truck, &track(3.5, 0.5), Weather::Sunny);
        assert!(rainy < sunny);
        assert!(mismatched < sunny);
    }

    #[test]
    fn worn_components_score_lower() {
        let fresh = stock_truck();
        let mut worn = stock_truck();
        for (_, component) in worn.components.iter_mut() {
            component.set_wear(50.0);
        }
        let location = track(2.8, 0.6);
        let fresh_score = base_performance(&fresh, &location, Weather::Cloudy);
        let worn_score = base_performance(&worn, &location, Weather::Cloudy);
        assert!((worn_score - fresh_score * 0.5).abs() < 1e-9);
    }

    #[test]
    fn variance_spans_ninety_to_one_ten_percent() {
        assert!((performance_with_roll(100.0, 0.0) - 90.0).abs() < 1e-9);
        assert!((performance_with_roll(100.0, 0.5) - 100.0).abs() < 1e-9);
        assert!(performance_with_roll(100.0, 0.999_999) < 110.0);
    }

    #[test]
    fn distance_is_never_below_floor() {
        let brutal = track(3.0, 10.0);
        assert!((distance_with_roll(0.0, &brutal, 0.0) - DISTANCE_FLOOR).abs() < f64::EPSILON);
        let easy = track(3.0, 0.0);
        assert!((distance_with_roll(300.0, &easy, 0.5) - 300.0).abs() < 1e-9);
    }

    #[test]
    fn fresh_truck_distance_stays_within_jitter_band() {
        let location = track(2.9, 0.5);
        let mut rng = ChaCha20Rng::seed_from_u64(99);
        for _ in 0..50 {
            let mut truck = stock_truck();
            let outcome = resolve_pull(&mut truck, &location, Weather::Sunny, &catalog(), &mut rng);
            let centre = expected_distance(outcome.performance, &location);
            assert!(outcome.distance >= DISTANCE_FLOOR);
            assert!(outcome.distance >= (centre - 50.0).max(DISTANCE_FLOOR) - 1e-9);
            assert!(outcome.distance < centre + 50.0);
        }
    }

    #[test]
    fn minimum_rolls_give_exact_outcome() {
        let mut truck = stock_truck();
        let location = track(2.5, 0.5);
        let mut rng = StepRng::new(0, 0);
        let outcome = resolve_pull(&mut truck, &location, Weather::Sunny, &catalog(), &mut rng);

        for (_, component) in truck.components.iter() {
            assert!((component.wear - 1.0).abs() < 1e-12);
        }
        let base = base_performance(&truck, &location, Weather::Sunny);
        assert!((outcome.performance - base * 0.9).abs() < 1e-9);
        let distance = expected_distance(outcome.performance, &location) - 50.0;
        assert!((outcome.distance - distance.max(DISTANCE_FLOOR)).abs() < 1e-9);
        assert!(outcome.failures.is_empty());
    }

    #[test]
    fn wear_is_monotonic_and_capped() {
        let mut truck = stock_truck();
        truck.components.engine.set_wear(97.5);
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let before: Vec<f64> = truck.components.iter().map(|(_, c)| c.wear).collect();
        apply_wear(&mut truck, &mut rng);
        for ((_, component), prior) in truck.components.iter().zip(before) {
            assert!(component.wear > prior);
            assert!(component.wear <= WEAR_MAX);
            assert!(component.wear - prior < 5.0);
        }
    }

    #[test]
    fn maxed_component_blows_and_is_replaced() {
        let catalog = catalog();
        let mut truck = stock_truck();
        let upgrade = catalog.get_tier(ComponentKind::Engine, 3).unwrap();
        truck
            .components
            .install(ComponentKind::Engine, InstalledComponent::from_tier(upgrade));
        truck.components.engine.set_wear(100.0);

        let mut rng = StepRng::new(0, 0);
        let outcome = resolve_pull(&mut truck, &track(3.0, 0.5), Weather::Hot, &catalog, &mut rng);

        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].kind, ComponentKind::Engine);
        assert_eq!(outcome.failures[0].to_string(), "Performance V8 blew up!");
        let engine = truck.component(ComponentKind::Engine);
        assert_eq!(engine.level(), 1);
        assert!(engine.wear.abs() < f64::EPSILON);
    }

    #[test]
    fn simultaneous_blowouts_are_all_reported_in_slot_order() {
        let catalog = catalog();
        let mut truck = stock_truck();
        truck.components.transfer.set_wear(99.9);
        truck.components.tires.set_wear(99.0);

        let mut rng = StepRng::new(0, 0);
        let outcome = resolve_pull(&mut truck, &track(3.0, 0.5), Weather::Cold, &catalog, &mut rng);

        let kinds: Vec<ComponentKind> = outcome.failures.iter().map(|f| f.kind).collect();
        assert_eq!(kinds, vec![ComponentKind::Tires, ComponentKind::Transfer]);
        for kind in ComponentKind::ALL {
            assert!(truck.component(kind).wear < WEAR_MAX);
        }
    }
}
