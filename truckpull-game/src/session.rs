//! Pull session: the explicit season value the presentation layer drives.
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, ComponentCatalog, ComponentKind, ComponentTier};
use crate::constants::{
    DEFAULT_AI_TRUCKS, DEFAULT_GARAGE_LIMIT, DEFAULT_PLAYER_TEAM, DEFAULT_STARTING_CASH,
    DEFAULT_TRUCK_PRICE, PLAYER_TRUCK_ID,
};
use crate::division::Division;
use crate::economy::{self, PurchaseResult, TruckPolicy};
use crate::error::{PurchaseError, SessionConfigError};
use crate::rng::RngBundle;
use crate::season::{PullConditions, PullReport, SeasonState, run_division_pull};
use crate::truck::{Truck, TruckId};

/// Tunable session parameters. Balance numbers live in [`crate::constants`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "SessionConfig::default_starting_cash")]
    pub starting_cash: i64,
    #[serde(default = "SessionConfig::default_ai_trucks")]
    pub ai_trucks: usize,
    #[serde(default = "SessionConfig::default_truck_price")]
    pub truck_price: i64,
    /// Owned trucks, counting the active one
    #[serde(default = "SessionConfig::default_garage_limit")]
    pub garage_limit: usize,
    #[serde(default = "SessionConfig::default_player_team")]
    pub player_team: String,
}

impl SessionConfig {
    const fn default_starting_cash() -> i64 {
        DEFAULT_STARTING_CASH
    }

    const fn default_ai_trucks() -> usize {
        DEFAULT_AI_TRUCKS
    }

    const fn default_truck_price() -> i64 {
        DEFAULT_TRUCK_PRICE
    }

    const fn default_garage_limit() -> usize {
        DEFAULT_GARAGE_LIMIT
    }

    fn default_player_team() -> String {
        DEFAULT_PLAYER_TEAM.to_string()
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`SessionConfigError`] when a field falls below its minimum or
    /// the team name is blank.
    pub fn validate(&self) -> Result<(), SessionConfigError> {
        require_min("starting_cash", 0, self.starting_cash)?;
        require_min("ai_trucks", 1, usize_to_i64(self.ai_trucks))?;
        require_min("truck_price", 0, self.truck_price)?;
        require_min("garage_limit", 1, usize_to_i64(self.garage_limit))?;
        if self.player_team.trim().is_empty() {
            return Err(SessionConfigError::EmptyTeamName);
        }
        Ok(())
    }

    const fn truck_policy(&self) -> TruckPolicy {
        TruckPolicy {
            price: self.truck_price,
            garage_limit: self.garage_limit,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            starting_cash: Self::default_starting_cash(),
            ai_trucks: Self::default_ai_trucks(),
            truck_price: Self::default_truck_price(),
            garage_limit: Self::default_garage_limit(),
            player_team: Self::default_player_team(),
        }
    }
}

const fn require_min(field: &'static str, min: i64, value: i64) -> Result<(), SessionConfigError> {
    if value < min {
        return Err(SessionConfigError::MinViolation { field, min, value });
    }
    Ok(())
}

fn usize_to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// One player's season: division, garage, calendar, cash, and RNG streams.
#[derive(Debug, Clone)]
pub struct PullSession {
    catalog: Catalog,
    config: SessionConfig,
    division: Division,
    garage: Vec<Truck>,
    season: SeasonState,
    rngs: RngBundle,
    seed: u64,
    next_truck_id: u32,
}

impl PullSession {
    /// Start a fresh season: month 1, pull 1, starting cash, stock player
    /// truck plus the AI field.
    ///
    /// # Errors
    ///
    /// Returns [`SessionConfigError`] if `config` fails validation.
    pub fn new(catalog: Catalog, config: SessionConfig, seed: u64) -> Result<Self, SessionConfigError> {
        config.validate()?;
        Ok(Self::build(catalog, config, seed))
    }

    /// Fresh season with [`SessionConfig::default`].
    #[must_use]
    pub fn with_defaults(catalog: Catalog, seed: u64) -> Self {
        Self::build(catalog, SessionConfig::default(), seed)
    }

    fn build(catalog: Catalog, config: SessionConfig, seed: u64) -> Self {
        let mut rngs = RngBundle::from_user_seed(seed);
        let player = Truck::player_default(
            TruckId(PLAYER_TRUCK_ID),
            &config.player_team,
            &catalog.components,
        );
        let division = Division::with_ai(
            player,
            config.ai_trucks,
            &catalog.components,
            rngs.roster(),
        );
        let next_truck_id = division.max_id().0.saturating_add(1);
        Self {
            season: SeasonState::new(config.starting_cash),
            catalog,
            config,
            division,
            garage: Vec::new(),
            rngs,
            seed,
            next_truck_id,
        }
    }

    /// Run the next pull for the whole division.
    pub fn run_pull(&mut self) -> PullReport {
        let conditions = PullConditions::draw(&self.catalog.locations, self.rngs.course());
        run_division_pull(
            &mut self.division,
            &mut self.season,
            &self.catalog.components,
            conditions,
            self.rngs.run(),
        )
    }

    /// Buy the next tier of `kind` for the active truck.
    pub fn buy_upgrade(&mut self, kind: ComponentKind, target_level: u8) -> PurchaseResult {
        self.try_buy_upgrade(kind, target_level).into()
    }

    /// Typed variant of [`Self::buy_upgrade`].
    ///
    /// # Errors
    ///
    /// See [`economy::buy_upgrade`].
    pub fn try_buy_upgrade(
        &mut self,
        kind: ComponentKind,
        target_level: u8,
    ) -> Result<(), PurchaseError> {
        economy::buy_upgrade(
            self.division.player_mut(),
            &mut self.season.cash,
            &self.catalog.components,
            kind,
            target_level,
        )
    }

    /// Buy a stock truck into the garage.
    pub fn buy_truck(&mut self) -> PurchaseResult {
        self.try_buy_truck().into()
    }

    /// Typed variant of [`Self::buy_truck`].
    ///
    /// # Errors
    ///
    /// See [`economy::buy_truck`].
    pub fn try_buy_truck(&mut self) -> Result<TruckId, PurchaseError> {
        let truck = Truck::player_default(
            TruckId(self.next_truck_id),
            &self.config.player_team,
            &self.catalog.components,
        );
        let owned = self.garage.len() + 1;
        let id = economy::buy_truck(
            &mut self.garage,
            owned,
            &mut self.season.cash,
            self.config.truck_policy(),
            truck,
        )?;
        self.next_truck_id = self.next_truck_id.saturating_add(1);
        Ok(id)
    }

    /// The player's active (competing) truck.
    #[must_use]
    pub const fn current_truck(&self) -> &Truck {
        self.division.player()
    }

    /// Division snapshot by descending points; ties keep division order.
    #[must_use]
    pub fn standings(&self) -> Vec<Truck> {
        self.division.standings()
    }

    /// Every purchasable tier, keyed by component kind.
    #[must_use]
    pub const fn upgrade_shop(&self) -> &ComponentCatalog {
        &self.catalog.components
    }

    /// The tier the active truck could buy next for `kind`, if any.
    #[must_use]
    pub fn next_upgrade(&self, kind: ComponentKind) -> Option<&ComponentTier> {
        let level = self.current_truck().component(kind).level();
        self.catalog.components.next_tier(kind, level)
    }

    /// Trucks bought from the dealer; they do not compete.
    #[must_use]
    pub fn garage(&self) -> &[Truck] {
        &self.garage
    }

    #[must_use]
    pub const fn season(&self) -> &SeasonState {
        &self.season
    }

    #[must_use]
    pub const fn cash(&self) -> i64 {
        self.season.cash
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub const fn division(&self) -> &Division {
        &self.division
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Instrumentation view of the RNG streams.
    #[must_use]
    pub const fn rngs(&self) -> &RngBundle {
        &self.rngs
    }

    /// Deterministically reseed the session's pull streams. Season state is kept.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rngs = RngBundle::from_user_seed(seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(seed: u64) -> PullSession {
        PullSession::with_defaults(Catalog::default_config().unwrap(), seed)
    }

    #[test]
    fn fresh_session_matches_defaults() {
        let session = session(1);
        assert_eq!(session.cash(), 25_000);
        assert_eq!(session.season().current_month, 1);
        assert_eq!(session.season().current_pull, 1);
        assert_eq!(session.division().len(), 5);
        assert_eq!(session.current_truck().name, "Super Mod 2WD #1");
        assert_eq!(session.current_truck().team_name, "Player Team");
        assert!(session.garage().is_empty());
    }

    #[test]
    fn config_validation_rejects_bad_values() {
        let catalog = Catalog::default_config().unwrap();
        let config = SessionConfig {
            starting_cash: -1,
            ..SessionConfig::default()
        };
        assert_eq!(
            PullSession::new(catalog.clone(), config, 1).unwrap_err(),
            SessionConfigError::MinViolation {
                field: "starting_cash",
                min: 0,
                value: -1
            }
        );

        let config = SessionConfig {
            player_team: "  ".into(),
            ..SessionConfig::default()
        };
        assert_eq!(
            PullSession::new(catalog, config, 1).unwrap_err(),
            SessionConfigError::EmptyTeamName
        );
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: SessionConfig = serde_json::from_str(r#"{"ai_trucks": 2}"#).unwrap();
        assert_eq!(config.ai_trucks, 2);
        assert_eq!(config.starting_cash, 25_000);
        assert_eq!(config.garage_limit, 3);
    }

    #[test]
    fn views_are_idempotent() {
        let session = session(3);
        assert_eq!(session.standings(), session.standings());
        assert!(std::ptr::eq(session.upgrade_shop(), session.upgrade_shop()));
        assert_eq!(session.upgrade_shop(), &session.catalog().components);
    }

    #[test]
    fn same_seed_same_season() {
        let mut a = session(77);
        let mut b = session(77);
        for _ in 0..12 {
            assert_eq!(a.run_pull(), b.run_pull());
        }
        assert_eq!(a.cash(), b.cash());
        assert_eq!(a.standings(), b.standings());
    }

    #[test]
    fn upgrade_through_session_debits_cash() {
        let mut session = session(5);
        let next = session.next_upgrade(ComponentKind::Tires).unwrap().clone();
        let result = session.buy_upgrade(ComponentKind::Tires, next.level);
        assert!(result.success);
        assert_eq!(session.cash(), 25_000 - next.cost);
        assert_eq!(session.current_truck().component(ComponentKind::Tires).level(), 2);

        let rejected = session.buy_upgrade(ComponentKind::Tires, 5);
        assert!(!rejected.success);
        assert!(rejected.message.is_some());
        assert_eq!(session.cash(), 25_000 - next.cost);
    }

    #[test]
    fn garage_fills_to_limit() {
        let mut session = session(9);
        session.season.cash = 100_000;
        assert_eq!(session.try_buy_truck(), Ok(TruckId(6)));
        assert_eq!(session.try_buy_truck(), Ok(TruckId(7)));
        assert_eq!(
            session.try_buy_truck(),
            Err(PurchaseError::GarageFull { limit: 3 })
        );
        assert_eq!(session.cash(), 70_000);
        assert_eq!(session.garage().len(), 2);
        assert_eq!(session.garage()[1].name, "Super Mod 2WD #7");
        assert_eq!(session.division().len(), 5);
    }

    #[test]
    fn reseed_changes_future_pulls_only() {
        let mut a = session(10);
        let mut b = session(10);
        a.run_pull();
        b.run_pull();
        b.reseed(11);
        assert_eq!(b.seed(), 11);
        assert_eq!(b.season(), a.season());
        assert_eq!(b.rngs().total_draws(), 0);
    }
}
