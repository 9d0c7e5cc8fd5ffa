//! Truck Pull Game Engine
//!
//! Platform-agnostic core logic for a truck-pulling season: component wear and
//! blowouts, pull resolution, monthly standings, prize money, and the upgrade
//! shop. This crate has no UI or platform-specific dependencies and performs
//! no I/O beyond parsing catalog data handed to it.

pub mod catalog;
pub mod constants;
pub mod division;
pub mod economy;
pub mod error;
pub mod numbers;
pub mod pull;
pub mod rng;
pub mod season;
pub mod seed;
pub mod session;
pub mod truck;
pub mod weather;

// Re-export commonly used types
pub use catalog::{
    Catalog, ComponentCatalog, ComponentKind, ComponentTier, Location, LocationCatalog, TierLadder,
};
pub use division::Division;
pub use economy::{PurchaseResult, TruckPolicy};
pub use error::{CatalogError, EngineError, PurchaseError, SessionConfigError};
pub use pull::{ComponentFailure, FailureList, PullOutcome, resolve_pull};
pub use rng::{CountingRng, RngBundle};
pub use season::{
    PlayerPullResult, PullConditions, PullEntry, PullReport, SeasonState, calculate_prize,
    points_for_rank,
};
pub use seed::{decode_to_seed, encode_friendly, generate_code_from_entropy};
pub use session::{PullSession, SessionConfig};
pub use truck::{Components, InstalledComponent, Truck, TruckId};
pub use weather::{Weather, WeatherPreference};

/// Trait for abstracting catalog loading
/// Platform-specific implementations should provide this
pub trait CatalogLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the component and location catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read, parsed, or validated.
    fn load_catalog(&self) -> Result<Catalog, Self::Error>;
}

/// Loader for the catalog embedded in this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledCatalog;

impl CatalogLoader for BundledCatalog {
    type Error = CatalogError;

    fn load_catalog(&self) -> Result<Catalog, Self::Error> {
        Catalog::default_config()
    }
}

/// Loader for catalog JSON supplied by the host.
#[derive(Debug, Clone, Copy)]
pub struct JsonCatalog<'a> {
    pub components: &'a str,
    pub locations: &'a str,
}

impl CatalogLoader for JsonCatalog<'_> {
    type Error = CatalogError;

    fn load_catalog(&self) -> Result<Catalog, Self::Error> {
        Catalog::from_json_parts(self.components, self.locations)
    }
}

/// Main game engine for starting pull sessions
pub struct GameEngine<L>
where
    L: CatalogLoader,
{
    catalog_loader: L,
    config: SessionConfig,
}

impl<L> GameEngine<L>
where
    L: CatalogLoader,
{
    /// Create a new engine with the provided loader and default session settings
    pub fn new(catalog_loader: L) -> Self {
        Self::with_config(catalog_loader, SessionConfig::default())
    }

    pub const fn with_config(catalog_loader: L, config: SessionConfig) -> Self {
        Self {
            catalog_loader,
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Start a new season with the specified seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or the session
    /// configuration is invalid.
    pub fn create_session(&self, seed: u64) -> Result<PullSession, EngineError<L::Error>> {
        let catalog = self
            .catalog_loader
            .load_catalog()
            .map_err(EngineError::Catalog)?;
        Ok(PullSession::new(catalog, self.config.clone(), seed)?)
    }

    /// Start a new season from a share code such as `TP-TORQUE42`.
    ///
    /// Returns `Ok(None)` when the code does not decode.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_session`].
    pub fn create_session_from_code(
        &self,
        code: &str,
    ) -> Result<Option<PullSession>, EngineError<L::Error>> {
        match decode_to_seed(code) {
            Some(seed) => self.create_session(seed).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct MissingCatalog;

    impl fmt::Display for MissingCatalog {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("catalog store offline")
        }
    }

    impl std::error::Error for MissingCatalog {}

    #[derive(Clone, Copy, Default)]
    struct OfflineLoader;

    impl CatalogLoader for OfflineLoader {
        type Error = MissingCatalog;

        fn load_catalog(&self) -> Result<Catalog, Self::Error> {
            Err(MissingCatalog)
        }
    }

    #[test]
    fn engine_creates_sessions_from_bundled_data() {
        let engine = GameEngine::new(BundledCatalog);
        let mut session = engine.create_session(0xABCD).unwrap();
        assert_eq!(session.seed(), 0xABCD);
        let report = session.run_pull();
        assert_eq!(report.results.len(), 5);
    }

    #[test]
    fn loader_failures_surface_as_catalog_errors() {
        let engine = GameEngine::new(OfflineLoader);
        let err = engine.create_session(1).unwrap_err();
        assert!(matches!(err, EngineError::Catalog(MissingCatalog)));
        assert_eq!(
            err.to_string(),
            "catalog could not be loaded: catalog store offline"
        );
    }

    #[test]
    fn invalid_config_is_rejected_before_play() {
        let config = SessionConfig {
            ai_trucks: 0,
            ..SessionConfig::default()
        };
        let engine = GameEngine::with_config(BundledCatalog, config);
        let err = engine.create_session(1).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Config(SessionConfigError::MinViolation {
                field: "ai_trucks",
                ..
            })
        ));
    }

    #[test]
    fn share_codes_start_reproducible_sessions() {
        let engine = GameEngine::new(BundledCatalog);
        let mut a = engine.create_session_from_code("TP-DIESEL07").unwrap().unwrap();
        let mut b = engine.create_session_from_code("tp-diesel07").unwrap().unwrap();
        assert_eq!(a.run_pull(), b.run_pull());
        assert!(engine.create_session_from_code("nope").unwrap().is_none());
    }

    #[test]
    fn json_loader_accepts_host_data() {
        let components = include_str!("../data/components.json");
        let locations = include_str!("../data/locations.json");
        let engine = GameEngine::new(JsonCatalog {
            components,
            locations,
        });
        let session = engine.create_session(3).unwrap();
        assert_eq!(session.catalog().locations.len(), 7);
    }
}
