//! Component tier and pull location catalogs
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hasher;
use std::str::FromStr;
use twox_hash::XxHash64;

use crate::constants::PERCENT;
use crate::error::CatalogError;
use crate::weather::WeatherPreference;

/// The four mandatory component slots on every truck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Engine,
    Tires,
    Chassis,
    Transfer,
}

impl ComponentKind {
    /// Canonical slot order used for iteration, scoring, and failure reports.
    pub const ALL: [Self; 4] = [Self::Engine, Self::Tires, Self::Chassis, Self::Transfer];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Engine => "engine",
            Self::Tires => "tires",
            Self::Chassis => "chassis",
            Self::Transfer => "transfer",
        }
    }

    /// Display label for shop and garage listings.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Engine => "Engine",
            Self::Tires => "Tires",
            Self::Chassis => "Chassis",
            Self::Transfer => "Transfer Case",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ComponentKind {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| CatalogError::UnknownComponent(s.to_string()))
    }
}

/// A single purchasable level of a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentTier {
    pub name: String,
    pub level: u8,
    pub power: f64,
    /// Percentage 0-100
    pub reliability: f64,
    /// Shop price in whole dollars; level 1 is free
    pub cost: i64,
    /// Tires only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_preference: Option<WeatherPreference>,
    /// Transfer cases only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<f64>,
}

/// Tiers for one component kind, ascending by level from 1.
///
/// Built only through [`TierLadder::new`], so every ladder has a level-1 base
/// tier, contiguous levels and the attributes its kind needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "Vec<ComponentTier>")]
pub struct TierLadder {
    kind: ComponentKind,
    base: ComponentTier,
    upgrades: Vec<ComponentTier>,
}

impl From<TierLadder> for Vec<ComponentTier> {
    fn from(ladder: TierLadder) -> Self {
        let mut tiers = Vec::with_capacity(ladder.upgrades.len() + 1);
        tiers.push(ladder.base);
        tiers.extend(ladder.upgrades);
        tiers
    }
}

impl TierLadder {
    /// Sort and validate the tiers of one kind.
    ///
    /// # Errors
    ///
    /// Returns an error when the list is empty, levels are not contiguous
    /// from 1, a tier carries an out-of-range stat, tires lack weather
    /// preferences, or transfer cases lack a gear ratio.
    pub fn new(kind: ComponentKind, mut tiers: Vec<ComponentTier>) -> Result<Self, CatalogError> {
        tiers.sort_by_key(|tier| tier.level);
        for (idx, tier) in tiers.iter().enumerate() {
            let expected = u8::try_from(idx + 1).unwrap_or(u8::MAX);
            if tier.level != expected {
                return Err(CatalogError::LevelGap {
                    kind,
                    expected,
                    found: tier.level,
                });
            }
            validate_tier(kind, tier)?;
        }
        let mut iter = tiers.into_iter();
        let base = iter.next().ok_or(CatalogError::EmptyLadder)?;
        Ok(Self {
            kind,
            base,
            upgrades: iter.collect(),
        })
    }

    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        self.kind
    }

    #[must_use]
    pub const fn base(&self) -> &ComponentTier {
        &self.base
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentTier> {
        std::iter::once(&self.base).chain(self.upgrades.iter())
    }

    #[must_use]
    pub fn get(&self, level: u8) -> Option<&ComponentTier> {
        self.iter().find(|tier| tier.level == level)
    }

    #[must_use]
    pub fn max_level(&self) -> u8 {
        self.upgrades.last().map_or(self.base.level, |tier| tier.level)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.upgrades.len() + 1
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

/// Component tiers as they appear in JSON, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawComponentCatalog {
    engine: Vec<ComponentTier>,
    tires: Vec<ComponentTier>,
    chassis: Vec<ComponentTier>,
    transfer: Vec<ComponentTier>,
}

/// Every component kind's tier ladder, keyed by kind in JSON.
///
/// Deserializing runs the same checks as [`ComponentCatalog::from_json`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawComponentCatalog", into = "RawComponentCatalog")]
pub struct ComponentCatalog {
    engine: TierLadder,
    tires: TierLadder,
    chassis: TierLadder,
    transfer: TierLadder,
}

impl TryFrom<RawComponentCatalog> for ComponentCatalog {
    type Error = CatalogError;

    fn try_from(raw: RawComponentCatalog) -> Result<Self, Self::Error> {
        Ok(Self {
            engine: TierLadder::new(ComponentKind::Engine, raw.engine)?,
            tires: TierLadder::new(ComponentKind::Tires, raw.tires)?,
            chassis: TierLadder::new(ComponentKind::Chassis, raw.chassis)?,
            transfer: TierLadder::new(ComponentKind::Transfer, raw.transfer)?,
        })
    }
}

impl From<ComponentCatalog> for RawComponentCatalog {
    fn from(catalog: ComponentCatalog) -> Self {
        Self {
            engine: catalog.engine.into(),
            tires: catalog.tires.into(),
            chassis: catalog.chassis.into(),
            transfer: catalog.transfer.into(),
        }
    }
}

impl ComponentCatalog {
    /// Parse and validate component tiers from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a ladder breaks the
    /// catalog rules (see [`TierLadder::new`]).
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let raw: RawComponentCatalog = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    #[must_use]
    pub const fn ladder(&self, kind: ComponentKind) -> &TierLadder {
        match kind {
            ComponentKind::Engine => &self.engine,
            ComponentKind::Tires => &self.tires,
            ComponentKind::Chassis => &self.chassis,
            ComponentKind::Transfer => &self.transfer,
        }
    }

    /// Look up a tier by kind and level.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::TierNotFound`] when the level is outside the ladder.
    pub fn get_tier(&self, kind: ComponentKind, level: u8) -> Result<&ComponentTier, CatalogError> {
        self.ladder(kind)
            .get(level)
            .ok_or(CatalogError::TierNotFound { kind, level })
    }

    /// Level-1 tier used for fresh trucks and blowout replacement.
    #[must_use]
    pub const fn base_tier(&self, kind: ComponentKind) -> &ComponentTier {
        self.ladder(kind).base()
    }

    /// All tiers of a kind, ascending by level.
    #[must_use]
    pub fn list_tiers(&self, kind: ComponentKind) -> Vec<&ComponentTier> {
        self.ladder(kind).iter().collect()
    }

    #[must_use]
    pub fn max_level(&self, kind: ComponentKind) -> u8 {
        self.ladder(kind).max_level()
    }

    /// The tier one level above `current_level`, if the ladder has one.
    #[must_use]
    pub fn next_tier(&self, kind: ComponentKind, current_level: u8) -> Option<&ComponentTier> {
        let next = current_level.checked_add(1)?;
        self.ladder(kind).get(next)
    }
}

fn validate_tier(kind: ComponentKind, tier: &ComponentTier) -> Result<(), CatalogError> {
    if !(0.0..=PERCENT).contains(&tier.reliability) {
        return Err(CatalogError::RangeViolation {
            field: format!("{}.reliability", tier.name),
            min: 0.0,
            max: PERCENT,
            value: tier.reliability,
        });
    }
    if tier.power < 0.0 || !tier.power.is_finite() {
        return Err(CatalogError::RangeViolation {
            field: format!("{}.power", tier.name),
            min: 0.0,
            max: f64::MAX,
            value: tier.power,
        });
    }
    if tier.cost < 0 {
        return Err(CatalogError::RangeViolation {
            field: format!("{}.cost", tier.name),
            min: 0.0,
            max: f64::MAX,
            value: crate::numbers::i64_to_f64(tier.cost),
        });
    }
    match kind {
        ComponentKind::Tires => {
            let Some(pref) = tier.weather_preference.as_ref() else {
                return Err(CatalogError::MissingAttribute {
                    kind,
                    name: tier.name.clone(),
                    attribute: "weather_preference",
                });
            };
            pref.validate(&tier.name)?;
        }
        ComponentKind::Transfer => {
            let Some(ratio) = tier.ratio else {
                return Err(CatalogError::MissingAttribute {
                    kind,
                    name: tier.name.clone(),
                    attribute: "ratio",
                });
            };
            if ratio <= 0.0 || !ratio.is_finite() {
                return Err(CatalogError::RangeViolation {
                    field: format!("{}.ratio", tier.name),
                    min: 0.0,
                    max: f64::MAX,
                    value: ratio,
                });
            }
        }
        ComponentKind::Engine | ComponentKind::Chassis => {}
    }
    Ok(())
}

/// A competition venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: String,
    /// Transfer-case ratio that loses no power at this track
    pub optimal_ratio: f64,
    /// Each point of difficulty costs 50 ft of distance
    pub difficulty: f64,
}

fn validate_location(location: &Location) -> Result<(), CatalogError> {
    if location.difficulty < 0.0 || !location.difficulty.is_finite() {
        return Err(CatalogError::RangeViolation {
            field: format!("{}.difficulty", location.name),
            min: 0.0,
            max: f64::MAX,
            value: location.difficulty,
        });
    }
    if location.optimal_ratio <= 0.0 || !location.optimal_ratio.is_finite() {
        return Err(CatalogError::RangeViolation {
            field: format!("{}.optimal_ratio", location.name),
            min: 0.0,
            max: f64::MAX,
            value: location.optimal_ratio,
        });
    }
    Ok(())
}

/// Non-empty list of validated pull venues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Location>", into = "Vec<Location>")]
pub struct LocationCatalog(Vec<Location>);

impl TryFrom<Vec<Location>> for LocationCatalog {
    type Error = CatalogError;

    fn try_from(locations: Vec<Location>) -> Result<Self, Self::Error> {
        if locations.is_empty() {
            return Err(CatalogError::NoLocations);
        }
        locations.iter().try_for_each(validate_location)?;
        Ok(Self(locations))
    }
}

impl From<LocationCatalog> for Vec<Location> {
    fn from(catalog: LocationCatalog) -> Self {
        catalog.0
    }
}

impl LocationCatalog {
    /// Parse and validate locations from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, the list is empty, or a
    /// location carries a negative difficulty.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let locations: Vec<Location> = serde_json::from_str(json)?;
        Self::try_from(locations)
    }

    #[must_use]
    pub fn all(&self) -> &[Location] {
        &self.0
    }

    #[must_use]
    pub fn by_country(&self, country: &str) -> Vec<&Location> {
        self.0
            .iter()
            .filter(|location| location.country == country)
            .collect()
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Location> {
        self.0.iter().find(|location| location.name == name)
    }

    /// Draw a uniformly random venue.
    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> &Location {
        let idx = rng.gen_range(0..self.0.len());
        &self.0[idx]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Location> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

impl<'a> IntoIterator for &'a LocationCatalog {
    type Item = &'a Location;
    type IntoIter = std::slice::Iter<'a, Location>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Complete static data supplied to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub components: ComponentCatalog,
    pub locations: LocationCatalog,
}

impl Catalog {
    /// Build a catalog from separate component and location JSON documents.
    ///
    /// # Errors
    ///
    /// Returns an error if either document fails to parse or validate.
    pub fn from_json_parts(components: &str, locations: &str) -> Result<Self, CatalogError> {
        Ok(Self {
            components: ComponentCatalog::from_json(components)?,
            locations: LocationCatalog::from_json(locations)?,
        })
    }

    /// Catalog bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error only if the embedded assets are corrupt.
    pub fn default_config() -> Result<Self, CatalogError> {
        Self::from_json_parts(
            include_str!("../data/components.json"),
            include_str!("../data/locations.json"),
        )
    }

    /// Stable hash of the canonical catalog JSON, for change detection.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(&canonical);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn bundled() -> Catalog {
        Catalog::default_config().unwrap()
    }

    #[test]
    fn bundled_catalog_has_six_levels_per_kind() {
        let catalog = bundled();
        for kind in ComponentKind::ALL {
            assert_eq!(catalog.components.max_level(kind), 6, "{kind}");
            let levels: Vec<u8> = catalog
                .components
                .list_tiers(kind)
                .iter()
                .map(|tier| tier.level)
                .collect();
            assert_eq!(levels, vec![1, 2, 3, 4, 5, 6]);
        }
        assert_eq!(catalog.locations.len(), 7);
    }

    #[test]
    fn base_tiers_are_free_level_one() {
        let catalog = bundled();
        for kind in ComponentKind::ALL {
            let base = catalog.components.base_tier(kind);
            assert_eq!(base.level, 1);
            assert_eq!(base.cost, 0);
        }
        assert_eq!(catalog.components.base_tier(ComponentKind::Engine).name, "Basic V8");
    }

    #[test]
    fn get_tier_outside_range_is_not_found() {
        let catalog = bundled();
        assert!(matches!(
            catalog.components.get_tier(ComponentKind::Tires, 7),
            Err(CatalogError::TierNotFound {
                kind: ComponentKind::Tires,
                level: 7
            })
        ));
        assert!(catalog.components.get_tier(ComponentKind::Tires, 0).is_err());
        let tier = catalog.components.get_tier(ComponentKind::Transfer, 4).unwrap();
        assert_eq!(tier.name, "Race Case");
        assert_eq!(tier.ratio, Some(3.2));
    }

    #[test]
    fn next_tier_stops_at_max_level() {
        let catalog = bundled();
        let next = catalog.components.next_tier(ComponentKind::Chassis, 1).unwrap();
        assert_eq!(next.level, 2);
        assert!(catalog.components.next_tier(ComponentKind::Chassis, 6).is_none());
        assert!(catalog.components.next_tier(ComponentKind::Chassis, u8::MAX).is_none());
    }

    #[test]
    fn unknown_component_kind_fails_to_parse() {
        assert_eq!("tires".parse::<ComponentKind>().unwrap(), ComponentKind::Tires);
        assert!(matches!(
            "turbo".parse::<ComponentKind>(),
            Err(CatalogError::UnknownComponent(_))
        ));
    }

    #[test]
    fn ladder_with_level_gap_is_rejected() {
        let mut tiers: Vec<ComponentTier> = bundled().components.engine.into();
        tiers.remove(2);
        assert!(matches!(
            TierLadder::new(ComponentKind::Engine, tiers),
            Err(CatalogError::LevelGap {
                kind: ComponentKind::Engine,
                expected: 3,
                found: 4
            })
        ));
    }

    #[test]
    fn ladder_must_start_at_level_one() {
        let mut tiers: Vec<ComponentTier> = bundled().components.chassis.into();
        tiers.remove(0);
        assert!(matches!(
            TierLadder::new(ComponentKind::Chassis, tiers),
            Err(CatalogError::LevelGap {
                expected: 1,
                found: 2,
                ..
            })
        ));
    }

    #[test]
    fn deserializing_components_runs_validation() {
        let mut value = serde_json::to_value(&bundled().components).unwrap();
        for tier in value["tires"].as_array_mut().unwrap() {
            tier.as_object_mut().unwrap().remove("weather_preference");
        }
        assert!(serde_json::from_value::<ComponentCatalog>(value).is_err());

        let mut value = serde_json::to_value(&bundled().components).unwrap();
        value["engine"].as_array_mut().unwrap().drain(0..2);
        let err = serde_json::from_value::<ComponentCatalog>(value).unwrap_err();
        assert!(err.to_string().contains("contiguous from level 1"), "{err}");
    }

    #[test]
    fn deserializing_locations_runs_validation() {
        let json = r#"[{ "name": "Pit", "country": "USA", "optimal_ratio": 3.0, "difficulty": -1.0 }]"#;
        assert!(serde_json::from_str::<LocationCatalog>(json).is_err());
        assert!(serde_json::from_str::<LocationCatalog>("[]").is_err());
    }

    #[test]
    fn bundled_catalog_survives_a_serde_round_trip() {
        let catalog = bundled();
        let json = serde_json::to_string(&catalog).unwrap();
        let parsed: Catalog = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, catalog);
        assert_eq!(parsed.components.ladder(ComponentKind::Tires).kind(), ComponentKind::Tires);
    }

    #[test]
    fn tires_without_preferences_are_rejected() {
        let json = r#"{
            "engine": [{ "name": "E", "level": 1, "power": 1, "reliability": 1, "cost": 0 }],
            "tires": [{ "name": "T", "level": 1, "power": 1, "reliability": 1, "cost": 0 }],
            "chassis": [{ "name": "C", "level": 1, "power": 1, "reliability": 1, "cost": 0 }],
            "transfer": [{ "name": "X", "level": 1, "power": 1, "reliability": 1, "cost": 0, "ratio": 2.5 }]
        }"#;
        let err = ComponentCatalog::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::MissingAttribute {
                kind: ComponentKind::Tires,
                attribute: "weather_preference",
                ..
            }
        ));
    }

    #[test]
    fn empty_ladder_fails_at_parse_time() {
        let json = r#"{ "engine": [], "tires": [], "chassis": [], "transfer": [] }"#;
        assert!(ComponentCatalog::from_json(json).is_err());
    }

    #[test]
    fn empty_location_list_is_rejected() {
        assert!(LocationCatalog::from_json("[]").is_err());
    }

    #[test]
    fn negative_difficulty_is_rejected() {
        let json = r#"[{ "name": "Pit", "country": "USA", "optimal_ratio": 3.0, "difficulty": -0.1 }]"#;
        assert!(matches!(
            LocationCatalog::from_json(json),
            Err(CatalogError::RangeViolation { .. })
        ));
    }

    #[test]
    fn locations_filter_by_country() {
        let catalog = bundled();
        let canada: Vec<&str> = catalog
            .locations
            .by_country("Canada")
            .into_iter()
            .map(|loc| loc.name.as_str())
            .collect();
        assert_eq!(canada, vec!["Woodstock, ON", "Alma, ON"]);
        assert!(catalog.locations.by_country("Mars").is_empty());
        assert!(catalog.locations.find("Eext").is_some());
    }

    #[test]
    fn random_location_draws_from_catalog() {
        let catalog = bundled();
        let mut rng = StepRng::new(0, 0);
        assert_eq!(catalog.locations.random(&mut rng).name, "Bowling Green, OH");
    }

    #[test]
    fn fingerprint_tracks_catalog_changes() {
        let catalog = bundled();
        assert_eq!(catalog.fingerprint(), bundled().fingerprint());

        let mut changed = catalog.clone();
        changed.locations = LocationCatalog::try_from(vec![Location {
            name: "Test Track".to_string(),
            country: "USA".to_string(),
            optimal_ratio: 3.0,
            difficulty: 0.5,
        }])
        .unwrap();
        assert_ne!(catalog.fingerprint(), changed.fingerprint());
    }

    #[test]
    fn catalog_serializes_keyed_by_kind() {
        let value = serde_json::to_value(&bundled().components).unwrap();
        for kind in ComponentKind::ALL {
            assert_eq!(value[kind.key()].as_array().map(Vec::len), Some(6));
        }
    }
}
