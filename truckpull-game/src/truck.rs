//! Truck entity model: identity, season totals, and installed components
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::{ComponentCatalog, ComponentKind, ComponentTier};
use crate::constants::{PERCENT, PLAYER_TRUCK_PREFIX, WEAR_MAX};

/// Stable identifier for a truck within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TruckId(pub u32);

impl fmt::Display for TruckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A catalog tier bolted onto one truck, with its own wear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalledComponent {
    #[serde(flatten)]
    pub tier: ComponentTier,
    /// Percentage 0-100; 100 means the part blows on its next failure check
    #[serde(default)]
    pub wear: f64,
}

impl InstalledComponent {
    /// Fresh copy of a catalog tier with zero wear.
    #[must_use]
    pub fn from_tier(tier: &ComponentTier) -> Self {
        Self {
            tier: tier.clone(),
            wear: 0.0,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.tier.name
    }

    #[must_use]
    pub const fn level(&self) -> u8 {
        self.tier.level
    }

    /// Share of stats still available after wear.
    #[must_use]
    pub fn wear_factor(&self) -> f64 {
        1.0 - self.wear / PERCENT
    }

    /// Add wear, clamping at the maximum. Returns the amount actually applied.
    pub fn add_wear(&mut self, amount: f64) -> f64 {
        if amount <= 0.0 {
            return 0.0;
        }
        let before = self.wear;
        self.wear = (self.wear + amount).min(WEAR_MAX);
        self.wear - before
    }

    /// Set wear to a specific value, clamped within valid bounds.
    pub const fn set_wear(&mut self, wear: f64) {
        self.wear = wear.clamp(0.0, WEAR_MAX);
    }

    #[must_use]
    pub fn is_blown(&self) -> bool {
        self.wear >= WEAR_MAX
    }
}

/// The four mandatory slots. Each is always filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Components {
    pub engine: InstalledComponent,
    pub tires: InstalledComponent,
    pub chassis: InstalledComponent,
    pub transfer: InstalledComponent,
}

impl Components {
    /// All slots at the catalog's level-1 tier.
    #[must_use]
    pub fn stock(catalog: &ComponentCatalog) -> Self {
        Self {
            engine: InstalledComponent::from_tier(catalog.base_tier(ComponentKind::Engine)),
            tires: InstalledComponent::from_tier(catalog.base_tier(ComponentKind::Tires)),
            chassis: InstalledComponent::from_tier(catalog.base_tier(ComponentKind::Chassis)),
            transfer: InstalledComponent::from_tier(catalog.base_tier(ComponentKind::Transfer)),
        }
    }

    #[must_use]
    pub const fn get(&self, kind: ComponentKind) -> &InstalledComponent {
        match kind {
            ComponentKind::Engine => &self.engine,
            ComponentKind::Tires => &self.tires,
            ComponentKind::Chassis => &self.chassis,
            ComponentKind::Transfer => &self.transfer,
        }
    }

    pub const fn get_mut(&mut self, kind: ComponentKind) -> &mut InstalledComponent {
        match kind {
            ComponentKind::Engine => &mut self.engine,
            ComponentKind::Tires => &mut self.tires,
            ComponentKind::Chassis => &mut self.chassis,
            ComponentKind::Transfer => &mut self.transfer,
        }
    }

    /// Swap in a new component, returning the one removed.
    pub fn install(
        &mut self,
        kind: ComponentKind,
        component: InstalledComponent,
    ) -> InstalledComponent {
        std::mem::replace(self.get_mut(kind), component)
    }

    /// Slots in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentKind, &InstalledComponent)> {
        ComponentKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ComponentKind, &mut InstalledComponent)> {
        [
            (ComponentKind::Engine, &mut self.engine),
            (ComponentKind::Tires, &mut self.tires),
            (ComponentKind::Chassis, &mut self.chassis),
            (ComponentKind::Transfer, &mut self.transfer),
        ]
        .into_iter()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Truck {
    pub id: TruckId,
    pub name: String,
    pub team_name: String,
    pub is_player: bool,
    /// Reset at each month boundary
    pub points: u32,
    /// Reset at each month boundary
    pub wins: u32,
    /// Cumulative across the whole session
    pub total_pulls: u32,
    pub components: Components,
}

impl Truck {
    /// A truck with every slot at its base tier and zeroed totals.
    #[must_use]
    pub fn stock(
        id: TruckId,
        name: impl Into<String>,
        team_name: impl Into<String>,
        is_player: bool,
        catalog: &ComponentCatalog,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            team_name: team_name.into(),
            is_player,
            points: 0,
            wins: 0,
            total_pulls: 0,
            components: Components::stock(catalog),
        }
    }

    /// The default player-owned build: "Super Mod 2WD #<id>".
    #[must_use]
    pub fn player_default(id: TruckId, team_name: &str, catalog: &ComponentCatalog) -> Self {
        let name = format!("{PLAYER_TRUCK_PREFIX} {id}");
        Self::stock(id, name, team_name, true, catalog)
    }

    #[must_use]
    pub const fn component(&self, kind: ComponentKind) -> &InstalledComponent {
        self.components.get(kind)
    }

    /// Clear the per-month standings totals; components and pull count persist.
    pub const fn reset_month_totals(&mut self) {
        self.points = 0;
        self.wins = 0;
    }
}
