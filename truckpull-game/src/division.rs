//! The division: the player's active truck plus the AI field.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::ComponentCatalog;
use crate::constants::{AI_TEAM_NAMES, AI_TRUCK_NAMES};
use crate::truck::{Truck, TruckId};

/// Competing trucks in insertion order, player first.
///
/// The player slot is a field rather than an index, so the division can
/// never lose its player truck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Division {
    player: Truck,
    rivals: Vec<Truck>,
}

impl Division {
    #[must_use]
    pub const fn new(player: Truck) -> Self {
        Self {
            player,
            rivals: Vec::new(),
        }
    }

    /// Build a division with `ai_count` stock AI trucks numbered after the player.
    ///
    /// AI names and teams are drawn independently, so duplicates are expected.
    pub fn with_ai<R: Rng + ?Sized>(
        player: Truck,
        ai_count: usize,
        catalog: &ComponentCatalog,
        rng: &mut R,
    ) -> Self {
        let mut division = Self::new(player);
        let first_id = division.player.id.0.saturating_add(1);
        for id in (first_id..).take(ai_count) {
            let name = AI_TRUCK_NAMES[rng.gen_range(0..AI_TRUCK_NAMES.len())];
            let team = AI_TEAM_NAMES[rng.gen_range(0..AI_TEAM_NAMES.len())];
            division.push_rival(Truck::stock(TruckId(id), name, team, false, catalog));
        }
        division
    }

    pub fn push_rival(&mut self, truck: Truck) {
        self.rivals.push(truck);
    }

    #[must_use]
    pub const fn player(&self) -> &Truck {
        &self.player
    }

    pub const fn player_mut(&mut self) -> &mut Truck {
        &mut self.player
    }

    #[must_use]
    pub fn rivals(&self) -> &[Truck] {
        &self.rivals
    }

    /// Trucks in division order (player first).
    pub fn iter(&self) -> impl Iterator<Item = &Truck> {
        std::iter::once(&self.player).chain(self.rivals.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Truck> {
        std::iter::once(&mut self.player).chain(self.rivals.iter_mut())
    }

    /// Truck at a division-order position.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Truck> {
        match index {
            0 => Some(&mut self.player),
            n => self.rivals.get_mut(n - 1),
        }
    }

    #[must_use]
    pub fn get(&self, id: TruckId) -> Option<&Truck> {
        self.iter().find(|truck| truck.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rivals.len() + 1
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Highest truck id in the division.
    #[must_use]
    pub fn max_id(&self) -> TruckId {
        self.iter()
            .map(|truck| truck.id)
            .max()
            .unwrap_or(self.player.id)
    }

    /// Snapshot sorted by descending points; equal points keep division order.
    #[must_use]
    pub fn standings(&self) -> Vec<Truck> {
        let mut standings: Vec<Truck> = self.iter().cloned().collect();
        standings.sort_by(|a, b| b.points.cmp(&a.points));
        standings
    }

    pub fn reset_month_totals(&mut self) {
        for truck in self.iter_mut() {
            truck.reset_month_totals();
        }
    }
}
