//! Upgrade shop and truck dealer
use log::info;
use serde::{Deserialize, Serialize};

use crate::catalog::{ComponentCatalog, ComponentKind};
use crate::error::PurchaseError;
use crate::truck::{InstalledComponent, Truck, TruckId};

/// Outcome surfaced to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PurchaseResult {
    #[must_use]
    pub const fn accepted() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    #[must_use]
    pub fn rejected(err: &PurchaseError) -> Self {
        Self {
            success: false,
            message: Some(err.to_string()),
        }
    }
}

impl<T> From<Result<T, PurchaseError>> for PurchaseResult {
    fn from(result: Result<T, PurchaseError>) -> Self {
        match result {
            Ok(_) => Self::accepted(),
            Err(err) => Self::rejected(&err),
        }
    }
}

/// Dealer rules for additional trucks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruckPolicy {
    pub price: i64,
    /// Owned trucks, counting the one racing in the division
    pub garage_limit: usize,
}

/// Buy the next tier of `kind` for `truck`.
///
/// All checks run before anything is mutated.
///
/// # Errors
///
/// Rejects when the slot is already at its top tier, `target_level` is not
/// exactly one above the installed level, or `cash` cannot cover the tier.
pub fn buy_upgrade(
    truck: &mut Truck,
    cash: &mut i64,
    catalog: &ComponentCatalog,
    kind: ComponentKind,
    target_level: u8,
) -> Result<(), PurchaseError> {
    let current = truck.component(kind).level();
    if current >= catalog.max_level(kind) {
        return Err(PurchaseError::AlreadyMaxed { kind });
    }
    let expected = current.saturating_add(1);
    if target_level != expected {
        return Err(PurchaseError::InvalidLevel {
            kind,
            requested: target_level,
            expected,
        });
    }
    let tier = catalog
        .get_tier(kind, target_level)
        .map_err(|_| PurchaseError::InvalidLevel {
            kind,
            requested: target_level,
            expected,
        })?;
    if *cash < tier.cost {
        return Err(PurchaseError::InsufficientFunds {
            cost: tier.cost,
            cash: *cash,
        });
    }

    *cash -= tier.cost;
    truck
        .components
        .install(kind, InstalledComponent::from_tier(tier));
    info!(
        "truck {} upgraded {kind} to level {} '{}' for ${}",
        truck.id, tier.level, tier.name, tier.cost
    );
    Ok(())
}

/// Buy a stock truck into the garage.
///
/// `owned` counts every truck the player already has, including the active one.
///
/// # Errors
///
/// Rejects when the garage is at its limit or `cash` cannot cover the price.
pub fn buy_truck(
    garage: &mut Vec<Truck>,
    owned: usize,
    cash: &mut i64,
    policy: TruckPolicy,
    new_truck: Truck,
) -> Result<TruckId, PurchaseError> {
    if owned >= policy.garage_limit {
        return Err(PurchaseError::GarageFull {
            limit: policy.garage_limit,
        });
    }
    if *cash < policy.price {
        return Err(PurchaseError::InsufficientFunds {
            cost: policy.price,
            cash: *cash,
        });
    }

    *cash -= policy.price;
    let id = new_truck.id;
    info!("bought truck {id} '{}' for ${}", new_truck.name, policy.price);
    garage.push(new_truck);
    Ok(id)
}
