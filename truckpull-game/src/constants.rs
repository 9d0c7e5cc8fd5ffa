//! Centralized balance and tuning constants for Truck Pull game logic.
//!
//! These values define the deterministic math for the pull simulation.
//! Catalog data (tiers and locations) lives in JSON assets; the formulas
//! that consume it are tuned here.

// Season calendar ----------------------------------------------------------
pub const PULLS_PER_MONTH: u32 = 10;
pub const FIRST_MONTH: u32 = 1;
pub const FIRST_PULL: u32 = 1;

// Wear ---------------------------------------------------------------------
pub const WEAR_MAX: f64 = 100.0;
pub const WEAR_ROLL_BASE: f64 = 1.0;
pub const WEAR_ROLL_SPAN: f64 = 4.0;

// Performance --------------------------------------------------------------
pub const COMPONENT_COUNT: f64 = 4.0;
pub const PERFORMANCE_VARIANCE_BASE: f64 = 0.9;
pub const PERFORMANCE_VARIANCE_SPAN: f64 = 0.2;
pub const RATIO_PENALTY_PER_UNIT: f64 = 0.1;
pub const RATIO_PENALTY_FLOOR: f64 = 0.7;
pub const PERCENT: f64 = 100.0;

// Distance -----------------------------------------------------------------
pub const DISTANCE_BASE: f64 = 200.0;
pub const DISTANCE_PERFORMANCE_DIVISOR: f64 = 3.0;
pub const DISTANCE_DIFFICULTY_FACTOR: f64 = 50.0;
pub const DISTANCE_JITTER_SPAN: f64 = 100.0;
pub const DISTANCE_JITTER_HALF: f64 = 50.0;
pub const DISTANCE_FLOOR: f64 = 50.0;

// Standings and payouts ----------------------------------------------------
pub const POINTS_CEILING: u32 = 6;
pub const PRIZE_TABLE: [i64; 5] = [5_000, 3_500, 2_500, 2_000, 1_500];
pub const PRIZE_CONSOLATION: i64 = 300;

// Session defaults ---------------------------------------------------------
pub const DEFAULT_STARTING_CASH: i64 = 25_000;
pub const DEFAULT_AI_TRUCKS: usize = 4;
pub const DEFAULT_TRUCK_PRICE: i64 = 15_000;
pub const DEFAULT_GARAGE_LIMIT: usize = 3;
pub const DEFAULT_PLAYER_TEAM: &str = "Player Team";
pub const PLAYER_TRUCK_PREFIX: &str = "Super Mod 2WD";
pub const PLAYER_TRUCK_ID: u32 = 1;

pub const AI_TRUCK_NAMES: [&str; 3] = ["Terminator", "Outlaw", "Reaper"];
pub const AI_TEAM_NAMES: [&str; 3] = ["Diesel Demons", "Mud Mavericks", "Track Tyrants"];
