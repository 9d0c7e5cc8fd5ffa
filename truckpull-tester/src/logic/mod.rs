pub mod game_tester;
pub mod policy;
pub mod reports;
pub mod scenario;
pub mod seeds;
pub mod tester;

pub use game_tester::GameTester;
pub use scenario::{get_scenario, list_scenarios};
pub use seeds::{SeedInfo, resolve_seed_inputs};
pub use tester::*;
