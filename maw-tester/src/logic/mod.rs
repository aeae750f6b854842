pub mod policy;
pub mod reports;
pub mod seeds;
pub mod simulation;
pub mod tester;

pub use policy::{PickStrategy, resolve_policies};
pub use seeds::{resolve_dates, resolve_salts, resolve_tiers};
pub use tester::*;
