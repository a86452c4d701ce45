//! Card pool, booster generation and collection tally. Keep this crate free of IO.

pub mod booster;
pub mod cards;
pub mod collection;
pub mod config;
pub mod rng;

pub use booster::*;
pub use cards::*;
pub use collection::*;
pub use config::*;
pub use rng::*;
