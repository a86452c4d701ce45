//! Set cache, catalog access and collection files.

pub mod cache;
pub mod collection;
pub mod error;
pub mod load;
pub mod pokemon_tcg;
pub mod provider;
pub mod schema;

pub use cache::*;
pub use collection::*;
pub use error::*;
pub use load::*;
pub use pokemon_tcg::*;
pub use provider::*;
pub use schema::*;
