//! The Graph Store and the node/connection data model it holds.

pub mod interchange;
pub mod model;
pub mod slot;
pub mod store;

pub use interchange::*;
pub use model::*;
pub use slot::*;
pub use store::*;
