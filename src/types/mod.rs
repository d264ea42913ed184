//! Wire and value types shared across the api, service and handler layers.

pub mod account;
pub mod assistant;
pub mod facts;
pub mod summary;
pub mod target;
