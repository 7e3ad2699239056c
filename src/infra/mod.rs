//! Concrete upstream sources and the delivery endpoint.

pub mod luxair;
pub mod luxairport;
pub mod twitter;
