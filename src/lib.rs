pub mod classify;
pub mod config;
pub mod diff;
pub mod fetch;
pub mod flight;
pub mod infra;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod poller;
pub mod render;
pub mod services;
pub mod snapshot;
pub mod validate;
