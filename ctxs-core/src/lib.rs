//! ctxs core library exports

pub mod config;
pub mod registry;
