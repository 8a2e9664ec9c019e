//! Mod manager engine for Microsoft Flight Simulator community packages.
//!
//! Mods are kept in a store folder owned by the manager and enabled by
//! linking them into the simulator's `Community` folder.

pub mod config;
pub mod core;
pub mod models;
pub mod utils;

pub use crate::core::registry::AppRegistry;
pub use crate::models::error::SError;
