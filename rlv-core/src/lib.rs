//! A Restrained Love Viewer protocol engine: parses `@behavior[:option]=param`
//! commands from in-world scripted objects, maintains the restriction store,
//! the derived locked-folder map, and the blacklist, and answers host
//! queries and forced-action requests through [`facade::RlvEngine`].

pub mod behaviors;
pub mod blacklist;
pub mod config;
pub mod constants;
pub mod error;
pub mod facade;
pub mod forced_actions;
pub mod getters;
pub mod grammar;
pub mod host;
pub mod inventory;
pub mod locked_folders;
pub mod notify;
pub mod permissions;
pub mod restriction;

pub use error::{EngineError, EngineResult};
pub use facade::{EngineStats, RlvEngine};
pub use host::{HostActions, HostQuery, InventorySnapshot};
