//! folio-core - Core library for Folio
//!
//! This crate contains the content models, the document store, and the
//! edit/reorder/sync logic behind the Folio portfolio dashboard.

pub mod board;
pub mod config;
pub mod confirm;
pub mod dashboard;
pub mod edit;
pub mod error;
pub mod integrations;
pub mod models;
pub mod notify;
pub mod reorder;
pub mod schedule;
pub mod store;
mod util;

pub use config::DashboardConfig;
pub use dashboard::{Dashboard, EditSession, EditTarget, View};
pub use error::{Error, Result};
pub use models::{Client, Experience, Overview, Project};
pub use store::{LibSqlStore, MemoryStore, RemoteStore};
