#![warn(clippy::all, missing_docs)]

//! Core domain logic for the realty catalog.
//!
//! This crate hosts the data models, configuration handling,
//! password hashing, and persistence layers used by the console
//! front end and any future frontends.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod models;
pub mod session;
pub mod store;

pub use catalog::{Catalog, CatalogError};
pub use config::AppConfig;
pub use models::{Account, AccountSummary, Listing, ListingUpdate};
pub use session::Session;
pub use store::{CatalogStore, JsonFileStore, StoreError};
