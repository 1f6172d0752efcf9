//! Catalog assembly and session state for the Yana Flow site.
//!
//! This crate turns the backend's flat tables into the denormalized catalog
//! the pages render from, and keeps it for the session:
//! - [`slug`]: URL paths
//! - [`derive`]: computed and placeholder fields
//! - [`join`]: relation resolution ([`build_catalog`])
//! - [`store`]: the session-scoped [`SessionStore`]
//! - [`bootstrap`]: one-time load into the store

pub mod bootstrap;
pub mod derive;
pub mod join;
pub mod slug;
pub mod store;

pub use bootstrap::{BootstrapOptions, BootstrapOutcome, bootstrap, fetch_catalog};
pub use join::{JoinOptions, build_catalog};
pub use slug::{slugify, teacher_path};
pub use store::{LoadState, SessionStore};
