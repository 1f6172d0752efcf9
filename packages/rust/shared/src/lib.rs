//! Shared types, error model, and configuration for the Yana Flow data layer.
//!
//! This crate is the foundation depended on by the other workspace crates.
//! It provides:
//! - [`YanaFlowError`], the unified error type
//! - Row and catalog types ([`TeacherRow`], [`Course`], [`Catalog`], ...)
//! - Configuration ([`AppConfig`], config loading) and tracing setup

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BackendConfig, LogFormat, LoggingConfig, SessionConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, resolve_api_key,
};
pub use error::{Result, YanaFlowError};
pub use logging::init_tracing;
pub use types::{
    Catalog, Course, CourseRow, CourseSchedule, CourseTeacher, DurationUnit, Event, EventRow,
    EventTeacher, RawEquipment, RawTables, RowId, Teacher, TeacherRow, parse_date,
    parse_timestamp,
};
