#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A JSON configuration file that is read with defaults and written through JSON pointers.
//!
//! [`JsonConfig`] loads a file into memory on construction. Reads are typed through `serde` and
//! fall back to a caller-provided default, so a partially filled file never stops a program from
//! starting. Problems with the file itself are logged through `tracing` with the line and column
//! of a syntax error.
//!
//! Writes modify the in-memory document and are persisted by [`JsonConfig::save()`] or, with
//! [`SaveMode::AutoSave`], when the configuration is dropped.
//!
//! # Example
//!
//! ```
//! use json_config::{JsonConfig, SaveMode};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("config.json");
//!
//! {
//!     let mut config = JsonConfig::empty(&path, SaveMode::AutoSave);
//!     config.set("name", "Martin").unwrap();
//!     config.set_by_pointer("/answer/everything", 42).unwrap();
//!     config.set_by_pointer("/list/-", 1).unwrap();
//! } // Saved here.
//!
//! let config = JsonConfig::load(&path, SaveMode::Manual);
//!
//! assert_eq!(config.get("name", String::new()), "Martin");
//! assert_eq!(config.get_by_pointer("/answer/everything", 0), 42);
//! assert!(config.is_array("list"));
//! assert_eq!(config.get("pi", 3.0), 3.0);
//! ```

mod config;
mod error;
mod pointer;
mod save_mode;

pub use config::*;
pub use error::*;
pub use save_mode::*;
