//! Quick hierarchical notes kept in a single local JSON file.
//!
//! - [`models`]: the note forest and the operations on it
//! - [`db`]: the data file, its atomic saves and schema migrations
//! - [`list`]: filtering and rendering for `ti list`
//! - [`cli`]: the `ti` command surface

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod list;
pub mod models;

pub use error::{Result, StoreError};
