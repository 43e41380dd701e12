//! school-core library
//!
//! Two independent subsystems over plain in-memory records:
//! - `search` - fuzzy search, structured filters, autocomplete and a facade
//!   that composes them (filter -> search -> sort -> paginate)
//! - `grading` - grading-table lookup, risk tiers and performance insights
//!
//! Everything here is synchronous and side-effect free apart from logging.

pub mod cli;
pub mod config;
pub mod error;
pub mod grading;
pub mod record;
pub mod search;
pub mod tools;

pub use error::AppError;
pub use record::Record;
