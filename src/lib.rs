//! spendtrack - personal expense and bill tracker
//!
//! This library provides the core of the spendtrack application: an
//! owner-scoped ledger of expenses and bills, the bill due-date lifecycle,
//! and category/trend reporting over the ledger.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Data directory resolution and user settings
//! - `error`: Custom error types
//! - `models`: Expenses, bills, categories, money, ids and query filters
//! - `storage`: JSON file storage layer
//! - `audit`: Audit logging of every change
//! - `services`: Owner-scoped business logic, including the overdue sweep
//! - `reports`: Aggregation, trends, the ledger report, stats and dashboard
//! - `export`: CSV, JSON and YAML output
//! - `display`: Terminal formatting
//! - `cli`: Command handlers for the `spendtrack` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use spendtrack::config::paths::TrackerPaths;
//! use spendtrack::reports::{LedgerReport, ReportRequest};
//! use spendtrack::storage::Storage;
//!
//! let storage = Storage::open(TrackerPaths::new()?)?;
//! let report = LedgerReport::generate(&storage, &owner, &ReportRequest::for_year(2025), today)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{TrackerError, TrackerResult};
