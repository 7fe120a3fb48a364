//! Finance Suite
//!
//! This crate provides German payroll (gross-to-net and its inverse) and
//! IG Metall NRW tariff calculators, a versioned finance table with
//! undo/redo revisions, settings snapshots and an action log, served over
//! an axum HTTP API backed by SQLite.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod tasks;
