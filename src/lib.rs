//! Travel Planner Backend Library
//!
//! This library exposes modules for testing and external use.
//! The server binary is in `src/main.rs`; `src/bin/plan_trip.rs` runs the
//! pipeline once from the command line.

pub mod api;
pub mod config;
pub mod error;
pub mod orchestrator;
/// Application state management
///
/// Shared configuration, tool registry and the single-run gate.
pub mod state;
pub mod tools;
