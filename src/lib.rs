//! # Fansight Rust Backend
//!
//! Per-event fan engagement statistics engine.
//!
//! This crate provides a Rust-based backend for event activations (photo
//! booths, brand stands, live tallies), turning raw per-event statistics into
//! calculated report charts. The backend exposes a REST API via Axum for the
//! React frontend.
//!
//! ## Features
//!
//! - **Variable Registry**: built-in and custom stat variables with
//!   categories, flags and derived formulas
//! - **Formula Engine**: arithmetic and safe percentages over per-project
//!   stats records
//! - **Chart Calculation**: KPI, bar, pie, text, table, image and composite
//!   value charts with typed payloads
//! - **Report Pipeline**: template resolution hierarchy, per-block error
//!   recovery, responsive grid widths
//! - **HTTP API**: RESTful endpoints for frontend integration
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: ID newtypes and DTO re-exports
//! - [`models`]: Core data model (variables, charts, templates, stats records)
//! - [`formula`]: Formula parser and evaluator
//! - [`registry`]: Variable registry and built-in catalog
//! - [`services`]: Calculation services and async orchestrators
//! - [`db`]: Repository pattern and persistence layer
//! - [`http`]: Axum-based HTTP server and request handlers
//!

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]
//! ## Determinism
//!
//! Chart calculation is pure and deterministic: identical configuration and
//! statistics produce byte-identical serialized output, so the admin preview
//! and the rendered report always agree. Stats records iterate in key order
//! and report payloads are checksummed for cheap change detection.

pub mod api;

pub mod db;

pub mod formula;

pub mod models;

pub mod registry;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
