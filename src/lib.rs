//! parchmint-check: parser and validator for ParchMint microfluidic device
//! descriptions.
//!
//! A ParchMint document is JSON describing a device as layers, components
//! with ports, connections between ports, and the physical features that
//! realise them. This crate turns such a document into a typed device graph
//! and reports every structural and semantic problem it finds in one pass.
//!
//! # Modules
//!
//! - [`parchmint`]: Device model, parser and validation
//! - [`report`]: Text, JSON and CSV rendering of check results
//! - [`config`]: Configuration loading and validation
//! - [`error`]: Configuration and reporting error types

pub mod config;
pub mod error;
pub mod parchmint;
pub mod report;
