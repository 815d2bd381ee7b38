//! Assessment engine, dataset model, and scoring for gutscore.
//!
//! This crate defines the questionnaire data model, the TOML dataset
//! parser, the session engine that records answers and walks sections,
//! and the results report that the rest of gutscore builds on.

pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
