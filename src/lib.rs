// src/lib.rs

//! TrendRadar Library
//!
//! Aggregates periodic ranked-list snapshots into keyword-grouped,
//! weighted trend reports.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
