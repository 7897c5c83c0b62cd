//! Consumer price index statistics, insight extraction from arbitrary
//! uploaded tables, and the press-release documents built from both.

pub mod config;
pub mod error;
pub mod insights;
pub mod render;
pub mod sources;
pub mod statistics;
pub mod table;
pub mod telemetry;
