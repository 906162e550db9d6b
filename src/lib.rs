pub mod aggregate;
pub mod cli;
pub mod collector;
pub mod error;
pub mod events;
pub mod lcov;
pub mod model;
pub mod replay;
pub mod report;
pub mod reporter;
pub mod source;
pub mod stats;
pub mod telemetry;
