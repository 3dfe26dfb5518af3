//! HealthAI core - daily health metrics and assistant context
//!
//! Raw health samples flow through a small pipeline: a source fetch replaces
//! the metric store per kind → the aggregator builds gap-filled daily series
//! → the formatter renders totals, averages, and a status line → the chat
//! session embeds that status in prompts for an external text generator.
//!
//! ## Modules
//!
//! - **Sources**: synthetic demo data and raw reading ingestion
//! - **Aggregation**: fixed-length daily series over a trailing window
//! - **Chat**: prompt assembly and conversation history

pub mod aggregator;
pub mod chat;
pub mod config;
pub mod error;
pub mod sources;
pub mod store;
pub mod summary;
pub mod types;

pub use aggregator::chart_data;
pub use chat::{ChatMessage, ChatSession, InsightService, Role};
pub use config::Config;
pub use error::ComputeError;
pub use sources::{FetchBatch, FetchReport, MetricSource, MockSource, ReadingsSource};
pub use store::{fetch_all_data, MetricStore, SharedStore};
pub use summary::{latest_status_line, summary, WindowSummary};
pub use types::{MetricKind, Sample, Window};

/// Crate version reported by the CLI
pub const HEALTHAI_VERSION: &str = env!("CARGO_PKG_VERSION");
