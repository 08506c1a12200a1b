//! Typed mapping definitions and a composable aggregation DSL for
//! Elasticsearch-compatible search engines.
//!
//! Two halves:
//!
//! - [`schema`] describes how a family of backing types maps onto engine
//!   fields. A [`DefinitionBuilder`] collects [`Field`]s and is frozen into
//!   an immutable [`Definition`] that renders the mapping document.
//! - [`nodes`] is a tree of aggregation and query nodes that renders the
//!   request document and decodes the engine's response into [`results`].
//!
//! Talking to the engine is left to an injected [`Transport`].

pub mod config;
pub mod error;
pub mod format;
pub mod nodes;
pub mod results;
pub mod schema;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use format::{DefinitionFormatter, Formatter, Passthrough};
pub use schema::{Definition, DefinitionBuilder, ElasticMode, Field, Indexable, Target};
pub use transport::Transport;

/// JSON object used for every rendered document fragment.
pub type Document = serde_json::Map<String, serde_json::Value>;
