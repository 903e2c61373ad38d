//! Reproducible request generation for the Bookshop API V1.
//!
//! This crate synthesizes a stream of HTTP requests against a REST API
//! exposing Books, Customers, and Orders, deliberately mixing valid
//! operations with named fault conditions to probe the API's
//! error-handling contract. Generation is fully deterministic: a fixed
//! seed replays the identical request sequence.
//!
//! # Architecture
//!
//! ```text
//! weight file (YAML)          books corpus (NDJSON)
//!        │                            │
//!        ▼                            ▼
//! ┌──────────────┐            ┌──────────────┐
//! │ Distributions│            │  BookCorpus  │
//! └──────┬───────┘            └──────┬───────┘
//!        │                           │
//!        ▼                           ▼
//! ┌─────────────────────────────────────────┐
//! │                 Engine                  │
//! │  RandomContext · VirtualTables · marker │
//! └────────────────────┬────────────────────┘
//!                      │ RequestDescriptor
//!                      ▼
//!              ┌──────────────┐   201 Created
//!              │BookshopClient│──────────────▶ register_created
//!              └──────────────┘
//! ```
//!
//! Each tick samples a resource, an operation, and a fault label from the
//! configured weight tables, synthesizes or selects entity data to match,
//! and emits one [`request::RequestDescriptor`]. Entities the API reports
//! as created are fed back through [`engine::Engine::register_created`] so
//! later reads, updates, deletes, and cross-resource order references
//! target real identities.

pub mod client;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod entity;
pub mod marker;
pub mod random;
pub mod request;
pub mod store;

pub use client::{ApiResponse, BookshopClient};
pub use config::{Config, ConfigError, Distributions};
pub use engine::{Engine, GenError, GeneratedRequest};
pub use request::{Method, RequestDescriptor, Resource};
