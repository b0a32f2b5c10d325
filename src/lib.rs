//! # rosterdb
//!
//! A single-file record store for fixed-schema personnel records with:
//! - Fixed-width binary slots (O(1) access by offset)
//! - In-memory secondary indexes over all seven attributes
//! - Soft delete (tombstones) and compaction
//! - Ordered insert, predicate-driven update and snapshot merge
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              RecordService (trait)                          │
//! │    Logged / Timed wrappers, SharedService handle            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 Engine (mutations)                          │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │                                  │
//!            ▼                                  ▼
//!   ┌─────────────────┐                ┌─────────────────┐
//!   │    IndexSet     │                │    SlotFile     │
//!   │ value → offsets │                │ (record codec)  │
//!   └─────────────────┘                └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod storage;
pub mod index;
pub mod validation;
pub mod engine;
pub mod service;
pub mod snapshot;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{Config, SyncStrategy};
pub use engine::{Engine, RestoreSummary, Stats};
pub use error::{Result, RosterError};
pub use record::{Assignment, Attribute, AttributeValue, Predicate, Rank, Record, Salary};
pub use service::{MemoryService, RecordService};
pub use snapshot::Snapshot;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of rosterdb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
