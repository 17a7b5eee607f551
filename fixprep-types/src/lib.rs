//! Shared DTOs for the fixprep workspace.
//!
//! # Design constraints
//! - Fixture specs are loaded from `fixprep.toml` and must stay tolerant of
//!   both the single-database and the multi-database spelling.
//! - Run reports are serialized to disk; prefer adding optional fields over
//!   changing semantics.

pub mod fixture;
pub mod options;
pub mod report;

/// Schema identifiers.
pub mod schema {
    pub const FIXPREP_REPORT_V1: &str = "fixprep.report.v1";
}
