//! Embeddable core library for fixprep.
//!
//! Provides a clap-free entry point that prepares test fixtures: it
//! materializes distribution templates and drives the external build
//! collaborators for every fixture directory.
//!
//! # Port traits
//!
//! All I/O beyond reading templates goes through port traits in [`ports`]:
//! - [`Collaborator`](ports::Collaborator) — run one external build step
//! - [`SchemaProbe`](ports::SchemaProbe) — count schema files in a fixture
//! - [`WritePort`](ports::WritePort) — write materialized files
//!
//! The [`adapters`] module provides default process- and filesystem-backed
//! implementations.
//!
//! # Entry point
//!
//! - [`run`](pipeline::run) — prepare every fixture and return a report

pub mod adapters;
pub mod error;
pub mod invocation;
pub mod pipeline;
pub mod ports;
pub mod settings;
pub mod template;

pub use error::{ErrorKind, PrepareError};
pub use fixprep_types::fixture::FixtureSpec;
pub use fixprep_types::options::BuildOptions;
pub use fixprep_types::report::RunReport;
