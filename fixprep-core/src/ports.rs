//! Port traits abstracting all side effects away from the pipeline.
//!
//! Every call receives the directory it acts on explicitly; nothing here
//! relies on the process working directory.

use crate::invocation::Invocation;
use camino::Utf8Path;

/// An external build step (SQL build/insert, config build, model build).
pub trait Collaborator {
    /// Run `invocation` with `working_dir` as its working directory.
    fn invoke(&self, working_dir: &Utf8Path, invocation: &Invocation) -> anyhow::Result<()>;
}

/// Counts the schema files a fixture directory holds.
pub trait SchemaProbe {
    fn count_schemas(&self, dir: &Utf8Path) -> anyhow::Result<usize>;
}

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;

    /// Move `from` over `to`, replacing any existing file.
    fn rename(&self, from: &Utf8Path, to: &Utf8Path) -> anyhow::Result<()>;

    fn remove_file(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
