//! Default process- and filesystem-backed port implementations.

use crate::invocation::Invocation;
use crate::ports::{Collaborator, SchemaProbe, WritePort};
use anyhow::Context;
use camino::Utf8Path;
use glob::{Pattern, glob};
use std::process::Command;
use tracing::debug;

pub const DEFAULT_GENERATOR: &str = "propel";
pub const DEFAULT_SCHEMA_PATTERN: &str = "*schema.xml";

/// Runs collaborators as `<program> <base_args..> <command> <args..>`.
///
/// The child process gets the fixture directory as its working directory;
/// the parent's working directory is never touched.
#[derive(Debug, Clone)]
pub struct ProcessCollaborator {
    pub program: String,
    pub base_args: Vec<String>,
}

impl ProcessCollaborator {
    pub fn new(program: impl Into<String>, base_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            base_args,
        }
    }
}

impl Default for ProcessCollaborator {
    fn default() -> Self {
        Self::new(DEFAULT_GENERATOR, Vec::new())
    }
}

impl Collaborator for ProcessCollaborator {
    fn invoke(&self, working_dir: &Utf8Path, invocation: &Invocation) -> anyhow::Result<()> {
        let command = invocation.step().command_name();
        let args = invocation.args();
        debug!(
            program = %self.program,
            command,
            dir = %working_dir,
            args = ?args,
            "invoking collaborator"
        );

        let status = Command::new(&self.program)
            .args(&self.base_args)
            .arg(command)
            .args(&args)
            .current_dir(working_dir)
            .status()
            .with_context(|| format!("spawn {} {}", self.program, command))?;

        if !status.success() {
            anyhow::bail!("{} {} exited with {}", self.program, command, status);
        }
        Ok(())
    }
}

/// Counts files matching a glob pattern directly inside the fixture directory.
#[derive(Debug, Clone)]
pub struct GlobSchemaProbe {
    pub pattern: String,
}

impl GlobSchemaProbe {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }
}

impl Default for GlobSchemaProbe {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEMA_PATTERN)
    }
}

impl SchemaProbe for GlobSchemaProbe {
    fn count_schemas(&self, dir: &Utf8Path) -> anyhow::Result<usize> {
        let pattern = format!("{}/{}", Pattern::escape(dir.as_str()), self.pattern);
        let mut count = 0;
        for entry in glob(&pattern).with_context(|| format!("glob {}", pattern))? {
            let path = entry.map_err(|e| anyhow::anyhow!("glob error: {e}"))?;
            if path.is_file() {
                count += 1;
            }
        }
        debug!(dir = %dir, pattern = %self.pattern, count, "probed schema files");
        Ok(count)
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs_err::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn rename(&self, from: &Utf8Path, to: &Utf8Path) -> anyhow::Result<()> {
        fs_err::rename(from, to).with_context(|| format!("rename {} to {}", from, to))
    }

    fn remove_file(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs_err::remove_file(path).with_context(|| format!("remove {}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn temp_root() -> (TempDir, Utf8PathBuf) {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        (temp, root)
    }

    fn build_sql() -> Invocation {
        Invocation::BuildSql {
            input_dir: ".".into(),
            output_dir: "build/sql/".into(),
            platform: "MysqlPlatform".to_string(),
            verbose: false,
        }
    }

    #[test]
    fn fs_write_port_writes_and_creates_dirs() {
        let (_temp, root) = temp_root();
        let target = root.join("nested").join("file.txt");

        FsWritePort.write_file(&target, b"hello").expect("write");

        let contents = std::fs::read_to_string(&target).expect("read");
        assert_eq!(contents, "hello");
    }

    #[test]
    fn fs_write_port_rename_replaces_target() {
        let (_temp, root) = temp_root();
        let staged = root.join("file.txt.tmp");
        let target = root.join("file.txt");
        std::fs::write(&target, "old").expect("write");
        FsWritePort.write_file(&staged, b"new").expect("write");

        FsWritePort.rename(&staged, &target).expect("rename");

        assert_eq!(std::fs::read_to_string(&target).expect("read"), "new");
        assert!(!staged.exists());
        FsWritePort.remove_file(&target).expect("remove");
        assert!(!target.exists());
    }

    #[test]
    fn glob_probe_counts_matching_files_only() {
        let (_temp, root) = temp_root();
        std::fs::write(root.join("schema.xml"), "<database/>").expect("write");
        std::fs::write(root.join("bookstore-schema.xml"), "<database/>").expect("write");
        std::fs::write(root.join("build.properties.dist"), "").expect("write");
        std::fs::create_dir_all(root.join("nested")).expect("mkdir");
        std::fs::write(root.join("nested").join("schema.xml"), "").expect("write");

        let probe = GlobSchemaProbe::default();
        assert_eq!(probe.count_schemas(&root).expect("probe"), 2);
    }

    #[test]
    fn glob_probe_handles_special_characters_in_dir() {
        let (_temp, root) = temp_root();
        let dir = root.join("odd[name]");
        std::fs::create_dir_all(&dir).expect("mkdir");
        std::fs::write(dir.join("schema.xml"), "").expect("write");

        assert_eq!(GlobSchemaProbe::default().count_schemas(&dir).expect("probe"), 1);
    }

    #[test]
    fn glob_probe_empty_dir_is_zero() {
        let (_temp, root) = temp_root();
        assert_eq!(GlobSchemaProbe::default().count_schemas(&root).expect("probe"), 0);
    }

    #[test]
    fn process_collaborator_reports_missing_program() {
        let (_temp, root) = temp_root();
        let collaborator = ProcessCollaborator::new("fixprep-no-such-generator", vec![]);
        let err = collaborator
            .invoke(&root, &build_sql())
            .expect_err("spawn must fail");
        assert!(err.to_string().contains("spawn fixprep-no-such-generator sql:build"));
    }

    #[cfg(unix)]
    #[test]
    fn process_collaborator_maps_exit_status() {
        let (_temp, root) = temp_root();
        ProcessCollaborator::new("true", vec![])
            .invoke(&root, &build_sql())
            .expect("true succeeds");

        let err = ProcessCollaborator::new("false", vec![])
            .invoke(&root, &build_sql())
            .expect_err("false fails");
        assert!(err.to_string().contains("false sql:build exited with"));
    }

    #[cfg(unix)]
    #[test]
    fn process_collaborator_runs_in_fixture_dir() {
        let (_temp, root) = temp_root();
        // `sh -c 'pwd > cwd.txt' sql:build ...` ignores the trailing args.
        let collaborator = ProcessCollaborator::new(
            "sh",
            vec!["-c".to_string(), "pwd > cwd.txt".to_string()],
        );
        collaborator.invoke(&root, &build_sql()).expect("sh succeeds");

        let recorded = std::fs::read_to_string(root.join("cwd.txt")).expect("read cwd");
        let recorded = std::fs::canonicalize(recorded.trim()).expect("canonicalize");
        let expected = std::fs::canonicalize(&root).expect("canonicalize");
        assert_eq!(recorded, expected);
    }
}
