//! Requests sent to the external build collaborators.
//!
//! Paths are relative to the fixture directory the collaborator runs in.

use camino::Utf8PathBuf;
use fixprep_types::report::Step;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    BuildSql {
        input_dir: Utf8PathBuf,
        output_dir: Utf8PathBuf,
        platform: String,
        verbose: bool,
    },
    InsertSql {
        output_dir: Utf8PathBuf,
        connections: Vec<String>,
        verbose: bool,
    },
    BuildConfig {
        input_dir: Utf8PathBuf,
        output_file: Utf8PathBuf,
        verbose: bool,
    },
    BuildModel {
        input_dir: Utf8PathBuf,
        output_dir: Utf8PathBuf,
        platform: String,
        verbose: bool,
    },
}

impl Invocation {
    pub fn step(&self) -> Step {
        match self {
            Invocation::BuildSql { .. } => Step::BuildSql,
            Invocation::InsertSql { .. } => Step::InsertSql,
            Invocation::BuildConfig { .. } => Step::BuildConfig,
            Invocation::BuildModel { .. } => Step::BuildModel,
        }
    }

    /// Command-line arguments following the subcommand name.
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        let verbose = match self {
            Invocation::BuildSql {
                input_dir,
                output_dir,
                platform,
                verbose,
            }
            | Invocation::BuildModel {
                input_dir,
                output_dir,
                platform,
                verbose,
            } => {
                push_opt(&mut args, "--input-dir", input_dir.as_str());
                push_opt(&mut args, "--output-dir", output_dir.as_str());
                push_opt(&mut args, "--platform", platform);
                *verbose
            }
            Invocation::InsertSql {
                output_dir,
                connections,
                verbose,
            } => {
                push_opt(&mut args, "--output-dir", output_dir.as_str());
                for connection in connections {
                    push_opt(&mut args, "--connection", connection);
                }
                *verbose
            }
            Invocation::BuildConfig {
                input_dir,
                output_file,
                verbose,
            } => {
                push_opt(&mut args, "--input-dir", input_dir.as_str());
                push_opt(&mut args, "--output-file", output_file.as_str());
                *verbose
            }
        };
        if verbose {
            args.push("--verbose".to_string());
        }
        args
    }
}

fn push_opt(args: &mut Vec<String>, name: &str, value: &str) {
    args.push(name.to_string());
    args.push(value.to_string());
}
