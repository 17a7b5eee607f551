//! Configuration file loading for fixprep.
//!
//! Discovers and loads `fixprep.toml` from the project root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fixprep_core::adapters::{DEFAULT_GENERATOR, DEFAULT_SCHEMA_PATTERN};
use fixprep_core::settings::PrepareSettings;
use fixprep_types::fixture::{FixtureSpec, default_fixtures};
use fixprep_types::options::BuildOptions;
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "fixprep.toml";

/// Top-level configuration from fixprep.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FixprepConfig {
    /// Connection settings substituted into templates.
    pub database: DatabaseConfig,

    /// External generator invoked for the build steps.
    pub generator: GeneratorConfig,

    /// Fixtures directory relative to the project root.
    pub fixtures_dir: Option<Utf8PathBuf>,

    /// Stop at the first fixture that does not complete.
    pub fail_fast: bool,

    /// Replaces the built-in fixture set when non-empty.
    pub fixtures: Vec<FixtureSpec>,
}

/// Database section of the config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub vendor: Option<String>,
    pub dsn: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

/// Generator section of the config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Program run for each step (default: `propel`).
    pub program: Option<String>,

    /// Arguments placed before the step's subcommand name.
    pub args: Vec<String>,

    /// Glob matched inside each fixture directory to find schema files.
    pub schema_pattern: Option<String>,

    /// Extension of the built runtime config file.
    pub config_format: Option<String>,
}

/// Discover the fixprep.toml config file.
///
/// Returns `None` if no config file is found in the project root.
pub fn discover_config(project_root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = project_root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a fixprep.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<FixprepConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<FixprepConfig> {
    let config: FixprepConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from the project root, or return default if not found.
pub fn load_or_default(project_root: &Utf8Path) -> anyhow::Result<FixprepConfig> {
    match discover_config(project_root) {
        Some(path) => load_config(&path),
        None => Ok(FixprepConfig::default()),
    }
}

/// Values given on the `test:prepare` command line.
#[derive(Debug, Clone, Default)]
pub struct PrepareOverrides {
    pub project_root: Utf8PathBuf,
    pub vendor: Option<String>,
    pub dsn: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub fixtures_dir: Option<Utf8PathBuf>,
    pub generator: Option<String>,
    pub generator_args: Vec<String>,
    pub config_format: Option<String>,
    pub fail_fast: bool,
    pub verbose: bool,
}

/// Merged configuration combining config file and CLI arguments.
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub options: BuildOptions,
    pub settings: PrepareSettings,
    pub fixtures: Vec<FixtureSpec>,
    pub generator_program: String,
    pub generator_args: Vec<String>,
    pub schema_pattern: String,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: FixprepConfig,
}

impl ConfigMerger {
    pub fn new(config: FixprepConfig) -> Self {
        Self { config }
    }

    /// Fixtures from the config file, or the built-in set.
    pub fn fixtures(&self) -> Vec<FixtureSpec> {
        if self.config.fixtures.is_empty() {
            default_fixtures()
        } else {
            self.config.fixtures.clone()
        }
    }

    /// Merge with `test:prepare` CLI arguments.
    ///
    /// Scalar CLI values override the config file, which overrides built-in
    /// defaults. CLI generator args extend the config file list. `fail_fast`
    /// is on when either source enables it.
    pub fn merge_prepare_args(self, cli: PrepareOverrides) -> MergedConfig {
        let fixtures = self.fixtures();
        let FixprepConfig {
            database,
            generator,
            fixtures_dir,
            fail_fast,
            ..
        } = self.config;
        let defaults = BuildOptions::default();
        let settings_defaults = PrepareSettings::default();

        let options = BuildOptions {
            vendor: cli.vendor.or(database.vendor).unwrap_or(defaults.vendor),
            dsn: cli.dsn.or(database.dsn).unwrap_or(defaults.dsn),
            user: cli.user.or(database.user).unwrap_or(defaults.user),
            password: cli
                .password
                .or(database.password)
                .unwrap_or(defaults.password),
            verbose: cli.verbose,
        };

        let settings = PrepareSettings {
            project_root: cli.project_root,
            fixtures_dir: cli
                .fixtures_dir
                .or(fixtures_dir)
                .unwrap_or(settings_defaults.fixtures_dir),
            config_format: cli
                .config_format
                .or(generator.config_format)
                .unwrap_or(settings_defaults.config_format),
            fail_fast: cli.fail_fast || fail_fast,
        };

        let mut generator_args = generator.args;
        generator_args.extend(cli.generator_args);

        MergedConfig {
            options,
            settings,
            fixtures,
            generator_program: cli
                .generator
                .or(generator.program)
                .unwrap_or_else(|| DEFAULT_GENERATOR.to_string()),
            generator_args,
            schema_pattern: generator
                .schema_pattern
                .unwrap_or_else(|| DEFAULT_SCHEMA_PATTERN.to_string()),
        }
    }
}
