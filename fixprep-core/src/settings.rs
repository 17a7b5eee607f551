//! Clap-free settings for the prepare pipeline.

use camino::{Utf8Path, Utf8PathBuf};
use fixprep_types::fixture::{DEFAULT_FIXTURES_DIR, FixtureSpec};

/// Output directory for generated SQL, relative to the fixture directory.
pub const SQL_OUTPUT_DIR: &str = "build/sql/";
/// Output directory for generated model classes, relative to the fixture directory.
pub const CLASSES_OUTPUT_DIR: &str = "build/classes/";
/// Output directory for generated runtime config, relative to the fixture directory.
pub const CONF_OUTPUT_DIR: &str = "build/conf";

pub const DEFAULT_CONFIG_FORMAT: &str = "php";

/// Settings for the prepare pipeline.
#[derive(Debug, Clone)]
pub struct PrepareSettings {
    pub project_root: Utf8PathBuf,
    /// Relative to `project_root`.
    pub fixtures_dir: Utf8PathBuf,
    /// Extension of the built runtime config file.
    pub config_format: String,
    /// Stop after the first fixture that does not complete cleanly.
    pub fail_fast: bool,
}

impl Default for PrepareSettings {
    fn default() -> Self {
        Self {
            project_root: Utf8PathBuf::from("."),
            fixtures_dir: Utf8PathBuf::from(DEFAULT_FIXTURES_DIR),
            config_format: DEFAULT_CONFIG_FORMAT.to_string(),
            fail_fast: false,
        }
    }
}

impl PrepareSettings {
    /// Fixture path as shown to users, e.g. `tests/Fixtures/bookstore`.
    pub fn display_path(&self, fixture: &FixtureSpec) -> Utf8PathBuf {
        self.fixtures_dir.join(&fixture.directory)
    }

    pub fn fixture_dir(&self, fixture: &FixtureSpec) -> Utf8PathBuf {
        self.project_root.join(self.display_path(fixture))
    }

    /// `build/conf/<primary>-conf.<ext>`
    pub fn config_output_file(&self, primary_database: &str) -> Utf8PathBuf {
        Utf8Path::new(CONF_OUTPUT_DIR)
            .join(format!("{}-conf.{}", primary_database, self.config_format))
    }
}
