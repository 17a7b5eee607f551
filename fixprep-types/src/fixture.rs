use serde::{Deserialize, Deserializer, Serialize};

/// Fixtures directory, relative to the project root.
pub const DEFAULT_FIXTURES_DIR: &str = "tests/Fixtures";

/// A template shipped with a fixture and the config file it is materialized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistributionFileRule {
    pub source: &'static str,
    pub target: &'static str,
}

pub const DISTRIBUTION_FILES: [DistributionFileRule; 2] = [
    DistributionFileRule {
        source: "build.properties.dist",
        target: "build.properties",
    },
    DistributionFileRule {
        source: "runtime-conf.xml.dist",
        target: "runtime-conf.xml",
    },
];

/// One fixture directory and the logical databases it sets up.
///
/// `databases` accepts either a single string or a list when deserialized and
/// is always held as a list; the first entry is the primary database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureSpec {
    /// Directory relative to the fixtures directory, e.g. `reverse/mysql`.
    pub directory: String,

    #[serde(deserialize_with = "one_or_many")]
    pub databases: Vec<String>,

    /// Skip the SQL phase when the directory holds no schema file.
    ///
    /// When unset, directories whose path contains `reverse` get this behaviour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_sql_without_schema: Option<bool>,
}

impl FixtureSpec {
    pub fn new<I, S>(directory: impl Into<String>, databases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            directory: directory.into(),
            databases: databases.into_iter().map(Into::into).collect(),
            skip_sql_without_schema: None,
        }
    }

    pub fn primary_database(&self) -> Option<&str> {
        self.databases.first().map(String::as_str)
    }

    /// Whether the SQL phase is skipped when the directory holds no schema.
    ///
    /// Without an explicit flag this falls back to "reverse" appearing in
    /// `directory`. Only the fixture's own directory is matched, never the
    /// fixtures root, so a root such as `/srv/reverse-proxy/tests/Fixtures`
    /// does not turn every fixture into a reverse one.
    pub fn skips_sql_without_schema(&self) -> bool {
        self.skip_sql_without_schema
            .unwrap_or_else(|| self.directory.contains("reverse"))
    }
}

/// The fixture set prepared when no config file overrides it.
pub fn default_fixtures() -> Vec<FixtureSpec> {
    vec![
        FixtureSpec::new(
            "bookstore",
            ["bookstore", "bookstore-cms", "bookstore-behavior"],
        ),
        FixtureSpec::new("bookstore-packaged", ["bookstore-packaged", "bookstore-log"]),
        FixtureSpec::new("namespaced", ["bookstore_namespaced"]),
        FixtureSpec::new("reverse/mysql", ["reverse-bookstore"]),
        FixtureSpec::new("schemas", ["bookstore"]),
    ]
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(name) => vec![name],
        OneOrMany::Many(names) => names,
    })
}
