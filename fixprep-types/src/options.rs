use std::fmt;

pub const DEFAULT_VENDOR: &str = "mysql";
pub const DEFAULT_DSN: &str = "mysql:host=127.0.0.1;dbname=test";
pub const DEFAULT_DB_USER: &str = "root";
pub const DEFAULT_DB_PASSWORD: &str = "";

/// Database settings substituted into templates and passed to collaborators.
#[derive(Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub vendor: String,
    pub dsn: String,
    pub user: String,
    pub password: String,
    pub verbose: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            vendor: DEFAULT_VENDOR.to_string(),
            dsn: DEFAULT_DSN.to_string(),
            user: DEFAULT_DB_USER.to_string(),
            password: DEFAULT_DB_PASSWORD.to_string(),
            verbose: false,
        }
    }
}

impl BuildOptions {
    /// Platform identifier: the vendor with its first letter uppercased, plus `Platform`.
    ///
    /// `mysql` becomes `MysqlPlatform`; the rest of the vendor name is left untouched.
    pub fn platform(&self) -> String {
        let mut chars = self.vendor.chars();
        match chars.next() {
            Some(first) => format!("{}{}Platform", first.to_uppercase(), chars.as_str()),
            None => "Platform".to_string(),
        }
    }

    /// `<database>=<dsn>;username=<user>;password=<password>`
    pub fn connection_descriptor(&self, database: &str) -> String {
        format!(
            "{}={};username={};password={}",
            database, self.dsn, self.user, self.password
        )
    }
}

impl fmt::Debug for BuildOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildOptions")
            .field("vendor", &self.vendor)
            .field("dsn", &self.dsn)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("verbose", &self.verbose)
            .finish()
    }
}
