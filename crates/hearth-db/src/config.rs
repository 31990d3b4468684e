//! Connection configuration.

/// Identifies the remote database instance to mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Hostname of the service endpoint (may be superseded at runtime by
    /// a host the service reports; see `Database::real_host`).
    pub host: String,
    /// Database namespace.
    pub database: String,
    /// Path the caller intends to observe.
    pub listen_path: String,
}

impl DatabaseConfig {
    pub fn new(
        host: impl Into<String>,
        database: impl Into<String>,
        listen_path: impl Into<String>,
    ) -> Self {
        DatabaseConfig {
            host: host.into(),
            database: database.into(),
            listen_path: listen_path.into(),
        }
    }

    /// The websocket URL for this configuration. The engine never dials;
    /// the caller hands this to its transport, and again after a redirect
    /// with the reported host substituted.
    pub fn connection_url(&self) -> String {
        format!("wss://{}/.ws?v=5&ns={}", self.host, self.database)
    }
}
