use std::path::{Path, PathBuf};
use std::time::Duration;

use cookie::SameSite;

/// Configuration for a [`SessionStore`](crate::SessionStore).
///
/// Every option has a default and can be overridden independently with the
/// chained setters.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use ttl_session::Config;
/// use ttl_session::cookie::SameSite;
///
/// let config = Config::build()
///     .in_memory(true)
///     .session_length(Duration::from_secs(30 * 60))
///     .extend_sessions(false)
///     .cookie_name("sid")
///     .cookie_same_site(SameSite::Lax)
///     .context_name("user");
/// ```
#[derive(Clone, Debug)]
pub struct Config {
    pub directory: PathBuf,
    pub in_memory: bool,
    /// Added to the current time to compute the expiry on creation and on
    /// every renewal.
    pub session_length: Duration,
    /// Slide the expiry forward on every successful read.
    pub extend_sessions: bool,
    pub cookie_name: String,
    pub cookie_path: String,
    pub cookie_domain: Option<String>,
    pub cookie_http_only: bool,
    pub cookie_secure: bool,
    pub cookie_same_site: SameSite,
    /// Key of the payload inside the request's
    /// [`SessionContext`](crate::SessionContext).
    pub context_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./session_data"),
            in_memory: false,
            session_length: Duration::from_secs(60 * 60),
            extend_sessions: true,
            cookie_name: "session".to_string(),
            cookie_path: "/".to_string(),
            cookie_domain: None,
            cookie_http_only: true,
            cookie_secure: true,
            cookie_same_site: SameSite::Strict,
            context_name: "session".to_string(),
        }
    }
}

impl Config {
    /// Creates a new `Config` with default values.
    pub fn build() -> Self {
        Self::default()
    }

    /// Sets the directory holding the persistent session database.
    pub fn directory(mut self, directory: impl AsRef<Path>) -> Self {
        self.directory = directory.as_ref().to_path_buf();
        self
    }

    /// Keeps sessions in memory only; nothing survives a restart.
    pub fn in_memory(mut self, in_memory: bool) -> Self {
        self.in_memory = in_memory;
        self
    }

    pub fn session_length(mut self, session_length: Duration) -> Self {
        self.session_length = session_length;
        self
    }

    pub fn extend_sessions(mut self, extend_sessions: bool) -> Self {
        self.extend_sessions = extend_sessions;
        self
    }

    pub fn cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn cookie_path(mut self, path: impl Into<String>) -> Self {
        self.cookie_path = path.into();
        self
    }

    pub fn cookie_domain(mut self, domain: impl Into<String>) -> Self {
        self.cookie_domain = Some(domain.into());
        self
    }

    pub fn cookie_http_only(mut self, http_only: bool) -> Self {
        self.cookie_http_only = http_only;
        self
    }

    pub fn cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    pub fn cookie_same_site(mut self, same_site: SameSite) -> Self {
        self.cookie_same_site = same_site;
        self
    }

    pub fn context_name(mut self, name: impl Into<String>) -> Self {
        self.context_name = name.into();
        self
    }
}
