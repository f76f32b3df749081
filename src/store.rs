//! The session lifecycle: create, read with optional renewal, delete.

use std::fmt;
use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};

use crate::engine::{LocalEngine, StorageEngine};
use crate::{Config, Error, Id, Result, codec};

/// A handle to a session store.
///
/// The store owns one storage engine and the [`Config`] it was opened with.
/// Cloning is cheap and every clone shares the same engine, so a single store
/// can serve any number of concurrent requests.
///
/// Payloads are typed only at the call site: [`create`](Self::create) accepts
/// any `Serialize` value and [`get`](Self::get) decodes into whatever type the
/// caller asks for. Asking for a different type than the one stored fails
/// with [`Error::Decode`].
///
/// # Example
///
/// ```rust,no_run
/// use ttl_session::{Config, SessionStore};
///
/// # async fn run() -> ttl_session::Result<()> {
/// let store = SessionStore::open(Config::build().in_memory(true))?;
///
/// let id = store.create(&"hello").await?;
/// let value: String = store.get(&id).await?;
/// assert_eq!(value, "hello");
///
/// store.delete(&id).await?;
/// store.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct SessionStore<E: StorageEngine = LocalEngine> {
    engine: Arc<E>,
    config: Arc<Config>,
}

impl<E: StorageEngine> Clone for SessionStore<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            config: Arc::clone(&self.config),
        }
    }
}

impl<E: StorageEngine> fmt::Debug for SessionStore<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SessionStore<LocalEngine> {
    /// Opens the store described by `config`.
    ///
    /// With `in_memory` set the sessions live in process memory, otherwise in
    /// a database under `config.directory`, which is created if missing.
    #[tracing::instrument(name = "opening session store", skip(config), fields(in_memory = config.in_memory))]
    pub fn open(config: Config) -> Result<Self> {
        validate(&config)?;
        let engine = LocalEngine::open(&config).map_err(|err| {
            tracing::error!(err = %err, "failed to open session store");
            err
        })?;

        Ok(Self {
            engine: Arc::new(engine),
            config: Arc::new(config),
        })
    }
}

impl<E: StorageEngine> SessionStore<E> {
    /// Wraps an already opened storage engine.
    pub fn with_engine(engine: E, config: Config) -> Result<Self> {
        validate(&config)?;
        Ok(Self {
            engine: Arc::new(engine),
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Creates a new session holding `payload` and returns its id.
    ///
    /// The session expires `session_length` from now.
    #[tracing::instrument(name = "creating session", skip(self, payload))]
    pub async fn create<T>(&self, payload: &T) -> Result<Id>
    where
        T: Serialize + ?Sized,
    {
        let id = Id::generate();
        let bytes = codec::encode(payload).map_err(|err| {
            tracing::error!(err = %err, "failed to encode session payload");
            err
        })?;

        self.engine
            .put(&id.to_string(), bytes, self.config.session_length)
            .await
            .map_err(|err| {
                tracing::error!(err = %err, "failed to save session to store");
                err
            })?;

        Ok(id)
    }

    /// Retrieves the payload of session `id`.
    ///
    /// When `extend_sessions` is on, a successful read pushes the expiry to
    /// `session_length` from now. The lookup and the renewal are a single
    /// engine operation, so a session deleted concurrently stays deleted. A
    /// failed renewal is returned as an error.
    #[tracing::instrument(name = "getting session from store", skip(self, id))]
    pub async fn get<T>(&self, id: &Id) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let key = id.to_string();
        let lookup = if self.config.extend_sessions {
            self.engine
                .get_and_touch(&key, self.config.session_length)
                .await
        } else {
            self.engine.get(&key).await
        };

        let bytes = lookup
            .map_err(|err| {
                tracing::error!(err = %err, "failed to get session from store");
                err
            })?
            .ok_or_else(|| {
                tracing::debug!("session not found or expired");
                Error::NotFound
            })?;

        codec::decode(&bytes).map_err(|err| {
            tracing::warn!(err = %err, "failed to decode session payload");
            err
        })
    }

    /// Deletes session `id`. Deleting an unknown or expired session succeeds.
    #[tracing::instrument(name = "deleting session from store", skip(self, id))]
    pub async fn delete(&self, id: &Id) -> Result<()> {
        self.engine.delete(&id.to_string()).await.map_err(|err| {
            tracing::error!(err = %err, "failed to delete session from store");
            err
        })
    }

    /// Releases the storage engine.
    ///
    /// Every clone of this store is affected; later operations fail with
    /// [`Error::Closed`]. In-flight requests should be drained first.
    #[tracing::instrument(name = "closing session store", skip(self))]
    pub async fn close(&self) -> Result<()> {
        self.engine.close().await.map_err(|err| {
            tracing::error!(err = %err, "failed to close session store");
            err
        })
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.session_length.is_zero() {
        return Err(Error::Configuration(
            "session_length must be greater than zero".to_string(),
        ));
    }

    if config.cookie_name.is_empty() {
        return Err(Error::Configuration(
            "cookie_name must not be empty".to_string(),
        ));
    }

    Ok(())
}
