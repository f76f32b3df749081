use std::result;

/// Errors returned by the session store and its cookie adapter.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The session id is absent from the store or its TTL has elapsed.
    #[error("session not found")]
    NotFound,

    /// The request did not carry the session cookie.
    #[error("session cookie `{0}` not found in the request")]
    CookieNotFound(String),

    /// The payload could not be serialized.
    #[error("Encoding failed with: {0}")]
    Encode(String),

    /// The stored bytes could not be deserialized into the requested type.
    #[error("Decoding failed with: {0}")]
    Decode(String),

    /// The storage engine failed to read, write or delete an entry.
    #[error("storage engine error: {0}")]
    Storage(String),

    /// The store could not be opened with the given configuration.
    #[error("invalid session store configuration: {0}")]
    Configuration(String),

    /// The store was closed with [`SessionStore::close`](crate::SessionStore::close).
    #[error("the session store has been closed")]
    Closed,
}

impl Error {
    /// Returns `true` when the lookup failed because there is no usable
    /// session, either because the cookie is missing or the id is unknown.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound | Error::CookieNotFound(_))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Storage(err.to_string())
    }
}

#[cfg(feature = "redis-store")]
impl From<fred::error::Error> for Error {
    fn from(err: fred::error::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

pub type Result<T> = result::Result<T, Error>;
