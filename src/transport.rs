//! Binds a [`SessionStore`] to an HTTP exchange through the session cookie.
//!
//! The request cookies and the outgoing `Set-Cookie` headers are both reached
//! through [`Cookies`], which `tower_cookies::CookieManagerLayer` installs in
//! the request extensions.

use cookie::time::{Duration, OffsetDateTime};
use serde::{Serialize, de::DeserializeOwned};
use tower_cookies::{Cookie, Cookies};

use crate::engine::StorageEngine;
use crate::{Error, Id, Result, SessionStore};

impl<E: StorageEngine> SessionStore<E> {
    /// Creates a session holding `payload` and sets the session cookie on the
    /// response.
    ///
    /// No cookie is written if the session could not be created.
    #[tracing::instrument(name = "creating session with cookie", skip(self, cookies, payload))]
    pub async fn create_with_cookie<T>(&self, cookies: &Cookies, payload: &T) -> Result<Id>
    where
        T: Serialize + ?Sized,
    {
        let id = self.create(payload).await?;
        cookies.add(self.session_cookie(id.to_string()));
        Ok(id)
    }

    /// Resolves the session named by the request cookie and refreshes the
    /// cookie's expiration on the response.
    ///
    /// The cookie is refreshed on every successful read, whether or not
    /// `extend_sessions` renewed the stored entry. Nothing is written on
    /// failure.
    #[tracing::instrument(name = "getting session with cookie", skip(self, cookies))]
    pub async fn get_with_cookie<T>(&self, cookies: &Cookies) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let id = self.session_id(cookies)?.ok_or(Error::NotFound)?;
        let payload = self.get(&id).await?;
        cookies.add(self.session_cookie(id.to_string()));
        Ok(payload)
    }

    /// Deletes the session named by the request cookie and tells the client
    /// to discard the cookie.
    #[tracing::instrument(name = "deleting session with cookie", skip(self, cookies))]
    pub async fn delete_with_cookie(&self, cookies: &Cookies) -> Result<()> {
        // A malformed id cannot name a stored session, so there is nothing
        // to delete, but the cookie is still cleared.
        if let Some(id) = self.session_id(cookies)? {
            self.delete(&id).await?;
        }

        cookies.add(self.removal_cookie());
        Ok(())
    }

    /// Reads the session id from the request cookie.
    ///
    /// Returns `Ok(None)` when the cookie is present but does not hold a
    /// well-formed id.
    fn session_id(&self, cookies: &Cookies) -> Result<Option<Id>> {
        let name = &self.config().cookie_name;
        let cookie = cookies.get(name).ok_or_else(|| {
            tracing::debug!(cookie = %name, "session cookie not found");
            Error::CookieNotFound(name.clone())
        })?;

        let id = cookie
            .value()
            .parse::<Id>()
            .map_err(|err| {
                tracing::warn!(
                    err = %err,
                    "possibly suspicious activity: malformed session id"
                )
            })
            .ok();

        Ok(id)
    }

    fn session_cookie(&self, value: String) -> Cookie<'static> {
        let length = Duration::try_from(self.config().session_length).unwrap_or(Duration::MAX);
        let expires = OffsetDateTime::now_utc().saturating_add(length);

        self.cookie_builder(value).expires(expires).build()
    }

    fn removal_cookie(&self) -> Cookie<'static> {
        self.cookie_builder(String::new())
            .max_age(Duration::ZERO)
            .expires(OffsetDateTime::UNIX_EPOCH)
            .build()
    }

    fn cookie_builder(&self, value: String) -> cookie::CookieBuilder<'static> {
        let config = self.config();
        let cookie_builder = Cookie::build((config.cookie_name.clone(), value))
            .path(config.cookie_path.clone())
            .http_only(config.cookie_http_only)
            .secure(config.cookie_secure)
            .same_site(config.cookie_same_site);

        if let Some(domain) = &config.cookie_domain {
            cookie_builder.domain(domain.clone())
        } else {
            cookie_builder
        }
    }
}
