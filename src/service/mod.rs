//! Session middleware for tower applications.
//!
//! This module provides [`SessionLayer`], which resolves the session cookie
//! before the inner service runs and exposes the payload through
//! [`SessionContext`].

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

use http::Request;
use serde::de::DeserializeOwned;
use tower::{Layer, Service};
use tower_cookies::Cookies;

use crate::engine::{LocalEngine, StorageEngine};
use crate::{SessionContext, SessionStore};

/// A Tower middleware that injects the session payload of type `T` into the
/// request.
///
/// Session resolution fails open: a missing cookie, an expired session or a
/// payload of another type leaves the request untouched and the inner service
/// is called as usual.
pub struct SessionService<S, T, E: StorageEngine = LocalEngine> {
    inner: S,
    store: SessionStore<E>,
    _payload: PhantomData<fn() -> T>,
}

impl<S, T, E> SessionService<S, T, E>
where
    E: StorageEngine,
{
    fn new(inner: S, store: SessionStore<E>) -> Self {
        Self {
            inner,
            store,
            _payload: PhantomData,
        }
    }
}

impl<S: Clone, T, E: StorageEngine> Clone for SessionService<S, T, E> {
    fn clone(&self) -> Self {
        Self::new(self.inner.clone(), self.store.clone())
    }
}

impl<S: fmt::Debug, T, E: StorageEngine> fmt::Debug for SessionService<S, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionService")
            .field("inner", &self.inner)
            .field("store", &self.store)
            .finish()
    }
}

impl<ReqBody, S, T, E> Service<Request<ReqBody>> for SessionService<S, T, E>
where
    S: Service<Request<ReqBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
    T: DeserializeOwned + Send + Sync + 'static,
    E: StorageEngine,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    #[inline]
    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        // The clone may not be ready; keep the instance that was polled.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let store = self.store.clone();

        Box::pin(async move {
            let cookies = req.extensions().get::<Cookies>().cloned();
            match cookies {
                Some(cookies) => match store.get_with_cookie::<T>(&cookies).await {
                    Ok(payload) => {
                        let mut context = req
                            .extensions_mut()
                            .remove::<SessionContext>()
                            .unwrap_or_default();
                        context.insert(store.config().context_name.clone(), payload);
                        req.extensions_mut().insert(context);
                    }
                    Err(err) => {
                        tracing::debug!(err = %err, "no session resolved, passing request through");
                    }
                },
                None => {
                    tracing::warn!(
                        "cookies not found in the request extensions; is CookieManagerLayer applied?"
                    );
                }
            }

            inner.call(req).await
        })
    }
}

/// Layer to apply [`SessionService`] middleware.
///
/// `T` is the payload type the sessions were created with. The layer must be
/// wrapped by `tower_cookies::CookieManagerLayer`, i.e. added *before* it on
/// an axum `Router`.
///
/// # Example
///
/// ```rust,no_run
/// use axum::{Router, routing::get};
/// use ttl_session::{Config, SessionContext, SessionLayer, SessionStore};
/// use tower_cookies::CookieManagerLayer;
///
/// # fn app() -> ttl_session::Result<Router> {
/// let store = SessionStore::open(Config::build().context_name("user"))?;
///
/// let app = Router::new()
///     .route("/", get(|context: SessionContext| async move {
///         context
///             .get::<String>("user")
///             .cloned()
///             .unwrap_or_else(|| "anonymous".to_string())
///     }))
///     .layer(SessionLayer::<String>::new(store))
///     .layer(CookieManagerLayer::new());
/// # Ok(app)
/// # }
/// ```
pub struct SessionLayer<T, E: StorageEngine = LocalEngine> {
    store: SessionStore<E>,
    _payload: PhantomData<fn() -> T>,
}

impl<T, E> SessionLayer<T, E>
where
    E: StorageEngine,
{
    /// Create a new session layer backed by `store`.
    pub fn new(store: SessionStore<E>) -> Self {
        Self {
            store,
            _payload: PhantomData,
        }
    }
}

impl<T, E: StorageEngine> Clone for SessionLayer<T, E> {
    fn clone(&self) -> Self {
        Self::new(self.store.clone())
    }
}

impl<T, E: StorageEngine> fmt::Debug for SessionLayer<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionLayer")
            .field("store", &self.store)
            .finish()
    }
}

impl<S, T, E> Layer<S> for SessionLayer<T, E>
where
    E: StorageEngine,
{
    type Service = SessionService<S, T, E>;

    fn layer(&self, inner: S) -> Self::Service {
        SessionService::new(inner, self.store.clone())
    }
}
