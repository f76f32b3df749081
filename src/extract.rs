use std::convert::Infallible;

use axum_core::extract::FromRequestParts;
use http::request::Parts;

use crate::SessionContext;

/// Axum extractor for [`SessionContext`].
///
/// Never rejects: a request that did not pass through a
/// [`SessionLayer`](crate::SessionLayer), or whose session could not be
/// resolved, yields an empty context.
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<SessionContext>()
            .cloned()
            .unwrap_or_default())
    }
}
