use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};
use axum_extra::TypedHeader;
use headers::{Header, HeaderName, HeaderValue};
use tracing::debug;

use shared_models::error::AppError;

static X_USER_ID: HeaderName = HeaderName::from_static("x-user-id");

/// `X-User-ID` header carrying the numeric id of the calling user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XUserId(pub i64);

impl Header for XUserId {
    fn name() -> &'static HeaderName {
        &X_USER_ID
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(headers::Error::invalid)?;
        value
            .to_str()
            .ok()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .map(XUserId)
            .ok_or_else(headers::Error::invalid)
    }

    fn encode<E>(&self, values: &mut E)
    where
        E: Extend<HeaderValue>,
    {
        values.extend(std::iter::once(HeaderValue::from(self.0)));
    }
}

/// The caller identified by `X-User-ID`; rejects with 400 when missing or malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestUser(pub i64);

impl<S> FromRequestParts<S> for RequestUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(XUserId(id)) = TypedHeader::<XUserId>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                debug!("Rejected X-User-ID header: {}", e);
                AppError::BadRequest("Missing or invalid X-User-ID header".to_string())
            })?;

        Ok(RequestUser(id))
    }
}
