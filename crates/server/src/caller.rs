//! Extractor resolving who a request acts for.

use std::convert::Infallible;

use api_types::query::EmailQuery;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};

use crate::Identity;

/// The owner email a request is scoped to, if any.
///
/// A verified token identity always wins over the `email` query parameter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Caller {
    pub email: Option<String>,
}

impl Caller {
    pub fn owner(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Owner for a write carrying its own `userEmail`, used only when nothing
    /// better identifies the caller.
    pub fn owner_or<'a>(&'a self, fallback: Option<&'a str>) -> Option<&'a str> {
        self.owner().or(fallback)
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(Caller {
                email: Some(identity.email.clone()),
            });
        }

        let query = Query::<EmailQuery>::try_from_uri(&parts.uri)
            .map(|Query(query)| query)
            .unwrap_or_default();
        Ok(Caller {
            email: query.email.filter(|email| !email.trim().is_empty()),
        })
    }
}
