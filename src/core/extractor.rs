use axum::{extract::FromRequestParts, http::request::Parts};

use crate::core::error::AppError;
use crate::shared::validation::validate_file_name;

/// Stored-file name taken from the request path (`/<name>`).
///
/// The path is percent-decoded and validated so the name always refers to an
/// entry directly inside the store root. Works on static routes too, so
/// `GET /upload` resolves to the stored file named `upload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileName(pub String);

impl<S> FromRequestParts<S> for FileName
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts.uri.path().strip_prefix('/').unwrap_or(parts.uri.path());

        let decoded = urlencoding::decode(raw)
            .map_err(|_| AppError::Validation("File name must be valid UTF-8".to_string()))?;

        validate_file_name(&decoded).map_err(AppError::Validation)?;

        Ok(Self(decoded.into_owned()))
    }
}
