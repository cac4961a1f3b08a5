use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::{AppError, ServiceError};

/// Header carrying the caller-chosen administrator identity.
pub const ADMIN_ID_HEADER: &str = "x-admin-id";

/// Administrator identity extracted from the `X-Admin-Id` header.
///
/// The id is an opaque UUID chosen by the client; there is no account store
/// behind it. It scopes ownership: quizzes created under one id can only be
/// managed under that same id.
#[derive(Debug, Clone, Copy)]
pub struct AdminIdentity(pub Uuid);

impl<S> FromRequestParts<S> for AdminIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(ADMIN_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<Uuid>().ok())
            .map(AdminIdentity)
            .ok_or_else(|| AppError::from(ServiceError::Unauthenticated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<AdminIdentity, AppError> {
        let (mut parts, ()) = request.into_parts();
        AdminIdentity::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn valid_header_is_accepted() {
        let id = Uuid::new_v4();
        let request = Request::builder()
            .header("X-Admin-Id", id.to_string())
            .body(())
            .unwrap();
        let identity = extract(request).await.unwrap();
        assert_eq!(identity.0, id);
    }

    #[tokio::test]
    async fn missing_or_malformed_header_is_rejected() {
        let request = Request::builder().body(()).unwrap();
        assert!(matches!(
            extract(request).await,
            Err(AppError::Unauthorized(_))
        ));

        let request = Request::builder()
            .header("X-Admin-Id", "not-a-uuid")
            .body(())
            .unwrap();
        assert!(matches!(
            extract(request).await,
            Err(AppError::Unauthorized(_))
        ));
    }
}
