//! HTTP response mapping for authorization failures

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::{HeaderValue, header};

use crate::error::AuthFailure;

impl IntoResponse for AuthFailure {
    fn into_response(self) -> Response {
        let mut resp = (self.status(), Json(self.to_json())).into_response();

        if let Some(challenge) = self.www_authenticate()
            && let Ok(value) = HeaderValue::from_str(&challenge)
        {
            resp.headers_mut().insert(header::WWW_AUTHENTICATE, value);
        }

        resp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use http::StatusCode;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_unauthorized_response_has_challenge() {
        let resp = AuthFailure::from(AuthError::MissingHeader).into_response();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            resp.headers()[header::WWW_AUTHENTICATE],
            "Bearer error=\"unauthorized\", error_description=\"Authorization header is expected.\""
        );
        assert_eq!(
            body_json(resp).await,
            serde_json::json!({
                "success": false,
                "error": 401,
                "code": "unauthorized",
                "description": "Authorization header is expected.",
            })
        );
    }

    #[tokio::test]
    async fn test_forbidden_response() {
        let resp = AuthFailure::from(AuthError::Forbidden {
            required: "delete:drinks".into(),
        })
        .into_response();

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert!(resp.headers().get(header::WWW_AUTHENTICATE).is_none());
        let body = body_json(resp).await;
        assert_eq!(body["error"], 403);
        assert_eq!(body["code"], "forbidden");
    }
}
