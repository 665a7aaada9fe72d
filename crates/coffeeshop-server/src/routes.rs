//! Drink routes
//!
//! | Route                 | Permission          |
//! |-----------------------|---------------------|
//! | `GET /drinks`         | public              |
//! | `GET /drinks-detail`  | `get:drinks-detail` |
//! | `POST /drinks`        | `post:drinks`       |
//! | `PATCH /drinks/{id}`  | `patch:drinks`      |
//! | `DELETE /drinks/{id}` | `delete:drinks`     |
//!
//! Protected handlers call the gate first and only read the request body
//! once the caller is authorized.

use axum::body::{Body, to_bytes};
use axum::extract::{Path, Request, State};
use axum::routing::{get, patch};
use axum::{Json, Router};
use coffeeshop_auth::DecodedPayload;
use http::HeaderMap;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::model::DrinkPayload;
use crate::state::AppState;

/// Largest request body accepted
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/drinks", get(list_drinks).post(create_drink))
        .route("/drinks-detail", get(list_drinks_detail))
        .route("/drinks/{id}", patch(update_drink).delete(delete_drink))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn authorize(
    state: &AppState,
    permission: &str,
    headers: &HeaderMap,
) -> ApiResult<DecodedPayload> {
    Ok(state.gate.authorize(permission, headers).await?)
}

async fn read_payload(body: Body) -> ApiResult<DrinkPayload> {
    let bytes = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| ApiError::BadRequest(format!("unreadable body: {e}")))?;
    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::BadRequest(format!("invalid JSON: {e}")))?;
    serde_json::from_value(value).map_err(|e| ApiError::Unprocessable(e.to_string()))
}

fn parse_id(raw: &str) -> ApiResult<u64> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

async fn list_drinks(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let drinks = state.store.list().await?;
    if drinks.is_empty() {
        return Err(ApiError::NotFound);
    }
    let drinks: Vec<_> = drinks.iter().map(|drink| drink.short()).collect();
    Ok(Json(json!({ "success": true, "drinks": drinks })))
}

async fn list_drinks_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    authorize(&state, "get:drinks-detail", &headers).await?;

    let drinks = state.store.list().await?;
    if drinks.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(json!({ "success": true, "drinks": drinks })))
}

async fn create_drink(State(state): State<AppState>, request: Request) -> ApiResult<Json<Value>> {
    let (parts, body) = request.into_parts();
    let payload = authorize(&state, "post:drinks", &parts.headers).await?;

    let new_drink = read_payload(body)
        .await?
        .into_new_drink()
        .ok_or_else(|| ApiError::Unprocessable("title and recipe are required".into()))?;

    let drink = state.store.insert(new_drink).await?;
    info!(id = drink.id, title = %drink.title, subject = ?payload.subject(), "Drink created");
    Ok(Json(json!({ "success": true, "drinks": [drink] })))
}

async fn update_drink(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Request,
) -> ApiResult<Json<Value>> {
    let (parts, body) = request.into_parts();
    let payload = authorize(&state, "patch:drinks", &parts.headers).await?;

    let id = parse_id(&id)?;
    state.store.get(id).await?;
    let update = read_payload(body)
        .await?
        .into_update()
        .ok_or_else(|| ApiError::Unprocessable("title must not be blank".into()))?;

    let drink = state.store.update(id, update).await?;
    info!(id, subject = ?payload.subject(), "Drink updated");
    Ok(Json(json!({ "success": true, "drinks": [drink] })))
}

async fn delete_drink(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let payload = authorize(&state, "delete:drinks", &headers).await?;

    let id = state.store.delete(parse_id(&id)?).await?;
    info!(id, subject = ?payload.subject(), "Drink deleted");
    Ok(Json(json!({ "success": true, "delete": id })))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryDrinkStore;
    use coffeeshop_auth::test_utils::{test_config, test_key_set};
    use coffeeshop_auth::{AuthGate, TokenVerifier};
    use http::{Method, Request as HttpRequest, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(store: InMemoryDrinkStore) -> Router {
        let gate = AuthGate::new(
            TokenVerifier::new(Arc::new(test_config())),
            Arc::new(test_key_set()),
        );
        router(AppState::new(gate, Arc::new(store)))
    }

    async fn send(app: Router, method: Method, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(
                HttpRequest::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_public_listing_uses_short_form() {
        let (status, body) = send(app(InMemoryDrinkStore::seeded()), Method::GET, "/drinks").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "success": true,
                "drinks": [{ "id": 1, "title": "water", "recipe": [{ "color": "blue", "parts": 1 }] }]
            })
        );
    }

    #[tokio::test]
    async fn test_empty_catalog_is_not_found() {
        let (status, body) = send(app(InMemoryDrinkStore::new()), Method::GET, "/drinks").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "resource not found");
    }

    #[tokio::test]
    async fn test_unknown_route_and_method() {
        let (status, _) = send(app(InMemoryDrinkStore::seeded()), Method::GET, "/teas").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(app(InMemoryDrinkStore::seeded()), Method::PUT, "/drinks").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            body,
            json!({ "success": false, "error": 405, "message": "method not allowed" })
        );
    }

    #[tokio::test]
    async fn test_protected_route_without_token() {
        let (status, body) =
            send(app(InMemoryDrinkStore::seeded()), Method::GET, "/drinks-detail").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "unauthorized");
        assert_eq!(body["description"], "Authorization header is expected.");
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(parse_id("abc"), Err(ApiError::NotFound)));
        assert!(matches!(parse_id("-1"), Err(ApiError::NotFound)));
    }
}
