//! Catalog HTTP routes.
//!
//! Read endpoints:
//! - `GET    /categories`                  list categories
//! - `GET    /categories/{id}`             one category
//! - `GET    /categories/{id}/products`    products of one category
//! - `GET    /products`                    search (`cat`, `minPrice`, `maxPrice`, `subCategory`)
//! - `GET    /products/{id}`               one product
//!
//! Admin endpoints (bearer token):
//! - `POST   /categories`, `PUT /categories/{id}`, `DELETE /categories/{id}`
//! - `POST   /products`,   `PUT /products/{id}`,   `DELETE /products/{id}`

use std::fmt::Display;
use std::str::FromStr;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use shopfront_core::domain::category::{Category, CategoryDraft, CategoryId};
use shopfront_core::domain::product::{Product, ProductDraft, ProductId};
use shopfront_core::errors::{ApplicationError, InterfaceError};
use shopfront_core::filter::ProductFilter;
use tower_http::cors::CorsLayer;
use tracing::{error, warn};
use uuid::Uuid;

use crate::auth::{require_admin, AuthError};
use crate::catalog::CatalogService;

#[derive(Clone)]
pub struct CatalogState {
    service: CatalogService,
    admin_token: Option<SecretString>,
}

impl CatalogState {
    pub fn new(service: CatalogService, admin_token: Option<SecretString>) -> Self {
        Self { service, admin_token }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    #[serde(rename = "correlationId")]
    pub correlation_id: String,
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

/// Raw search parameters. Numeric values are parsed after extraction so a
/// blank `cat=` or `minPrice=` counts as not supplied.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub cat: Option<String>,
    #[serde(rename = "minPrice")]
    pub min_price: Option<String>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<String>,
    #[serde(rename = "subCategory")]
    pub sub_category: Option<String>,
}

impl TryFrom<SearchQuery> for ProductFilter {
    type Error = String;

    fn try_from(query: SearchQuery) -> Result<Self, Self::Error> {
        Ok(ProductFilter::from_raw(
            parse_param("cat", query.cat)?,
            parse_param("minPrice", query.min_price)?,
            parse_param("maxPrice", query.max_price)?,
            query.sub_category,
        ))
    }
}

fn parse_param<T>(name: &str, raw: Option<String>) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: Display,
{
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|error| format!("invalid `{name}` value `{value}`: {error}")),
    }
}

pub fn router(state: CatalogState) -> Router {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/categories/{id}/products", get(category_products))
        .route("/products", get(search_products).post(create_product))
        .route("/products/{id}", get(get_product).put(update_product).delete(delete_product))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

fn new_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

fn app_error(operation: &'static str, cause: ApplicationError) -> (StatusCode, Json<ApiError>) {
    let interface = cause.into_interface(new_correlation_id());
    let status = match &interface {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
        InterfaceError::Conflict { .. } => StatusCode::CONFLICT,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!(
            event_name = "http.catalog.error",
            correlation_id = %interface.correlation_id(),
            operation,
            status = status.as_u16(),
            error = %interface.message(),
            "catalog request failed"
        );
    } else {
        warn!(
            event_name = "http.catalog.rejected",
            correlation_id = %interface.correlation_id(),
            operation,
            status = status.as_u16(),
            error = %interface.message(),
            "catalog request rejected"
        );
    }

    // Validation and lookup messages name only the caller's own input.
    let message = match &interface {
        InterfaceError::BadRequest { message, .. } | InterfaceError::NotFound { message, .. } => {
            message.clone()
        }
        other => other.user_message().to_string(),
    };

    (status, Json(ApiError { error: message, correlation_id: interface.correlation_id().to_string() }))
}

fn bad_request(operation: &'static str, detail: String) -> (StatusCode, Json<ApiError>) {
    let correlation_id = new_correlation_id();
    warn!(
        event_name = "http.catalog.bad_request",
        correlation_id = %correlation_id,
        operation,
        error = %detail,
        "malformed catalog request"
    );
    (StatusCode::BAD_REQUEST, Json(ApiError { error: detail, correlation_id }))
}

fn authorize(state: &CatalogState, headers: &HeaderMap, operation: &'static str) -> ApiResult<()> {
    require_admin(headers, state.admin_token.as_ref()).map_err(|cause| {
        let correlation_id = new_correlation_id();
        let status = match cause {
            AuthError::MissingCredentials => StatusCode::UNAUTHORIZED,
            AuthError::AdminDisabled | AuthError::InvalidToken => StatusCode::FORBIDDEN,
        };
        warn!(
            event_name = "http.catalog.unauthorized",
            correlation_id = %correlation_id,
            operation,
            status = status.as_u16(),
            error = %cause,
            "admin request refused"
        );
        (status, Json(ApiError { error: cause.to_string(), correlation_id }))
    })
}

// ---------------------------------------------------------------------------
// Category handlers
// ---------------------------------------------------------------------------

async fn list_categories(State(state): State<CatalogState>) -> ApiResult<Json<Vec<Category>>> {
    let categories =
        state.service.list_categories().await.map_err(|e| app_error("list_categories", e))?;
    Ok(Json(categories))
}

async fn get_category(
    Path(id): Path<i64>,
    State(state): State<CatalogState>,
) -> ApiResult<Json<Category>> {
    let category =
        state.service.category(CategoryId(id)).await.map_err(|e| app_error("get_category", e))?;
    Ok(Json(category))
}

async fn category_products(
    Path(id): Path<i64>,
    State(state): State<CatalogState>,
) -> ApiResult<Json<Vec<Product>>> {
    let products = state
        .service
        .products_in_category(CategoryId(id))
        .await
        .map_err(|e| app_error("category_products", e))?;
    Ok(Json(products))
}

async fn create_category(
    State(state): State<CatalogState>,
    headers: HeaderMap,
    body: Result<Json<CategoryDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    authorize(&state, &headers, "create_category")?;
    let Json(draft) = body.map_err(|e| bad_request("create_category", e.body_text()))?;
    let category =
        state.service.create_category(draft).await.map_err(|e| app_error("create_category", e))?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    Path(id): Path<i64>,
    State(state): State<CatalogState>,
    headers: HeaderMap,
    body: Result<Json<CategoryDraft>, JsonRejection>,
) -> ApiResult<StatusCode> {
    authorize(&state, &headers, "update_category")?;
    let Json(draft) = body.map_err(|e| bad_request("update_category", e.body_text()))?;
    state
        .service
        .update_category(CategoryId(id), draft)
        .await
        .map_err(|e| app_error("update_category", e))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_category(
    Path(id): Path<i64>,
    State(state): State<CatalogState>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    authorize(&state, &headers, "delete_category")?;
    state
        .service
        .delete_category(CategoryId(id))
        .await
        .map_err(|e| app_error("delete_category", e))?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Product handlers
// ---------------------------------------------------------------------------

async fn search_products(
    State(state): State<CatalogState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Product>>> {
    let Query(query) = query.map_err(|e| bad_request("search_products", e.body_text()))?;
    let filter =
        ProductFilter::try_from(query).map_err(|detail| bad_request("search_products", detail))?;
    let products =
        state.service.search(&filter).await.map_err(|e| app_error("search_products", e))?;
    Ok(Json(products))
}

async fn get_product(
    Path(id): Path<i64>,
    State(state): State<CatalogState>,
) -> ApiResult<Json<Product>> {
    let product =
        state.service.product(ProductId(id)).await.map_err(|e| app_error("get_product", e))?;
    Ok(Json(product))
}

async fn create_product(
    State(state): State<CatalogState>,
    headers: HeaderMap,
    body: Result<Json<ProductDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    authorize(&state, &headers, "create_product")?;
    let Json(draft) = body.map_err(|e| bad_request("create_product", e.body_text()))?;
    let product =
        state.service.create_product(draft).await.map_err(|e| app_error("create_product", e))?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    Path(id): Path<i64>,
    State(state): State<CatalogState>,
    headers: HeaderMap,
    body: Result<Json<ProductDraft>, JsonRejection>,
) -> ApiResult<StatusCode> {
    authorize(&state, &headers, "update_product")?;
    let Json(draft) = body.map_err(|e| bad_request("update_product", e.body_text()))?;
    state
        .service
        .update_product(ProductId(id), draft)
        .await
        .map_err(|e| app_error("update_product", e))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_product(
    Path(id): Path<i64>,
    State(state): State<CatalogState>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    authorize(&state, &headers, "delete_product")?;
    state
        .service
        .delete_product(ProductId(id))
        .await
        .map_err(|e| app_error("delete_product", e))?;
    Ok(StatusCode::NO_CONTENT)
}
