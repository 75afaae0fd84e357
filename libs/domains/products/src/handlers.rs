//! HTTP handlers for the Products API

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse, UnauthorizedResponse,
    },
    extractors::Identity,
};
use database::QueryOptions;
use mongodb::bson::Document;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::error::ProductResult;
use crate::models::{CreateProduct, Product, ProductStats, ProductWithCategory, UpdateProduct};
use crate::service::ProductService;

/// OpenAPI documentation for the Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        get_product,
        update_product,
        delete_product,
        product_stats,
    ),
    components(
        schemas(
            Product, ProductWithCategory, CreateProduct, UpdateProduct,
            ProductStats, ProductPage, Pagination
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Ownership-scoped product management")
    )
)]
pub struct ApiDoc;

/// Create the products router with all HTTP endpoints
pub fn router(service: ProductService) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/stats", get(product_stats))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .with_state(shared_service)
}

/// Sort direction for listings
#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Query parameters for listing products
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListProductsQuery {
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page (1-100)
    #[serde(default = "default_limit")]
    pub limit: u64,
    /// Field to sort by
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    /// Sort direction
    #[serde(default)]
    pub sort_order: SortOrder,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    10
}

fn default_sort_by() -> String {
    "created_at".to_string()
}

/// Pagination metadata for list responses
#[derive(Debug, Serialize, ToSchema)]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub items_per_page: u64,
}

/// A page of products with pagination metadata
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductPage {
    pub products: Vec<ProductWithCategory>,
    pub pagination: Pagination,
}

/// List the caller's products, paginated and sorted
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    params(ListProductsQuery),
    responses(
        (status = 200, description = "Page of products with expanded categories", body = ProductPage),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products(
    State(service): State<Arc<ProductService>>,
    Identity(owner_id): Identity,
    Query(query): Query<ListProductsQuery>,
) -> ProductResult<Json<ProductPage>> {
    let page = query.page.max(1);
    let limit = query.limit.clamp(1, 100);

    let direction = match query.sort_order {
        SortOrder::Asc => 1,
        SortOrder::Desc => -1,
    };
    let mut sort = Document::new();
    sort.insert(query.sort_by.as_str(), direction);

    let options = QueryOptions::new()
        .sort(sort)
        .skip((page - 1) * limit)
        .limit(limit as i64);

    let products = service.list_by_owner(owner_id, options).await?;
    let total_items = service.count_by_owner(owner_id).await?;

    Ok(Json(ProductPage {
        products,
        pagination: Pagination {
            current_page: page,
            total_pages: total_items.div_ceil(limit),
            total_items,
            items_per_page: limit,
        },
    }))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created successfully", body = ProductWithCategory),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product(
    State(service): State<Arc<ProductService>>,
    Identity(owner_id): Identity,
    Json(input): Json<CreateProduct>,
) -> ProductResult<impl IntoResponse> {
    let product = service.create(input, owner_id).await?;
    let product = service
        .get_by_owner(&product.id.to_string(), owner_id)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Get one of the caller's products
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product with expanded category", body = ProductWithCategory),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product(
    State(service): State<Arc<ProductService>>,
    Identity(owner_id): Identity,
    Path(id): Path<String>,
) -> ProductResult<Json<ProductWithCategory>> {
    let product = service.get_by_owner(&id, owner_id).await?;
    Ok(Json(product))
}

/// Partially update one of the caller's products
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Updated product with expanded category", body = ProductWithCategory),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product(
    State(service): State<Arc<ProductService>>,
    Identity(owner_id): Identity,
    Path(id): Path<String>,
    Json(patch): Json<UpdateProduct>,
) -> ProductResult<Json<ProductWithCategory>> {
    let product = service.update(&id, patch, owner_id).await?;
    let product = service
        .get_by_owner(&product.id.to_string(), owner_id)
        .await?;
    Ok(Json(product))
}

/// Delete one of the caller's products
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Removed product", body = Product),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product(
    State(service): State<Arc<ProductService>>,
    Identity(owner_id): Identity,
    Path(id): Path<String>,
) -> ProductResult<Json<Product>> {
    let product = service.delete(&id, owner_id).await?;
    Ok(Json(product))
}

/// Statistics over the caller's products
#[utoipa::path(
    get,
    path = "/stats",
    tag = "Products",
    responses(
        (status = 200, description = "Aggregate product statistics", body = ProductStats),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn product_stats(
    State(service): State<Arc<ProductService>>,
    Identity(owner_id): Identity,
) -> ProductResult<Json<ProductStats>> {
    let stats = service.statistics(owner_id).await?;
    Ok(Json(stats))
}
