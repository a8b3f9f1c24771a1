// src/handlers/product.rs
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use tracing::instrument;

use crate::dtos::product::{CreateProductRequest, ProductResponse, UpdateProductRequest};
use crate::error::AppError;
use crate::services::product::ProductError;
use crate::state::AppState;

fn malformed(rejection: impl std::fmt::Display) -> AppError {
    ProductError::MalformedInput(rejection.to_string()).into()
}

fn product_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    path.map(|Path(id)| id).map_err(malformed)
}

// GET /v1/products - List all products
#[instrument(skip(state))]
pub async fn get_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let products = state.products.list().await?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

// GET /v1/product/{id} - Get single product
#[instrument(skip(state))]
pub async fn get_product(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<ProductResponse>, AppError> {
    let id = product_id(path)?;
    let product = state.products.get(id).await?;

    Ok(Json(ProductResponse::from(product)))
}

// POST /v1/product - Create new product; 201 is reported as a plain 200 with no body
#[instrument(skip(state, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(payload) = payload.map_err(malformed)?;
    state.products.create(payload.into()).await?;

    Ok(StatusCode::OK)
}

// PUT /v1/product/{id} - Partially update product
#[instrument(skip(state, payload))]
pub async fn update_product(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
    payload: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let id = product_id(path)?;
    let Json(payload) = payload.map_err(malformed)?;
    state.products.update(id, payload.into()).await?;

    Ok(StatusCode::OK)
}

// DELETE /v1/product/{id} - Delete product
#[instrument(skip(state))]
pub async fn delete_product(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let id = product_id(path)?;
    state.products.delete(id).await?;

    Ok(StatusCode::OK)
}
