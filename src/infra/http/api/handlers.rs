use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use uuid::Uuid;

use crate::application::listings::Cached;
use crate::application::query::{ListingScope, RawParams};

use super::error::ApiError;
use super::models::*;
use super::state::ApiState;

pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

type PairsQuery = Result<Query<Vec<(String, String)>>, QueryRejection>;

pub async fn search_listings(
    State(state): State<ApiState>,
    query: PairsQuery,
) -> Result<Response, ApiError> {
    let raw = raw_params(query)?;
    let page = state.listings.search(&raw, ListingScope::Public).await?;
    Ok(cached_response(page))
}

pub async fn search_my_listings(
    State(state): State<ApiState>,
    query: PairsQuery,
) -> Result<Response, ApiError> {
    let raw = raw_params(query)?;
    let seller_id = raw
        .first("sellerId")
        .ok_or_else(|| ApiError::bad_request("sellerId is required", None))?;
    let seller_id = Uuid::parse_str(seller_id).map_err(|_| {
        ApiError::bad_request("sellerId is not a valid identifier", Some(seller_id.to_string()))
    })?;

    let page = state
        .listings
        .search(&raw, ListingScope::Seller(seller_id))
        .await?;
    Ok(cached_response(page))
}

pub async fn get_listing(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_listing_id(&id)?;
    let listing = state.listings.get_by_id(id).await?;
    Ok(cached_response(listing))
}

pub async fn similar_listings(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    query: Result<Query<SimilarQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let id = parse_listing_id(&id)?;
    let limit = query
        .ok()
        .and_then(|Query(query)| query.limit)
        .and_then(|value| value.trim().parse::<u32>().ok());

    let list = state.listings.similar(id, limit).await?;
    Ok(cached_response(list))
}

pub async fn create_listing(
    State(state): State<ApiState>,
    payload: Result<Json<ListingCreateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.map_err(json_rejection)?;
    let record = state
        .listings
        .create_listing(payload.seller_id, payload.listing)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(record))))
}

pub async fn update_listing(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    payload: Result<Json<ListingUpdateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_listing_id(&id)?;
    let Json(patch) = payload.map_err(json_rejection)?;
    let record = state.listings.update_listing(id, patch).await?;
    Ok(Json(ApiResponse::ok(record)))
}

pub async fn update_listing_status(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    payload: Result<Json<ListingStatusRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_listing_id(&id)?;
    let Json(payload) = payload.map_err(json_rejection)?;
    let record = state.listings.set_status(id, payload.status).await?;
    Ok(Json(ApiResponse::ok(record)))
}

pub async fn delete_listing(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_listing_id(&id)?;
    state.listings.delete_listing(id).await?;
    Ok(Json(ApiResponse::ok(DeletedListing { id, deleted: true })))
}

fn raw_params(query: PairsQuery) -> Result<RawParams, ApiError> {
    let Query(pairs) = query.map_err(|err| {
        ApiError::bad_request("Malformed query string", Some(err.body_text()))
    })?;
    Ok(RawParams::from_pairs(pairs))
}

fn parse_listing_id(value: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(value).map_err(|_| {
        ApiError::bad_request("Listing id is not a valid identifier", Some(value.to_string()))
    })
}

fn json_rejection(err: JsonRejection) -> ApiError {
    ApiError::bad_request("Malformed request body", Some(err.body_text()))
}

fn cached_response<T: Serialize>(cached: Cached<T>) -> Response {
    let mut response = Json(ApiResponse::ok(cached.value.as_ref())).into_response();
    if let Some(value) = cached.outcome.as_header() {
        response
            .headers_mut()
            .insert(X_CACHE, HeaderValue::from_static(value));
    }
    response
}
