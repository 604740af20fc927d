use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection, rejection::PathRejection},
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::validate_section_id;
use super::{ApiError, ApiResponse, AppState};
use crate::models::{Section, SectionInput};

/// GET /sections
pub async fn list_sections(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Section>>>, ApiError> {
    let sections = state.section_service().list().await?;
    Ok(Json(ApiResponse::success("Sections retrieved", sections)))
}

/// GET /sections/{id}
pub async fn get_section(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<ApiResponse<Section>>, ApiError> {
    let Path(id) = id?;
    let id = validate_section_id(id)?;

    let section = state.section_service().get(id).await?;
    Ok(Json(ApiResponse::success("Section retrieved", section)))
}

/// POST /sections
pub async fn create_section(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SectionInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Section>>), ApiError> {
    let Json(input) = payload?;

    let section = state.section_service().create(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_status(
            StatusCode::CREATED,
            "Section created",
            section,
        )),
    ))
}

/// PUT /sections/{id}
pub async fn update_section(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<SectionInput>, JsonRejection>,
) -> Result<Json<ApiResponse<Section>>, ApiError> {
    let Path(id) = id?;
    let id = validate_section_id(id)?;
    let Json(input) = payload?;

    let section = state.section_service().update(id, input).await?;
    Ok(Json(ApiResponse::success("Section updated", section)))
}

/// DELETE /sections/{id}
pub async fn delete_section(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let Path(id) = id?;
    let id = validate_section_id(id)?;

    state.section_service().delete(id).await?;

    Ok(Json(ApiResponse::message(StatusCode::OK, "Section deleted")))
}
