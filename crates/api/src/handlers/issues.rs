//! Handlers for issues.
//!
//! Each handler hands the request to the store, which runs the transition
//! engine, and maps rejections to HTTP responses via [`AppError`].

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use issuetrack_core::issue::{IssuePatch, NewIssue};
use issuetrack_core::status::parse_status_filter;
use issuetrack_core::transition;
use issuetrack_core::types::DbId;
use issuetrack_db::models::issue::{CreateIssue, IssueListParams, UpdateIssue};

use crate::error::{AppError, AppResult};
use crate::response::{IssueListResponse, IssueResponse};
use crate::state::AppState;

/// Unwrap a JSON body, reporting decoding failures as `400 BAD_REQUEST`.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// Unwrap a path id, reporting non-integer ids as `400 BAD_REQUEST`.
fn path_id(path: Result<Path<DbId>, PathRejection>) -> AppResult<DbId> {
    path
        .map(|Path(id)| id)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

// ---------------------------------------------------------------------------
// POST /issue
// ---------------------------------------------------------------------------

/// Create an issue. It starts `IN_PROGRESS` when an owner is given.
pub async fn create_issue(
    State(state): State<AppState>,
    payload: Result<Json<CreateIssue>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let input: NewIssue = json_body(payload)?.into();

    let created = state.store.create_issue(input, state.clock.now()).await?;

    tracing::info!(
        issue_id = created.issue.id,
        status = %created.issue.status,
        owner_id = ?created.issue.owner_id,
        "Issue created",
    );

    Ok((StatusCode::CREATED, Json(IssueResponse::from(created))))
}

// ---------------------------------------------------------------------------
// GET /issue
// ---------------------------------------------------------------------------

/// List issues, optionally filtered by `?status=`.
pub async fn list_issues(
    State(state): State<AppState>,
    Query(params): Query<IssueListParams>,
) -> AppResult<impl IntoResponse> {
    let status = parse_status_filter(params.status.as_deref())?;

    let issues = state.store.list_issues(status).await?;

    Ok(Json(IssueListResponse {
        issues: issues.into_iter().map(IssueResponse::from).collect(),
    }))
}

// ---------------------------------------------------------------------------
// GET /issue/{id}
// ---------------------------------------------------------------------------

/// Get a single issue by ID.
pub async fn get_issue(
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let id = path_id(path)?;
    let issue = transition::found(id, state.store.find_issue(id).await?)?;
    Ok(Json(IssueResponse::from(issue)))
}

// ---------------------------------------------------------------------------
// PATCH /issue/{id}
// ---------------------------------------------------------------------------

/// Apply a partial update. Rejected patches leave the issue unchanged.
pub async fn update_issue(
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
    payload: Result<Json<UpdateIssue>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let id = path_id(path)?;
    let patch: IssuePatch = json_body(payload)?.into();

    let updated = match state.store.edit_issue(id, &patch, state.clock.now()).await {
        Ok(updated) => updated,
        Err(err) => {
            tracing::debug!(issue_id = id, error = %err, "Issue edit rejected");
            return Err(err.into());
        }
    };

    tracing::info!(
        issue_id = id,
        status = %updated.issue.status,
        owner_id = ?updated.issue.owner_id,
        "Issue updated",
    );

    Ok(Json(IssueResponse::from(updated)))
}
