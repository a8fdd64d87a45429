// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Microtask Platform

//! Submission endpoints.
//!
//! Approval pays the worker and consumes a task slot; rejection reopens
//! the slot. Both transitions require the submission to still be pending
//! and run under the ledger lock, so a submission can never pay twice.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    auth::Auth,
    error::ApiError,
    state::AppState,
    storage::{
        AccountRepository, NotificationRepository, StorageError, StoredNotification,
        StoredSubmission, SubmissionRepository, SubmissionStatus, TaskRepository,
    },
};

/// Request body for POST /submissions.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateSubmissionRequest {
    pub task_id: String,
    pub details: String,
}

/// Query parameters for GET /submissions.
#[derive(Debug, Deserialize, IntoParams)]
pub struct SubmissionListQuery {
    /// Email to filter by
    pub email: String,
    /// `worker` (default) or `buyer`
    #[serde(default, rename = "type")]
    pub side: Option<String>,
}

/// Query parameters for the paginated my-submissions listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// Zero-based page index
    #[serde(default)]
    pub page: Option<usize>,
    /// Page size (default 10)
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Response for the paginated my-submissions listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct PagedSubmissions {
    pub total: usize,
    pub submissions: Vec<StoredSubmission>,
}

const DEFAULT_PAGE_LIMIT: usize = 10;

/// Submit proof of completion for a task.
///
/// Task and buyer fields are copied from the stored task, and the worker
/// identity comes from the token; nothing in the body is trusted beyond
/// the task reference and the proof text.
#[utoipa::path(
    post,
    path = "/submissions",
    tag = "Submissions",
    security(("bearer" = [])),
    request_body = CreateSubmissionRequest,
    responses(
        (status = 201, body = StoredSubmission),
        (status = 404, description = "Task or worker account missing"),
    )
)]
pub async fn create_submission(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateSubmissionRequest>,
) -> Result<(StatusCode, Json<StoredSubmission>), ApiError> {
    let tasks = TaskRepository::new(state.storage());
    let accounts = AccountRepository::new(state.storage());
    let submissions = SubmissionRepository::new(state.storage());

    let task = tasks.get(&request.task_id)?;
    let worker = accounts
        .find_by_email(&user.email)?
        .ok_or_else(|| ApiError::not_found("Account not found"))?;

    let submission = StoredSubmission {
        id: Uuid::new_v4().to_string(),
        task_id: task.id,
        task_title: task.title,
        worker_email: worker.email,
        worker_name: worker.name,
        buyer_email: task.buyer_email,
        buyer_name: task.buyer_name,
        payable_amount: task.payable_amount,
        details: request.details,
        status: SubmissionStatus::Pending,
        created_at: Utc::now(),
    };
    submissions.create(&submission)?;

    Ok((StatusCode::CREATED, Json(submission)))
}

/// List submissions by worker or buyer email.
#[utoipa::path(
    get,
    path = "/submissions",
    tag = "Submissions",
    security(("bearer" = [])),
    params(SubmissionListQuery),
    responses((status = 200, body = [StoredSubmission]))
)]
pub async fn list_submissions(
    Auth(_user): Auth,
    State(state): State<AppState>,
    Query(query): Query<SubmissionListQuery>,
) -> Result<Json<Vec<StoredSubmission>>, ApiError> {
    let repo = SubmissionRepository::new(state.storage());
    let email = query.email.to_lowercase();
    let submissions = match query.side.as_deref() {
        Some("buyer") => repo.list_by_buyer(&email)?,
        _ => repo.list_by_worker(&email)?,
    };
    Ok(Json(submissions))
}

/// List submissions on one task (buyer review view).
#[utoipa::path(
    get,
    path = "/submissions/task/{task_id}",
    tag = "Submissions",
    security(("bearer" = [])),
    params(("task_id" = String, Path, description = "Task ID")),
    responses((status = 200, body = [StoredSubmission]))
)]
pub async fn submissions_by_task(
    Auth(_user): Auth,
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<Vec<StoredSubmission>>, ApiError> {
    let repo = SubmissionRepository::new(state.storage());
    Ok(Json(repo.list_by_task(&task_id)?))
}

/// List the caller's pending review queue as a buyer.
#[utoipa::path(
    get,
    path = "/submissions/buyer-pending/{email}",
    tag = "Submissions",
    security(("bearer" = [])),
    params(("email" = String, Path, description = "Buyer email")),
    responses(
        (status = 200, body = [StoredSubmission]),
        (status = 403, description = "Not the caller's own email"),
    )
)]
pub async fn buyer_pending(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<StoredSubmission>>, ApiError> {
    user.ensure_owns(&email)
        .map_err(|e| ApiError::forbidden(e.to_string()))?;
    let repo = SubmissionRepository::new(state.storage());
    Ok(Json(repo.list_pending_by_buyer(&email.to_lowercase())?))
}

/// List the caller's own submissions as a worker, paginated.
#[utoipa::path(
    get,
    path = "/submissions/my-submissions/{email}",
    tag = "Submissions",
    security(("bearer" = [])),
    params(
        ("email" = String, Path, description = "Worker email"),
        PageQuery,
    ),
    responses(
        (status = 200, body = PagedSubmissions),
        (status = 403, description = "Not the caller's own email"),
    )
)]
pub async fn my_submissions(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(email): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PagedSubmissions>, ApiError> {
    user.ensure_owns(&email)
        .map_err(|e| ApiError::forbidden(e.to_string()))?;

    let repo = SubmissionRepository::new(state.storage());
    let all = repo.list_by_worker(&email.to_lowercase())?;
    let total = all.len();

    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT).max(1);
    let page = query.page.unwrap_or(0);
    let submissions = all
        .into_iter()
        .skip(page.saturating_mul(limit))
        .take(limit)
        .collect();

    Ok(Json(PagedSubmissions { total, submissions }))
}

/// Approve a pending submission.
///
/// Pays the worker, consumes one task slot, and notifies the worker. Only
/// the buyer who owns the task may approve, and only while the submission
/// is still pending.
#[utoipa::path(
    patch,
    path = "/submissions/approve/{id}",
    tag = "Submissions",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Submission ID")),
    responses(
        (status = 200, body = StoredSubmission),
        (status = 400, description = "Submission is not pending"),
        (status = 403, description = "Caller does not own the task"),
        (status = 404, description = "No such submission"),
    )
)]
pub async fn approve_submission(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredSubmission>, ApiError> {
    let submissions = SubmissionRepository::new(state.storage());
    let tasks = TaskRepository::new(state.storage());
    let accounts = AccountRepository::new(state.storage());
    let notifications = NotificationRepository::new(state.storage());

    let _ledger = state.lock_ledger().await;

    let mut submission = submissions.get(&id)?;
    user.ensure_owns(&submission.buyer_email)
        .map_err(|e| ApiError::forbidden(e.to_string()))?;
    if submission.status != SubmissionStatus::Pending {
        return Err(ApiError::bad_request(
            "Submission has already been reviewed",
        ));
    }

    submission.status = SubmissionStatus::Approved;
    submissions.update(&submission)?;

    // The task may have been deleted since submission; the payout stands
    // either way.
    match tasks.adjust_required_workers(&submission.task_id, -1) {
        Ok(_) | Err(StorageError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    accounts.adjust_coins(&submission.worker_email, submission.payable_amount)?;

    notifications.create(&StoredNotification::new(
        submission.worker_email.clone(),
        format!(
            "You have earned {} coins from {} for completing {}",
            submission.payable_amount, submission.buyer_name, submission.task_title
        ),
        "/dashboard/worker-home".to_string(),
    ))?;

    Ok(Json(submission))
}

/// Reject a pending submission.
///
/// Reopens the task slot and notifies the worker. No coins move.
#[utoipa::path(
    patch,
    path = "/submissions/reject/{id}",
    tag = "Submissions",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Submission ID")),
    responses(
        (status = 200, body = StoredSubmission),
        (status = 400, description = "Submission is not pending"),
        (status = 403, description = "Caller does not own the task"),
        (status = 404, description = "No such submission"),
    )
)]
pub async fn reject_submission(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredSubmission>, ApiError> {
    let submissions = SubmissionRepository::new(state.storage());
    let tasks = TaskRepository::new(state.storage());
    let notifications = NotificationRepository::new(state.storage());

    let _ledger = state.lock_ledger().await;

    let mut submission = submissions.get(&id)?;
    user.ensure_owns(&submission.buyer_email)
        .map_err(|e| ApiError::forbidden(e.to_string()))?;
    if submission.status != SubmissionStatus::Pending {
        return Err(ApiError::bad_request(
            "Submission has already been reviewed",
        ));
    }

    submission.status = SubmissionStatus::Rejected;
    submissions.update(&submission)?;

    match tasks.adjust_required_workers(&submission.task_id, 1) {
        Ok(_) | Err(StorageError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    notifications.create(&StoredNotification::new(
        submission.worker_email.clone(),
        format!(
            "Your submission for {} was rejected by {}",
            submission.task_title, submission.buyer_name
        ),
        "/dashboard/worker-home".to_string(),
    ))?;

    Ok(Json(submission))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{cleanup, create_test_state, seed_account, seed_task, test_user};
    use crate::auth::Role;

    async fn submit(state: &AppState, worker: &str, task_id: &str) -> StoredSubmission {
        let (_, Json(submission)) = create_submission(
            Auth(test_user(worker)),
            State(state.clone()),
            Json(CreateSubmissionRequest {
                task_id: task_id.to_string(),
                details: "done, see screenshot".to_string(),
            }),
        )
        .await
        .expect("submission creation succeeds");
        submission
    }

    #[tokio::test]
    async fn create_submission_derives_fields_from_task() {
        let state = create_test_state();
        seed_account(&state, "b@example.com", Role::Buyer, 100);
        seed_account(&state, "w@example.com", Role::Worker, 10);
        let task = seed_task(&state, "b@example.com", 2, 15);

        let submission = submit(&state, "w@example.com", &task.id).await;

        assert_eq!(submission.status, SubmissionStatus::Pending);
        assert_eq!(submission.payable_amount, 15);
        assert_eq!(submission.buyer_email, "b@example.com");
        assert_eq!(submission.worker_email, "w@example.com");
        assert_eq!(submission.task_title, task.title);

        cleanup(&state);
    }

    #[tokio::test]
    async fn approve_pays_worker_exactly_once() {
        let state = create_test_state();
        seed_account(&state, "b@example.com", Role::Buyer, 100);
        seed_account(&state, "w@example.com", Role::Worker, 10);
        let task = seed_task(&state, "b@example.com", 2, 15);
        let submission = submit(&state, "w@example.com", &task.id).await;

        let Json(approved) = approve_submission(
            Auth(test_user("b@example.com")),
            State(state.clone()),
            Path(submission.id.clone()),
        )
        .await
        .expect("approval succeeds");
        assert_eq!(approved.status, SubmissionStatus::Approved);

        let accounts = AccountRepository::new(state.storage());
        let worker = accounts.find_by_email("w@example.com").unwrap().unwrap();
        assert_eq!(worker.coins, 25);

        let tasks = TaskRepository::new(state.storage());
        assert_eq!(tasks.get(&task.id).unwrap().required_workers, 1);

        // Second approval must not pay again.
        let result = approve_submission(
            Auth(test_user("b@example.com")),
            State(state.clone()),
            Path(submission.id),
        )
        .await;
        assert_eq!(result.unwrap_err().status, StatusCode::BAD_REQUEST);

        let worker = accounts.find_by_email("w@example.com").unwrap().unwrap();
        assert_eq!(worker.coins, 25);

        cleanup(&state);
    }

    #[tokio::test]
    async fn approve_rejects_non_owner() {
        let state = create_test_state();
        seed_account(&state, "b@example.com", Role::Buyer, 100);
        seed_account(&state, "w@example.com", Role::Worker, 10);
        let task = seed_task(&state, "b@example.com", 1, 10);
        let submission = submit(&state, "w@example.com", &task.id).await;

        let result = approve_submission(
            Auth(test_user("other@example.com")),
            State(state.clone()),
            Path(submission.id),
        )
        .await;
        assert_eq!(result.unwrap_err().status, StatusCode::FORBIDDEN);

        cleanup(&state);
    }

    #[tokio::test]
    async fn reject_reopens_slot_without_paying() {
        let state = create_test_state();
        seed_account(&state, "b@example.com", Role::Buyer, 100);
        seed_account(&state, "w@example.com", Role::Worker, 10);
        let task = seed_task(&state, "b@example.com", 2, 15);
        let submission = submit(&state, "w@example.com", &task.id).await;

        let Json(rejected) = reject_submission(
            Auth(test_user("b@example.com")),
            State(state.clone()),
            Path(submission.id.clone()),
        )
        .await
        .expect("rejection succeeds");
        assert_eq!(rejected.status, SubmissionStatus::Rejected);

        let accounts = AccountRepository::new(state.storage());
        let worker = accounts.find_by_email("w@example.com").unwrap().unwrap();
        assert_eq!(worker.coins, 10);

        let tasks = TaskRepository::new(state.storage());
        assert_eq!(tasks.get(&task.id).unwrap().required_workers, 3);

        // A rejected submission cannot later be approved.
        let result = approve_submission(
            Auth(test_user("b@example.com")),
            State(state.clone()),
            Path(submission.id),
        )
        .await;
        assert_eq!(result.unwrap_err().status, StatusCode::BAD_REQUEST);

        cleanup(&state);
    }

    #[tokio::test]
    async fn approval_notifies_the_worker() {
        let state = create_test_state();
        seed_account(&state, "b@example.com", Role::Buyer, 100);
        seed_account(&state, "w@example.com", Role::Worker, 10);
        let task = seed_task(&state, "b@example.com", 1, 10);
        let submission = submit(&state, "w@example.com", &task.id).await;

        approve_submission(
            Auth(test_user("b@example.com")),
            State(state.clone()),
            Path(submission.id),
        )
        .await
        .unwrap();

        let notifications = NotificationRepository::new(state.storage());
        let inbox = notifications.list_by_recipient("w@example.com").unwrap();
        assert_eq!(inbox.len(), 1);
        assert!(inbox[0].message.contains("10 coins"));

        cleanup(&state);
    }

    #[tokio::test]
    async fn my_submissions_paginates() {
        let state = create_test_state();
        seed_account(&state, "b@example.com", Role::Buyer, 1000);
        seed_account(&state, "w@example.com", Role::Worker, 10);
        let task = seed_task(&state, "b@example.com", 30, 1);

        for _ in 0..12 {
            submit(&state, "w@example.com", &task.id).await;
        }

        let Json(page) = my_submissions(
            Auth(test_user("w@example.com")),
            State(state.clone()),
            Path("w@example.com".to_string()),
            Query(PageQuery {
                page: Some(1),
                limit: Some(5),
            }),
        )
        .await
        .unwrap();

        assert_eq!(page.total, 12);
        assert_eq!(page.submissions.len(), 5);

        // A page index past the end is an empty page, whatever its size.
        let Json(beyond) = my_submissions(
            Auth(test_user("w@example.com")),
            State(state.clone()),
            Path("w@example.com".to_string()),
            Query(PageQuery {
                page: Some(usize::MAX),
                limit: Some(usize::MAX),
            }),
        )
        .await
        .unwrap();
        assert_eq!(beyond.total, 12);
        assert!(beyond.submissions.is_empty());

        cleanup(&state);
    }
}
