// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Microtask Platform

//! Task endpoints.
//!
//! Posting a task escrows its full cost (`required_workers x
//! payable_amount`) out of the buyer's balance up front; deleting a task
//! refunds only the slots that were never paid out.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    auth::Auth,
    error::ApiError,
    state::AppState,
    storage::{AccountRepository, AvailableTaskFilter, StoredTask, TaskRepository, TaskSort},
};

/// Request body for POST /tasks.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateTaskRequest {
    pub title: String,
    pub detail: String,
    pub submission_info: String,
    #[serde(default)]
    pub image: Option<String>,
    pub payable_amount: i64,
    pub required_workers: i64,
    pub completion_date: NaiveDate,
}

/// Request body for PATCH /tasks/{id}.
///
/// Only these fields are editable after creation; amounts and slot
/// counts are fixed because coins were already escrowed against them.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub submission_info: Option<String>,
    #[serde(default)]
    pub completion_date: Option<NaiveDate>,
}

/// Query parameters for GET /tasks/available.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AvailableTasksQuery {
    /// Case-insensitive title substring
    #[serde(default)]
    pub search: Option<String>,
    /// Minimum reward per worker
    #[serde(default)]
    pub min_reward: Option<i64>,
    /// Maximum reward per worker
    #[serde(default)]
    pub max_reward: Option<i64>,
    /// Sort order: `reward_asc`, `reward_desc`, or `completion_date`
    #[serde(default)]
    pub sort_by: Option<TaskSort>,
}

/// Post a task.
///
/// The full cost is deducted from the buyer's balance before the task
/// document is written; both steps happen under the ledger lock so two
/// concurrent posts cannot overdraw the same account.
#[utoipa::path(
    post,
    path = "/tasks",
    tag = "Tasks",
    security(("bearer" = [])),
    request_body = CreateTaskRequest,
    responses(
        (status = 201, body = StoredTask),
        (status = 400, description = "Invalid amounts or insufficient coins"),
        (status = 404, description = "Caller has no account"),
    )
)]
pub async fn create_task(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<StoredTask>), ApiError> {
    if request.payable_amount <= 0 {
        return Err(ApiError::bad_request("payable_amount must be positive"));
    }
    if request.required_workers <= 0 {
        return Err(ApiError::bad_request("required_workers must be positive"));
    }
    let cost = request
        .required_workers
        .checked_mul(request.payable_amount)
        .ok_or_else(|| ApiError::bad_request("task cost exceeds the representable range"))?;

    let accounts = AccountRepository::new(state.storage());
    let tasks = TaskRepository::new(state.storage());

    let _ledger = state.lock_ledger().await;

    let buyer = accounts
        .find_by_email(&user.email)?
        .ok_or_else(|| ApiError::not_found("Account not found"))?;
    if buyer.coins < cost {
        return Err(ApiError::bad_request(format!(
            "Insufficient coins: task costs {cost}, balance is {}",
            buyer.coins
        )));
    }

    accounts.adjust_coins(&buyer.email, -cost)?;

    let task = StoredTask {
        id: Uuid::new_v4().to_string(),
        buyer_email: buyer.email,
        buyer_name: buyer.name,
        title: request.title,
        detail: request.detail,
        submission_info: request.submission_info,
        image: request.image,
        payable_amount: request.payable_amount,
        required_workers: request.required_workers,
        completion_date: request.completion_date,
        created_at: Utc::now(),
    };
    tasks.create(&task)?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// List every task.
#[utoipa::path(
    get,
    path = "/tasks",
    tag = "Tasks",
    responses((status = 200, body = [StoredTask]))
)]
pub async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<StoredTask>>, ApiError> {
    let repo = TaskRepository::new(state.storage());
    Ok(Json(repo.list_all()?))
}

/// List tasks with open slots, filtered and sorted for the worker feed.
#[utoipa::path(
    get,
    path = "/tasks/available",
    tag = "Tasks",
    security(("bearer" = [])),
    params(AvailableTasksQuery),
    responses((status = 200, body = [StoredTask]))
)]
pub async fn available_tasks(
    Auth(_user): Auth,
    State(state): State<AppState>,
    Query(query): Query<AvailableTasksQuery>,
) -> Result<Json<Vec<StoredTask>>, ApiError> {
    let filter = AvailableTaskFilter {
        search: query.search,
        min_reward: query.min_reward,
        max_reward: query.max_reward,
        sort: query.sort_by.unwrap_or_default(),
    };
    let repo = TaskRepository::new(state.storage());
    Ok(Json(repo.list_available(&filter)?))
}

/// List the caller's own tasks, newest completion date first.
#[utoipa::path(
    get,
    path = "/tasks/my-tasks/{email}",
    tag = "Tasks",
    security(("bearer" = [])),
    params(("email" = String, Path, description = "Buyer email")),
    responses(
        (status = 200, body = [StoredTask]),
        (status = 403, description = "Not the caller's own email"),
    )
)]
pub async fn my_tasks(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<StoredTask>>, ApiError> {
    user.ensure_owns(&email)
        .map_err(|e| ApiError::forbidden(e.to_string()))?;
    let repo = TaskRepository::new(state.storage());
    Ok(Json(repo.list_by_buyer(&email.to_lowercase())?))
}

/// Fetch one task.
#[utoipa::path(
    get,
    path = "/tasks/{id}",
    tag = "Tasks",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, body = StoredTask),
        (status = 404, description = "No such task"),
    )
)]
pub async fn get_task(
    Auth(_user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredTask>, ApiError> {
    let repo = TaskRepository::new(state.storage());
    Ok(Json(repo.get(&id)?))
}

/// Edit a task's descriptive fields.
#[utoipa::path(
    patch,
    path = "/tasks/{id}",
    tag = "Tasks",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Task ID")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, body = StoredTask),
        (status = 403, description = "Caller does not own the task"),
        (status = 404, description = "No such task"),
    )
)]
pub async fn update_task(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTaskRequest>,
) -> Result<Json<StoredTask>, ApiError> {
    let repo = TaskRepository::new(state.storage());
    let mut task = repo.get(&id)?;
    user.ensure_owns(&task.buyer_email)
        .map_err(|e| ApiError::forbidden(e.to_string()))?;

    if let Some(title) = request.title {
        task.title = title;
    }
    if let Some(detail) = request.detail {
        task.detail = detail;
    }
    if let Some(submission_info) = request.submission_info {
        task.submission_info = submission_info;
    }
    if let Some(completion_date) = request.completion_date {
        task.completion_date = completion_date;
    }
    repo.update(&task)?;

    Ok(Json(task))
}

/// Delete a task, refunding the unfilled slots.
///
/// Coins already paid to approved workers stay paid; only
/// `remaining_slots x payable_amount` flows back to the buyer.
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    tag = "Tasks",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 204),
        (status = 403, description = "Caller does not own the task"),
        (status = 404, description = "No such task"),
    )
)]
pub async fn delete_task(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let tasks = TaskRepository::new(state.storage());
    let accounts = AccountRepository::new(state.storage());

    let _ledger = state.lock_ledger().await;

    let task = tasks.get(&id)?;
    user.ensure_owns(&task.buyer_email)
        .map_err(|e| ApiError::forbidden(e.to_string()))?;

    let refund = task
        .required_workers
        .checked_mul(task.payable_amount)
        .ok_or_else(|| ApiError::internal("task refund exceeds the representable range"))?;
    if refund > 0 {
        accounts.adjust_coins(&task.buyer_email, refund)?;
    }
    tasks.delete(&id)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{cleanup, create_test_state, seed_account, test_user};
    use crate::auth::Role;

    fn sample_request(workers: i64, amount: i64) -> CreateTaskRequest {
        CreateTaskRequest {
            title: "Watch my video".to_string(),
            detail: "Watch and leave a comment".to_string(),
            submission_info: "Screenshot of the comment".to_string(),
            image: None,
            payable_amount: amount,
            required_workers: workers,
            completion_date: NaiveDate::from_ymd_opt(2026, 9, 30).unwrap(),
        }
    }

    #[tokio::test]
    async fn create_task_deducts_exact_cost() {
        let state = create_test_state();
        seed_account(&state, "b@example.com", Role::Buyer, 50);

        let (status, Json(task)) = create_task(
            Auth(test_user("b@example.com")),
            State(state.clone()),
            Json(sample_request(3, 10)),
        )
        .await
        .expect("task creation succeeds");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(task.buyer_email, "b@example.com");
        assert_eq!(task.required_workers, 3);

        let accounts = AccountRepository::new(state.storage());
        let buyer = accounts.find_by_email("b@example.com").unwrap().unwrap();
        assert_eq!(buyer.coins, 20);

        cleanup(&state);
    }

    #[tokio::test]
    async fn create_task_rejects_insufficient_funds_without_mutation() {
        let state = create_test_state();
        seed_account(&state, "b@example.com", Role::Buyer, 25);

        let result = create_task(
            Auth(test_user("b@example.com")),
            State(state.clone()),
            Json(sample_request(3, 10)),
        )
        .await;

        assert_eq!(result.unwrap_err().status, StatusCode::BAD_REQUEST);

        let accounts = AccountRepository::new(state.storage());
        let buyer = accounts.find_by_email("b@example.com").unwrap().unwrap();
        assert_eq!(buyer.coins, 25);
        assert!(TaskRepository::new(state.storage())
            .list_all()
            .unwrap()
            .is_empty());

        cleanup(&state);
    }

    #[tokio::test]
    async fn create_task_rejects_nonpositive_amounts() {
        let state = create_test_state();
        seed_account(&state, "b@example.com", Role::Buyer, 100);

        let result = create_task(
            Auth(test_user("b@example.com")),
            State(state.clone()),
            Json(sample_request(0, 10)),
        )
        .await;
        assert_eq!(result.unwrap_err().status, StatusCode::BAD_REQUEST);

        let result = create_task(
            Auth(test_user("b@example.com")),
            State(state.clone()),
            Json(sample_request(3, -5)),
        )
        .await;
        assert_eq!(result.unwrap_err().status, StatusCode::BAD_REQUEST);

        cleanup(&state);
    }

    #[tokio::test]
    async fn create_task_rejects_overflowing_cost() {
        let state = create_test_state();
        seed_account(&state, "b@example.com", Role::Buyer, 50);

        let result = create_task(
            Auth(test_user("b@example.com")),
            State(state.clone()),
            Json(sample_request(i64::MAX / 2, 3)),
        )
        .await;
        assert_eq!(result.unwrap_err().status, StatusCode::BAD_REQUEST);

        let accounts = AccountRepository::new(state.storage());
        let buyer = accounts.find_by_email("b@example.com").unwrap().unwrap();
        assert_eq!(buyer.coins, 50);
        assert!(TaskRepository::new(state.storage())
            .list_all()
            .unwrap()
            .is_empty());

        cleanup(&state);
    }

    #[tokio::test]
    async fn update_task_rejects_non_owner() {
        let state = create_test_state();
        seed_account(&state, "b@example.com", Role::Buyer, 100);

        let (_, Json(task)) = create_task(
            Auth(test_user("b@example.com")),
            State(state.clone()),
            Json(sample_request(2, 10)),
        )
        .await
        .unwrap();

        let result = update_task(
            Auth(test_user("intruder@example.com")),
            State(state.clone()),
            Path(task.id),
            Json(UpdateTaskRequest {
                title: Some("Hijacked".to_string()),
                detail: None,
                submission_info: None,
                completion_date: None,
            }),
        )
        .await;

        assert_eq!(result.unwrap_err().status, StatusCode::FORBIDDEN);

        cleanup(&state);
    }

    #[tokio::test]
    async fn delete_task_refunds_remaining_slots_only() {
        let state = create_test_state();
        seed_account(&state, "b@example.com", Role::Buyer, 100);

        let (_, Json(task)) = create_task(
            Auth(test_user("b@example.com")),
            State(state.clone()),
            Json(sample_request(4, 10)),
        )
        .await
        .unwrap();

        // One slot consumed by an approval elsewhere.
        let tasks = TaskRepository::new(state.storage());
        tasks.adjust_required_workers(&task.id, -1).unwrap();

        let status = delete_task(
            Auth(test_user("b@example.com")),
            State(state.clone()),
            Path(task.id.clone()),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        // 100 - 40 escrow + 30 refund for the 3 unfilled slots.
        let accounts = AccountRepository::new(state.storage());
        let buyer = accounts.find_by_email("b@example.com").unwrap().unwrap();
        assert_eq!(buyer.coins, 90);
        assert!(!tasks.exists(&task.id));

        cleanup(&state);
    }

    #[tokio::test]
    async fn available_tasks_respects_filters() {
        let state = create_test_state();
        seed_account(&state, "b@example.com", Role::Buyer, 1000);

        create_task(
            Auth(test_user("b@example.com")),
            State(state.clone()),
            Json(sample_request(1, 5)),
        )
        .await
        .unwrap();
        create_task(
            Auth(test_user("b@example.com")),
            State(state.clone()),
            Json(CreateTaskRequest {
                title: "Review my app".to_string(),
                ..sample_request(1, 30)
            }),
        )
        .await
        .unwrap();

        let Json(matched) = available_tasks(
            Auth(test_user("w@example.com")),
            State(state.clone()),
            Query(AvailableTasksQuery {
                search: Some("review".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();

        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].payable_amount, 30);

        cleanup(&state);
    }
}
