// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Microtask Platform

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

pub mod health;
pub mod notifications;
pub mod payments;
pub mod stats;
pub mod submissions;
pub mod tasks;
pub mod token;
pub mod users;
pub mod withdrawals;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/", get(health::liveness))
        .route("/health", get(health::health))
        .route("/jwt", post(token::issue_token))
        .route(
            "/users",
            post(users::create_account).get(users::list_accounts),
        )
        .route("/users/best", get(users::best_workers))
        .route(
            "/users/role/{key}",
            get(users::get_role).patch(users::set_role),
        )
        .route("/users/admin/{email}", get(users::admin_flag))
        .route("/users/buyer/{email}", get(users::buyer_flag))
        .route("/users/worker/{email}", get(users::worker_flag))
        .route(
            "/users/{email}",
            get(users::get_account)
                .patch(users::update_profile)
                .delete(users::delete_account),
        )
        .route("/tasks", post(tasks::create_task).get(tasks::list_tasks))
        .route("/tasks/available", get(tasks::available_tasks))
        .route("/tasks/my-tasks/{email}", get(tasks::my_tasks))
        .route(
            "/tasks/{id}",
            get(tasks::get_task)
                .patch(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route(
            "/submissions",
            post(submissions::create_submission).get(submissions::list_submissions),
        )
        .route(
            "/submissions/task/{task_id}",
            get(submissions::submissions_by_task),
        )
        .route(
            "/submissions/buyer-pending/{email}",
            get(submissions::buyer_pending),
        )
        .route(
            "/submissions/my-submissions/{email}",
            get(submissions::my_submissions),
        )
        .route(
            "/submissions/approve/{id}",
            patch(submissions::approve_submission),
        )
        .route(
            "/submissions/reject/{id}",
            patch(submissions::reject_submission),
        )
        .route(
            "/create-payment-intent",
            post(payments::create_payment_intent),
        )
        .route(
            "/create-checkout-session",
            post(payments::create_checkout_session),
        )
        .route("/payments/success", post(payments::payment_success))
        .route("/payments", post(payments::record_payment))
        .route("/payments/{email}", get(payments::payment_history))
        .route(
            "/withdrawals",
            post(withdrawals::create_withdrawal).get(withdrawals::list_pending_withdrawals),
        )
        .route("/withdrawals/{id}", patch(withdrawals::approve_withdrawal))
        .route(
            "/notifications/{email}",
            get(notifications::list_notifications),
        )
        .route("/admin-stats", get(stats::admin_stats))
        .route("/buyer-stats/{email}", get(stats::buyer_stats))
        .route("/worker-stats/{email}", get(stats::worker_stats))
        .with_state(state);

    routes
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::liveness,
        health::health,
        token::issue_token,
        users::create_account,
        users::get_role,
        users::best_workers,
        users::list_accounts,
        users::admin_flag,
        users::buyer_flag,
        users::worker_flag,
        users::get_account,
        users::update_profile,
        users::set_role,
        users::delete_account,
        tasks::create_task,
        tasks::list_tasks,
        tasks::available_tasks,
        tasks::my_tasks,
        tasks::get_task,
        tasks::update_task,
        tasks::delete_task,
        submissions::create_submission,
        submissions::list_submissions,
        submissions::submissions_by_task,
        submissions::buyer_pending,
        submissions::my_submissions,
        submissions::approve_submission,
        submissions::reject_submission,
        payments::create_payment_intent,
        payments::create_checkout_session,
        payments::payment_success,
        payments::record_payment,
        payments::payment_history,
        withdrawals::create_withdrawal,
        withdrawals::list_pending_withdrawals,
        withdrawals::approve_withdrawal,
        notifications::list_notifications,
        stats::admin_stats,
        stats::buyer_stats,
        stats::worker_stats
    ),
    components(
        schemas(
            crate::auth::Role,
            crate::storage::StoredAccount,
            crate::storage::StoredTask,
            crate::storage::StoredSubmission,
            crate::storage::SubmissionStatus,
            crate::storage::StoredPayment,
            crate::storage::StoredWithdrawal,
            crate::storage::WithdrawalStatus,
            crate::storage::StoredNotification,
            token::IssueTokenRequest,
            token::IssueTokenResponse,
            users::CreateAccountRequest,
            users::CreateAccountResponse,
            users::RoleLookupResponse,
            users::RoleFlagResponse,
            users::UpdateProfileRequest,
            users::SetRoleRequest,
            tasks::CreateTaskRequest,
            tasks::UpdateTaskRequest,
            submissions::CreateSubmissionRequest,
            submissions::PagedSubmissions,
            payments::CreateIntentRequest,
            payments::CreateIntentResponse,
            payments::CreateSessionRequest,
            payments::CreateSessionResponse,
            payments::PaymentSuccessRequest,
            payments::RecordPaymentRequest,
            withdrawals::CreateWithdrawalRequest,
            stats::AdminStats,
            stats::BuyerStats,
            stats::WorkerStats
        )
    ),
    tags(
        (name = "Health", description = "Liveness and storage health"),
        (name = "Auth", description = "Access token issuance"),
        (name = "Users", description = "Account management"),
        (name = "Tasks", description = "Task posting and discovery"),
        (name = "Submissions", description = "Work submission and review"),
        (name = "Payments", description = "Coin purchases"),
        (name = "Withdrawals", description = "Coin payouts"),
        (name = "Notifications", description = "Per-account notifications"),
        (name = "Stats", description = "Dashboard statistics")
    )
)]
struct ApiDoc;
