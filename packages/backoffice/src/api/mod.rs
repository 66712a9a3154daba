// ABOUTME: Router assembly for every back-office resource
// ABOUTME: One sub-router per entity, nested by create_backoffice_router

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::db::DbState;

pub mod analytics_handlers;
pub mod audit_handlers;
pub mod documents_handlers;
pub mod employees_handlers;
pub mod feedback_handlers;
pub mod jobs_handlers;
pub mod notifications_handlers;
pub mod payouts_handlers;
pub mod projects_handlers;
pub mod response;
pub mod suggestions_handlers;
pub mod surveys_handlers;
pub mod templates_handlers;
pub mod validation;
pub mod workflows_handlers;

/// Creates the projects API router
pub fn create_projects_router() -> Router<DbState> {
    Router::new()
        .route("/", get(projects_handlers::list_projects))
        .route("/", post(projects_handlers::create_project))
        .route("/{id}", get(projects_handlers::get_project))
        .route("/{id}", put(projects_handlers::update_project))
        .route("/{id}", delete(projects_handlers::delete_project))
        .route("/{id}/members", get(projects_handlers::list_project_members))
        .route("/{id}/members", post(projects_handlers::add_project_member))
        .route(
            "/{id}/members/{employee_id}",
            delete(projects_handlers::remove_project_member),
        )
}

/// Creates the employees API router
pub fn create_employees_router() -> Router<DbState> {
    Router::new()
        .route("/", get(employees_handlers::list_employees))
        .route("/", post(employees_handlers::create_employee))
        .route("/{id}", get(employees_handlers::get_employee))
        .route("/{id}", put(employees_handlers::update_employee))
        .route("/{id}", delete(employees_handlers::delete_employee))
        .route("/{id}/terminate", post(employees_handlers::terminate_employee))
}

/// Creates the feedback API router
pub fn create_feedback_router() -> Router<DbState> {
    Router::new()
        .route("/", get(feedback_handlers::list_feedback))
        .route("/", post(feedback_handlers::create_feedback))
        .route("/{id}", get(feedback_handlers::get_feedback))
        .route("/{id}", delete(feedback_handlers::delete_feedback))
        .route("/{id}/respond", post(feedback_handlers::respond_feedback))
        .route("/{id}/status", put(feedback_handlers::update_feedback_status))
}

/// Creates the suggestions API router
pub fn create_suggestions_router() -> Router<DbState> {
    Router::new()
        .route("/", get(suggestions_handlers::list_suggestions))
        .route("/", post(suggestions_handlers::create_suggestion))
        .route("/{id}", get(suggestions_handlers::get_suggestion))
        .route("/{id}", delete(suggestions_handlers::delete_suggestion))
        .route("/{id}/vote", post(suggestions_handlers::vote_suggestion))
        .route("/{id}/vote", delete(suggestions_handlers::unvote_suggestion))
        .route(
            "/{id}/status",
            put(suggestions_handlers::update_suggestion_status),
        )
}

/// Creates the surveys API router
pub fn create_surveys_router() -> Router<DbState> {
    Router::new()
        .route("/", get(surveys_handlers::list_surveys))
        .route("/", post(surveys_handlers::create_survey))
        .route("/{id}", get(surveys_handlers::get_survey))
        .route("/{id}", put(surveys_handlers::update_survey))
        .route("/{id}", delete(surveys_handlers::delete_survey))
        .route("/{id}/open", post(surveys_handlers::open_survey))
        .route("/{id}/close", post(surveys_handlers::close_survey))
        .route("/{id}/responses", get(surveys_handlers::list_survey_responses))
        .route("/{id}/responses", post(surveys_handlers::submit_survey_response))
        .route("/{id}/summary", get(surveys_handlers::survey_summary))
}

/// Creates the job postings API router
pub fn create_jobs_router() -> Router<DbState> {
    Router::new()
        .route("/", get(jobs_handlers::list_jobs))
        .route("/", post(jobs_handlers::create_job))
        .route("/open", get(jobs_handlers::list_open_jobs))
        .route("/{id}", get(jobs_handlers::get_job))
        .route("/{id}", put(jobs_handlers::update_job))
        .route("/{id}", delete(jobs_handlers::delete_job))
        .route("/{id}/publish", post(jobs_handlers::publish_job))
        .route("/{id}/close", post(jobs_handlers::close_job))
}

/// Creates the documents API router
pub fn create_documents_router() -> Router<DbState> {
    Router::new()
        .route("/", get(documents_handlers::list_documents))
        .route("/", post(documents_handlers::upload_document))
        .route("/{id}", get(documents_handlers::get_document))
        .route("/{id}", put(documents_handlers::update_document))
        .route("/{id}", delete(documents_handlers::delete_document))
        .route("/{id}/download", get(documents_handlers::download_document))
}

/// Creates the affiliate payouts API router
pub fn create_payouts_router() -> Router<DbState> {
    Router::new()
        .route("/", get(payouts_handlers::list_payouts))
        .route("/", post(payouts_handlers::create_payout))
        .route("/{id}", get(payouts_handlers::get_payout))
        .route("/{id}", delete(payouts_handlers::delete_payout))
        .route("/{id}/approve", post(payouts_handlers::approve_payout))
        .route("/{id}/reject", post(payouts_handlers::reject_payout))
        .route("/{id}/pay", post(payouts_handlers::mark_payout_paid))
}

/// Creates the billing templates API router (invoice and receipt kinds)
pub fn create_templates_router() -> Router<DbState> {
    Router::new()
        .route("/invoice", get(templates_handlers::list_invoice_templates))
        .route("/invoice", post(templates_handlers::create_invoice_template))
        .route("/receipt", get(templates_handlers::list_receipt_templates))
        .route("/receipt", post(templates_handlers::create_receipt_template))
        .route("/{id}", get(templates_handlers::get_template))
        .route("/{id}", put(templates_handlers::update_template))
        .route("/{id}", delete(templates_handlers::delete_template))
        .route("/{id}/set-default", post(templates_handlers::set_default_template))
}

/// Creates the workflow automation API router
pub fn create_workflows_router() -> Router<DbState> {
    Router::new()
        .route("/rules", get(workflows_handlers::list_rules))
        .route("/rules", post(workflows_handlers::create_rule))
        .route("/rules/{id}", get(workflows_handlers::get_rule))
        .route("/rules/{id}", put(workflows_handlers::update_rule))
        .route("/rules/{id}", delete(workflows_handlers::delete_rule))
        .route("/trigger", post(workflows_handlers::trigger_event))
        .route("/instances", get(workflows_handlers::list_instances))
}

/// Creates the analytics API router
pub fn create_analytics_router() -> Router<DbState> {
    Router::new()
        .route("/feedback-summary", get(analytics_handlers::feedback_summary))
        .route(
            "/suggestion-engagement",
            get(analytics_handlers::suggestion_engagement),
        )
        .route(
            "/survey-participation",
            get(analytics_handlers::survey_participation),
        )
        .route("/headcount", get(analytics_handlers::headcount))
        .route("/project-status", get(analytics_handlers::project_status))
        .route("/payout-totals", get(analytics_handlers::payout_totals))
        .route("/hiring-funnel", get(analytics_handlers::hiring_funnel))
}

/// Creates the audit log API router
pub fn create_audit_router() -> Router<DbState> {
    Router::new().route("/", get(audit_handlers::list_audit_entries))
}

/// Creates the notifications API router
pub fn create_notifications_router() -> Router<DbState> {
    Router::new()
        .route("/", get(notifications_handlers::list_notifications))
        .route("/{id}/read", post(notifications_handlers::mark_notification_read))
        .route(
            "/read-all",
            post(notifications_handlers::mark_all_notifications_read),
        )
}

/// Assemble every resource router on top of the shared state
pub fn create_backoffice_router(state: DbState) -> Router {
    Router::new()
        .nest("/projects", create_projects_router())
        .nest("/employees", create_employees_router())
        .nest("/feedback", create_feedback_router())
        .nest("/suggestions", create_suggestions_router())
        .nest("/surveys", create_surveys_router())
        .nest("/jobs", create_jobs_router())
        .nest("/documents", create_documents_router())
        .nest("/payouts", create_payouts_router())
        .nest("/templates", create_templates_router())
        .nest("/workflows", create_workflows_router())
        .nest("/analytics", create_analytics_router())
        .nest("/audit", create_audit_router())
        .nest("/notifications", create_notifications_router())
        .with_state(state)
}
