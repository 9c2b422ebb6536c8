use crate::{
    error::LeaveError,
    model::leave_request::{LeaveRequest, LeaveStatus},
    store::AppState,
};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyLeave {
    #[schema(example = 1, value_type = u64)]
    pub employee_id: Option<u64>,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub start_date: Option<String>,
    #[schema(example = "2026-01-09", format = "date", value_type = String)]
    pub end_date: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateLeaveStatus {
    /// `Approved` or `Rejected`
    #[schema(example = "Approved", value_type = String)]
    pub status: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LeaveFilter {
    #[schema(example = 1)]
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    #[schema(example = "Pending")]
    /// Filter by leave status
    pub status: Option<String>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    #[schema(example = 10)]
    /// Items per page
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 10)]
    pub per_page: u64,
    #[schema(example = 1)]
    pub total: usize,
}

/* =========================
Apply for leave
========================= */
#[utoipa::path(
    post,
    path = "/leaves/apply",
    request_body(
        content = ApplyLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave request recorded as Pending", body = LeaveRequest),
        (status = 400, description = "Missing field, bad date, overlap or insufficient balance", body = Object, example = json!({
            "error": "Leave request overlaps with existing leave."
        })),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "error": "Employee not found."
        }))
    ),
    tag = "Leave"
)]
pub async fn apply_leave(
    state: web::Data<AppState>,
    payload: web::Json<ApplyLeave>,
) -> Result<impl Responder, LeaveError> {
    let payload = payload.into_inner();

    let mut store = state.write()?;
    let store = &mut *store;
    let result = store.ledger.apply(
        &store.registry,
        payload.employee_id,
        payload.start_date.as_deref().unwrap_or_default(),
        payload.end_date.as_deref().unwrap_or_default(),
    );

    match result {
        Ok(leave) => {
            info!(
                leave_id = leave.id,
                employee_id = leave.employee_id,
                start = %leave.start_date,
                end = %leave.end_date,
                "Leave request submitted"
            );
            Ok(HttpResponse::Ok().json(leave))
        }
        Err(e) => {
            warn!(error = %e, employee_id = ?payload.employee_id, "Leave request rejected");
            Err(e)
        }
    }
}

/* =========================
Approve / reject leave
========================= */
#[utoipa::path(
    put,
    path = "/leaves/{leave_id}/status",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to decide")
    ),
    request_body = UpdateLeaveStatus,
    responses(
        (status = 200, description = "Leave request decided", body = Decision),
        (status = 400, description = "Bad status, already processed or insufficient balance", body = Object, example = json!({
            "error": "Leave request is already processed."
        })),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "error": "Leave request not found."
        }))
    ),
    tag = "Leave"
)]
pub async fn update_leave_status(
    state: web::Data<AppState>,
    path: web::Path<u64>,
    payload: web::Json<UpdateLeaveStatus>,
) -> Result<impl Responder, LeaveError> {
    let leave_id = path.into_inner();
    let status = payload.status.as_deref().unwrap_or_default();

    let mut store = state.write()?;
    let store = &mut *store;

    match store.ledger.decide(&store.registry, leave_id, status) {
        Ok(decision) => {
            info!(
                leave_id,
                status = %decision.status,
                remaining = decision.leave_balance_remaining,
                "Leave request decided"
            );
            Ok(HttpResponse::Ok().json(decision))
        }
        Err(e) => {
            warn!(error = %e, leave_id, status, "Leave decision rejected");
            Err(e)
        }
    }
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/leaves/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "error": "Leave request not found."
        }))
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> Result<impl Responder, LeaveError> {
    let leave_id = path.into_inner();
    let store = state.read()?;

    match store.ledger.find(leave_id) {
        Some(data) => Ok(HttpResponse::Ok().json(data)),
        None => Err(LeaveError::not_found("Leave request not found.")),
    }
}

/// for getting leave applications endpoint
#[utoipa::path(
    get,
    path = "/leaves",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 400, description = "Unknown status filter")
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    state: web::Data<AppState>,
    query: web::Query<LeaveFilter>,
) -> Result<impl Responder, LeaveError> {
    let status = query
        .status
        .as_deref()
        .map(|s| {
            s.parse::<LeaveStatus>().map_err(|_| {
                LeaveError::validation("Status must be Pending, Approved or Rejected.")
            })
        })
        .transpose()?;

    // -------------------------
    // Pagination
    // -------------------------
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1).saturating_mul(per_page) as usize;

    let store = state.read()?;
    let found = store.ledger.list(query.employee_id, status);
    let total = found.len();

    let data = found
        .into_iter()
        .skip(offset)
        .take(per_page as usize)
        .cloned()
        .collect();

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data,
        page,
        per_page,
        total,
    }))
}
