use crate::{
    error::LeaveError,
    model::employee::Employee,
    store::AppState,
};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use tracing::{info, warn};
use utoipa::ToSchema;

/// Registration payload. Every field is optional on the wire so a missing
/// field is reported the same way as an empty one.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployee {
    #[schema(example = "John Doe", value_type = String)]
    pub name: Option<String>,
    #[schema(example = "john@email.com", format = "email", value_type = String)]
    pub email: Option<String>,
    #[schema(example = "Engineering", value_type = String)]
    pub department: Option<String>,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub joining_date: Option<String>,
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/employees",
    request_body = CreateEmployee,
    responses(
        (status = 200, description = "Employee registered", body = Employee),
        (status = 400, description = "Missing field, duplicate email or bad date", body = Object, example = json!({
            "error": "Email already exists."
        }))
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    state: web::Data<AppState>,
    payload: web::Json<CreateEmployee>,
) -> Result<impl Responder, LeaveError> {
    let payload = payload.into_inner();

    let result = state.write()?.registry.register(
        payload.name.as_deref().unwrap_or_default(),
        payload.email.as_deref().unwrap_or_default(),
        payload.department.as_deref().unwrap_or_default(),
        payload.joining_date.as_deref().unwrap_or_default(),
    );

    match result {
        Ok(employee) => {
            info!(employee_id = employee.id, "Employee registered");
            Ok(HttpResponse::Ok().json(employee))
        }
        Err(e) => {
            warn!(error = %e, "Employee registration rejected");
            Err(e)
        }
    }
}

/// List Employees
#[utoipa::path(
    get,
    path = "/employees",
    responses(
        (status = 200, description = "All registered employees", body = [Employee])
    ),
    tag = "Employee"
)]
pub async fn list_employees(state: web::Data<AppState>) -> Result<impl Responder, LeaveError> {
    let store = state.read()?;
    let employees: Vec<&Employee> = store.registry.list().collect();

    Ok(HttpResponse::Ok().json(employees))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "error": "Employee not found."
        }))
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> Result<impl Responder, LeaveError> {
    let employee_id = path.into_inner();
    let store = state.read()?;

    match store.registry.find(employee_id) {
        Some(emp) => Ok(HttpResponse::Ok().json(emp)),
        None => Err(LeaveError::not_found("Employee not found.")),
    }
}

/// Get current leave balance
#[utoipa::path(
    get,
    path = "/employees/{employee_id}/balance",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Allowance minus approved leave days", body = Balance),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "error": "Employee not found."
        }))
    ),
    tag = "Employee"
)]
pub async fn get_balance(
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> Result<impl Responder, LeaveError> {
    let employee_id = path.into_inner();
    let store = state.read()?;

    let balance = store.ledger.balance_of(&store.registry, employee_id)?;
    Ok(HttpResponse::Ok().json(balance))
}
