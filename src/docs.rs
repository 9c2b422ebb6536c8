use crate::api::employee::CreateEmployee;
use crate::api::leave_request::{ApplyLeave, LeaveFilter, LeaveListResponse, UpdateLeaveStatus};
use crate::model::employee::Employee;
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::store::ledger::{Balance, Decision};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Ledger API",
        version = "1.0.0",
        description = r#"
## Employee Leave Management

Registers employees, accepts leave requests and tracks each employee's
remaining annual allowance.

### 🔹 Key Features
- **Employees**
  - Register, list and view employees
  - Read the live leave balance (allowance minus approved days)
- **Leave**
  - Apply for a date range, checked for overlap and balance
  - Approve or reject pending requests (one decision per request)
  - List and filter requests

### 📦 Response Format
- JSON, camelCase fields
- Errors are `{"error": "..."}`
- Dates are `YYYY-MM-DD`

---
Built with **Rust**, **Actix Web** and **Utoipa**.
"#,
    ),
    paths(
        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::get_balance,

        crate::api::leave_request::apply_leave,
        crate::api::leave_request::update_leave_status,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::leave_list
    ),
    components(
        schemas(
            Employee,
            CreateEmployee,
            Balance,
            LeaveRequest,
            LeaveStatus,
            ApplyLeave,
            UpdateLeaveStatus,
            Decision,
            LeaveFilter,
            LeaveListResponse
        )
    ),
    tags(
        (name = "Employee", description = "Employee registry APIs"),
        (name = "Leave", description = "Leave request APIs"),
    )
)]
pub struct ApiDoc;
