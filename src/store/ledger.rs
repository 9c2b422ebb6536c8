use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::LeaveError;
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::store::registry::EmployeeRegistry;
use crate::utils::date::{day_count, parse_date};

/// Outcome of approving or rejecting a request.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    #[schema(example = 1)]
    pub leave_request_id: u64,
    #[schema(example = "Approved")]
    pub status: LeaveStatus,
    #[schema(example = 15)]
    pub leave_balance_remaining: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    #[schema(example = 1)]
    pub employee_id: u64,
    #[schema(example = 20)]
    pub leave_balance: i64,
}

/// Holds every leave request and derives balances from approved history.
///
/// Balances are never stored: each call to [`LeaveLedger::current_balance`]
/// walks the approved requests of that employee again.
#[derive(Debug)]
pub struct LeaveLedger {
    requests: BTreeMap<u64, LeaveRequest>,
    next_id: u64,
    allowance: i64,
}

impl LeaveLedger {
    pub fn new(allowance: i64) -> Self {
        Self {
            requests: BTreeMap::new(),
            next_id: 1,
            allowance,
        }
    }

    /// Allowance minus approved days, or `None` for an unknown employee.
    pub fn current_balance(&self, registry: &EmployeeRegistry, employee_id: u64) -> Option<i64> {
        registry.find(employee_id)?;

        let used: i64 = self
            .requests
            .values()
            .filter(|r| r.employee_id == employee_id && r.status == LeaveStatus::Approved)
            .map(|r| day_count(r.start_date, r.end_date))
            .sum();

        Some(self.allowance - used)
    }

    /// Any Pending or Approved request of this employee shares a day with `[start, end]`.
    pub fn overlaps(&self, employee_id: u64, start: NaiveDate, end: NaiveDate) -> bool {
        self.requests.values().any(|r| {
            r.employee_id == employee_id
                && r.status != LeaveStatus::Rejected
                && r.intersects(start, end)
        })
    }

    /// Submit a new leave request. Checks run in a fixed order and the first
    /// failure is returned; the ledger is only touched once all pass.
    pub fn apply(
        &mut self,
        registry: &EmployeeRegistry,
        employee_id: Option<u64>,
        start_date: &str,
        end_date: &str,
    ) -> Result<LeaveRequest, LeaveError> {
        let (start_date, end_date) = (start_date.trim(), end_date.trim());

        let employee_id = match employee_id {
            Some(id) if !start_date.is_empty() && !end_date.is_empty() => id,
            _ => {
                return Err(LeaveError::validation(
                    "employeeId, startDate and endDate are required.",
                ));
            }
        };

        let employee = registry
            .find(employee_id)
            .ok_or_else(|| LeaveError::not_found("Employee not found."))?;

        let (start, end) = match (parse_date(start_date), parse_date(end_date)) {
            (Some(s), Some(e)) => (s, e),
            _ => return Err(LeaveError::validation("Invalid date format.")),
        };

        if end < start {
            return Err(LeaveError::validation("endDate cannot be before startDate."));
        }

        if start < employee.joining_date {
            return Err(LeaveError::validation("Cannot apply leave before joining date."));
        }

        if self.overlaps(employee_id, start, end) {
            return Err(LeaveError::conflict("Leave request overlaps with existing leave."));
        }

        let balance = self
            .current_balance(registry, employee_id)
            .ok_or_else(|| LeaveError::not_found("Employee not found."))?;
        if day_count(start, end) > balance {
            return Err(LeaveError::validation("Leave days exceed available leave balance."));
        }

        let request = LeaveRequest {
            id: self.next_id,
            employee_id,
            start_date: start,
            end_date: end,
            status: LeaveStatus::Pending,
        };
        self.next_id += 1;
        self.requests.insert(request.id, request.clone());

        Ok(request)
    }

    /// Move a pending request to `Approved` or `Rejected`.
    ///
    /// Approval re-checks the balance: two pending requests may each fit on
    /// their own but not together, and whichever is approved second loses.
    pub fn decide(
        &mut self,
        registry: &EmployeeRegistry,
        leave_id: u64,
        status: &str,
    ) -> Result<Decision, LeaveError> {
        let status = match status.parse::<LeaveStatus>() {
            Ok(s) if s.is_terminal() => s,
            _ => {
                return Err(LeaveError::validation("Status must be Approved or Rejected."));
            }
        };

        let request = self
            .requests
            .get(&leave_id)
            .ok_or_else(|| LeaveError::not_found("Leave request not found."))?;

        if request.status != LeaveStatus::Pending {
            return Err(LeaveError::conflict("Leave request is already processed."));
        }

        let employee_id = request.employee_id;

        if status == LeaveStatus::Approved {
            let balance = self
                .current_balance(registry, employee_id)
                .ok_or_else(|| LeaveError::not_found("Employee not found."))?;
            if day_count(request.start_date, request.end_date) > balance {
                return Err(LeaveError::validation("Insufficient leave balance to approve."));
            }
        }

        if let Some(request) = self.requests.get_mut(&leave_id) {
            request.status = status;
        }

        let remaining = self
            .current_balance(registry, employee_id)
            .ok_or_else(|| LeaveError::not_found("Employee not found."))?;

        Ok(Decision {
            leave_request_id: leave_id,
            status,
            leave_balance_remaining: remaining,
        })
    }

    pub fn balance_of(
        &self,
        registry: &EmployeeRegistry,
        employee_id: u64,
    ) -> Result<Balance, LeaveError> {
        let leave_balance = self
            .current_balance(registry, employee_id)
            .ok_or_else(|| LeaveError::not_found("Employee not found."))?;

        Ok(Balance {
            employee_id,
            leave_balance,
        })
    }

    pub fn find(&self, leave_id: u64) -> Option<&LeaveRequest> {
        self.requests.get(&leave_id)
    }

    /// Requests matching the optional filters, oldest first.
    pub fn list(
        &self,
        employee_id: Option<u64>,
        status: Option<LeaveStatus>,
    ) -> Vec<&LeaveRequest> {
        self.requests
            .values()
            .filter(|r| employee_id.is_none_or(|id| r.employee_id == id))
            .filter(|r| status.is_none_or(|s| r.status == s))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALLOWANCE: i64 = 20;

    struct Fixture {
        registry: EmployeeRegistry,
        ledger: LeaveLedger,
        emp: u64,
    }

    /// One employee who joined on 2025-01-01.
    fn fixture() -> Fixture {
        let mut registry = EmployeeRegistry::new(ALLOWANCE);
        let emp = registry
            .register("Ann", "ann@corp.io", "Ops", "2025-01-01")
            .unwrap()
            .id;
        Fixture {
            registry,
            ledger: LeaveLedger::new(ALLOWANCE),
            emp,
        }
    }

    impl Fixture {
        fn apply(&mut self, start: &str, end: &str) -> Result<LeaveRequest, LeaveError> {
            self.ledger.apply(&self.registry, Some(self.emp), start, end)
        }

        fn decide(&mut self, id: u64, status: &str) -> Result<Decision, LeaveError> {
            self.ledger.decide(&self.registry, id, status)
        }

        fn balance(&self) -> i64 {
            self.ledger.balance_of(&self.registry, self.emp).unwrap().leave_balance
        }
    }

    #[test]
    fn apply_creates_pending_request_with_increasing_ids() {
        let mut f = fixture();
        let a = f.apply("2025-02-03", "2025-02-04").unwrap();
        let b = f.apply("2025-03-03", "2025-03-03").unwrap();

        assert_eq!(a.status, LeaveStatus::Pending);
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(f.ledger.find(1), Some(&a));
    }

    #[test]
    fn missing_inputs_fail_before_employee_lookup() {
        let mut f = fixture();
        let err = f.ledger.apply(&f.registry, None, "2025-02-03", "2025-02-04");
        assert!(matches!(err, Err(LeaveError::Validation(_))));

        let err = f.ledger.apply(&f.registry, Some(999), "", "2025-02-04");
        assert!(matches!(err, Err(LeaveError::Validation(_))));
    }

    #[test]
    fn unknown_employee_is_checked_before_date_format() {
        let mut f = fixture();
        let err = f
            .ledger
            .apply(&f.registry, Some(999), "garbage", "2025-02-04")
            .unwrap_err();
        assert_eq!(err, LeaveError::not_found("Employee not found."));
    }

    #[test]
    fn bad_dates_and_reversed_range() {
        let mut f = fixture();
        assert_eq!(
            f.apply("2025-02-31", "2025-03-01").unwrap_err(),
            LeaveError::validation("Invalid date format.")
        );
        assert_eq!(
            f.apply("2025-03-05", "2025-03-01").unwrap_err(),
            LeaveError::validation("endDate cannot be before startDate.")
        );
    }

    #[test]
    fn start_before_joining_date_fails_regardless_of_balance() {
        let mut f = fixture();
        let err = f.apply("2024-12-31", "2025-01-01").unwrap_err();
        assert_eq!(
            err,
            LeaveError::validation("Cannot apply leave before joining date.")
        );
        // joining day itself is allowed
        assert!(f.apply("2025-01-01", "2025-01-01").is_ok());
    }

    #[test]
    fn full_allowance_fits_but_one_more_day_does_not() {
        let mut f = fixture();
        let err = f.apply("2025-03-01", "2025-03-21").unwrap_err();
        assert_eq!(
            err,
            LeaveError::validation("Leave days exceed available leave balance.")
        );

        let ok = f.apply("2025-03-01", "2025-03-20").unwrap();
        assert_eq!(day_count(ok.start_date, ok.end_date), 20);
    }

    #[test]
    fn second_approval_is_rechecked_against_balance() {
        let mut f = fixture();
        let fifteen = f.apply("2025-04-01", "2025-04-15").unwrap();
        let ten = f.apply("2025-05-01", "2025-05-10").unwrap();

        let d = f.decide(fifteen.id, "Approved").unwrap();
        assert_eq!(d.leave_balance_remaining, 5);

        let err = f.decide(ten.id, "Approved").unwrap_err();
        assert_eq!(
            err,
            LeaveError::validation("Insufficient leave balance to approve.")
        );
        // still pending, can be rejected instead
        assert_eq!(f.ledger.find(ten.id).unwrap().status, LeaveStatus::Pending);
        assert_eq!(f.decide(ten.id, "Rejected").unwrap().leave_balance_remaining, 5);
    }

    #[test]
    fn overlap_with_live_requests_is_conflict() {
        let mut f = fixture();
        let first = f.apply("2025-06-10", "2025-06-12").unwrap();

        // touching endpoint counts
        let err = f.apply("2025-06-12", "2025-06-13").unwrap_err();
        assert!(matches!(err, LeaveError::Conflict(_)));

        f.decide(first.id, "Approved").unwrap();
        let err = f.apply("2025-06-01", "2025-06-30").unwrap_err();
        assert!(matches!(err, LeaveError::Conflict(_)));

        // adjacent but disjoint is fine
        assert!(f.apply("2025-06-13", "2025-06-13").is_ok());
    }

    #[test]
    fn same_dates_as_rejected_request_are_accepted() {
        let mut f = fixture();
        let first = f.apply("2025-07-01", "2025-07-03").unwrap();
        f.decide(first.id, "Rejected").unwrap();

        let again = f.apply("2025-07-01", "2025-07-03").unwrap();
        assert_eq!(again.status, LeaveStatus::Pending);
        assert_ne!(again.id, first.id);
    }

    #[test]
    fn overlap_is_scoped_per_employee() {
        let mut f = fixture();
        let other = f
            .registry
            .register("Bob", "bob@corp.io", "Ops", "2025-01-01")
            .unwrap()
            .id;
        f.apply("2025-08-01", "2025-08-05").unwrap();
        assert!(
            f.ledger
                .apply(&f.registry, Some(other), "2025-08-01", "2025-08-05")
                .is_ok()
        );
    }

    #[test]
    fn decided_request_is_terminal_for_any_target() {
        let mut f = fixture();
        let a = f.apply("2025-09-01", "2025-09-01").unwrap();
        let b = f.apply("2025-09-02", "2025-09-02").unwrap();
        f.decide(a.id, "Approved").unwrap();
        f.decide(b.id, "Rejected").unwrap();

        for id in [a.id, b.id] {
            for target in ["Approved", "Rejected"] {
                assert_eq!(
                    f.decide(id, target).unwrap_err(),
                    LeaveError::conflict("Leave request is already processed.")
                );
            }
        }
    }

    #[test]
    fn decide_validates_status_before_lookup() {
        let mut f = fixture();
        for bad in ["Pending", "approved", ""] {
            assert_eq!(
                f.decide(999, bad).unwrap_err(),
                LeaveError::validation("Status must be Approved or Rejected.")
            );
        }
        assert_eq!(
            f.decide(999, "Approved").unwrap_err(),
            LeaveError::not_found("Leave request not found.")
        );
    }

    #[test]
    fn balance_tracks_approvals_only() {
        let mut f = fixture();
        assert_eq!(f.balance(), ALLOWANCE);

        let five = f.apply("2025-10-06", "2025-10-10").unwrap();
        let three = f.apply("2025-11-03", "2025-11-05").unwrap();
        assert_eq!(f.balance(), ALLOWANCE);

        f.decide(three.id, "Rejected").unwrap();
        assert_eq!(f.balance(), ALLOWANCE);

        f.decide(five.id, "Approved").unwrap();
        assert_eq!(f.balance(), ALLOWANCE - 5);
    }

    #[test]
    fn balance_of_unknown_employee_is_not_found() {
        let f = fixture();
        assert!(f.ledger.current_balance(&f.registry, 77).is_none());
        assert!(matches!(
            f.ledger.balance_of(&f.registry, 77),
            Err(LeaveError::NotFound(_))
        ));
    }

    #[test]
    fn list_filters_by_employee_and_status() {
        let mut f = fixture();
        let other = f
            .registry
            .register("Bob", "bob@corp.io", "Ops", "2025-01-01")
            .unwrap()
            .id;
        let a = f.apply("2025-02-03", "2025-02-03").unwrap();
        f.apply("2025-02-04", "2025-02-04").unwrap();
        f.ledger
            .apply(&f.registry, Some(other), "2025-02-03", "2025-02-03")
            .unwrap();
        f.decide(a.id, "Approved").unwrap();

        assert_eq!(f.ledger.list(None, None).len(), 3);
        assert_eq!(f.ledger.list(Some(f.emp), None).len(), 2);
        assert_eq!(f.ledger.list(Some(other), None).len(), 1);

        let approved = f.ledger.list(None, Some(LeaveStatus::Approved));
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].id, a.id);
        assert_eq!(
            f.ledger.list(Some(other), Some(LeaveStatus::Approved)).len(),
            0
        );
    }
}
