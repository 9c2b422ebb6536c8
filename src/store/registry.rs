use std::collections::{BTreeMap, HashSet};

use crate::error::LeaveError;
use crate::model::employee::Employee;
use crate::utils::date::parse_date;

/// Issues employee ids and owns every employee record.
#[derive(Debug)]
pub struct EmployeeRegistry {
    employees: BTreeMap<u64, Employee>,
    emails: HashSet<String>,
    next_id: u64,
    allowance: i64,
}

impl EmployeeRegistry {
    pub fn new(allowance: i64) -> Self {
        Self {
            employees: BTreeMap::new(),
            emails: HashSet::new(),
            next_id: 1,
            allowance,
        }
    }

    /// Register a new employee.
    ///
    /// Fails with `Validation` on an empty field or unparseable joining date,
    /// and with `Conflict` when the email is already registered. Nothing is
    /// stored on failure.
    pub fn register(
        &mut self,
        name: &str,
        email: &str,
        department: &str,
        joining_date: &str,
    ) -> Result<Employee, LeaveError> {
        let (name, email, department, joining_date) = (
            name.trim(),
            email.trim(),
            department.trim(),
            joining_date.trim(),
        );

        if name.is_empty() || email.is_empty() || department.is_empty() || joining_date.is_empty()
        {
            return Err(LeaveError::validation("All fields are required."));
        }

        if self.emails.contains(email) {
            return Err(LeaveError::conflict("Email already exists."));
        }

        let joining_date = parse_date(joining_date)
            .ok_or_else(|| LeaveError::validation("Invalid joiningDate format."))?;

        let employee = Employee {
            id: self.next_id,
            name: name.to_string(),
            email: email.to_string(),
            department: department.to_string(),
            joining_date,
            leave_balance: self.allowance,
        };

        self.next_id += 1;
        self.emails.insert(employee.email.clone());
        self.employees.insert(employee.id, employee.clone());

        Ok(employee)
    }

    pub fn find(&self, id: u64) -> Option<&Employee> {
        self.employees.get(&id)
    }

    /// All employees, oldest first.
    pub fn list(&self) -> impl Iterator<Item = &Employee> {
        self.employees.values()
    }
}
