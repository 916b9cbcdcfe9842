use std::collections::{HashMap, HashSet};
use tracing::warn;

use crate::model::employee::Employee;

/// Active employees keyed by device code. A missing mapping is a data-entry
/// problem surfaced to HR, not a transient failure, so resolution is a pure
/// lookup with no retry.
#[derive(Debug, Default)]
pub struct EmployeeDirectory {
    by_code: HashMap<String, Employee>,
    duplicates: HashSet<String>,
}

impl EmployeeDirectory {
    pub fn new(employees: Vec<Employee>) -> Self {
        let mut directory = Self::default();
        for employee in employees {
            let Some(code) = employee.employee_code.clone() else {
                continue;
            };
            if directory.duplicates.contains(&code) {
                continue;
            }
            if directory.by_code.remove(&code).is_some() {
                // Two active employees share one device code. Neither can be
                // trusted; their punches surface as unmatched instead.
                warn!(code = %code, "duplicate employee code, punches will not resolve");
                directory.duplicates.insert(code);
                continue;
            }
            directory.by_code.insert(code, employee);
        }
        directory
    }

    pub fn resolve(&self, code: &str) -> Option<&Employee> {
        self.by_code.get(code)
    }

    /// Everyone a batch is allowed to synthesize day records for.
    pub fn employees(&self) -> impl Iterator<Item = &Employee> {
        self.by_code.values()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use pretty_assertions::assert_eq;

    fn employee(id: u64, code: Option<&str>) -> Employee {
        Employee {
            id,
            name: format!("Employee {id}"),
            department: "Ops".to_string(),
            employee_code: code.map(str::to_string),
            schedule_start: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            schedule_end: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
        }
    }

    #[test]
    fn resolves_by_code() {
        let directory = EmployeeDirectory::new(vec![employee(1, Some("1001"))]);
        assert_eq!(directory.resolve("1001").map(|e| e.id), Some(1));
        assert_eq!(directory.resolve("9999").map(|e| e.id), None);
    }

    #[test]
    fn employees_without_codes_are_not_indexed() {
        let directory = EmployeeDirectory::new(vec![employee(1, None)]);
        assert!(directory.is_empty());
    }

    #[test]
    fn duplicate_codes_resolve_to_nobody() {
        let directory = EmployeeDirectory::new(vec![
            employee(1, Some("1001")),
            employee(2, Some("1001")),
            employee(3, Some("1002")),
        ]);
        assert_eq!(directory.resolve("1001").map(|e| e.id), None);
        assert_eq!(directory.resolve("1002").map(|e| e.id), Some(3));
        assert_eq!(directory.employees().count(), 1);
    }
}
