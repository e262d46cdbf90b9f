//! Domain vocabulary shared by prompts, heuristics and validation

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// The closed set of departments
pub const DEPARTMENTS: [&str; 6] = [
    "EPD",
    "Product Marketing",
    "Sales",
    "Commercial",
    "Legal",
    "Customer Success",
];

/// Office locations suggested to the model. Not a closed set.
pub const LOCATIONS: [&str; 8] = [
    "San Francisco",
    "New York",
    "Chicago",
    "Austin",
    "Remote",
    "Seattle",
    "Boston",
    "Los Angeles",
];

/// Example job titles used to steer query translation
pub const COMMON_JOB_TITLES: [&str; 19] = [
    "Software Engineer",
    "Senior Software Engineer",
    "Staff Software Engineer",
    "Principal Engineer",
    "Product Manager",
    "Senior Product Manager",
    "Director of Product",
    "Marketing Manager",
    "Senior Marketing Manager",
    "Marketing Director",
    "Account Executive",
    "Senior Account Executive",
    "Sales Director",
    "Legal Counsel",
    "Senior Legal Counsel",
    "General Counsel",
    "Customer Success Manager",
    "Senior Customer Success Manager",
    "VP Customer Success",
];

/// Job titles offered as change targets
pub const CHANGE_JOB_TITLES: [&str; 4] = [
    "Software Engineer",
    "Senior Software Engineer",
    "Manager",
    "Director",
];

/// Individual contributor and management levels
pub const LEVELS: [&str; 8] = ["L3", "L4", "L5", "L6", "L7", "M1", "M2", "M3"];

/// Levels that put an employee into management
pub const MANAGEMENT_LEVELS: [&str; 3] = ["M1", "M2", "M3"];

/// Compensation bands
pub const COMPENSATION_BANDS: [&str; 3] = ["Band 1", "Band 2", "Band 3"];

/// Bonus target percentages
pub const BONUS_TARGETS: [&str; 4] = ["15%", "20%", "25%", "30%"];

/// Locations offered as change targets
pub const CHANGE_LOCATIONS: [&str; 4] = ["San Francisco", "New York", "Remote", "Chicago"];

/// Employment types
pub const EMPLOYEE_TYPES: [&str; 2] = ["FTE", "Contractor"];

/// A mutable employee field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmployeeField {
    JobTitle,
    Level,
    Department,
    BaseCompensation,
    BonusTarget,
    JobLocation,
    EmployeeType,
    Manager,
}

impl EmployeeField {
    /// Every mutable field, in display order
    pub const ALL: [EmployeeField; 8] = [
        EmployeeField::JobTitle,
        EmployeeField::Level,
        EmployeeField::Department,
        EmployeeField::BaseCompensation,
        EmployeeField::BonusTarget,
        EmployeeField::JobLocation,
        EmployeeField::EmployeeType,
        EmployeeField::Manager,
    ];

    /// Name used in change operations
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeField::JobTitle => "jobTitle",
            EmployeeField::Level => "level",
            EmployeeField::Department => "department",
            EmployeeField::BaseCompensation => "baseCompensation",
            EmployeeField::BonusTarget => "bonusTarget",
            EmployeeField::JobLocation => "jobLocation",
            EmployeeField::EmployeeType => "employeeType",
            EmployeeField::Manager => "manager",
        }
    }

    /// Column name in the employees table
    pub fn column(&self) -> &'static str {
        match self {
            EmployeeField::JobTitle => "job_title",
            EmployeeField::Level => "level",
            EmployeeField::Department => "department",
            EmployeeField::BaseCompensation => "base_compensation",
            EmployeeField::BonusTarget => "bonus_target",
            EmployeeField::JobLocation => "job_location",
            EmployeeField::EmployeeType => "employee_type",
            EmployeeField::Manager => "manager",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            EmployeeField::JobTitle => "Job Title",
            EmployeeField::Level => "Level",
            EmployeeField::Department => "Department",
            EmployeeField::BaseCompensation => "Base Compensation",
            EmployeeField::BonusTarget => "Bonus Target",
            EmployeeField::JobLocation => "Job Location",
            EmployeeField::EmployeeType => "Employee Type",
            EmployeeField::Manager => "Manager",
        }
    }

    /// Whether setting this field to `value` needs approval.
    ///
    /// Compensation and bonus changes always do; a level change only when the
    /// new level is a management level.
    pub fn requires_approval(&self, value: &str) -> bool {
        match self {
            EmployeeField::BaseCompensation | EmployeeField::BonusTarget => true,
            EmployeeField::Level => {
                let level = value.trim().to_uppercase();
                MANAGEMENT_LEVELS.contains(&level.as_str())
            }
            _ => false,
        }
    }
}

impl fmt::Display for EmployeeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmployeeField {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EmployeeField::ALL
            .iter()
            .copied()
            .find(|field| field.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ServiceError::validation(format!("Unknown employee field: {}", s)))
    }
}

/// Approval rule for a raw field name; unknown fields never need approval
pub fn requires_approval(field: &str, value: &str) -> bool {
    field
        .parse::<EmployeeField>()
        .map(|f| f.requires_approval(value))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_round_trip_names() {
        for field in EmployeeField::ALL {
            assert_eq!(field.as_str().parse::<EmployeeField>().unwrap(), field);
        }
        assert_eq!("BonusTarget".parse::<EmployeeField>().unwrap(), EmployeeField::BonusTarget);
        assert!("salary".parse::<EmployeeField>().is_err());
    }

    #[test]
    fn test_approval_rules() {
        assert!(requires_approval("baseCompensation", "Band 2"));
        assert!(requires_approval("bonusTarget", "20%"));
        assert!(requires_approval("level", "M1"));
        assert!(requires_approval("level", " m2 "));
        assert!(!requires_approval("level", "L5"));
        assert!(!requires_approval("jobTitle", "Manager"));
        assert!(!requires_approval("favoriteColor", "blue"));
    }
}
