//! Staged per-employee edits and their validation summary

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::vocabulary::EmployeeField;

use super::ChangeConfiguration;

/// Message attached to records that touch a sensitive field
pub const SENSITIVE_CHANGES_MESSAGE: &str = "Contains sensitive field changes requiring approval";

/// Edits staged in the wizard: employee id to field to new value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PendingEdits {
    edits: HashMap<String, BTreeMap<EmployeeField, String>>,
}

impl PendingEdits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage one value, replacing any earlier value for the same field
    pub fn set(&mut self, employee_id: impl Into<String>, field: EmployeeField, value: impl Into<String>) {
        self.edits
            .entry(employee_id.into())
            .or_default()
            .insert(field, value.into());
    }

    /// Staged value for one field
    pub fn get(&self, employee_id: &str, field: EmployeeField) -> Option<&str> {
        self.edits
            .get(employee_id)
            .and_then(|fields| fields.get(&field))
            .map(String::as_str)
    }

    /// All staged values for one employee
    pub fn for_employee(&self, employee_id: &str) -> Option<&BTreeMap<EmployeeField, String>> {
        self.edits.get(employee_id)
    }

    /// Number of employees with staged values
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn clear(&mut self) {
        self.edits.clear();
    }

    /// Stage every change of `config` for every employee in `selection`.
    ///
    /// Changes are written in order, so a repeated field keeps its last
    /// value. Returns the fields touched, without duplicates, in first-seen
    /// order.
    pub fn apply_configuration<S: AsRef<str>>(
        &mut self,
        selection: &[S],
        config: &ChangeConfiguration,
    ) -> Vec<EmployeeField> {
        for employee_id in selection {
            for change in &config.changes {
                self.set(employee_id.as_ref(), change.field, change.value.clone());
            }
        }

        let mut fields = Vec::new();
        for change in &config.changes {
            if !fields.contains(&change.field) {
                fields.push(change.field);
            }
        }
        fields
    }
}

/// A record whose edits need approval
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationWarning {
    pub employee_id: String,
    pub message: String,
    pub fields: Vec<EmployeeField>,
}

/// Counts shown on the review step before changes are submitted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    /// Selected records with at least one non-empty edit
    pub total_records: usize,
    pub fields_impacted: usize,
    pub valid_records: usize,
    pub warning_records: usize,
    /// No rule currently produces errors
    pub error_records: usize,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationSummary {
    /// Summarise the staged edits of the selected employees
    pub fn evaluate<S: AsRef<str>>(selection: &[S], edits: &PendingEdits, fields: &[EmployeeField]) -> Self {
        let mut summary = Self {
            fields_impacted: fields.len(),
            ..Self::default()
        };

        for employee_id in selection {
            let employee_id = employee_id.as_ref();
            let Some(staged) = edits.for_employee(employee_id) else {
                continue;
            };

            let non_empty: Vec<(&EmployeeField, &String)> =
                staged.iter().filter(|(_, value)| !value.trim().is_empty()).collect();
            if non_empty.is_empty() {
                continue;
            }

            summary.total_records += 1;

            let sensitive: Vec<EmployeeField> = non_empty
                .iter()
                .filter(|(field, value)| field.requires_approval(value))
                .map(|(field, _)| **field)
                .collect();

            if sensitive.is_empty() {
                summary.valid_records += 1;
            } else {
                summary.warning_records += 1;
                summary.warnings.push(ValidationWarning {
                    employee_id: employee_id.to_string(),
                    message: SENSITIVE_CHANGES_MESSAGE.to_string(),
                    fields: sensitive,
                });
            }
        }

        summary
    }

    /// Whether submitting these edits needs approval
    pub fn requires_approval(&self) -> bool {
        self.warning_records > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::ChangeOperation;

    #[test]
    fn test_apply_configuration_last_write_wins() {
        let config = ChangeConfiguration::from_changes(
            vec![
                ChangeOperation::set(EmployeeField::JobTitle, "Senior Software Engineer"),
                ChangeOperation::set(EmployeeField::Level, "L5"),
                ChangeOperation::set(EmployeeField::JobTitle, "Manager"),
            ],
            2,
        );

        let mut edits = PendingEdits::new();
        let fields = edits.apply_configuration(&["e1", "e2"], &config);

        assert_eq!(fields, vec![EmployeeField::JobTitle, EmployeeField::Level]);
        assert_eq!(edits.len(), 2);
        assert_eq!(edits.get("e1", EmployeeField::JobTitle), Some("Manager"));
        assert_eq!(edits.get("e2", EmployeeField::Level), Some("L5"));
        assert_eq!(edits.get("e3", EmployeeField::Level), None);
    }

    #[test]
    fn test_validation_summary() {
        let mut edits = PendingEdits::new();
        edits.set("e1", EmployeeField::BonusTarget, "20%");
        edits.set("e1", EmployeeField::JobLocation, "Remote");
        edits.set("e2", EmployeeField::JobLocation, "Remote");
        edits.set("e3", EmployeeField::Level, "L6");
        edits.set("e4", EmployeeField::Manager, "");
        edits.set("e5", EmployeeField::Level, "M2");

        let selection = ["e1", "e2", "e3", "e4", "e5", "e6"];
        let fields = [EmployeeField::BonusTarget, EmployeeField::JobLocation, EmployeeField::Level];
        let summary = ValidationSummary::evaluate(&selection, &edits, &fields);

        assert_eq!(summary.total_records, 4);
        assert_eq!(summary.fields_impacted, 3);
        assert_eq!(summary.valid_records, 2);
        assert_eq!(summary.warning_records, 2);
        assert_eq!(summary.error_records, 0);
        assert!(summary.requires_approval());

        assert_eq!(summary.warnings[0].employee_id, "e1");
        assert_eq!(summary.warnings[0].fields, vec![EmployeeField::BonusTarget]);
        assert_eq!(summary.warnings[0].message, SENSITIVE_CHANGES_MESSAGE);
        assert_eq!(summary.warnings[1].fields, vec![EmployeeField::Level]);
    }

    #[test]
    fn test_unselected_edits_are_ignored() {
        let mut edits = PendingEdits::new();
        edits.set("e9", EmployeeField::BaseCompensation, "Band 3");

        let summary = ValidationSummary::evaluate(&["e1"], &edits, &[EmployeeField::BaseCompensation]);
        assert_eq!(summary.total_records, 0);
        assert!(!summary.requires_approval());
    }
}
