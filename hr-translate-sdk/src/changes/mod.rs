//! Change translation: free text to bulk field updates

mod fallback;
mod pending;

pub use fallback::{parse_changes, parse_changes_with_rng, AFFECTED_COUNT_RANGE};
pub use pending::{PendingEdits, ValidationSummary, ValidationWarning, SENSITIVE_CHANGES_MESSAGE};

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::TranslatorConfig;
use crate::core::schema::{self, null_as_empty, OutputSchema};
use crate::core::GenerationRequest;
use crate::error::{Result, ServiceError};
use crate::translate::{ResultEnvelope, Translation, Translator};
use crate::vocabulary::{
    EmployeeField, BONUS_TARGETS, CHANGE_JOB_TITLES, CHANGE_LOCATIONS, COMPENSATION_BANDS, DEPARTMENTS,
    EMPLOYEE_TYPES, LEVELS,
};

/// Statement emitted when nothing could be parsed
pub const NO_CHANGES_STATEMENT: &str = "-- No changes detected from query";

/// Explanation emitted when nothing could be parsed
pub const NO_CHANGES_EXPLANATION: &str = "No specific changes could be parsed from your request";

/// Restricts an update to the wizard's current selection
pub const SELECTION_CLAUSE: &str = "WHERE employee_id IN (SELECT employee_id FROM selected_employees)";

/// A single field update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeOperation {
    pub field: EmployeeField,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl ChangeOperation {
    /// Unconditional update of `field` to `value`
    pub fn set(field: EmployeeField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            condition: None,
        }
    }

    /// Whether this update needs approval
    pub fn is_sensitive(&self) -> bool {
        self.field.requires_approval(&self.value)
    }
}

/// Output of the change translator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeConfiguration {
    /// Updates in application order; a repeated field is overwritten by the later entry
    #[serde(default, deserialize_with = "null_as_empty")]
    pub changes: Vec<ChangeOperation>,

    pub data_modification_statement: String,

    pub explanation: String,

    /// Estimate only
    #[serde(default)]
    pub affected_employee_count: u32,

    #[serde(default)]
    pub requires_approval: bool,
}

impl ChangeConfiguration {
    /// Build a configuration for `changes` with the derived statement and explanation
    pub fn from_changes(changes: Vec<ChangeOperation>, affected_employee_count: u32) -> Self {
        Self {
            data_modification_statement: update_statement(&changes),
            explanation: describe_changes(&changes),
            changes,
            affected_employee_count,
            requires_approval: false,
        }
        .enforce_approval_policy()
    }

    /// True when no field is updated
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Fields whose updates need approval, without duplicates
    pub fn sensitive_fields(&self) -> Vec<EmployeeField> {
        let mut fields = Vec::new();
        for change in self.changes.iter().filter(|c| c.is_sensitive()) {
            if !fields.contains(&change.field) {
                fields.push(change.field);
            }
        }
        fields
    }

    /// Raise `requires_approval` when any update touches a sensitive field.
    /// Never lowers it.
    pub fn enforce_approval_policy(mut self) -> Self {
        if !self.sensitive_fields().is_empty() {
            self.requires_approval = true;
        }
        self
    }
}

fn quoted(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| format!("\"{}\"", v))
        .collect::<Vec<_>>()
        .join(", ")
}

fn sql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// `UPDATE` statement applying `changes` to the selected employees
pub fn update_statement(changes: &[ChangeOperation]) -> String {
    if changes.is_empty() {
        return NO_CHANGES_STATEMENT.to_string();
    }

    let assignments = changes
        .iter()
        .map(|c| format!("{} = {}", c.field.column(), sql_literal(&c.value)))
        .collect::<Vec<_>>()
        .join(", ");

    format!("UPDATE employees SET {} {}", assignments, SELECTION_CLAUSE)
}

/// Human-readable summary of `changes`
pub fn describe_changes(changes: &[ChangeOperation]) -> String {
    if changes.is_empty() {
        return NO_CHANGES_EXPLANATION.to_string();
    }

    let parts = changes
        .iter()
        .map(|c| format!("{} → {}", c.field, c.value))
        .collect::<Vec<_>>()
        .join(", ");

    format!("Applied changes: {}", parts)
}

/// Input to the change translator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRequest {
    /// The instruction as typed
    pub text: String,

    /// Number of employees currently selected
    pub selected_count: usize,
}

impl ChangeRequest {
    pub fn new(text: impl Into<String>, selected_count: usize) -> Self {
        Self {
            text: text.into(),
            selected_count,
        }
    }
}

/// Where the heuristic's affected-count placeholder comes from
#[derive(Debug, Clone)]
enum CountSource {
    Thread,
    Seeded(Arc<Mutex<StdRng>>),
}

/// Change translation: free text to `ChangeConfiguration`
#[derive(Debug, Clone)]
pub struct ChangeTranslation {
    counts: CountSource,
}

impl Default for ChangeTranslation {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeTranslation {
    pub fn new() -> Self {
        Self {
            counts: CountSource::Thread,
        }
    }

    /// Use a seeded generator for the heuristic's affected-count placeholder
    pub fn with_seed(seed: u64) -> Self {
        Self {
            counts: CountSource::Seeded(Arc::new(Mutex::new(StdRng::seed_from_u64(seed)))),
        }
    }

    /// System prompt describing the mutable fields
    pub fn system_prompt(&self, selected_count: usize) -> String {
        format!(
            "You are an HR system assistant that converts natural language change requests into structured employee updates.\n\n\
             Available fields to modify:\n\
             - jobTitle: Job titles like {titles}\n\
             - level: Levels like {levels}\n\
             - department: Departments like {departments}\n\
             - baseCompensation: Compensation bands like {bands}\n\
             - bonusTarget: Bonus percentages like {bonuses}\n\
             - jobLocation: Locations like {locations}\n\
             - employeeType: Types like {types}\n\
             - manager: Manager names\n\n\
             Sensitive fields that require approval: baseCompensation, bonusTarget, level (when promoting to management)\n\n\
             Generate SQL UPDATE statements that would apply to the selected employees. Use proper SQL syntax with \
             employee_id IN (SELECT employee_id FROM selected_employees) as the WHERE clause.\n\n\
             Current context: {count} employees are selected for bulk changes.",
            titles = quoted(&CHANGE_JOB_TITLES),
            levels = quoted(&LEVELS),
            departments = quoted(&DEPARTMENTS),
            bands = quoted(&COMPENSATION_BANDS),
            bonuses = quoted(&BONUS_TARGETS),
            locations = quoted(&CHANGE_LOCATIONS),
            types = quoted(&EMPLOYEE_TYPES),
            count = selected_count,
        )
    }

    /// Output schema for `ChangeConfiguration`
    pub fn schema() -> OutputSchema {
        let fields: Vec<&str> = EmployeeField::ALL.iter().map(EmployeeField::as_str).collect();

        let change = schema::strict_object(vec![
            (
                "field",
                json!({
                    "type": "string",
                    "enum": fields,
                    "description": "The field to be changed (e.g., jobTitle, level, baseCompensation)",
                }),
            ),
            ("value", schema::string("The new value for the field")),
            ("condition", schema::nullable_string("Optional condition for when to apply this change")),
        ]);

        OutputSchema::new(
            "change_configuration",
            schema::strict_object(vec![
                (
                    "changes",
                    json!({
                        "type": "array",
                        "items": change,
                        "description": "Array of changes to be applied",
                    }),
                ),
                ("dataModificationStatement", schema::string("SQL UPDATE query to apply these changes")),
                ("explanation", schema::string("Human-readable explanation of what changes will be applied")),
                (
                    "affectedEmployeeCount",
                    json!({
                        "type": "integer",
                        "description": "Estimated number of employees that will be affected",
                    }),
                ),
                (
                    "requiresApproval",
                    json!({
                        "type": "boolean",
                        "description": "Whether these changes require approval",
                    }),
                ),
            ]),
        )
    }
}

impl Translation for ChangeTranslation {
    type Input = ChangeRequest;
    type Output = ChangeConfiguration;

    fn name(&self) -> &'static str {
        "changes"
    }

    fn text<'a>(&self, input: &'a ChangeRequest) -> &'a str {
        &input.text
    }

    fn request(&self, input: &ChangeRequest) -> GenerationRequest {
        GenerationRequest {
            system_prompt: self.system_prompt(input.selected_count),
            user_prompt: format!("Convert this bulk change request into structured updates: \"{}\"", input.text),
            schema: Self::schema(),
        }
    }

    fn accept(&self, mut output: ChangeConfiguration) -> Result<ChangeConfiguration> {
        if let Some(blank) = output.changes.iter().find(|c| c.value.trim().is_empty()) {
            return Err(ServiceError::validation(format!("Empty value for field {}", blank.field)));
        }

        for change in output.changes.iter_mut() {
            if change.condition.as_deref().map_or(false, |c| c.trim().is_empty()) {
                change.condition = None;
            }
        }

        if output.data_modification_statement.trim().is_empty() {
            output.data_modification_statement = update_statement(&output.changes);
        }

        if output.explanation.trim().is_empty() {
            output.explanation = describe_changes(&output.changes);
        }

        Ok(output.enforce_approval_policy())
    }

    fn fallback(&self, input: &ChangeRequest) -> ChangeConfiguration {
        match &self.counts {
            CountSource::Thread => parse_changes(&input.text),
            CountSource::Seeded(rng) => {
                let mut guard = match rng.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                parse_changes_with_rng(&input.text, &mut *guard)
            }
        }
    }
}

/// Translator from free text to `ChangeConfiguration`
pub type ChangeTranslator = Translator<ChangeTranslation>;

impl Translator<ChangeTranslation> {
    /// Build a change translator from translator settings
    pub fn from_config(config: &TranslatorConfig) -> Self {
        Translator::new(ChangeTranslation::new(), &config.openai)
    }

    /// Translate a free-text bulk change instruction for `selected_count` employees
    pub async fn translate_changes(&self, text: &str, selected_count: usize) -> ResultEnvelope<ChangeConfiguration> {
        self.translate(&ChangeRequest::new(text, selected_count)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_statement() {
        let changes = vec![
            ChangeOperation::set(EmployeeField::JobTitle, "Senior Software Engineer"),
            ChangeOperation::set(EmployeeField::Level, "L5"),
        ];

        assert_eq!(
            update_statement(&changes),
            "UPDATE employees SET job_title = 'Senior Software Engineer', level = 'L5' \
             WHERE employee_id IN (SELECT employee_id FROM selected_employees)"
        );
        assert_eq!(update_statement(&[]), NO_CHANGES_STATEMENT);
    }

    #[test]
    fn test_statement_escapes_quotes() {
        let changes = vec![ChangeOperation::set(EmployeeField::Manager, "Dana O'Neil")];
        assert!(update_statement(&changes).contains("manager = 'Dana O''Neil'"));
    }

    #[test]
    fn test_describe_changes() {
        let changes = vec![ChangeOperation::set(EmployeeField::JobLocation, "Remote")];
        assert_eq!(describe_changes(&changes), "Applied changes: jobLocation → Remote");
        assert_eq!(describe_changes(&[]), NO_CHANGES_EXPLANATION);
    }

    #[test]
    fn test_approval_policy_raises_flag() {
        let config = ChangeConfiguration {
            changes: vec![ChangeOperation::set(EmployeeField::Level, "M2")],
            data_modification_statement: String::new(),
            explanation: String::new(),
            affected_employee_count: 3,
            requires_approval: false,
        };

        let config = ChangeTranslation::new().accept(config).unwrap();
        assert!(config.requires_approval);
        assert_eq!(config.sensitive_fields(), vec![EmployeeField::Level]);
        assert!(config.data_modification_statement.starts_with("UPDATE employees SET level = 'M2'"));
        assert_eq!(config.explanation, "Applied changes: level → M2");
    }

    #[test]
    fn test_approval_policy_never_lowers_flag() {
        let config = ChangeConfiguration::from_changes(vec![], 0);
        assert!(!config.requires_approval);

        let config = ChangeConfiguration {
            requires_approval: true,
            ..config
        }
        .enforce_approval_policy();
        assert!(config.requires_approval);
    }

    #[test]
    fn test_unknown_field_fails_decoding() {
        let result = serde_json::from_value::<ChangeConfiguration>(serde_json::json!({
            "changes": [{ "field": "favoriteColor", "value": "blue" }],
            "dataModificationStatement": "",
            "explanation": "",
            "affectedEmployeeCount": 1,
            "requiresApproval": false
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_value_rejected() {
        let config = ChangeConfiguration::from_changes(vec![ChangeOperation::set(EmployeeField::Department, " ")], 1);
        assert!(ChangeTranslation::new().accept(config).is_err());
    }

    #[test]
    fn test_prompt_mentions_selection_and_fields() {
        let request = ChangeTranslation::new().request(&ChangeRequest::new("make everyone remote", 12));

        assert!(request.system_prompt.contains("12 employees are selected"));
        assert!(request.system_prompt.contains("\"Band 1\", \"Band 2\", \"Band 3\""));
        assert!(request.system_prompt.contains("employee_id IN (SELECT employee_id FROM selected_employees)"));
        assert!(request.user_prompt.ends_with("\"make everyone remote\""));
        let mut properties = request.schema.property_names();
        properties.sort_unstable();
        assert_eq!(
            properties,
            vec![
                "affectedEmployeeCount",
                "changes",
                "dataModificationStatement",
                "explanation",
                "requiresApproval"
            ]
        );
    }
}
