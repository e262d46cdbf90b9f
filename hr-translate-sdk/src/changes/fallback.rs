//! Keyword parser used when the model is unavailable

use std::ops::RangeInclusive;

use rand::Rng;

use crate::vocabulary::EmployeeField;

use super::{ChangeConfiguration, ChangeOperation};

/// Range of the heuristic's affected-employee placeholder. The value is not
/// derived from the selection.
pub const AFFECTED_COUNT_RANGE: RangeInclusive<u32> = 5..=24;

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

/// Parse a change instruction with the thread-local generator for the count placeholder
pub fn parse_changes(text: &str) -> ChangeConfiguration {
    parse_changes_with_rng(text, &mut rand::thread_rng())
}

/// Parse a change instruction with plain keyword matching.
///
/// Everything except `affected_employee_count` is a pure function of `text`.
pub fn parse_changes_with_rng<R: Rng + ?Sized>(text: &str, rng: &mut R) -> ChangeConfiguration {
    let lower = text.to_lowercase();
    let mut changes = Vec::new();
    let mut requires_approval = false;

    if contains_any(&lower, &["promote", "promotion"]) {
        if lower.contains("senior") {
            changes.push(ChangeOperation::set(EmployeeField::JobTitle, "Senior Software Engineer"));
            changes.push(ChangeOperation::set(EmployeeField::Level, "L5"));
        }
        if lower.contains("manager") {
            changes.push(ChangeOperation::set(EmployeeField::JobTitle, "Manager"));
            changes.push(ChangeOperation::set(EmployeeField::Level, "M1"));
        }
    }

    if contains_any(&lower, &["salary", "compensation", "raise"]) {
        requires_approval = true;
        if lower.contains("band 2") {
            changes.push(ChangeOperation::set(EmployeeField::BaseCompensation, "Band 2"));
        } else if lower.contains("band 3") {
            changes.push(ChangeOperation::set(EmployeeField::BaseCompensation, "Band 3"));
        }
    }

    if lower.contains("bonus") {
        requires_approval = true;
        if lower.contains("20%") {
            changes.push(ChangeOperation::set(EmployeeField::BonusTarget, "20%"));
        } else if lower.contains("25%") {
            changes.push(ChangeOperation::set(EmployeeField::BonusTarget, "25%"));
        }
    }

    if contains_any(&lower, &["move to", "transfer"]) {
        if contains_any(&lower, &["epd", "engineering"]) {
            changes.push(ChangeOperation::set(EmployeeField::Department, "EPD"));
        } else if lower.contains("marketing") {
            changes.push(ChangeOperation::set(EmployeeField::Department, "Product Marketing"));
        }
    }

    if contains_any(&lower, &["remote", "work from home"]) {
        changes.push(ChangeOperation::set(EmployeeField::JobLocation, "Remote"));
    }

    let mut config = ChangeConfiguration::from_changes(changes, rng.gen_range(AFFECTED_COUNT_RANGE));
    config.requires_approval |= requires_approval;
    config
}
