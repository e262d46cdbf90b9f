//! Employee records as seen by the bulk-edit wizard

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A row of the employees table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub email: String,
    pub employee_id: String,
    pub department: String,
    pub job_title: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub manager: String,
}
