//! Query translation: free text to employee search filters

mod fallback;
mod filter;

pub use fallback::parse_query;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::{TranslatorConfig, DEFAULT_REFERENCE_YEAR};
use crate::core::schema::{self, null_as_empty, OutputSchema};
use crate::core::GenerationRequest;
use crate::error::{Result, ServiceError};
use crate::translate::{Translation, Translator};
use crate::vocabulary::{COMMON_JOB_TITLES, DEPARTMENTS, LOCATIONS};

/// Prefix shared by every generated explanation
pub const EXPLANATION_PREFIX: &str = "Applied filters based on your query: ";

/// Explanation tail used when no category was populated
pub const GENERAL_SEARCH_TERMS: &str = "general search terms";

/// Structured employee search filter.
///
/// Empty lists mean "no constraint" for that category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilter {
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub departments: Vec<String>,

    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub job_titles: Vec<String>,

    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<String>,

    #[serde(default, deserialize_with = "lenient_date", skip_serializing_if = "Option::is_none")]
    pub start_date_after: Option<NaiveDate>,

    #[serde(default, deserialize_with = "lenient_date", skip_serializing_if = "Option::is_none")]
    pub start_date_before: Option<NaiveDate>,

    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub managers: Vec<String>,

    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub search_terms: Vec<String>,

    pub explanation: String,
}

/// `null`, missing and blank strings are all "no date"; anything else must be YYYY-MM-DD
fn lenient_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Trim, drop blanks and remove duplicates while keeping first-seen order
fn normalize_set(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let value = value.trim().to_string();
        if !value.is_empty() && !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

impl SearchFilter {
    /// True when the filter constrains nothing
    pub fn is_empty(&self) -> bool {
        self.departments.is_empty()
            && self.job_titles.is_empty()
            && self.locations.is_empty()
            && self.start_date_after.is_none()
            && self.start_date_before.is_none()
            && self.managers.is_empty()
            && self.search_terms.is_empty()
    }

    /// Check the date-range invariant
    pub fn validate(&self) -> Result<()> {
        if let (Some(after), Some(before)) = (self.start_date_after, self.start_date_before) {
            if after > before {
                return Err(ServiceError::validation(format!(
                    "startDateAfter {} is later than startDateBefore {}",
                    after, before
                )));
            }
        }
        Ok(())
    }

    /// Sentence describing the populated categories, in a fixed order:
    /// departments, job titles, locations, dates.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();

        if !self.departments.is_empty() {
            parts.push(format!("departments ({})", self.departments.join(", ")));
        }
        if !self.job_titles.is_empty() {
            parts.push(format!("job titles containing ({})", self.job_titles.join(", ")));
        }
        if !self.locations.is_empty() {
            parts.push(format!("locations ({})", self.locations.join(", ")));
        }
        match (self.start_date_after, self.start_date_before) {
            (Some(after), Some(before)) => {
                if after.year() == before.year() && after.ordinal() == 1 && before.month() == 12 && before.day() == 31 {
                    parts.push(format!("hired in {}", after.year()));
                } else {
                    parts.push(format!("hired between {} and {}", after, before));
                }
            }
            (Some(after), None) => parts.push(format!("hired after {}", after)),
            (None, Some(before)) => parts.push(format!("hired before {}", before)),
            (None, None) => {}
        }

        let tail = if parts.is_empty() {
            GENERAL_SEARCH_TERMS.to_string()
        } else {
            parts.join(", ")
        };

        format!("{}{}", EXPLANATION_PREFIX, tail)
    }
}

/// Query translation: free text to `SearchFilter`
#[derive(Debug, Clone)]
pub struct QueryTranslation {
    reference_year: i32,
}

impl Default for QueryTranslation {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_YEAR)
    }
}

impl QueryTranslation {
    /// Create a query translation whose prompt states `reference_year` as the current year
    pub fn new(reference_year: i32) -> Self {
        Self { reference_year }
    }

    /// System prompt describing the search vocabulary
    pub fn system_prompt(&self) -> String {
        format!(
            "You are an HR system assistant that converts natural language queries into structured employee filters.\n\n\
             Available departments: {departments}\n\
             Available locations: {locations}\n\
             Common job titles: {titles}\n\n\
             Convert the user's natural language query into appropriate filters. Be flexible with matching - \
             if they say \"engineers\" match any engineering titles, if they say \"SF\" match \"San Francisco\", etc.\n\n\
             For dates, assume current year is {year}. If they say \"hired in {example}\" use startDateAfter: \"{example}-01-01\" \
             and startDateBefore: \"{example}-12-31\". Use null for any filter that does not apply.",
            departments = DEPARTMENTS.join(", "),
            locations = LOCATIONS.join(", "),
            titles = COMMON_JOB_TITLES.join(", "),
            year = self.reference_year,
            example = self.reference_year - 1,
        )
    }

    /// Output schema for `SearchFilter`
    pub fn schema() -> OutputSchema {
        OutputSchema::new(
            "employee_search_filter",
            schema::strict_object(vec![
                ("departments", schema::nullable_string_list("Department names to filter by")),
                ("jobTitles", schema::nullable_string_list("Job titles or roles to filter by")),
                ("locations", schema::nullable_string_list("Office locations to filter by")),
                ("startDateAfter", schema::nullable_string("Start date after this date (YYYY-MM-DD format)")),
                ("startDateBefore", schema::nullable_string("Start date before this date (YYYY-MM-DD format)")),
                ("managers", schema::nullable_string_list("Manager names to filter by")),
                ("searchTerms", schema::nullable_string_list("General search terms for names or emails")),
                ("explanation", schema::string("Brief explanation of what filters were applied")),
            ]),
        )
    }
}

impl Translation for QueryTranslation {
    type Input = str;
    type Output = SearchFilter;

    fn name(&self) -> &'static str {
        "query"
    }

    fn text<'a>(&self, input: &'a str) -> &'a str {
        input
    }

    fn request(&self, input: &str) -> GenerationRequest {
        GenerationRequest {
            system_prompt: self.system_prompt(),
            user_prompt: format!("Convert this employee search query into filters: \"{}\"", input),
            schema: Self::schema(),
        }
    }

    fn accept(&self, output: SearchFilter) -> Result<SearchFilter> {
        let mut filter = SearchFilter {
            departments: normalize_set(output.departments),
            job_titles: normalize_set(output.job_titles),
            locations: normalize_set(output.locations),
            managers: normalize_set(output.managers),
            search_terms: normalize_set(output.search_terms),
            ..output
        };

        filter.validate()?;

        if filter.explanation.trim().is_empty() {
            filter.explanation = filter.describe();
        }

        Ok(filter)
    }

    fn fallback(&self, input: &str) -> SearchFilter {
        parse_query(input)
    }
}

/// Translator from free text to `SearchFilter`
pub type QueryTranslator = Translator<QueryTranslation>;

impl Translator<QueryTranslation> {
    /// Build a query translator from translator settings
    pub fn from_config(config: &TranslatorConfig) -> Self {
        Translator::new(QueryTranslation::new(config.reference_year), &config.openai)
    }

    /// Translate a free-text employee search query
    pub async fn translate_query(&self, text: &str) -> crate::translate::ResultEnvelope<SearchFilter> {
        self.translate(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_strict_model_output() {
        let filter: SearchFilter = serde_json::from_value(json!({
            "departments": ["Sales", "Sales", " "],
            "jobTitles": null,
            "locations": ["San Francisco"],
            "startDateAfter": "2023-01-01",
            "startDateBefore": "2023-12-31",
            "managers": null,
            "searchTerms": null,
            "explanation": "Sales in SF hired in 2023"
        }))
        .unwrap();

        let filter = QueryTranslation::default().accept(filter).unwrap();
        assert_eq!(filter.departments, vec!["Sales"]);
        assert!(filter.job_titles.is_empty());
        assert_eq!(filter.start_date_after, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(filter.start_date_before, NaiveDate::from_ymd_opt(2023, 12, 31));
    }

    #[test]
    fn test_inverted_dates_rejected() {
        let filter: SearchFilter = serde_json::from_value(json!({
            "startDateAfter": "2024-01-01",
            "startDateBefore": "2023-01-01",
            "explanation": "x"
        }))
        .unwrap();

        assert!(QueryTranslation::default().accept(filter).is_err());
    }

    #[test]
    fn test_bad_date_format_fails_decoding() {
        let result = serde_json::from_value::<SearchFilter>(json!({
            "startDateAfter": "last spring",
            "explanation": "x"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_explanation_is_filled() {
        let filter = SearchFilter {
            locations: vec!["Remote".to_string()],
            ..SearchFilter::default()
        };

        let filter = QueryTranslation::default().accept(filter).unwrap();
        assert_eq!(filter.explanation, "Applied filters based on your query: locations (Remote)");
    }

    #[test]
    fn test_describe_date_ranges() {
        let filter = SearchFilter {
            start_date_after: NaiveDate::from_ymd_opt(2022, 3, 1),
            start_date_before: NaiveDate::from_ymd_opt(2022, 6, 30),
            ..SearchFilter::default()
        };
        assert!(filter.describe().ends_with("hired between 2022-03-01 and 2022-06-30"));
    }

    #[test]
    fn test_serialized_dates_and_omitted_lists() {
        let filter = SearchFilter {
            start_date_after: NaiveDate::from_ymd_opt(2023, 1, 1),
            explanation: "x".to_string(),
            ..SearchFilter::default()
        };

        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({ "startDateAfter": "2023-01-01", "explanation": "x" })
        );
    }

    #[test]
    fn test_prompt_mentions_vocabulary_and_year() {
        let translation = QueryTranslation::new(2024);
        let request = translation.request("engineers in SF");

        assert!(request.system_prompt.contains("Customer Success"));
        assert!(request.system_prompt.contains("Los Angeles"));
        assert!(request.system_prompt.contains("assume current year is 2024"));
        assert!(request.system_prompt.contains("\"hired in 2023\""));
        assert!(request.user_prompt.ends_with("\"engineers in SF\""));
        assert_eq!(request.schema.name, "employee_search_filter");
        assert_eq!(request.schema.property_names().len(), 8);
    }
}
