//! Keyword parser used when the model is unavailable

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use super::SearchFilter;

// ASCII word boundaries: a year directly followed by a CJK character still counts
static YEAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?-u:\b)(20\d{2})(?-u:\b)").expect("valid year regex"));

/// Department keyword and the synonyms that also select it
const DEPARTMENT_KEYWORDS: [(&str, &[&str]); 6] = [
    ("epd", &["engineering", "engineer"]),
    ("product marketing", &["marketing"]),
    ("sales", &[]),
    ("commercial", &[]),
    ("legal", &[]),
    ("customer success", &["success"]),
];

const JOB_TITLE_KEYWORDS: [(&[&str], &str); 5] = [
    (&["engineer", "developer"], "Engineer"),
    (&["manager"], "Manager"),
    (&["director"], "Director"),
    (&["senior"], "Senior"),
    (&["principal"], "Principal"),
];

const LOCATION_KEYWORDS: [(&[&str], &str); 5] = [
    (&["san francisco", "sf"], "San Francisco"),
    (&["new york", "ny", "nyc"], "New York"),
    (&["remote"], "Remote"),
    (&["chicago"], "Chicago"),
    (&["austin"], "Austin"),
];

/// Upper-case the first letter of each word, keeping acronyms intact
fn display_department(key: &str) -> String {
    if key == "epd" {
        return "EPD".to_string();
    }

    key.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

/// Parse a search query with plain keyword matching.
///
/// Matching is case-insensitive substring search, so short tokens like `sf`
/// or `ny` also fire inside longer words. The output is a pure function of
/// the input text.
pub fn parse_query(text: &str) -> SearchFilter {
    let lower = text.to_lowercase();
    let mut filter = SearchFilter::default();

    for (key, synonyms) in DEPARTMENT_KEYWORDS.iter() {
        if lower.contains(key) || contains_any(&lower, synonyms) {
            filter.departments.push(display_department(key));
        }
    }

    for (needles, title) in JOB_TITLE_KEYWORDS.iter() {
        if contains_any(&lower, needles) {
            filter.job_titles.push(title.to_string());
        }
    }

    for (needles, location) in LOCATION_KEYWORDS.iter() {
        if contains_any(&lower, needles) {
            filter.locations.push(location.to_string());
        }
    }

    if let Some(year) = YEAR_PATTERN
        .captures(&lower)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i32>().ok())
    {
        let first_day = NaiveDate::from_ymd_opt(year, 1, 1);
        let last_day = NaiveDate::from_ymd_opt(year, 12, 31);

        if lower.contains("before") || lower.contains("prior to") {
            filter.start_date_before = first_day;
        } else if lower.contains("after") || lower.contains("since") {
            filter.start_date_after = last_day;
        } else if lower.contains("in") || lower.contains("during") {
            filter.start_date_after = first_day;
            filter.start_date_before = last_day;
        }
    }

    filter.explanation = filter.describe();
    filter
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_managers_in_sales() {
        let filter = parse_query("All managers in Sales");

        assert_eq!(filter.departments, vec!["Sales"]);
        assert_eq!(filter.job_titles, vec!["Manager"]);
        assert!(filter.locations.is_empty());
        assert!(filter.start_date_after.is_none());
        assert_eq!(
            filter.explanation,
            "Applied filters based on your query: departments (Sales), job titles containing (Manager)"
        );
    }

    #[test]
    fn test_department_synonyms() {
        let filter = parse_query("senior engineers in customer success and marketing");

        assert_eq!(filter.departments, vec!["EPD", "Product Marketing", "Customer Success"]);
        assert_eq!(filter.job_titles, vec!["Engineer", "Senior"]);
    }

    #[test]
    fn test_location_aliases() {
        let filter = parse_query("developers in SF or NYC");
        assert_eq!(filter.locations, vec!["San Francisco", "New York"]);
        assert_eq!(filter.job_titles, vec!["Engineer"]);
    }

    #[test]
    fn test_year_keywords() {
        let filter = parse_query("hired in 2023");
        assert_eq!(filter.start_date_after, date(2023, 1, 1));
        assert_eq!(filter.start_date_before, date(2023, 12, 31));
        assert!(filter.explanation.ends_with("hired in 2023"));

        let filter = parse_query("joined before 2020");
        assert!(filter.start_date_after.is_none());
        assert_eq!(filter.start_date_before, date(2020, 1, 1));
        assert!(filter.explanation.ends_with("hired before 2020-01-01"));

        let filter = parse_query("people hired since 2021");
        assert_eq!(filter.start_date_after, date(2021, 12, 31));
        assert!(filter.start_date_before.is_none());
        assert!(filter.explanation.ends_with("hired after 2021-12-31"));

        // "before" wins over "after"
        let filter = parse_query("after lunch, before 2022");
        assert_eq!(filter.start_date_before, date(2022, 1, 1));
        assert!(filter.start_date_after.is_none());
    }

    #[test]
    fn test_year_next_to_non_ascii_text() {
        let filter = parse_query("hired in 2023年");
        assert_eq!(filter.start_date_after, date(2023, 1, 1));
        assert_eq!(filter.start_date_before, date(2023, 12, 31));

        // still no match inside a longer number
        let filter = parse_query("hired in 120235");
        assert!(filter.start_date_after.is_none());
    }

    #[test]
    fn test_empty_and_blank_input() {
        for text in ["", "   "] {
            let filter = parse_query(text);
            assert!(filter.is_empty());
            assert_eq!(filter.explanation, "Applied filters based on your query: general search terms");
        }
    }

    #[test]
    fn test_year_without_keyword_is_ignored() {
        let filter = parse_query("class of 2019");
        assert!(filter.start_date_after.is_none());
        assert!(filter.start_date_before.is_none());
    }

    #[test]
    fn test_nothing_recognised() {
        let filter = parse_query("xyzzy");
        assert!(filter.is_empty());
        assert_eq!(filter.explanation, "Applied filters based on your query: general search terms");
    }

    #[test]
    fn test_deterministic() {
        let text = "Directors in Legal in Austin hired after 2019";
        assert_eq!(parse_query(text), parse_query(text));
    }
}
