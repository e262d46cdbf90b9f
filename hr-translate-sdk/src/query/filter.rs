//! Applying a `SearchFilter` to employee records

use crate::employee::Employee;

use super::SearchFilter;

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Empty `wanted` matches everything; otherwise any entry may match
fn any_contained(field: &str, wanted: &[String]) -> bool {
    wanted.is_empty() || wanted.iter().any(|w| contains_ci(field, w))
}

fn quoted(values: &[String], separator: &str) -> String {
    values
        .iter()
        .map(|v| format!("\"{}\"", v))
        .collect::<Vec<_>>()
        .join(separator)
}

impl SearchFilter {
    /// Whether `employee` passes every populated category.
    ///
    /// Text comparisons are case-insensitive substring matches. Date bounds
    /// are inclusive. Search terms match against name or email.
    pub fn matches(&self, employee: &Employee) -> bool {
        if !any_contained(&employee.department, &self.departments)
            || !any_contained(&employee.job_title, &self.job_titles)
            || !any_contained(&employee.location, &self.locations)
            || !any_contained(&employee.manager, &self.managers)
        {
            return false;
        }

        if let Some(after) = self.start_date_after {
            if employee.start_date < after {
                return false;
            }
        }

        if let Some(before) = self.start_date_before {
            if employee.start_date > before {
                return false;
            }
        }

        self.search_terms.is_empty()
            || self
                .search_terms
                .iter()
                .any(|term| contains_ci(&employee.name, term) || contains_ci(&employee.email, term))
    }

    /// Employees that match, in input order
    pub fn apply<'a>(&self, employees: &'a [Employee]) -> Vec<&'a Employee> {
        employees.iter().filter(|e| self.matches(e)).collect()
    }

    /// Pseudo-SQL preview of the filter, or an empty string when it constrains nothing
    pub fn to_query_syntax(&self) -> String {
        let mut conditions = Vec::new();

        if !self.departments.is_empty() {
            conditions.push(format!("department IN ({})", quoted(&self.departments, ", ")));
        }
        if !self.job_titles.is_empty() {
            conditions.push(format!("jobTitle CONTAINS ({})", quoted(&self.job_titles, " OR ")));
        }
        if !self.locations.is_empty() {
            conditions.push(format!("location IN ({})", quoted(&self.locations, ", ")));
        }
        if let Some(after) = self.start_date_after {
            conditions.push(format!("startDate >= \"{}\"", after));
        }
        if let Some(before) = self.start_date_before {
            conditions.push(format!("startDate <= \"{}\"", before));
        }
        if !self.managers.is_empty() {
            conditions.push(format!("manager CONTAINS ({})", quoted(&self.managers, " OR ")));
        }
        if !self.search_terms.is_empty() {
            conditions.push(format!("(name OR email) CONTAINS ({})", quoted(&self.search_terms, " OR ")));
        }

        if conditions.is_empty() {
            return String::new();
        }

        format!("SELECT * FROM employees WHERE {}", conditions.join(" AND "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn employee(name: &str, department: &str, title: &str, location: &str, start: (i32, u32, u32)) -> Employee {
        Employee {
            id: name.to_lowercase(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            employee_id: format!("EMP-{}", name.len()),
            department: department.to_string(),
            job_title: title.to_string(),
            location: location.to_string(),
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            manager: "Dana Reyes".to_string(),
        }
    }

    fn roster() -> Vec<Employee> {
        vec![
            employee("Ada", "EPD", "Senior Software Engineer", "San Francisco", (2023, 1, 1)),
            employee("Grace", "Sales", "Sales Director", "New York", (2021, 6, 15)),
            employee("Linus", "EPD", "Engineering Manager", "Remote", (2023, 12, 31)),
            employee("Marie", "Legal", "Legal Counsel", "Chicago", (2024, 1, 1)),
        ]
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let employees = roster();
        assert_eq!(SearchFilter::default().apply(&employees).len(), 4);
        assert_eq!(SearchFilter::default().to_query_syntax(), "");
    }

    #[test]
    fn test_categories_combine_with_and() {
        let employees = roster();
        let filter = SearchFilter {
            departments: vec!["epd".to_string()],
            job_titles: vec!["engineer".to_string(), "director".to_string()],
            ..SearchFilter::default()
        };

        let names: Vec<_> = filter.apply(&employees).iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Ada", "Linus"]);
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let employees = roster();
        let filter = SearchFilter {
            start_date_after: NaiveDate::from_ymd_opt(2023, 1, 1),
            start_date_before: NaiveDate::from_ymd_opt(2023, 12, 31),
            ..SearchFilter::default()
        };

        let names: Vec<_> = filter.apply(&employees).iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Ada", "Linus"]);
    }

    #[test]
    fn test_search_terms_match_name_or_email() {
        let employees = roster();
        let filter = SearchFilter {
            search_terms: vec!["MARIE@".to_string()],
            ..SearchFilter::default()
        };
        assert_eq!(filter.apply(&employees).len(), 1);
    }

    #[test]
    fn test_query_syntax() {
        let filter = SearchFilter {
            departments: vec!["Sales".to_string(), "Legal".to_string()],
            job_titles: vec!["Manager".to_string(), "Director".to_string()],
            start_date_after: NaiveDate::from_ymd_opt(2023, 1, 1),
            ..SearchFilter::default()
        };

        assert_eq!(
            filter.to_query_syntax(),
            "SELECT * FROM employees WHERE department IN (\"Sales\", \"Legal\") \
             AND jobTitle CONTAINS (\"Manager\" OR \"Director\") AND startDate >= \"2023-01-01\""
        );
    }
}
