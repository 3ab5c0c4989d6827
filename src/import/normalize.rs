use serde_json::{Map, Value};

use crate::import::extract::{
    describe_education, join_skills, most_recent_employer, primary_salary,
    rounded_experience_years,
};
use crate::models::NewCandidate;
use crate::utils::json::{first_present, join_list, present_text, text_or_empty};

/// A parsed import record, classified once by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCandidate {
    /// Nested export format carrying `work_experiences`, structured education and
    /// salary data.
    Nested(Map<String, Value>),
    /// Flat record with scalar fields and case-variant aliases, as found in CSV.
    Legacy(Map<String, Value>),
}

impl RawCandidate {
    /// Classifies a JSON element. Non-object elements become empty legacy records.
    pub fn classify(value: Value) -> Self {
        let record = match value {
            Value::Object(record) => record,
            _ => Map::new(),
        };

        let nested = matches!(
            record.get("work_experiences"),
            Some(value) if !matches!(value, Value::Null | Value::Bool(false))
        );
        if nested {
            Self::Nested(record)
        } else {
            Self::Legacy(record)
        }
    }

    /// CSV rows never carry nested data.
    pub fn from_csv_row(headers: &csv::StringRecord, row: &csv::StringRecord) -> Self {
        let record = headers
            .iter()
            .zip(row.iter())
            .map(|(header, field)| (header.to_string(), Value::String(field.to_string())))
            .collect();
        Self::Legacy(record)
    }

    pub fn normalize(&self) -> NewCandidate {
        match self {
            Self::Nested(record) => normalize_nested(record),
            Self::Legacy(record) => normalize_legacy(record),
        }
    }
}

fn normalize_nested(record: &Map<String, Value>) -> NewCandidate {
    let work_history = record.get("work_experiences");

    NewCandidate {
        name: text_or_empty(record, &["name"]),
        email: text_or_empty(record, &["email"]),
        phone: text_or_empty(record, &["phone"]),
        location: text_or_empty(record, &["location"]),
        experience_years: rounded_experience_years(work_history),
        skills: join_skills(record.get("skills")),
        education: describe_education(record.get("education")),
        previous_company: most_recent_employer(work_history),
        linkedin_url: text_or_empty(record, &["linkedin_url"]),
        github_url: text_or_empty(record, &["github_url"]),
        portfolio_url: text_or_empty(record, &["portfolio_url"]),
        cover_letter: text_or_empty(record, &["cover_letter"]),
        work_availability: join_list(record.get("work_availability")),
        salary_expectation: primary_salary(record.get("annual_salary_expectation")),
        submitted_at: text_or_empty(record, &["submitted_at"]),
        ..NewCandidate::default()
    }
}

fn normalize_legacy(record: &Map<String, Value>) -> NewCandidate {
    NewCandidate {
        name: text_or_empty(record, &["name", "Name"]),
        email: text_or_empty(record, &["email", "Email"]),
        phone: text_or_empty(record, &["phone", "Phone"]),
        location: text_or_empty(record, &["location", "Location"]),
        experience_years: leading_integer(first_present(
            record,
            &["experience_years", "Experience", "experienceYears"],
        )),
        skills: join_list(first_present(record, &["skills", "Skills"])),
        education: text_or_empty(record, &["education", "Education"]),
        previous_company: text_or_empty(record, &["previous_company", "Company", "previousCompany"]),
        linkedin_url: text_or_empty(record, &["linkedin_url", "LinkedIn", "linkedinUrl"]),
        github_url: text_or_empty(record, &["github_url", "GitHub", "githubUrl"]),
        portfolio_url: text_or_empty(record, &["portfolio_url", "Portfolio", "portfolioUrl"]),
        cover_letter: text_or_empty(record, &["cover_letter", "CoverLetter", "coverLetter"]),
        work_availability: text_or_empty(record, &["work_availability"]),
        salary_expectation: text_or_empty(record, &["salary_expectation"]),
        submitted_at: text_or_empty(record, &["submitted_at"]),
        ..NewCandidate::default()
    }
}

/// Parses the leading integer of a number or string (`"5 years"` gives 5,
/// `3.9` gives 3). Unparseable input and negatives give 0.
fn leading_integer(value: Option<&Value>) -> i32 {
    let Some(text) = present_text(value) else {
        return 0;
    };
    let trimmed = text.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    digits[..end]
        .parse::<i64>()
        .map(|years| (sign * years).clamp(0, i64::from(i32::MAX)) as i32)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn work_experiences_selects_nested_shape() {
        assert!(matches!(
            RawCandidate::classify(json!({ "work_experiences": [] })),
            RawCandidate::Nested(_)
        ));
        assert!(matches!(
            RawCandidate::classify(json!({ "work_experiences": null })),
            RawCandidate::Legacy(_)
        ));
        assert!(matches!(
            RawCandidate::classify(json!({ "name": "Ada" })),
            RawCandidate::Legacy(_)
        ));
        assert_eq!(
            RawCandidate::classify(json!(42)),
            RawCandidate::Legacy(Map::new())
        );
    }

    #[test]
    fn nested_record_is_fully_extracted() {
        let raw = RawCandidate::classify(json!({
            "name": "A",
            "email": "a@x.com",
            "location": "Austin, TX",
            "work_experiences": [
                { "company": "Acme", "roleName": "Eng" }
            ],
            "education": {
                "degrees": [{ "degree": "BS", "subject": "CS", "originalSchool": "MIT" }]
            },
            "skills": ["React", "AWS"],
            "work_availability": ["full-time", "contract"],
            "annual_salary_expectation": { "full-time": "$120000" },
            "submitted_at": "2025-01-15 10:00:00"
        }));

        let candidate = raw.normalize();
        assert_eq!(candidate.name, "A");
        assert_eq!(candidate.email, "a@x.com");
        assert_eq!(candidate.location, "Austin, TX");
        assert_eq!(candidate.skills, "React, AWS");
        assert_eq!(candidate.education, "BS in CS from MIT");
        assert_eq!(candidate.previous_company, "Acme");
        assert_eq!(candidate.experience_years, 1);
        assert_eq!(candidate.work_availability, "full-time, contract");
        assert_eq!(candidate.salary_expectation, "$120000");
        assert_eq!(candidate.submitted_at, "2025-01-15 10:00:00");
        assert_eq!(candidate.total_score, 0);
    }

    #[test]
    fn legacy_reads_aliases() {
        let raw = RawCandidate::classify(json!({
            "Name": "Grace",
            "Email": "grace@example.com",
            "Experience": "7",
            "Skills": "COBOL, Fortran",
            "Company": "Navy",
            "LinkedIn": "https://linkedin.com/in/grace",
            "CoverLetter": "Hello"
        }));

        let candidate = raw.normalize();
        assert_eq!(candidate.name, "Grace");
        assert_eq!(candidate.email, "grace@example.com");
        assert_eq!(candidate.experience_years, 7);
        assert_eq!(candidate.skills, "COBOL, Fortran");
        assert_eq!(candidate.previous_company, "Navy");
        assert_eq!(candidate.linkedin_url, "https://linkedin.com/in/grace");
        assert_eq!(candidate.cover_letter, "Hello");
        assert_eq!(candidate.phone, "");
    }

    #[test]
    fn canonical_name_wins_over_alias() {
        let raw = RawCandidate::classify(json!({
            "experience_years": 4,
            "experienceYears": 9,
            "previous_company": "Initech",
            "previousCompany": "Globex"
        }));
        let candidate = raw.normalize();
        assert_eq!(candidate.experience_years, 4);
        assert_eq!(candidate.previous_company, "Initech");
    }

    #[test]
    fn experience_parse_degrades_to_zero() {
        assert_eq!(leading_integer(Some(&json!("5 years"))), 5);
        assert_eq!(leading_integer(Some(&json!(3.9))), 3);
        assert_eq!(leading_integer(Some(&json!("  12"))), 12);
        assert_eq!(leading_integer(Some(&json!("senior"))), 0);
        assert_eq!(leading_integer(Some(&json!("-3"))), 0);
        assert_eq!(leading_integer(Some(&json!(""))), 0);
        assert_eq!(leading_integer(None), 0);
    }

    #[test]
    fn csv_rows_are_always_legacy() {
        let headers = csv::StringRecord::from(vec!["name", "email", "work_experiences"]);
        let row = csv::StringRecord::from(vec!["Linus", "linus@example.com", "Transmeta"]);
        let raw = RawCandidate::from_csv_row(&headers, &row);
        assert!(matches!(raw, RawCandidate::Legacy(_)));
        let candidate = raw.normalize();
        assert_eq!(candidate.name, "Linus");
        assert_eq!(candidate.experience_years, 0);
    }
}
