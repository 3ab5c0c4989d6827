//! Field extractors for the nested import shape. Every function is total: missing
//! or oddly typed input degrades to an empty string or zero.

use serde_json::Value;

use crate::utils::json::{present_text, scalar_text};

const FULL_TIME: &str = "full-time";

/// Approximates tenure from the number of listed roles when no dates are given.
pub fn experience_years_from_work_history(entries: Option<&Value>) -> f64 {
    let count = match entries {
        Some(Value::Array(items)) => items.len(),
        _ => 0,
    };

    match count {
        0 => 0.0,
        1 => 1.0,
        2..=3 => count as f64 * 1.5,
        _ => count as f64 * 1.2,
    }
}

/// The stored form of [`experience_years_from_work_history`].
pub fn rounded_experience_years(entries: Option<&Value>) -> i32 {
    experience_years_from_work_history(entries).round() as i32
}

/// Every element is kept, blanks included, so positions match the source list.
pub fn join_skills(skills: Option<&Value>) -> String {
    match skills {
        Some(Value::Array(items)) => items.iter().map(scalar_text).collect::<Vec<_>>().join(", "),
        _ => String::new(),
    }
}

pub fn describe_education(education: Option<&Value>) -> String {
    let Some(education) = education.and_then(Value::as_object) else {
        return String::new();
    };

    match education.get("degrees") {
        Some(Value::Array(degrees)) => degrees
            .iter()
            .map(describe_degree)
            .collect::<Vec<_>>()
            .join("; "),
        _ => present_text(education.get("highest_level")).unwrap_or_default(),
    }
}

fn describe_degree(degree: &Value) -> String {
    let mut parts = Vec::new();
    if let Some(name) = present_text(degree.get("degree")) {
        parts.push(name);
    }
    if let Some(subject) = present_text(degree.get("subject")) {
        parts.push(format!("in {subject}"));
    }
    let school = present_text(degree.get("originalSchool"))
        .or_else(|| present_text(degree.get("school")));
    if let Some(school) = school {
        parts.push(format!("from {school}"));
    }
    parts.join(" ")
}

/// Work history is listed most recent first.
pub fn most_recent_employer(entries: Option<&Value>) -> String {
    entries
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(|first| present_text(first.get("company")))
        .unwrap_or_default()
}

pub fn primary_salary(salaries: Option<&Value>) -> String {
    match salaries {
        Some(Value::Object(map)) => present_text(map.get(FULL_TIME))
            .or_else(|| present_text(map.values().next()))
            .unwrap_or_default(),
        Some(Value::Array(items)) => present_text(items.first()).unwrap_or_default(),
        _ => String::new(),
    }
}
