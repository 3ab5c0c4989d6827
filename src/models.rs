use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::*;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = candidates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Candidate {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub experience_years: i32,
    pub skills: String,
    pub education: String,
    pub previous_company: String,
    pub linkedin_url: String,
    pub github_url: String,
    pub portfolio_url: String,
    pub cover_letter: String,
    pub resume_score: i32,
    pub diversity_score: i32,
    pub technical_score: i32,
    pub total_score: i32,
    pub selected: bool,
    pub selection_reason: Option<String>,
    pub created_at: NaiveDateTime,
    pub work_availability: String,
    pub salary_expectation: String,
    pub submitted_at: String,
}

/// Full column set written by an upsert. Columns not listed here (`selected`,
/// `selection_reason`, `created_at`) fall back to their table defaults, so a
/// replaced row never keeps its previous selection state.
#[derive(Debug, Clone, Default, PartialEq, Insertable, Deserialize, Serialize)]
#[diesel(table_name = candidates)]
#[serde(default)]
pub struct NewCandidate {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub experience_years: i32,
    pub skills: String,
    pub education: String,
    pub previous_company: String,
    pub linkedin_url: String,
    pub github_url: String,
    pub portfolio_url: String,
    pub cover_letter: String,
    pub resume_score: i32,
    pub diversity_score: i32,
    pub technical_score: i32,
    pub total_score: i32,
    pub work_availability: String,
    pub salary_expectation: String,
    pub submitted_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScoreUpdate {
    pub id: i32,
    pub technical_score: i32,
    pub resume_score: i32,
    pub diversity_score: i32,
    pub total_score: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectionUpdate {
    pub selected: bool,
    #[serde(default)]
    pub selection_reason: Option<String>,
}
