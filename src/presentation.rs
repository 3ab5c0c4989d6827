use std::cmp::Ordering;
use std::collections::HashSet;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::models::{Candidate, SelectionUpdate};

pub const TEAM_CAPACITY: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    TotalScore,
    ExperienceYears,
    Name,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "total_score" => Ok(Self::TotalScore),
            "experience_years" => Ok(Self::ExperienceYears),
            "name" => Ok(Self::Name),
            other => Err(format!("unknown sort key `{other}`")),
        }
    }
}

/// Keeps candidates whose name, skills or location contain `query`, ignoring case.
/// A blank query keeps everyone.
pub fn filter_candidates(candidates: Vec<Candidate>, query: &str) -> Vec<Candidate> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return candidates;
    }
    candidates
        .into_iter()
        .filter(|candidate| {
            [&candidate.name, &candidate.skills, &candidate.location]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Stable sort: scores and experience descending, names ascending.
pub fn sort_candidates(candidates: &mut [Candidate], key: SortKey) {
    match key {
        SortKey::TotalScore => candidates.sort_by(|a, b| b.total_score.cmp(&a.total_score)),
        SortKey::ExperienceYears => {
            candidates.sort_by(|a, b| b.experience_years.cmp(&a.experience_years))
        }
        SortKey::Name => candidates.sort_by(|a, b| compare_names(&a.name, &b.name)),
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExperienceTier {
    Junior,
    #[serde(rename = "Mid-level")]
    MidLevel,
    Senior,
}

impl ExperienceTier {
    pub fn for_years(years: i32) -> Self {
        match years {
            i32::MIN..=2 => Self::Junior,
            3..=5 => Self::MidLevel,
            _ => Self::Senior,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSummary {
    pub size: usize,
    pub capacity: usize,
    pub remaining: usize,
    pub locations: Vec<String>,
    pub experience_levels: Vec<ExperienceTier>,
    pub skill_count: usize,
    pub average_score: Option<f64>,
}

/// Diversity overview of the selected team. Lists keep first-seen order.
pub fn team_summary(selected: &[Candidate]) -> TeamSummary {
    let mut locations = Vec::new();
    let mut seen_locations = HashSet::new();
    let mut experience_levels = Vec::new();
    let mut skills = HashSet::new();

    for candidate in selected {
        if seen_locations.insert(candidate.location.as_str()) {
            locations.push(candidate.location.clone());
        }
        let tier = ExperienceTier::for_years(candidate.experience_years);
        if !experience_levels.contains(&tier) {
            experience_levels.push(tier);
        }
        skills.extend(
            candidate
                .skills
                .split(',')
                .map(str::trim)
                .filter(|skill| !skill.is_empty()),
        );
    }

    let average_score = (!selected.is_empty()).then(|| {
        let total: i64 = selected.iter().map(|c| i64::from(c.total_score)).sum();
        total as f64 / selected.len() as f64
    });

    TeamSummary {
        size: selected.len(),
        capacity: TEAM_CAPACITY,
        remaining: TEAM_CAPACITY.saturating_sub(selected.len()),
        locations,
        experience_levels,
        skill_count: skills.len(),
        average_score,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionRejection {
    #[error("You can only select up to 5 candidates")]
    TeamFull,
    #[error("a selection reason is required when selecting a candidate")]
    MissingReason,
}

/// Applies the team rules to a selection request and returns the reason to
/// store. `others_selected` counts selected candidates other than the target.
pub fn check_selection(
    already_selected: bool,
    others_selected: usize,
    update: &SelectionUpdate,
) -> Result<Option<String>, SelectionRejection> {
    if !update.selected {
        return Ok(None);
    }

    let reason = update
        .selection_reason
        .as_deref()
        .map(str::trim)
        .filter(|reason| !reason.is_empty())
        .ok_or(SelectionRejection::MissingReason)?;

    if !already_selected && others_selected >= TEAM_CAPACITY {
        return Err(SelectionRejection::TeamFull);
    }

    Ok(Some(reason.to_string()))
}
