use anyhow::Context;
use serde::Serialize;
use tracing::{info, warn};

use crate::batch::{self, BatchFailure};
use crate::models::{Candidate, NewCandidate, ScoreUpdate};
use crate::store::CandidateStore;

pub const MAX_SUB_SCORE: i32 = 100;

const TECHNICAL_KEYWORDS: &[(&[&str], i32)] = &[
    (&["react"], 15),
    (&["node.js", "nodejs"], 15),
    (&["python"], 12),
    (&["aws", "cloud"], 10),
    (&["docker"], 8),
    (&["javascript"], 10),
    (&["java"], 10),
];

const EXPERIENCE_POINTS_PER_YEAR: i32 = 2;
const EXPERIENCE_POINTS_CAP: i32 = 20;

const NOTABLE_EMPLOYERS: &[&str] = &["google", "apple", "meta", "amazon", "microsoft"];
const NOTABLE_SCHOOLS: &[&str] = &["stanford", "mit"];

const TECH_HUB: &str = "san francisco";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub technical: f64,
    pub resume: f64,
    pub diversity: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            technical: 0.4,
            resume: 0.35,
            diversity: 0.25,
        }
    }
}

/// The candidate fields the scoring heuristics look at.
#[derive(Debug, Clone, Copy)]
pub struct Profile<'a> {
    pub skills: &'a str,
    pub education: &'a str,
    pub previous_company: &'a str,
    pub location: &'a str,
    pub experience_years: i32,
}

impl<'a> From<&'a Candidate> for Profile<'a> {
    fn from(candidate: &'a Candidate) -> Self {
        Self {
            skills: &candidate.skills,
            education: &candidate.education,
            previous_company: &candidate.previous_company,
            location: &candidate.location,
            experience_years: candidate.experience_years,
        }
    }
}

impl<'a> From<&'a NewCandidate> for Profile<'a> {
    fn from(candidate: &'a NewCandidate) -> Self {
        Self {
            skills: &candidate.skills,
            education: &candidate.education,
            previous_company: &candidate.previous_company,
            location: &candidate.location,
            experience_years: candidate.experience_years,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scores {
    pub technical: i32,
    pub resume: i32,
    pub diversity: i32,
    pub total: i32,
}

impl Scores {
    /// Clamps each sub-score to `0..=100` and derives the weighted total from the
    /// clamped values.
    pub fn weighted(technical: i32, resume: i32, diversity: i32, weights: &ScoringWeights) -> Self {
        let technical = technical.clamp(0, MAX_SUB_SCORE);
        let resume = resume.clamp(0, MAX_SUB_SCORE);
        let diversity = diversity.clamp(0, MAX_SUB_SCORE);
        let total = (f64::from(technical) * weights.technical
            + f64::from(resume) * weights.resume
            + f64::from(diversity) * weights.diversity)
            .round() as i32;

        Self {
            technical,
            resume,
            diversity,
            total,
        }
    }

    pub fn into_update(self, id: i32) -> ScoreUpdate {
        ScoreUpdate {
            id,
            technical_score: self.technical,
            resume_score: self.resume,
            diversity_score: self.diversity,
            total_score: self.total,
        }
    }
}

pub fn score(profile: Profile<'_>) -> Scores {
    score_with_weights(profile, &ScoringWeights::default())
}

pub fn score_with_weights(profile: Profile<'_>, weights: &ScoringWeights) -> Scores {
    Scores::weighted(
        technical_score(&profile),
        resume_score(&profile),
        diversity_score(&profile),
        weights,
    )
}

/// Scores every candidate independently and returns the rows to persist.
pub fn score_all(candidates: &[Candidate]) -> Vec<ScoreUpdate> {
    candidates
        .iter()
        .map(|candidate| score(Profile::from(candidate)).into_update(candidate.id))
        .collect()
}

/// Writes every update concurrently. Updates for unknown ids change nothing and
/// are not errors. Returns the number of rows changed.
pub async fn persist_scores(
    store: &dyn CandidateStore,
    updates: Vec<ScoreUpdate>,
) -> Result<usize, BatchFailure> {
    let outcome = batch::run_all(
        updates
            .into_iter()
            .map(|update| store.update_scores(update)),
    )
    .await;
    if let Some(err) = &outcome.first_error {
        warn!(
            attempted = outcome.attempted,
            failed = outcome.failed,
            error = %err,
            "score updates failed"
        );
    }
    Ok(outcome.into_result()?.into_iter().sum())
}

/// Scores every stored candidate and persists the results.
pub async fn rescore_all(store: &dyn CandidateStore) -> anyhow::Result<usize> {
    let candidates = store.list().await.context("failed to load candidates")?;
    let updates = score_all(&candidates);
    let scored = updates.len();
    persist_scores(store, updates).await?;
    info!(scored, "rescored candidates");
    Ok(scored)
}

fn technical_score(profile: &Profile<'_>) -> i32 {
    let skills = profile.skills.to_lowercase();
    let keyword_points: i32 = TECHNICAL_KEYWORDS
        .iter()
        .filter(|(needles, _)| needles.iter().any(|needle| skills.contains(needle)))
        .map(|(_, points)| points)
        .sum();
    let experience_points = profile
        .experience_years
        .saturating_mul(EXPERIENCE_POINTS_PER_YEAR)
        .min(EXPERIENCE_POINTS_CAP);

    keyword_points + experience_points
}

fn resume_score(profile: &Profile<'_>) -> i32 {
    let education = profile.education.to_lowercase();
    let company = profile.previous_company.to_lowercase();
    let mut points = 0;

    if education.contains("ms ") || education.contains("master") {
        points += 25;
    } else if education.contains("bs ") || education.contains("bachelor") {
        points += 20;
    }
    if NOTABLE_SCHOOLS.iter().any(|school| education.contains(school)) {
        points += 15;
    }
    if NOTABLE_EMPLOYERS
        .iter()
        .any(|employer| company.contains(employer))
    {
        points += 20;
    }

    points
}

fn diversity_score(profile: &Profile<'_>) -> i32 {
    let mut points = 0;
    if !profile.location.to_lowercase().contains(TECH_HUB) {
        points += 15;
    }
    if (2..=4).contains(&profile.experience_years) {
        points += 15;
    }
    points
}
