use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use thiserror::Error;
use tokio::task;

use crate::db::SqlitePool;
use crate::models::{Candidate, NewCandidate, ScoreUpdate, SelectionUpdate};
use crate::presentation::{check_selection, SelectionRejection};
use crate::schema::candidates;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("database pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("store task failed: {0}")]
    Task(#[from] task::JoinError),
    #[error("candidate {0} not found")]
    NotFound(i32),
    #[error(transparent)]
    Rejected(#[from] SelectionRejection),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Candidate persistence, keyed by unique email.
#[async_trait]
pub trait CandidateStore: Send + Sync + 'static {
    /// All candidates, best total score first.
    async fn list(&self) -> StoreResult<Vec<Candidate>>;

    async fn list_selected(&self) -> StoreResult<Vec<Candidate>>;

    async fn find(&self, id: i32) -> StoreResult<Option<Candidate>>;

    /// Inserts the candidate or replaces the row sharing its email, returning the
    /// row id.
    async fn upsert(&self, candidate: NewCandidate) -> StoreResult<i32>;

    /// Returns the number of rows changed.
    async fn update_selection(&self, id: i32, update: SelectionUpdate) -> StoreResult<usize>;

    /// Returns the number of rows changed.
    async fn update_scores(&self, update: ScoreUpdate) -> StoreResult<usize>;
}

pub struct SqliteCandidateStore {
    pool: SqlitePool,
    enforce_team_rules: bool,
}

impl SqliteCandidateStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            enforce_team_rules: true,
        }
    }

    pub fn with_team_rules(mut self, enforce: bool) -> Self {
        self.enforce_team_rules = enforce;
        self
    }

    async fn with_conn<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut SqliteConnection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await?
    }
}

#[async_trait]
impl CandidateStore for SqliteCandidateStore {
    async fn list(&self) -> StoreResult<Vec<Candidate>> {
        self.with_conn(|conn| {
            let rows = candidates::table
                .order((candidates::total_score.desc(), candidates::id.asc()))
                .select(Candidate::as_select())
                .load(conn)?;
            Ok(rows)
        })
        .await
    }

    async fn list_selected(&self) -> StoreResult<Vec<Candidate>> {
        self.with_conn(|conn| {
            let rows = candidates::table
                .filter(candidates::selected.eq(true))
                .order((candidates::total_score.desc(), candidates::id.asc()))
                .select(Candidate::as_select())
                .load(conn)?;
            Ok(rows)
        })
        .await
    }

    async fn find(&self, id: i32) -> StoreResult<Option<Candidate>> {
        self.with_conn(move |conn| {
            let row = candidates::table
                .find(id)
                .select(Candidate::as_select())
                .first(conn)
                .optional()?;
            Ok(row)
        })
        .await
    }

    async fn upsert(&self, candidate: NewCandidate) -> StoreResult<i32> {
        self.with_conn(move |conn| {
            diesel::replace_into(candidates::table)
                .values(&candidate)
                .execute(conn)?;
            let id = candidates::table
                .filter(candidates::email.eq(&candidate.email))
                .select(candidates::id)
                .first(conn)?;
            Ok(id)
        })
        .await
    }

    async fn update_selection(&self, id: i32, update: SelectionUpdate) -> StoreResult<usize> {
        let enforce = self.enforce_team_rules;
        self.with_conn(move |conn| {
            conn.immediate_transaction::<_, StoreError, _>(|conn| {
                let reason = if enforce {
                    let current: Option<bool> = candidates::table
                        .find(id)
                        .select(candidates::selected)
                        .first(conn)
                        .optional()?;
                    match current {
                        Some(already_selected) => {
                            let others: i64 = candidates::table
                                .filter(candidates::selected.eq(true))
                                .filter(candidates::id.ne(id))
                                .count()
                                .get_result(conn)?;
                            check_selection(already_selected, others as usize, &update)?
                        }
                        None if update.selected => return Err(StoreError::NotFound(id)),
                        None => None,
                    }
                } else if update.selected {
                    update.selection_reason.clone()
                } else {
                    None
                };

                let changed = diesel::update(candidates::table.find(id))
                    .set((
                        candidates::selected.eq(update.selected),
                        candidates::selection_reason.eq(reason),
                    ))
                    .execute(conn)?;
                Ok(changed)
            })
        })
        .await
    }

    async fn update_scores(&self, update: ScoreUpdate) -> StoreResult<usize> {
        self.with_conn(move |conn| {
            let changed = diesel::update(candidates::table.find(update.id))
                .set((
                    candidates::technical_score.eq(update.technical_score),
                    candidates::resume_score.eq(update.resume_score),
                    candidates::diversity_score.eq(update.diversity_score),
                    candidates::total_score.eq(update.total_score),
                ))
                .execute(conn)?;
            Ok(changed)
        })
        .await
    }
}
