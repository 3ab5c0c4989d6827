use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::Router;
use hireboard::config::{AppConfig, DEFAULT_MAX_UPLOAD_BYTES};
use hireboard::db;
use hireboard::models::{Candidate, NewCandidate, ScoreUpdate, SelectionUpdate};
use hireboard::routes;
use hireboard::state::AppState;
use hireboard::store::{CandidateStore, SqliteCandidateStore, StoreError, StoreResult};
use http_body_util::BodyExt;
use serde::Serialize;
use serde_json::Value;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub struct TestApp {
    pub state: AppState,
    router: Router,
    sqlite: Arc<SqliteCandidateStore>,
    upload_dir: PathBuf,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Result<Self> {
        Self::build(true, |store| store).await
    }

    /// App with the team cap and reason requirement switched off.
    #[allow(dead_code)]
    pub async fn without_team_rules() -> Result<Self> {
        Self::build(false, |store| store).await
    }

    /// App whose handlers talk to `wrap(real store)` instead of the store itself.
    #[allow(dead_code)]
    pub async fn with_store<F>(wrap: F) -> Result<Self>
    where
        F: FnOnce(Arc<dyn CandidateStore>) -> Arc<dyn CandidateStore>,
    {
        Self::build(true, wrap).await
    }

    async fn build<F>(enforce_team_rules: bool, wrap: F) -> Result<Self>
    where
        F: FnOnce(Arc<dyn CandidateStore>) -> Arc<dyn CandidateStore>,
    {
        let dir = tempfile::tempdir().context("failed to create test directory")?;
        let upload_dir = dir.path().join("uploads");
        std::fs::create_dir_all(&upload_dir)?;
        let database_path = dir.path().join("hiring.db");

        let config = AppConfig {
            database_url: database_path.to_string_lossy().into_owned(),
            database_max_pool_size: db::DEFAULT_MAX_POOL_SIZE,
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            upload_dir: upload_dir.clone(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            cors_allowed_origin: None,
            enforce_team_rules,
        };

        let pool = db::init_pool(config.database_path())?;
        let migrate_pool = pool.clone();
        tokio::task::spawn_blocking(move || db::run_migrations(&migrate_pool))
            .await
            .context("migration task panicked")??;

        let sqlite =
            Arc::new(SqliteCandidateStore::new(pool).with_team_rules(config.enforce_team_rules));
        let real: Arc<dyn CandidateStore> = sqlite.clone();
        let store = wrap(real);
        let state = AppState::new(store, config);
        let router = routes::create_router(state.clone());

        Ok(Self {
            state,
            router,
            sqlite,
            upload_dir,
            _dir: dir,
        })
    }

    /// The real store, bypassing any wrapper installed with `with_store`.
    #[allow(dead_code)]
    pub fn sqlite(&self) -> &SqliteCandidateStore {
        &self.sqlite
    }

    /// Number of files left behind in the upload directory.
    #[allow(dead_code)]
    pub fn upload_dir_entries(&self) -> Result<usize> {
        Ok(std::fs::read_dir(&self.upload_dir)?.count())
    }

    #[allow(dead_code)]
    pub async fn insert_candidate(&self, candidate: NewCandidate) -> Result<i32> {
        Ok(self.sqlite.upsert(candidate).await?)
    }

    #[allow(dead_code)]
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<hyper::Response<Body>> {
        self.send_json(Method::POST, path, payload).await
    }

    #[allow(dead_code)]
    pub async fn put_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<hyper::Response<Body>> {
        self.send_json(Method::PUT, path, payload).await
    }

    #[allow(dead_code)]
    pub async fn post_empty(&self, path: &str) -> Result<hyper::Response<Body>> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .body(Body::empty())?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    pub async fn get(&self, path: &str) -> Result<hyper::Response<Body>> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    /// Multipart upload with the file in the `dataFile` field.
    #[allow(dead_code)]
    pub async fn upload_file(&self, filename: &str, data: &[u8]) -> Result<hyper::Response<Body>> {
        self.upload_field("dataFile", filename, data).await
    }

    #[allow(dead_code)]
    pub async fn upload_field(
        &self,
        field: &str,
        filename: &str,
        data: &[u8],
    ) -> Result<hyper::Response<Body>> {
        let boundary = "hireboard-test-boundary";
        let mut body = Vec::new();
        body.extend(format!("--{boundary}\r\n").as_bytes());
        body.extend(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend(data);
        body.extend(b"\r\n");
        body.extend(format!("--{boundary}--\r\n").as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/import")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    async fn send_json<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        payload: &T,
    ) -> Result<hyper::Response<Body>> {
        let body = serde_json::to_vec(payload)?;
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body))?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }
}

pub async fn body_to_vec(body: Body) -> Result<Vec<u8>> {
    let collected = body
        .collect()
        .await
        .map_err(|err| anyhow!("failed to read response body: {err}"))?;
    Ok(collected.to_bytes().to_vec())
}

#[allow(dead_code)]
pub async fn body_json(response: hyper::Response<Body>) -> Result<Value> {
    let bytes = body_to_vec(response.into_body()).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[allow(dead_code)]
pub fn candidate(name: &str, email: &str) -> NewCandidate {
    NewCandidate {
        name: name.to_string(),
        email: email.to_string(),
        ..NewCandidate::default()
    }
}

/// Delegates to a real store but fails upserts for matching emails and every
/// score update.
#[allow(dead_code)]
pub struct FailingStore {
    inner: Arc<dyn CandidateStore>,
    fail_email: String,
}

impl FailingStore {
    #[allow(dead_code)]
    pub fn new(inner: Arc<dyn CandidateStore>, fail_email: &str) -> Self {
        Self {
            inner,
            fail_email: fail_email.to_string(),
        }
    }
}

fn injected_failure() -> StoreError {
    StoreError::Database(diesel::result::Error::QueryBuilderError(
        "injected failure".into(),
    ))
}

#[async_trait]
impl CandidateStore for FailingStore {
    async fn list(&self) -> StoreResult<Vec<Candidate>> {
        self.inner.list().await
    }

    async fn list_selected(&self) -> StoreResult<Vec<Candidate>> {
        self.inner.list_selected().await
    }

    async fn find(&self, id: i32) -> StoreResult<Option<Candidate>> {
        self.inner.find(id).await
    }

    async fn upsert(&self, candidate: NewCandidate) -> StoreResult<i32> {
        if candidate.email == self.fail_email {
            return Err(injected_failure());
        }
        self.inner.upsert(candidate).await
    }

    async fn update_selection(&self, id: i32, update: SelectionUpdate) -> StoreResult<usize> {
        self.inner.update_selection(id, update).await
    }

    async fn update_scores(&self, _update: ScoreUpdate) -> StoreResult<usize> {
        Err(injected_failure())
    }
}
