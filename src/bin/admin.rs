use std::env;
use std::path::Path;

use anyhow::{Context, Result};

use hireboard::{
    config::AppConfig,
    db, import,
    import::UploadedFile,
    presentation, scoring,
    store::{CandidateStore, SqliteCandidateStore},
};

const USAGE: &str = "Usage: admin <import FILE | rescore | team>";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("import") => match args.next() {
            Some(file) => import_file(&file).await?,
            None => {
                eprintln!("Missing file argument\n{USAGE}");
                std::process::exit(1);
            }
        },
        Some("rescore") => rescore().await?,
        Some("team") => print_team().await?,
        Some(cmd) => {
            eprintln!("Unknown command: {cmd}\n{USAGE}");
            std::process::exit(1);
        }
        None => {
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn open_store(config: &AppConfig) -> Result<SqliteCandidateStore> {
    tracing::info!(
        component = "admin",
        database_path = %config.database_path(),
        pool_size = config.database_max_pool_size,
        "loaded configuration"
    );
    let pool = db::init_pool_with_size(config.database_path(), config.database_max_pool_size)?;
    db::run_migrations(&pool)?;
    Ok(SqliteCandidateStore::new(pool).with_team_rules(config.enforce_team_rules))
}

async fn import_file(file: &str) -> Result<()> {
    let config = AppConfig::from_env()?;
    let store = open_store(&config)?;

    let bytes = std::fs::read(file).with_context(|| format!("failed to read {file}"))?;
    let original_name = Path::new(file)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(file)
        .to_string();

    std::fs::create_dir_all(&config.upload_dir).with_context(|| {
        format!(
            "failed to create upload directory {}",
            config.upload_dir.display()
        )
    })?;
    let upload = UploadedFile::persist_in(&config.upload_dir, original_name, &bytes)
        .context("failed to spool import file")?;

    let summary = import::import_upload(&store, upload).await?;
    println!("{}", summary.message());
    Ok(())
}

async fn rescore() -> Result<()> {
    let config = AppConfig::from_env()?;
    let store = open_store(&config)?;

    let scored = scoring::rescore_all(&store).await?;
    println!("Rescored {scored} candidates.");
    Ok(())
}

async fn print_team() -> Result<()> {
    let config = AppConfig::from_env()?;
    let store = open_store(&config)?;

    let selected = store.list_selected().await?;
    if selected.is_empty() {
        println!("No candidates selected.");
        return Ok(());
    }

    for candidate in &selected {
        println!(
            "{:>4}  {:<30} {:>3}  {}",
            candidate.id,
            candidate.name,
            candidate.total_score,
            candidate.selection_reason.as_deref().unwrap_or("")
        );
    }
    let summary = presentation::team_summary(&selected);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
