//! # Client Binary Entry Point
//!
//! Thin wrapper around the courses page and the API gateway.
//!
//! ## Usage
//!
//! ```bash
//! STUDY_COACH_API_URL=https://backend.example.com cargo run --bin client -- list
//! cargo run --bin client -- --config config/client.toml add \
//!   --name "CSE 316" --term-start 2024-01-22 --term-end 2024-05-10 --exam 2024-05-06
//! ```
//!
//! The client will:
//! 1. Load configuration from the optional TOML file
//! 2. Resolve the base URL (`STUDY_COACH_API_URL` wins over the file)
//! 3. Open the file-backed session store
//! 4. Run the command, reporting classified failures to the user
//! 5. Export request metrics to JSON (if --metrics-output is given)

use anyhow::{anyhow, Context};
use clap::Parser;
use log::info;
use std::sync::{Arc, Mutex};

use study_coach::cli::{render_courses, Args, Command};
use study_coach::client::courses::{describe_failure, CoursesPage, PageError};
use study_coach::client::session::{self, FileStore, RecordingNavigator};
use study_coach::client::{ApiClient, ClientMetrics};
use study_coach::common::config::{ClientSettings, API_URL_ENV};
use study_coach::utils::init_logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => ClientSettings::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path))?,
        None => ClientSettings::default(),
    };

    let session_path = args
        .session_file
        .clone()
        .unwrap_or_else(|| settings.session.path.clone());
    let store = Arc::new(FileStore::new(&session_path));

    // Session bookkeeping never touches the network.
    match &args.command {
        Command::Login { token, user } => {
            session::store_session(store.as_ref(), token, user.as_deref())?;
            println!("Credential stored in {}", session_path);
            return Ok(());
        }
        Command::Logout => {
            session::clear_session(store.as_ref())?;
            println!("Credential removed from {}", session_path);
            return Ok(());
        }
        _ => {}
    }

    let env_value = std::env::var(API_URL_ENV).ok();
    let config = settings.api_config(env_value.as_deref())?;

    let navigator = Arc::new(RecordingNavigator::at(settings.session.current_path.clone()));
    let mut api = ApiClient::with_session(&config, store, navigator.clone())?;

    // Initialize metrics if output path is specified
    let metrics = args
        .metrics_output
        .as_ref()
        .map(|_| Arc::new(Mutex::new(ClientMetrics::new("client".to_string()))));
    if let Some(m) = &metrics {
        api = api.with_metrics(m.clone());
    }

    let outcome = run_command(&args.command, api).await;

    if let (Some(metrics), Some(output_path)) = (metrics, &args.metrics_output) {
        let metrics = metrics
            .lock()
            .map_err(|_| anyhow!("metrics lock poisoned"))?;
        metrics.export_to_json(output_path)?;
        info!("Metrics exported to: {}", output_path);
    }

    match outcome {
        Ok(output) => {
            print!("{}", output);
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", describe_failure(&err));
            if let Some(target) = navigator.redirects().last() {
                eprintln!("Redirected to {}", target);
            }
            Err(err.into())
        }
    }
}

async fn run_command(command: &Command, api: ApiClient) -> Result<String, PageError> {
    match command {
        Command::Health => {
            let health = api.health().await?;
            Ok(format!("Backend status: {}\n", health.status))
        }
        Command::List => {
            let mut page = CoursesPage::new(api);
            let courses = page.load().await?;
            Ok(render_courses(courses))
        }
        Command::Add { .. } => {
            let form = command.course_form().unwrap_or_default();
            let mut page = CoursesPage::new(api);
            let created = page.add(&form).await?;
            Ok(format!(
                "Saved course '{}' (id {})\n{}",
                created.name,
                created.id,
                render_courses(page.courses())
            ))
        }
        Command::Login { .. } | Command::Logout => Ok(String::new()),
    }
}
