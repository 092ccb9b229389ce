use crate::cli::Command;
use crate::config::Config;
use crate::data::models::SearchContext;
use crate::data::{PgStore, Store};
use crate::globalsearch::{ClassSearch, Navigator};
use crate::notify::Notifier;
use crate::notify::join::JoinNotifier;
use crate::scraper::refresh::{refresh_class_data, refresh_semester_data, sync_available_terms};
use crate::scraper::scheduler::WatchScheduler;
use crate::scraper::watch::WatchJob;
use crate::utils::fmt_duration;
use anyhow::Context;
use sqlx::ConnectOptions;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

/// Main application struct containing all necessary components
pub struct App {
    config: Config,
    store: Arc<dyn Store>,
    search: Arc<dyn ClassSearch>,
    notifier: Arc<dyn Notifier>,
}

impl App {
    /// Connect to the database, run migrations and build the HTTP clients.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let connect_options = PgConnectOptions::from_str(&config.database_url)
            .context("Failed to parse database URL")?
            .log_statements(tracing::log::LevelFilter::Debug)
            .log_slow_statements(tracing::log::LevelFilter::Warn, Duration::from_secs(1));

        let db_pool = PgPoolOptions::new()
            .min_connections(0)
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(4))
            .idle_timeout(Duration::from_secs(60 * 2))
            .max_lifetime(Duration::from_secs(60 * 30))
            .connect_with(connect_options)
            .await
            .context("Failed to create database pool")?;

        info!(
            max_connections = 4,
            acquire_timeout = "4s",
            idle_timeout = "2m",
            max_lifetime = "30m",
            "database pool established"
        );

        info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&db_pool)
            .await
            .context("Failed to run database migrations")?;
        info!("Database migrations completed successfully");

        let navigator = Navigator::new(config.navigator_options());
        let notifier =
            JoinNotifier::new(config.join_options()).context("Failed to create Join client")?;
        if config.join_api_key.is_none() || config.join_device_id.is_none() {
            warn!("Join credentials are not configured, notifications will fail");
        }

        Ok(App {
            store: Arc::new(PgStore::new(db_pool)),
            search: Arc::new(navigator),
            notifier: Arc::new(notifier),
            config,
        })
    }

    /// Execute one CLI command.
    pub async fn run(self, command: Command) -> ExitCode {
        let start = Instant::now();
        let result = match command {
            Command::SyncTerms => self.sync_terms().await,
            Command::RefreshSemester { school, term } => {
                self.refresh_semester(&school, &term).await
            }
            Command::RefreshClasses {
                school,
                term,
                subject,
                career,
                open_only,
            } => {
                self.refresh_classes(&school, &term, &subject, &career, open_only)
                    .await
            }
            Command::Check => self.check().await,
            Command::Watch => {
                self.watch().await;
                Ok(())
            }
        };

        match result {
            Ok(()) => {
                info!(duration = fmt_duration(start.elapsed()), "Command completed");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(error = ?e, "Command failed");
                ExitCode::FAILURE
            }
        }
    }

    async fn sync_terms(&self) -> anyhow::Result<()> {
        let sync = sync_available_terms(self.search.as_ref(), self.store.as_ref()).await?;
        info!(
            terms = sync.terms.len(),
            schools = sync.schools.len(),
            "Synced available terms and schools"
        );
        Ok(())
    }

    async fn refresh_semester(&self, school: &str, term: &str) -> anyhow::Result<()> {
        let school = self
            .store
            .find_school(school)
            .await?
            .with_context(|| format!("Unknown school {school:?}, run sync-terms first"))?;
        let term = self
            .store
            .find_term(term)
            .await?
            .with_context(|| format!("Unknown term {term:?}, run sync-terms first"))?;

        let data =
            refresh_semester_data(self.search.as_ref(), self.store.as_ref(), &school, &term)
                .await?;
        info!(
            school = school.name,
            term = term.full_term_name(),
            careers = data.careers.len(),
            subjects = data.subjects.len(),
            "Refreshed semester data"
        );
        Ok(())
    }

    async fn refresh_classes(
        &self,
        school: &str,
        term: &str,
        subject: &str,
        career: &str,
        open_only: bool,
    ) -> anyhow::Result<()> {
        let context = SearchContext {
            school: self
                .store
                .find_school(school)
                .await?
                .with_context(|| format!("Unknown school {school:?}"))?,
            term: self
                .store
                .find_term(term)
                .await?
                .with_context(|| format!("Unknown term {term:?}"))?,
            subject: self
                .store
                .find_subject(subject)
                .await?
                .with_context(|| format!("Unknown subject {subject:?}, run refresh-semester first"))?,
            career: self
                .store
                .find_career(career)
                .await?
                .with_context(|| format!("Unknown career {career:?}, run refresh-semester first"))?,
        };

        let refresh = refresh_class_data(
            self.search.as_ref(),
            self.store.as_ref(),
            &context,
            open_only,
        )
        .await?;
        info!(
            search = %context,
            courses = refresh.counts.courses,
            sections_created = refresh.counts.sections_created,
            sections_updated = refresh.counts.sections_updated,
            instruction_entries = refresh.counts.instruction_entries,
            instructors = refresh.counts.instructors,
            "Refreshed class data"
        );
        Ok(())
    }

    async fn check(&self) -> anyhow::Result<()> {
        WatchJob::new(
            self.search.as_ref(),
            self.store.as_ref(),
            self.notifier.as_ref(),
            self.config.watch_options(),
        )
        .run()
        .await?;
        Ok(())
    }

    async fn watch(&self) {
        let scheduler = WatchScheduler::new(
            self.search.clone(),
            self.store.clone(),
            self.notifier.clone(),
            self.config.watch_options(),
            self.config.check_interval,
            self.config.shutdown_timeout,
        );

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let signals = tokio::spawn(async move {
            wait_for_shutdown_signal().await;
            let _ = shutdown_tx.send(());
        });

        scheduler.run(shutdown_rx).await;
        signals.abort();
    }
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = ?e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let sigterm = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, shutting down");
            }
            Err(e) => {
                error!(error = ?e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = sigterm => {}
    }
}
