use std::{
    convert::TryFrom,
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use log::{error, info};
use rusqlite::{params, Connection, Row};
use tokio::sync::oneshot;

mod migrations;
pub mod models;

use migrations::run_migrations;
pub use models::CallReport;

use crate::session::state::{CallPhase, SentimentSample};

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum DbCommand {
    Execute(DbTask),
    Shutdown,
}

struct DatabaseInner {
    sender: mpsc::Sender<DbCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(DbCommand::Shutdown) {
                error!("Failed to send shutdown to DB thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join DB thread: {join_err:?}");
            }
        }
    }
}

fn to_i64(value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| anyhow!("value {value} exceeds SQLite INTEGER range"))
}

fn to_u32(value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| anyhow!("value {value} out of range"))
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| anyhow!("invalid datetime '{value}': {err}"))
}

fn phase_from_str(value: &str) -> Result<CallPhase> {
    match value {
        "introduction" => Ok(CallPhase::Introduction),
        "discovery" => Ok(CallPhase::Discovery),
        "presentation" => Ok(CallPhase::Presentation),
        "handling-objections" => Ok(CallPhase::HandlingObjections),
        "closing" => Ok(CallPhase::Closing),
        _ => Err(anyhow!("unknown call phase '{value}'")),
    }
}

fn report_from_row(row: &Row<'_>) -> Result<CallReport> {
    let keywords: Vec<String> = serde_json::from_str(&row.get::<_, String>(7)?)
        .context("failed to parse keywords column")?;
    let entities: Vec<String> = serde_json::from_str(&row.get::<_, String>(8)?)
        .context("failed to parse entities column")?;
    let sentiment_series: Vec<SentimentSample> = serde_json::from_str(&row.get::<_, String>(9)?)
        .context("failed to parse sentiment series column")?;

    Ok(CallReport {
        id: row.get::<_, String>(0)?,
        started_at: row
            .get::<_, Option<String>>(1)?
            .map(|s| parse_datetime(&s))
            .transpose()?,
        phase: phase_from_str(&row.get::<_, String>(2)?)?,
        transcript: row.get::<_, String>(3)?,
        word_count: usize::try_from(row.get::<_, i64>(4)?)
            .map_err(|_| anyhow!("negative word count"))?,
        average_word_length: row.get::<_, f64>(5)?,
        effectiveness: to_u32(row.get::<_, i64>(6)?)?,
        keywords,
        entities,
        sentiment_series,
        reviewer_score: to_u32(row.get::<_, i64>(10)?)?,
        reviewer_notes: row.get::<_, String>(11)?,
        created_at: parse_datetime(&row.get::<_, String>(12)?)?,
    })
}

const REPORT_COLUMNS: &str = "id, started_at, phase, transcript, word_count, average_word_length, \
     effectiveness, keywords, entities, sentiment_series, reviewer_score, reviewer_notes, created_at";

/// Handle to the SQLite store. All access funnels through a dedicated
/// worker thread so callers never block the async runtime on disk I/O.
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
    db_path: Arc<PathBuf>,
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create database directory {}", parent.display())
                })?;
            }
        }

        let (command_tx, command_rx) = mpsc::channel::<DbCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let path_for_thread = db_path.clone();

        let worker = thread::Builder::new()
            .name("callsight-db".into())
            .spawn(move || {
                let mut conn = match Connection::open(&path_for_thread) {
                    Ok(connection) => connection,
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow::Error::new(err)
                            .context("failed to open SQLite database")));
                        return;
                    }
                };

                if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                    error!("Failed to enable WAL mode: {err}");
                }

                let init_result =
                    run_migrations(&mut conn).context("failed to run database migrations");
                if ready_tx.send(init_result).is_err() {
                    error!("DB initialization receiver dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        DbCommand::Execute(task) => {
                            task(&mut conn);
                        }
                        DbCommand::Shutdown => break,
                    }
                }

                info!("Database thread shutting down");
            })
            .with_context(|| "failed to spawn database worker thread")?;

        ready_rx
            .recv()
            .context("database worker exited before signaling readiness")??;

        info!("Database initialized at {}", db_path.as_path().display());

        Ok(Self {
            inner: Arc::new(DatabaseInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
            db_path: Arc::new(db_path),
        })
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }

    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self.inner.sender.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = DbCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                error!("DB caller dropped before receiving result");
            }
        }));

        sender
            .send(command)
            .map_err(|err| anyhow!("failed to send command to DB thread: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("database thread terminated unexpectedly"))?
    }

    pub async fn insert_call_report(&self, report: &CallReport) -> Result<()> {
        let record = report.clone();
        self.execute(move |conn| {
            let keywords =
                serde_json::to_string(&record.keywords).context("failed to encode keywords")?;
            let entities =
                serde_json::to_string(&record.entities).context("failed to encode entities")?;
            let sentiment_series = serde_json::to_string(&record.sentiment_series)
                .context("failed to encode sentiment series")?;

            conn.execute(
                "INSERT INTO call_reports (id, started_at, phase, transcript, word_count, \
                 average_word_length, effectiveness, keywords, entities, sentiment_series, \
                 reviewer_score, reviewer_notes, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    record.id,
                    record.started_at.as_ref().map(|dt| dt.to_rfc3339()),
                    record.phase.as_str(),
                    record.transcript,
                    to_i64(record.word_count as u64)?,
                    record.average_word_length,
                    i64::from(record.effectiveness),
                    keywords,
                    entities,
                    sentiment_series,
                    i64::from(record.reviewer_score),
                    record.reviewer_notes,
                    record.created_at.to_rfc3339(),
                ],
            )
            .with_context(|| "failed to insert call report")?;
            Ok(())
        })
        .await
    }

    pub async fn get_call_report(&self, report_id: &str) -> Result<Option<CallReport>> {
        let report_id = report_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REPORT_COLUMNS} FROM call_reports WHERE id = ?1"
            ))?;

            let mut rows = stmt.query(params![report_id])?;
            if let Some(row) = rows.next()? {
                Ok(Some(report_from_row(row)?))
            } else {
                Ok(None)
            }
        })
        .await
    }

    pub async fn list_call_reports(&self) -> Result<Vec<CallReport>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REPORT_COLUMNS} FROM call_reports ORDER BY created_at DESC"
            ))?;

            let mut rows = stmt.query([])?;
            let mut reports = Vec::new();
            while let Some(row) = rows.next()? {
                reports.push(report_from_row(row)?);
            }

            Ok(reports)
        })
        .await
    }
}
