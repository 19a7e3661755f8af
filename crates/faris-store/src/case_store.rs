//! SQLite persistence of analysis results

use crate::StoreError;
use faris_domain::traits::{CaseSink, CollaboratorError};
use faris_domain::{AnalysisResult, CaseId, FailurePattern, FailureType, Severity};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// One row of the case listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseSummary {
    /// Case identifier
    pub case_id: CaseId,
    /// Completion time, seconds since Unix epoch
    pub created_at: u64,
    /// Request domain
    pub domain: String,
    /// Analysed question
    pub question: String,
    /// Risk score
    pub risk_score: f64,
    /// Risk level
    pub risk_level: String,
    /// Whether any failure survived aggregation
    pub failure_detected: bool,
    /// Whether the analysis absorbed failures
    pub degraded: bool,
}

/// Aggregate statistics over all stored cases
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct CaseStats {
    /// Number of stored cases
    pub total_cases: usize,
    /// Cases with at least one failure
    pub failed_cases: usize,
    /// Cases marked degraded
    pub degraded_cases: usize,
    /// Mean risk score, `None` when empty
    pub mean_risk_score: Option<f64>,
    /// Finding count per failure type
    pub failures_by_type: BTreeMap<String, usize>,
}

/// SQLite-backed [`CaseSink`]
///
/// Stores each result as JSON plus indexed columns for listing and stats.
/// The connection sits behind a mutex so one store can be shared across
/// concurrent analyses.
///
/// # Examples
///
/// ```no_run
/// use faris_store::SqliteCaseStore;
///
/// let store = SqliteCaseStore::new("faris.db").unwrap();
/// println!("{} cases", store.stats().unwrap().total_cases);
/// ```
pub struct SqliteCaseStore {
    conn: Mutex<Connection>,
}

impl SqliteCaseStore {
    /// Open (or create) a database at `path`
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Persist one result, replacing a previous version of the same case
    pub fn save(&self, result: &AnalysisResult) -> Result<(), StoreError> {
        let case_id = result.case_id.to_string();
        let json = serde_json::to_string(result)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM case_failures WHERE case_id = ?1", params![&case_id])?;
        tx.execute(
            "INSERT OR REPLACE INTO cases
             (case_id, created_at, domain, question, risk_score, risk_level, failure_detected, degraded, result_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                &case_id,
                result.metadata.created_at as i64,
                result.request.domain.as_str(),
                &result.request.question,
                result.risk_assessment.score,
                result.risk_assessment.level.as_str(),
                result.failure_detected,
                result.degraded,
                &json,
            ],
        )?;
        for (position, finding) in result.failures.iter().enumerate() {
            tx.execute(
                "INSERT INTO case_failures (case_id, position, failure_type, severity, confidence, description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    &case_id,
                    position as i64,
                    finding.failure_type.as_str(),
                    finding.severity.as_str(),
                    finding.confidence,
                    &finding.description,
                ],
            )?;
        }
        tx.commit()?;

        debug!("Stored case {} with {} findings", case_id, result.failures.len());
        Ok(())
    }

    /// Load a stored result
    pub fn get(&self, case_id: CaseId) -> Result<Option<AnalysisResult>, StoreError> {
        let conn = self.conn()?;
        let json: Option<String> = conn
            .query_row(
                "SELECT result_json FROM cases WHERE case_id = ?1",
                params![case_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        json.map(|j| serde_json::from_str(&j).map_err(StoreError::from))
            .transpose()
    }

    /// The `limit` most recent cases, newest first
    pub fn list_recent(&self, limit: usize) -> Result<Vec<CaseSummary>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT case_id, created_at, domain, question, risk_score, risk_level, failure_detected, degraded
             FROM cases ORDER BY created_at DESC, case_id DESC LIMIT ?1",
        )?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                let id: String = row.get(0)?;
                let case_id = id.parse::<CaseId>().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        0,
                        rusqlite::types::Type::Text,
                        Box::new(StoreError::InvalidData(e)),
                    )
                })?;
                Ok(CaseSummary {
                    case_id,
                    created_at: row.get::<_, i64>(1)? as u64,
                    domain: row.get(2)?,
                    question: row.get(3)?,
                    risk_score: row.get(4)?,
                    risk_level: row.get(5)?,
                    failure_detected: row.get(6)?,
                    degraded: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Aggregate statistics over all cases
    pub fn stats(&self) -> Result<CaseStats, StoreError> {
        let conn = self.conn()?;
        let (total, failed, degraded, mean): (i64, Option<i64>, Option<i64>, Option<f64>) = conn
            .query_row(
                "SELECT COUNT(*), SUM(failure_detected), SUM(degraded), AVG(risk_score) FROM cases",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )?;

        let mut stmt = conn.prepare(
            "SELECT failure_type, COUNT(*) FROM case_failures GROUP BY failure_type",
        )?;
        let failures_by_type = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
            })?
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(CaseStats {
            total_cases: total as usize,
            failed_cases: failed.unwrap_or(0) as usize,
            degraded_cases: degraded.unwrap_or(0) as usize,
            mean_risk_score: mean,
            failures_by_type,
        })
    }

    /// Every stored finding as a failure pattern, oldest case first
    ///
    /// Used to rebuild a [`PatternStore`](crate::PatternStore) on startup.
    pub fn patterns(&self) -> Result<Vec<FailurePattern>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT f.case_id, f.failure_type, f.severity, f.description, c.question
             FROM case_failures f JOIN cases c ON c.case_id = f.case_id
             ORDER BY c.created_at, f.case_id, f.position",
        )?;

        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter()
            .map(|(id, failure_type, severity, description, question)| {
                Ok(FailurePattern {
                    case_id: id.parse().map_err(StoreError::InvalidData)?,
                    failure_type: failure_type
                        .parse::<FailureType>()
                        .map_err(StoreError::InvalidData)?,
                    severity: Severity::parse(&severity).ok_or_else(|| {
                        StoreError::InvalidData(format!("Unknown severity: {}", severity))
                    })?,
                    description,
                    question,
                })
            })
            .collect()
    }
}

impl CaseSink for SqliteCaseStore {
    fn store_result(&self, result: &AnalysisResult) -> Result<(), CollaboratorError> {
        Ok(self.save(result)?)
    }
}
