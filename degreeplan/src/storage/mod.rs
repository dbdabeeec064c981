//! SQLite persistence for course plans.
//!
//! A plan is always written as a whole: the plan row is upserted and its
//! planned-course set is replaced inside one transaction. Concurrent saves
//! of the same plan are last-write-wins.
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::error::{PlanError, Result};
use crate::models::{CoursePlan, ElectiveType, PlanRecord, PlannedCourseRecord};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS course_plans (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    user_id TEXT,
    num_terms INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS planned_courses (
    plan_id TEXT NOT NULL REFERENCES course_plans(id) ON DELETE CASCADE,
    id INTEGER NOT NULL,
    position INTEGER NOT NULL,
    term INTEGER NOT NULL,
    course_id TEXT NOT NULL,
    requirement_id TEXT,
    is_elective INTEGER NOT NULL DEFAULT 0,
    elective_type TEXT,
    placeholder_id TEXT,
    alternative_ids TEXT NOT NULL DEFAULT '[]',
    shared_requirement_id TEXT,
    PRIMARY KEY (plan_id, id)
);

CREATE INDEX IF NOT EXISTS idx_course_plans_user ON course_plans(user_id);
";

/// Row of `list_plans`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub id: String,
    pub title: String,
    pub user_id: Option<String>,
    pub num_terms: u32,
    pub updated_at: String,
}

#[derive(Debug)]
pub struct PlanStore {
    conn: Connection,
}

fn elective_type_to_str(t: ElectiveType) -> &'static str {
    match t {
        ElectiveType::Elec => "ELEC",
        ElectiveType::Choice => "CHOICE",
    }
}

fn elective_type_from_str(s: &str) -> Result<ElectiveType> {
    match s {
        "ELEC" => Ok(ElectiveType::Elec),
        "CHOICE" => Ok(ElectiveType::Choice),
        other => Err(PlanError::InvalidRecord(format!("unknown elective type {:?}", other))),
    }
}

impl PlanStore {
    /// Open (or create) a file-backed store. Creates the parent directory and
    /// the schema if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let conn = Connection::open(path)?;
        let store = PlanStore { conn };
        store.init()?;
        debug!(path = %path.display(), "plan store opened");
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let store = PlanStore { conn: Connection::open_in_memory()? };
        store.init()?;
        Ok(store)
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Upsert the plan row and replace its planned courses.
    pub fn save_plan(&mut self, plan: &CoursePlan) -> Result<()> {
        let record = plan.to_record();
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO course_plans (id, title, user_id, num_terms, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                user_id = excluded.user_id,
                num_terms = excluded.num_terms,
                updated_at = excluded.updated_at",
            params![record.id, record.title, record.user_id, record.num_terms, now],
        )?;
        tx.execute("DELETE FROM planned_courses WHERE plan_id = ?1", params![record.id])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO planned_courses (
                    plan_id, id, position, term, course_id, requirement_id, is_elective,
                    elective_type, placeholder_id, alternative_ids, shared_requirement_id
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for (position, pc) in record.planned_courses.iter().enumerate() {
                let alternatives = serde_json::to_string(&pc.alternative_ids)?;
                stmt.execute(params![
                    record.id,
                    pc.id as i64,
                    position as i64,
                    pc.term,
                    pc.course_id,
                    pc.requirement_id,
                    pc.is_elective,
                    pc.elective_type.map(elective_type_to_str),
                    pc.placeholder_id,
                    alternatives,
                    pc.shared_requirement_id,
                ])?;
            }
        }
        tx.commit()?;
        info!(plan = %record.id, courses = record.planned_courses.len(), "plan saved");
        Ok(())
    }

    /// Raw stored record, without resolving course codes.
    pub fn load_record(&self, id: &str) -> Result<Option<PlanRecord>> {
        let head = self
            .conn
            .query_row(
                "SELECT id, title, user_id, num_terms FROM course_plans WHERE id = ?1",
                params![id],
                |row| {
                    Ok(PlanRecord {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        user_id: row.get(2)?,
                        num_terms: row.get(3)?,
                        planned_courses: Vec::new(),
                    })
                },
            )
            .optional()?;
        let Some(mut record) = head else { return Ok(None) };

        let mut stmt = self.conn.prepare(
            "SELECT id, term, course_id, requirement_id, is_elective, elective_type,
                    placeholder_id, alternative_ids, shared_requirement_id
             FROM planned_courses WHERE plan_id = ?1 ORDER BY position",
        )?;
        let rows = stmt.query_map(params![id], |row| {
            let id: i64 = row.get(0)?;
            let elective_type: Option<String> = row.get(5)?;
            let alternatives: String = row.get(7)?;
            Ok((
                elective_type,
                PlannedCourseRecord {
                    id: id as u64,
                    term: row.get(1)?,
                    course_id: row.get(2)?,
                    requirement_id: row.get(3)?,
                    is_elective: row.get(4)?,
                    elective_type: None,
                    placeholder_id: row.get(6)?,
                    alternative_ids: Vec::new(),
                    shared_requirement_id: row.get(8)?,
                },
                alternatives,
            ))
        })?;
        for row in rows {
            let (elective_type, mut pc, alternatives) = row?;
            pc.elective_type = elective_type.as_deref().map(elective_type_from_str).transpose()?;
            pc.alternative_ids = serde_json::from_str(&alternatives)?;
            record.planned_courses.push(pc);
        }
        Ok(Some(record))
    }

    /// Load a plan and resolve its courses against `catalog`.
    pub fn load_plan(&self, id: &str, catalog: &Catalog) -> Result<Option<CoursePlan>> {
        match self.load_record(id)? {
            Some(record) => Ok(Some(CoursePlan::from_record(&record, catalog)?)),
            None => Ok(None),
        }
    }

    /// Plans ordered by last update, optionally only those of `user_id`.
    pub fn list_plans(&self, user_id: Option<&str>) -> Result<Vec<PlanSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, user_id, num_terms, updated_at FROM course_plans
             WHERE ?1 IS NULL OR user_id = ?1
             ORDER BY updated_at DESC, id",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok(PlanSummary {
                id: row.get(0)?,
                title: row.get(1)?,
                user_id: row.get(2)?,
                num_terms: row.get(3)?,
                updated_at: row.get(4)?,
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    /// Returns whether a plan was deleted.
    pub fn delete_plan(&mut self, id: &str) -> Result<bool> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM planned_courses WHERE plan_id = ?1", params![id])?;
        let n = tx.execute("DELETE FROM course_plans WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(n > 0)
    }
}
