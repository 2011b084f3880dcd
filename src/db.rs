use std::path::Path;

use anyhow::{anyhow, Context};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OpenFlags, Row};

use crate::grading::Grade;
use crate::model::{ComponentScores, StudentInput, StudentRecord};

pub const DB_FILE_NAME: &str = "gradebook.sqlite3";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to initialize storage: {0}")]
    Init(#[source] rusqlite::Error),
    #[error("failed to read students: {0}")]
    Read(#[source] rusqlite::Error),
    #[error("failed to write student: {0}")]
    Write(#[source] rusqlite::Error),
    #[error("student {id} not found")]
    NotFound { id: i64 },
}

// created_at keeps millisecond precision so rows saved within the same second
// still sort newest first.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS students(
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    student_id TEXT NOT NULL,
    course_name TEXT NOT NULL,
    score_component1 REAL NOT NULL CHECK (score_component1 BETWEEN 0 AND 100),
    score_component2 REAL NOT NULL CHECK (score_component2 BETWEEN 0 AND 100),
    score_final_exam REAL NOT NULL CHECK (score_final_exam BETWEEN 0 AND 100),
    score_final REAL NOT NULL,
    grade TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f','now'))
);
CREATE INDEX IF NOT EXISTS idx_students_created_at ON students(created_at);
";

const SELECT_COLUMNS: &str = "id, name, student_id, course_name,
       score_component1, score_component2, score_final_exam,
       score_final, grade, created_at";

/// Owns the single connection to a workspace database.
pub struct Gateway {
    conn: Connection,
}

impl Gateway {
    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(workspace)
            .with_context(|| format!("failed to create workspace {}", workspace.display()))?;
        let db_path = workspace.join(DB_FILE_NAME);
        let conn = Connection::open(&db_path)
            .with_context(|| format!("failed to open {}", db_path.display()))?;
        let gateway = Self { conn };
        gateway
            .ensure_schema()
            .with_context(|| format!("failed to prepare schema in {}", db_path.display()))?;
        Ok(gateway)
    }

    /// Opens a database file that must already hold a readable `students`
    /// table. Nothing is created, so a foreign file is refused untouched.
    pub fn open_existing(db_path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("failed to open {}", db_path.display()))?;
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'students'",
                [],
                |r| r.get(0),
            )
            .with_context(|| format!("{} is not a sqlite database", db_path.display()))?;
        if tables == 0 {
            return Err(anyhow!("{} has no students table", db_path.display()));
        }
        let gateway = Self { conn };
        gateway
            .select_all()
            .with_context(|| format!("{} holds unreadable student rows", db_path.display()))?;
        Ok(gateway)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(StorageError::Init)?;
        let gateway = Self { conn };
        gateway.ensure_schema()?;
        Ok(gateway)
    }

    /// Safe to call on every start.
    pub fn ensure_schema(&self) -> Result<(), StorageError> {
        self.conn
            .execute_batch(SCHEMA)
            .map_err(StorageError::Init)
    }

    pub fn insert(&self, input: &StudentInput) -> Result<i64, StorageError> {
        let final_score = input.scores.final_score();
        let grade = input.scores.grade();
        self.conn
            .execute(
                "INSERT INTO students(
                   name,
                   student_id,
                   course_name,
                   score_component1,
                   score_component2,
                   score_final_exam,
                   score_final,
                   grade
                 ) VALUES(?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    input.name,
                    input.student_id,
                    input.course_name,
                    input.scores.component1,
                    input.scores.component2,
                    input.scores.final_exam,
                    final_score,
                    grade.label(),
                ],
            )
            .map_err(StorageError::Write)?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn update(&self, id: i64, input: &StudentInput) -> Result<(), StorageError> {
        let final_score = input.scores.final_score();
        let grade = input.scores.grade();
        let changed = self
            .conn
            .execute(
                "UPDATE students SET
                   name = ?,
                   student_id = ?,
                   course_name = ?,
                   score_component1 = ?,
                   score_component2 = ?,
                   score_final_exam = ?,
                   score_final = ?,
                   grade = ?
                 WHERE id = ?",
                params![
                    input.name,
                    input.student_id,
                    input.course_name,
                    input.scores.component1,
                    input.scores.component2,
                    input.scores.final_exam,
                    final_score,
                    grade.label(),
                    id,
                ],
            )
            .map_err(StorageError::Write)?;
        if changed == 0 {
            return Err(StorageError::NotFound { id });
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> Result<(), StorageError> {
        let changed = self
            .conn
            .execute("DELETE FROM students WHERE id = ?", [id])
            .map_err(StorageError::Write)?;
        if changed == 0 {
            return Err(StorageError::NotFound { id });
        }
        Ok(())
    }

    /// Writes a consistent copy of the whole database to `dest`, which must
    /// not exist yet.
    pub fn snapshot_to(&self, dest: &Path) -> Result<(), StorageError> {
        self.conn
            .execute("VACUUM INTO ?", [dest.to_string_lossy().into_owned()])
            .map_err(StorageError::Read)?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Newest first; rows created in the same instant fall back to id order.
    pub fn select_all(&self) -> Result<Vec<StudentRecord>, StorageError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM students ORDER BY created_at DESC, id DESC"
            ))
            .map_err(StorageError::Read)?;
        let rows = stmt
            .query_map([], record_from_row)
            .and_then(|it| it.collect::<Result<Vec<_>, _>>())
            .map_err(StorageError::Read)?;
        Ok(rows)
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<StudentRecord> {
    let grade_text: String = row.get(8)?;
    let grade = grade_text.parse::<Grade>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let created_text: String = row.get(9)?;
    let created_at = parse_timestamp(&created_text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(StudentRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        student_id: row.get(2)?,
        course_name: row.get(3)?,
        scores: ComponentScores {
            component1: row.get(4)?,
            component2: row.get(5)?,
            final_exam: row.get(6)?,
        },
        score_final: row.get(7)?,
        grade,
        created_at,
    })
}

/// Accepts both `CURRENT_TIMESTAMP` output and the millisecond form the
/// column default writes.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}
