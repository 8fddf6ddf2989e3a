use crate::error::{AppError, AppResult};
use crate::models::{Answer, Question};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

pub struct Database {
    connection: Mutex<Connection>,
}

impl Database {
    pub fn open(db_path: &Path) -> AppResult<Self> {
        // Ensure the database directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        tracing::info!("Opened database at {}", db_path.display());
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> AppResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> AppResult<Self> {
        // Foreign keys are off by default in SQLite, and the cascade depends on them
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        run_migrations(&conn)?;

        Ok(Database {
            connection: Mutex::new(conn),
        })
    }

    /// Releases the connection. Called once at shutdown.
    pub fn close(self) -> AppResult<()> {
        let conn = self
            .connection
            .into_inner()
            .map_err(|e| AppError::Internal(format!("Database lock poisoned: {e}")))?;

        conn.close().map_err(|(_, e)| AppError::Database(e))?;
        tracing::info!("Database closed");
        Ok(())
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|e| AppError::Internal(format!("Failed to acquire database lock: {e}")))
    }

    // Question methods
    pub fn create_question(&self, comment: &str) -> AppResult<Question> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO questions (comment) VALUES (?1)",
            params![comment],
        )?;
        let id = conn.last_insert_rowid();

        tracing::info!(question_id = id, "Created question");
        Ok(Question {
            id,
            comment: comment.to_string(),
            answers: Vec::new(),
        })
    }

    pub fn get_question(&self, id: i64) -> AppResult<Option<Question>> {
        let conn = self.lock()?;
        Ok(query_question(&conn, id)?)
    }

    pub fn list_questions(&self) -> AppResult<Vec<Question>> {
        let conn = self.lock()?;

        let mut answers_by_question: HashMap<i64, Vec<Answer>> = HashMap::new();
        let mut stmt = conn.prepare(
            "SELECT id, answer, question_id FROM answers ORDER BY question_id, id",
        )?;
        for answer in stmt.query_map([], answer_from_row)? {
            let answer = answer?;
            answers_by_question
                .entry(answer.question_id)
                .or_default()
                .push(answer);
        }

        let mut stmt = conn.prepare("SELECT id, comment FROM questions ORDER BY id")?;
        let questions = stmt
            .query_map([], |row| {
                let id: i64 = row.get(0)?;
                Ok(Question {
                    id,
                    comment: row.get(1)?,
                    answers: Vec::new(),
                })
            })?
            .map(|question| {
                question.map(|mut question| {
                    question.answers = answers_by_question
                        .remove(&question.id)
                        .unwrap_or_default();
                    question
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(questions)
    }

    /// Returns `None` when the question does not exist. A `None` comment
    /// leaves the stored text as it is.
    pub fn update_question(
        &self,
        id: i64,
        comment: Option<&str>,
    ) -> AppResult<Option<Question>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let Some(mut question) = query_question(&tx, id)? else {
            return Ok(None);
        };

        if let Some(comment) = comment {
            tx.execute(
                "UPDATE questions SET comment = ?1 WHERE id = ?2",
                params![comment, id],
            )?;
            question.comment = comment.to_string();
        }

        tx.commit()?;
        tracing::info!(question_id = id, "Updated question");
        Ok(Some(question))
    }

    /// Deletes the question together with every answer it owns.
    pub fn delete_question(&self, id: i64) -> AppResult<bool> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        // Explicit so the cascade holds even on a connection without foreign keys
        let answers_deleted = tx.execute("DELETE FROM answers WHERE question_id = ?1", [id])?;
        let rows_affected = tx.execute("DELETE FROM questions WHERE id = ?1", [id])?;

        if rows_affected == 0 {
            return Ok(false);
        }

        tx.commit()?;
        tracing::info!(question_id = id, answers_deleted, "Deleted question");
        Ok(true)
    }

    // Answer methods

    /// Returns `None`, inserting nothing, when the question does not exist.
    pub fn create_answer(&self, question_id: i64, answer: &str) -> AppResult<Option<Answer>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM questions WHERE id = ?1)",
            [question_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Ok(None);
        }

        tx.execute(
            "INSERT INTO answers (answer, question_id) VALUES (?1, ?2)",
            params![answer, question_id],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::info!(answer_id = id, question_id, "Created answer");
        Ok(Some(Answer {
            id,
            answer: answer.to_string(),
            question_id,
        }))
    }

    pub fn get_answer(&self, id: i64) -> AppResult<Option<Answer>> {
        let conn = self.lock()?;
        Ok(query_answer(&conn, id)?)
    }

    pub fn list_answers(&self, question_id: i64) -> AppResult<Vec<Answer>> {
        let conn = self.lock()?;
        Ok(query_answers(&conn, question_id)?)
    }

    pub fn update_answer(&self, id: i64, answer: Option<&str>) -> AppResult<Option<Answer>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let Some(mut current) = query_answer(&tx, id)? else {
            return Ok(None);
        };

        if let Some(answer) = answer {
                tx.execute(
                "UPDATE answers SET answer = ?1 WHERE id = ?2",
                params![answer, id],
            )?;
            current.answer = answer.to_string();
        }

        tx.commit()?;
        tracing::info!(answer_id = id, "Updated answer");
        Ok(Some(current))
    }

    pub fn delete_answer(&self, id: i64) -> AppResult<bool> {
        let conn = self.lock()?;
        let rows_affected = conn.execute("DELETE FROM answers WHERE id = ?1", [id])?;

        if rows_affected == 0 {
            return Ok(false);
        }

        tracing::info!(answer_id = id, "Deleted answer");
        Ok(true)
    }
}

fn run_migrations(conn: &Connection) -> AppResult<()> {
    // AUTOINCREMENT keeps ids from being reused after the newest row is deleted.
    // SQLite records VARCHAR(500) as the column size but does not truncate or reject.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS questions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            comment VARCHAR(500) NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS answers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            answer VARCHAR(500) NOT NULL,
            question_id INTEGER NOT NULL,
            FOREIGN KEY (question_id) REFERENCES questions (id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_answers_question_id ON answers(question_id)",
        [],
    )?;

    Ok(())
}

fn answer_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Answer> {
    Ok(Answer {
        id: row.get(0)?,
        answer: row.get(1)?,
        question_id: row.get(2)?,
    })
}

fn query_question(conn: &Connection, id: i64) -> rusqlite::Result<Option<Question>> {
    let question = conn
        .query_row(
            "SELECT id, comment FROM questions WHERE id = ?1",
            [id],
            |row| {
                Ok(Question {
                    id: row.get(0)?,
                    comment: row.get(1)?,
                    answers: Vec::new(),
                })
            },
        )
        .optional()?;

    match question {
        Some(mut question) => {
            question.answers = query_answers(conn, id)?;
            Ok(Some(question))
        }
        None => Ok(None),
    }
}

fn query_answer(conn: &Connection, id: i64) -> rusqlite::Result<Option<Answer>> {
    conn.query_row(
        "SELECT id, answer, question_id FROM answers WHERE id = ?1",
        [id],
        answer_from_row,
    )
    .optional()
}

fn query_answers(conn: &Connection, question_id: i64) -> rusqlite::Result<Vec<Answer>> {
    let mut stmt = conn.prepare(
        "SELECT id, answer, question_id FROM answers WHERE question_id = ?1 ORDER BY id",
    )?;
    let answers = stmt
        .query_map([question_id], answer_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(answers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn count_rows(db: &Database, table: &str) -> i64 {
        let conn = db.lock().unwrap();
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
            row.get(0)
        })
        .unwrap()
    }

    #[test]
    fn test_create_question_starts_without_answers() {
        let db = test_db();

        let question = db.create_question("Is the sky blue?").unwrap();
        assert_eq!(question.id, 1);
        assert_eq!(question.comment, "Is the sky blue?");
        assert!(question.answers.is_empty());

        assert_eq!(db.get_question(question.id).unwrap(), Some(question));
    }

    #[test]
    fn test_get_missing_question_is_none() {
        let db = test_db();
        assert_eq!(db.get_question(42).unwrap(), None);
        assert_eq!(db.get_answer(42).unwrap(), None);
    }

    #[test]
    fn test_list_questions_in_insertion_order_with_answers() {
        let db = test_db();
        let first = db.create_question("first").unwrap();
        let second = db.create_question("second").unwrap();

        db.create_answer(second.id, "b1").unwrap().unwrap();
        db.create_answer(first.id, "a1").unwrap().unwrap();
        db.create_answer(second.id, "b2").unwrap().unwrap();

        let questions = db.list_questions().unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].comment, "first");
        assert_eq!(questions[1].comment, "second");

        let first_answers: Vec<_> = questions[0]
            .answers
            .iter()
            .map(|a| a.answer.as_str())
            .collect();
        let second_answers: Vec<_> = questions[1]
            .answers
            .iter()
            .map(|a| a.answer.as_str())
            .collect();
        assert_eq!(first_answers, vec!["a1"]);
        assert_eq!(second_answers, vec!["b1", "b2"]);
    }

    #[test]
    fn test_update_question_keeps_id_and_answers() {
        let db = test_db();
        let question = db.create_question("before").unwrap();
        let answer = db.create_answer(question.id, "reply").unwrap().unwrap();

        let updated = db
            .update_question(question.id, Some("after"))
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, question.id);
        assert_eq!(updated.comment, "after");
        assert_eq!(updated.answers, vec![answer]);
    }

    #[test]
    fn test_update_question_without_comment_is_noop() {
        let db = test_db();
        let question = db.create_question("unchanged").unwrap();

        let updated = db.update_question(question.id, None).unwrap().unwrap();
        assert_eq!(updated, question);
    }

    #[test]
    fn test_update_missing_question_is_none() {
        let db = test_db();
        assert_eq!(db.update_question(5, Some("x")).unwrap(), None);
        assert_eq!(db.update_question(5, None).unwrap(), None);
    }

    #[test]
    fn test_delete_question_cascades_to_answers() {
        let db = test_db();
        let doomed = db.create_question("doomed").unwrap();
        let kept = db.create_question("kept").unwrap();
        let a1 = db.create_answer(doomed.id, "one").unwrap().unwrap();
        let a2 = db.create_answer(doomed.id, "two").unwrap().unwrap();
        let other = db.create_answer(kept.id, "other").unwrap().unwrap();

        assert!(db.delete_question(doomed.id).unwrap());

        assert_eq!(db.get_question(doomed.id).unwrap(), None);
        assert_eq!(db.get_answer(a1.id).unwrap(), None);
        assert_eq!(db.get_answer(a2.id).unwrap(), None);
        assert!(db.list_answers(doomed.id).unwrap().is_empty());
        assert_eq!(db.get_answer(other.id).unwrap(), Some(other));
        assert_eq!(count_rows(&db, "answers"), 1);
    }

    #[test]
    fn test_delete_missing_question_is_false() {
        let db = test_db();
        assert!(!db.delete_question(3).unwrap());
    }

    #[test]
    fn test_create_answer_for_missing_question_inserts_nothing() {
        let db = test_db();
        assert_eq!(db.create_answer(9, "orphan").unwrap(), None);
        assert_eq!(count_rows(&db, "answers"), 0);
    }

    #[test]
    fn test_foreign_key_rejects_orphan_answers() {
        let db = test_db();
        let conn = db.lock().unwrap();
        let result = conn.execute(
            "INSERT INTO answers (answer, question_id) VALUES ('orphan', 77)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_update_and_delete_answer() {
        let db = test_db();
        let question = db.create_question("q").unwrap();
        let answer = db.create_answer(question.id, "draft").unwrap().unwrap();

        let updated = db.update_answer(answer.id, Some("final")).unwrap().unwrap();
        assert_eq!(updated.answer, "final");
        assert_eq!(updated.question_id, question.id);

        let untouched = db.update_answer(answer.id, None).unwrap().unwrap();
        assert_eq!(untouched.answer, "final");

        assert!(db.delete_answer(answer.id).unwrap());
        assert!(!db.delete_answer(answer.id).unwrap());
        assert_eq!(db.update_answer(answer.id, Some("late")).unwrap(), None);

        // Parent survives its answers
        assert!(db.get_question(question.id).unwrap().is_some());
    }

    #[test]
    fn test_ids_are_not_reused() {
        let db = test_db();
        db.create_question("one").unwrap();
        let two = db.create_question("two").unwrap();
        assert!(db.delete_question(two.id).unwrap());

        let three = db.create_question("three").unwrap();
        assert_eq!(three.id, 3);

        let answer = db.create_answer(three.id, "a").unwrap().unwrap();
        assert!(db.delete_answer(answer.id).unwrap());
        let next = db.create_answer(three.id, "b").unwrap().unwrap();
        assert_eq!(next.id, answer.id + 1);
    }

    #[test]
    fn test_text_past_column_size_is_stored_as_is() {
        let db = test_db();
        let long = "x".repeat(501);
        let longer = "é".repeat(800);

        let question = db.create_question(&long).unwrap();
        assert_eq!(question.comment, long);

        let updated = db
            .update_question(question.id, Some(longer.as_str()))
            .unwrap()
            .unwrap();
        assert_eq!(updated.comment, longer);

        let answer = db.create_answer(question.id, &long).unwrap().unwrap();
        let stored = db.get_question(question.id).unwrap().unwrap();
        assert_eq!(stored.comment, longer);
        assert_eq!(stored.answers, vec![answer]);
    }

    #[test]
    fn test_reopen_file_database_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("db.sqlite");

        let db = Database::open(&path).unwrap();
        let question = db.create_question("persisted").unwrap();
        db.create_answer(question.id, "still here").unwrap().unwrap();
        db.close().unwrap();

        let reopened = Database::open(&path).unwrap();
        let questions = reopened.list_questions().unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].answers[0].answer, "still here");
    }
}
