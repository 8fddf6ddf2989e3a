//! Shared setup for the HTTP integration tests.
//!
//! Every `TestApp` owns its own temporary directory and SQLite file, so tests
//! can run in parallel without seeing each other's rows.

use actix_web::web;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use comment_board::database::Database;
use comment_board::handlers::AppState;
use comment_board::models::{Answer, Question};

pub struct TestApp {
    pub temp_dir: TempDir,
    pub database: Arc<Database>,
    pub app_state: web::Data<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temporary directory for test");
        let database = Arc::new(
            Database::open(&temp_dir.path().join("db.sqlite"))
                .expect("Failed to open test database"),
        );
        let app_state = web::Data::new(AppState {
            database: Arc::clone(&database),
        });

        Self {
            temp_dir,
            database,
            app_state,
        }
    }

    pub fn app_state(&self) -> &web::Data<AppState> {
        &self.app_state
    }

    pub fn db(&self) -> &Arc<Database> {
        &self.database
    }

    pub fn db_path(&self) -> PathBuf {
        self.temp_dir.path().join("db.sqlite")
    }

    /// Inserts a question directly, bypassing HTTP.
    pub fn seed_question(&self, comment: &str) -> Question {
        self.database.create_question(comment).unwrap()
    }

    pub fn seed_answer(&self, question_id: i64, answer: &str) -> Answer {
        self.database
            .create_answer(question_id, answer)
            .unwrap()
            .expect("seed answer needs an existing question")
    }
}
