//! Route table shared by the server binary and the integration tests.

use crate::error::{json_error_handler, path_error_handler};
use crate::handlers::{answer_handlers, question_handlers};
use actix_cors::Cors;
use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        // Questions
        .route("/add", web::post().to(question_handlers::create_question))
        .route("/home", web::get().to(question_handlers::list_questions))
        .route(
            "/update/{id}",
            web::patch().to(question_handlers::update_question),
        )
        .route(
            "/delete/{id}",
            web::delete().to(question_handlers::delete_question),
        )
        // Answers
        .route(
            "/add_answer/{question_id}",
            web::post().to(answer_handlers::create_answer),
        )
        .route(
            "/update_answer/{id}",
            web::patch().to(answer_handlers::update_answer),
        )
        .route(
            "/delete_answer/{id}",
            web::delete().to(answer_handlers::delete_answer),
        );
}

/// Builds the CORS policy. `"*"` in `allowed_origins` accepts any origin.
pub fn cors(allowed_origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);

    if allowed_origins.iter().any(|origin| origin == "*") {
        return cors.allow_any_origin();
    }

    allowed_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}
