use super::{parse_optional_body, AppState};
use crate::error::AppError;
use crate::models::{CreateQuestionRequest, DeleteResponse, UpdateQuestionRequest};
use actix_web::{web, HttpResponse, Result};

pub async fn create_question(
    data: web::Data<AppState>,
    request: web::Json<CreateQuestionRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    let question = data.database.create_question(&request.comment)?;
    Ok(HttpResponse::Ok().json(question))
}

pub async fn list_questions(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let questions = data.database.list_questions()?;
    tracing::debug!(count = questions.len(), "Listed questions");
    Ok(HttpResponse::Ok().json(questions))
}

pub async fn update_question(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let question_id = path.into_inner();

    if data.database.get_question(question_id)?.is_none() {
        tracing::warn!(question_id, "Question not found for update");
        return Err(AppError::question_not_found());
    }

    let request: UpdateQuestionRequest = parse_optional_body(&body)?;

    // Re-checked inside the update transaction in case of a concurrent delete
    match data
        .database
        .update_question(question_id, request.comment.as_deref())?
    {
        Some(question) => Ok(HttpResponse::Ok().json(question)),
        None => Err(AppError::question_not_found()),
    }
}

pub async fn delete_question(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let question_id = path.into_inner();

    if !data.database.delete_question(question_id)? {
        tracing::warn!(question_id, "Question not found for delete");
        return Err(AppError::question_not_found());
    }

    Ok(HttpResponse::Ok().json(DeleteResponse::question(question_id)))
}
