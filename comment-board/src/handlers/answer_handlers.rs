use super::{parse_body, parse_optional_body, AppState};
use crate::error::AppError;
use crate::models::{CreateAnswerRequest, DeleteResponse, UpdateAnswerRequest};
use actix_web::{web, HttpResponse, Result};

pub async fn create_answer(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let question_id = path.into_inner();

    if data.database.get_question(question_id)?.is_none() {
        tracing::warn!(question_id, "Question not found for new answer");
        return Err(AppError::question_not_found());
    }

    let request: CreateAnswerRequest = parse_body(&body)?;

    match data.database.create_answer(question_id, &request.answer)? {
        Some(answer) => Ok(HttpResponse::Ok().json(answer)),
        None => Err(AppError::question_not_found()),
    }
}

pub async fn update_answer(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let answer_id = path.into_inner();

    if data.database.get_answer(answer_id)?.is_none() {
        tracing::warn!(answer_id, "Answer not found for update");
        return Err(AppError::answer_not_found());
    }

    let request: UpdateAnswerRequest = parse_optional_body(&body)?;

    match data
        .database
        .update_answer(answer_id, request.answer.as_deref())?
    {
        Some(answer) => Ok(HttpResponse::Ok().json(answer)),
        None => Err(AppError::answer_not_found()),
    }
}

pub async fn delete_answer(
    data: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let answer_id = path.into_inner();

    if !data.database.delete_answer(answer_id)? {
        tracing::warn!(answer_id, "Answer not found for delete");
        return Err(AppError::answer_not_found());
    }

    Ok(HttpResponse::Ok().json(DeleteResponse::answer(answer_id)))
}
