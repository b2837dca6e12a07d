use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::models::{
    badge::ClaimBadgeRequest,
    question::{question_hash, ApiQuestion},
    response::SubmitAnswerRequest,
    QuestionSetRequest, QuestionSetResponse, Stage,
};
use crate::services::{
    answer_service::AnswerService, badge_service::BadgeService, generator::GeneratorClient,
    selector_service::SelectorService, session_service::SessionService, AppState,
};

fn selector(state: &AppState) -> SelectorService {
    SelectorService::new(
        AnswerService::new(state.mongo.clone()),
        sessions(state),
        GeneratorClient::new(
            state.config.generator_api_url.clone(),
            state.config.generator_api_key.clone(),
        ),
        state.question_cache.clone(),
    )
}

fn sessions(state: &AppState) -> SessionService {
    SessionService::new(state.redis.clone(), state.config.quiz_session_ttl_seconds)
}

pub async fn get_questions(
    State(state): State<Arc<AppState>>,
    Path(stage): Path<Stage>,
    Json(req): Json<QuestionSetRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    req.validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    tracing::info!(
        "Building question set: user_id={}, stage={}, count={}",
        req.user_id,
        stage,
        req.count
    );

    match selector(&state)
        .select_questions(&req.user_id, stage, req.count as usize)
        .await
    {
        Ok((difficulty_level, questions)) => Ok((
            StatusCode::OK,
            Json(QuestionSetResponse {
                stage,
                difficulty_level,
                questions: questions.into_iter().map(ApiQuestion::from).collect(),
            }),
        )),
        Err(e) => {
            tracing::error!("Failed to build question set: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to build question set".to_string(),
            ))
        }
    }
}

pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    Path(stage): Path<Stage>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    req.validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    tracing::info!(
        "Submitting answer: user_id={}, stage={}",
        req.user_id,
        stage
    );

    // Grade against the snapshot served in this session, never client input.
    let session = sessions(&state)
        .get(&req.user_id, stage)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load quiz session: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load quiz session".to_string(),
            )
        })?
        .ok_or((
            StatusCode::NOT_FOUND,
            "No active quiz session".to_string(),
        ))?;

    let question = session
        .find_served(&question_hash(&req.question))
        .ok_or((
            StatusCode::NOT_FOUND,
            "Question is not part of the current quiz".to_string(),
        ))?
        .clone();

    let answers = AnswerService::new(state.mongo.clone());
    match answers
        .submit_answer(&req.user_id, stage, &question, &req.answer)
        .await
    {
        Ok(response) => Ok((StatusCode::OK, Json(response))),
        Err(e) => {
            tracing::error!("Failed to record answer: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to record answer".to_string(),
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    pub user_id: String,
}

pub async fn get_progress(
    State(state): State<Arc<AppState>>,
    Path(stage): Path<Stage>,
    Query(query): Query<ProgressQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let badges = BadgeService::new(state.mongo.clone());

    match badges.progress(&query.user_id, stage).await {
        Ok(progress) => Ok((StatusCode::OK, Json(progress))),
        Err(e) => {
            tracing::error!("Failed to compute badge progress: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to compute badge progress".to_string(),
            ))
        }
    }
}

pub async fn claim_badge(
    State(state): State<Arc<AppState>>,
    Path(stage): Path<Stage>,
    Json(req): Json<ClaimBadgeRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    req.validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    tracing::info!("Claiming badge: user_id={}, stage={}", req.user_id, stage);

    let badges = BadgeService::new(state.mongo.clone());
    match badges.claim(&req.user_id, stage).await {
        Ok(response) => Ok((StatusCode::OK, Json(response))),
        Err(e) => {
            let msg = e.to_string();
            if msg.contains("already claimed") {
                Err((StatusCode::CONFLICT, msg))
            } else if msg.contains("not yet earned") {
                Err((StatusCode::BAD_REQUEST, msg))
            } else {
                tracing::error!("Failed to claim badge: {}", e);
                Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to claim badge".to_string(),
                ))
            }
        }
    }
}
