use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use skillbook_shared::errors::{AppError, AppResult, ErrorCode};
use skillbook_shared::types::api::ApiResponse;
use skillbook_shared::middleware::TeacherUser;
use skillbook_shared::types::event::payloads;

use crate::events::publisher;
use crate::models::{NewTeacher, Teacher};
use crate::schema::teachers;
use crate::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterTeacherPayload {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "skill must be 1-100 characters"))]
    pub skill: String,
    #[validate(range(min = 1, message = "hourly price must be positive"))]
    pub price_per_hour: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTeacherPayload {
    #[validate(length(min = 1, max = 100, message = "skill must be 1-100 characters"))]
    pub skill: Option<String>,
    #[validate(range(min = 1, message = "hourly price must be positive"))]
    pub price_per_hour: Option<i32>,
}

// ---------------------------------------------------------------------------
// Cached lookup, shared with the slot and payment handlers
// ---------------------------------------------------------------------------

pub async fn load_teacher(state: &AppState, teacher_id: Uuid) -> AppResult<Teacher> {
    let cache_key = format!("teacher:{teacher_id}");

    if let Some(teacher) = state.teacher_cache.get(&cache_key).await {
        return Ok(teacher);
    }

    let mut conn = state
        .db
        .get()
        .map_err(|e| AppError::internal(format!("database connection error: {e}")))?;

    let teacher = teachers::table
        .find(teacher_id)
        .first::<Teacher>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::TeacherNotFound, "teacher not found"))?;

    state.teacher_cache.insert(cache_key, teacher.clone()).await;

    Ok(teacher)
}

// ---------------------------------------------------------------------------
// POST /teachers
// ---------------------------------------------------------------------------

pub async fn register_teacher(
    TeacherUser(auth_user): TeacherUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterTeacherPayload>,
) -> AppResult<Json<ApiResponse<Teacher>>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut conn = state
        .db
        .get()
        .map_err(|e| AppError::internal(format!("database connection error: {e}")))?;

    let existing = teachers::table
        .filter(teachers::auth_id.eq(auth_user.id))
        .first::<Teacher>(&mut conn)
        .optional()?;
    if let Some(teacher) = existing {
        return Ok(Json(ApiResponse::ok_with_message(
            teacher,
            "teacher profile already exists",
        )));
    }

    let new_teacher = NewTeacher {
        auth_id: auth_user.id,
        name: payload.name,
        email: payload.email,
        skill: payload.skill,
        price_per_hour: payload.price_per_hour,
    };

    let teacher = diesel::insert_into(teachers::table)
        .values(&new_teacher)
        .get_result::<Teacher>(&mut conn)
        .map_err(AppError::Database)?;

    publisher::publish_teacher_registered(
        &state.rabbitmq,
        payloads::TeacherRegistered {
            teacher_id: teacher.id,
            auth_id: teacher.auth_id,
            name: teacher.name.clone(),
        },
    )
    .await;

    Ok(Json(ApiResponse::ok(teacher)))
}

// ---------------------------------------------------------------------------
// GET /teachers/:id
// ---------------------------------------------------------------------------

pub async fn get_teacher(
    State(state): State<Arc<AppState>>,
    Path(teacher_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Teacher>>> {
    let teacher = load_teacher(&state, teacher_id).await?;
    Ok(Json(ApiResponse::ok(teacher)))
}

// ---------------------------------------------------------------------------
// PATCH /teachers/me
// ---------------------------------------------------------------------------

pub async fn update_me(
    TeacherUser(auth_user): TeacherUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateTeacherPayload>,
) -> AppResult<Json<ApiResponse<Teacher>>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut conn = state
        .db
        .get()
        .map_err(|e| AppError::internal(format!("database connection error: {e}")))?;

    let teacher = teachers::table
        .filter(teachers::auth_id.eq(auth_user.id))
        .first::<Teacher>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::TeacherNotFound, "teacher not found"))?;

    let updated = diesel::update(teachers::table.find(teacher.id))
        .set((
            teachers::skill.eq(payload.skill.unwrap_or(teacher.skill)),
            teachers::price_per_hour.eq(payload.price_per_hour.unwrap_or(teacher.price_per_hour)),
        ))
        .get_result::<Teacher>(&mut conn)
        .map_err(AppError::Database)?;

    state
        .teacher_cache
        .invalidate(&format!("teacher:{}", updated.id))
        .await;

    Ok(Json(ApiResponse::ok(updated)))
}
