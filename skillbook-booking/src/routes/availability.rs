use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::NaiveDate;
use diesel::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

use skillbook_shared::errors::{AppError, AppResult, ErrorCode};
use skillbook_shared::middleware::TeacherUser;
use skillbook_shared::types::api::ApiResponse;

use crate::models::{
    AvailabilityException, NewAvailabilityException, NewWeeklyAvailability, Teacher,
    WeeklyAvailability,
};
use crate::schema::{availability_exceptions, teachers, weekly_availability};
use crate::timeslot::parse_booking_time;
use crate::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateWeeklyPayload {
    pub day_of_week: i16,
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateExceptionPayload {
    pub exception_date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_available: bool,
    pub reason: Option<String>,
}

fn default_true() -> bool {
    true
}

fn require_teacher(state: &AppState, auth_id: Uuid) -> AppResult<Teacher> {
    let mut conn = state
        .db
        .get()
        .map_err(|e| AppError::internal(format!("database connection error: {e}")))?;

    teachers::table
        .filter(teachers::auth_id.eq(auth_id))
        .first::<Teacher>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::TeacherNotFound, "teacher profile not found"))
}

// ---------------------------------------------------------------------------
// GET /availability/weekly
// ---------------------------------------------------------------------------

pub async fn list_weekly(
    TeacherUser(auth_user): TeacherUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<WeeklyAvailability>>>> {
    let teacher = require_teacher(&state, auth_user.id)?;

    let mut conn = state
        .db
        .get()
        .map_err(|e| AppError::internal(format!("database connection error: {e}")))?;

    let rules = weekly_availability::table
        .filter(weekly_availability::teacher_id.eq(teacher.id))
        .order((
            weekly_availability::day_of_week.asc(),
            weekly_availability::start_time.asc(),
        ))
        .load::<WeeklyAvailability>(&mut conn)?;

    Ok(Json(ApiResponse::ok(rules)))
}

// ---------------------------------------------------------------------------
// POST /availability/weekly
// ---------------------------------------------------------------------------

pub async fn create_weekly(
    TeacherUser(auth_user): TeacherUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateWeeklyPayload>,
) -> AppResult<Json<ApiResponse<WeeklyAvailability>>> {
    if !(0..=6).contains(&payload.day_of_week) {
        return Err(AppError::new(
            ErrorCode::ValidationError,
            "day_of_week must be 0 (Sunday) through 6 (Saturday)",
        ));
    }

    let start = parse_booking_time(&payload.start_time)?;
    let end = parse_booking_time(&payload.end_time)?;
    if start >= end {
        return Err(AppError::new(
            ErrorCode::InvalidAvailabilityWindow,
            "start_time must be before end_time",
        ));
    }

    let teacher = require_teacher(&state, auth_user.id)?;

    let new_rule = NewWeeklyAvailability {
        teacher_id: teacher.id,
        day_of_week: payload.day_of_week,
        start_time: start,
        end_time: end,
        is_available: payload.is_available,
    };

    let mut conn = state
        .db
        .get()
        .map_err(|e| AppError::internal(format!("database connection error: {e}")))?;

    let rule = diesel::insert_into(weekly_availability::table)
        .values(&new_rule)
        .get_result::<WeeklyAvailability>(&mut conn)
        .map_err(AppError::Database)?;

    Ok(Json(ApiResponse::ok(rule)))
}

// ---------------------------------------------------------------------------
// DELETE /availability/weekly/:id
// ---------------------------------------------------------------------------

pub async fn delete_weekly(
    TeacherUser(auth_user): TeacherUser,
    State(state): State<Arc<AppState>>,
    Path(rule_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let teacher = require_teacher(&state, auth_user.id)?;

    let mut conn = state
        .db
        .get()
        .map_err(|e| AppError::internal(format!("database connection error: {e}")))?;

    let deleted = diesel::delete(
        weekly_availability::table
            .find(rule_id)
            .filter(weekly_availability::teacher_id.eq(teacher.id)),
    )
    .execute(&mut conn)?;

    if deleted == 0 {
        return Err(AppError::new(
            ErrorCode::AvailabilityRuleNotFound,
            "availability rule not found",
        ));
    }

    Ok(Json(ApiResponse::ok(())))
}

// ---------------------------------------------------------------------------
// GET /availability/exceptions
// ---------------------------------------------------------------------------

pub async fn list_exceptions(
    TeacherUser(auth_user): TeacherUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<AvailabilityException>>>> {
    let teacher = require_teacher(&state, auth_user.id)?;

    let mut conn = state
        .db
        .get()
        .map_err(|e| AppError::internal(format!("database connection error: {e}")))?;

    let exceptions = availability_exceptions::table
        .filter(availability_exceptions::teacher_id.eq(teacher.id))
        .order(availability_exceptions::exception_date.asc())
        .load::<AvailabilityException>(&mut conn)?;

    Ok(Json(ApiResponse::ok(exceptions)))
}

// ---------------------------------------------------------------------------
// POST /availability/exceptions
// ---------------------------------------------------------------------------

pub async fn create_exception(
    TeacherUser(auth_user): TeacherUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateExceptionPayload>,
) -> AppResult<Json<ApiResponse<AvailabilityException>>> {
    let window = match (&payload.start_time, &payload.end_time) {
        (Some(start), Some(end)) => {
            let start = parse_booking_time(start)?;
            let end = parse_booking_time(end)?;
            if start >= end {
                return Err(AppError::new(
                    ErrorCode::InvalidAvailabilityWindow,
                    "start_time must be before end_time",
                ));
            }
            Some((start, end))
        }
        (None, None) => None,
        _ => {
            return Err(AppError::new(
                ErrorCode::InvalidAvailabilityWindow,
                "start_time and end_time must be provided together",
            ));
        }
    };

    let teacher = require_teacher(&state, auth_user.id)?;

    let new_exception = NewAvailabilityException {
        teacher_id: teacher.id,
        exception_date: payload.exception_date,
        start_time: window.map(|(s, _)| s),
        end_time: window.map(|(_, e)| e),
        is_available: payload.is_available,
        reason: payload.reason,
    };

    let mut conn = state
        .db
        .get()
        .map_err(|e| AppError::internal(format!("database connection error: {e}")))?;

    let exception = diesel::insert_into(availability_exceptions::table)
        .values(&new_exception)
        .get_result::<AvailabilityException>(&mut conn)
        .map_err(AppError::Database)?;

    Ok(Json(ApiResponse::ok(exception)))
}

// ---------------------------------------------------------------------------
// DELETE /availability/exceptions/:id
// ---------------------------------------------------------------------------

pub async fn delete_exception(
    TeacherUser(auth_user): TeacherUser,
    State(state): State<Arc<AppState>>,
    Path(exception_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let teacher = require_teacher(&state, auth_user.id)?;

    let mut conn = state
        .db
        .get()
        .map_err(|e| AppError::internal(format!("database connection error: {e}")))?;

    let deleted = diesel::delete(
        availability_exceptions::table
            .find(exception_id)
            .filter(availability_exceptions::teacher_id.eq(teacher.id)),
    )
    .execute(&mut conn)?;

    if deleted == 0 {
        return Err(AppError::new(
            ErrorCode::AvailabilityExceptionNotFound,
            "availability exception not found",
        ));
    }

    Ok(Json(ApiResponse::ok(())))
}
