use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use skillbook_shared::errors::{AppError, AppResult, ErrorCode};
use skillbook_shared::types::api::ApiResponse;

use crate::availability::{
    bookable_dates, open_slots, weekday_index, DateOverride, LookupErrorPolicy, WeeklyWindow,
};
use crate::routes::teachers::load_teacher;
use crate::schema::{availability_exceptions, weekly_availability};
use crate::services::booking_service;
use crate::timeslot::candidate_slots;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct BookableDatesResponse {
    pub teacher_id: Uuid,
    pub dates: Vec<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct OpenSlotsResponse {
    pub teacher_id: Uuid,
    pub date: NaiveDate,
    pub slots: Vec<NaiveTime>,
}

/// Applies the configured lookup-failure policy: degrade to `fallback` or
/// surface the error.
fn or_fail_open<T>(
    result: Result<T, diesel::result::Error>,
    policy: LookupErrorPolicy,
    fallback: T,
    what: &str,
) -> AppResult<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) => match policy {
            LookupErrorPolicy::FailOpen => {
                tracing::warn!(error = %e, what, "lookup failed, degrading to open");
                Ok(fallback)
            }
            LookupErrorPolicy::FailClosed => Err(AppError::Database(e)),
        },
    }
}

// ---------------------------------------------------------------------------
// GET /teachers/:id/bookable-dates
// ---------------------------------------------------------------------------

pub async fn get_bookable_dates(
    State(state): State<Arc<AppState>>,
    Path(teacher_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BookableDatesResponse>>> {
    let teacher = load_teacher(&state, teacher_id).await?;
    let policy = state.config.on_lookup_error;
    let horizon = state.config.booking_horizon_days;
    let today = Utc::now().date_naive();

    let mut conn = state
        .db
        .get()
        .map_err(|e| AppError::internal(format!("database connection error: {e}")))?;

    // Fail-open on the weekly rules means every weekday counts as open.
    let open_weekdays: HashSet<i16> = or_fail_open(
        weekly_availability::table
            .filter(weekly_availability::teacher_id.eq(teacher.id))
            .filter(weekly_availability::is_available.eq(true))
            .select(weekly_availability::day_of_week)
            .load::<i16>(&mut conn),
        policy,
        (0..=6).collect(),
        "weekly rules",
    )?
    .into_iter()
    .collect();

    let horizon_end = today + Duration::days(horizon as i64);
    let override_days: HashMap<NaiveDate, bool> = or_fail_open(
        availability_exceptions::table
            .filter(availability_exceptions::teacher_id.eq(teacher.id))
            .filter(availability_exceptions::exception_date.gt(today))
            .filter(availability_exceptions::exception_date.le(horizon_end))
            .select((
                availability_exceptions::exception_date,
                availability_exceptions::is_available,
            ))
            .load::<(NaiveDate, bool)>(&mut conn),
        policy,
        Vec::new(),
        "availability exceptions",
    )?
    .into_iter()
    .collect();

    let dates = bookable_dates(today, horizon, &open_weekdays, &override_days);

    Ok(Json(ApiResponse::ok(BookableDatesResponse {
        teacher_id: teacher.id,
        dates,
    })))
}

// ---------------------------------------------------------------------------
// GET /teachers/:id/slots?date=YYYY-MM-DD
// ---------------------------------------------------------------------------

pub async fn get_open_slots(
    State(state): State<Arc<AppState>>,
    Path(teacher_id): Path<Uuid>,
    Query(query): Query<SlotsQuery>,
) -> AppResult<Json<ApiResponse<OpenSlotsResponse>>> {
    let teacher = load_teacher(&state, teacher_id).await?;
    let policy = state.config.on_lookup_error;
    let today = Utc::now().date_naive();
    let horizon_end = today + Duration::days(state.config.booking_horizon_days as i64);

    if query.date <= today || query.date > horizon_end {
        return Err(AppError::new(
            ErrorCode::DateOutOfHorizon,
            format!(
                "date must be between {} and {}",
                today + Duration::days(1),
                horizon_end
            ),
        ));
    }

    let weekday = weekday_index(query.date);

    let mut conn = state
        .db
        .get()
        .map_err(|e| AppError::internal(format!("database connection error: {e}")))?;

    // Fail-open on the weekly rules yields an empty list, which the resolver
    // reads as a fully open day.
    let weekly: Vec<WeeklyWindow> = or_fail_open(
        weekly_availability::table
            .filter(weekly_availability::teacher_id.eq(teacher.id))
            .filter(weekly_availability::day_of_week.eq(weekday))
            .filter(weekly_availability::is_available.eq(true))
            .select((
                weekly_availability::start_time,
                weekly_availability::end_time,
            ))
            .load::<(NaiveTime, NaiveTime)>(&mut conn),
        policy,
        Vec::new(),
        "weekly rules",
    )?
    .into_iter()
    .map(|(start, end)| WeeklyWindow { start, end })
    .collect();

    let date_override: Option<DateOverride> = or_fail_open(
        availability_exceptions::table
            .filter(availability_exceptions::teacher_id.eq(teacher.id))
            .filter(availability_exceptions::exception_date.eq(query.date))
            .select((
                availability_exceptions::is_available,
                availability_exceptions::start_time,
                availability_exceptions::end_time,
            ))
            .first::<(bool, Option<NaiveTime>, Option<NaiveTime>)>(&mut conn)
            .optional(),
        policy,
        None,
        "availability exception",
    )?
    .map(|(is_available, start, end)| DateOverride {
        is_available,
        window: start.zip(end),
    });

    let booked = match booking_service::booked_times(&state.db, teacher.id, query.date) {
        Ok(times) => times,
        Err(e) if matches!(policy, LookupErrorPolicy::FailOpen) => {
            tracing::warn!(error = %e, "booked-times lookup failed, treating slots as free");
            HashSet::new()
        }
        Err(e) => return Err(e),
    };

    let slots = open_slots(
        &candidate_slots(),
        &weekly,
        date_override,
        &booked,
        state.config.open_ended_exception,
    );

    Ok(Json(ApiResponse::ok(OpenSlotsResponse {
        teacher_id: teacher.id,
        date: query.date,
        slots,
    })))
}
