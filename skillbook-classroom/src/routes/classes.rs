use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use skillbook_shared::errors::{AppError, AppResult, ErrorCode};
use skillbook_shared::middleware::TeacherUser;
use skillbook_shared::types::api::ApiResponse;
use skillbook_shared::types::auth::AuthUser;
use skillbook_shared::types::event::payloads;

use crate::events::publisher;
use crate::models::{Booking, ClassSession};
use crate::services::session_service::{self, EndDecision, StartDecision};
use crate::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct StartClassPayload {
    pub booking_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct JoinClassPayload {
    pub booking_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct EndClassPayload {
    pub class_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub booking_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CreateRoomPayload {
    pub room_name: String,
    pub participant_name: String,
}

#[derive(Debug, Serialize)]
pub struct ClassResponse {
    pub class_id: Uuid,
    pub booking_id: Uuid,
    pub room_id: String,
    pub room_url: String,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct JoinClassResponse {
    pub class_id: Uuid,
    pub room_id: String,
    pub join_url: String,
}

#[derive(Debug, Serialize)]
pub struct ClassStatusResponse {
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// Interval clients should wait before polling again.
    pub poll_after_secs: u32,
}

#[derive(Debug, Serialize)]
pub struct RoomResponse {
    pub room_url: String,
    pub join_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ActiveClassEntry {
    class_id: Uuid,
    room_id: String,
    started_at: DateTime<Utc>,
}

fn active_class_key(booking_id: Uuid) -> String {
    format!("class:active:{booking_id}")
}

fn require_participant(booking: &Booking, auth_id: Uuid) -> AppResult<()> {
    if booking.teacher_auth_id != auth_id && booking.learner_auth_id != auth_id {
        return Err(AppError::new(
            ErrorCode::NotClassParticipant,
            "you are not a participant of this booking",
        ));
    }
    Ok(())
}

async fn cache_active_session(state: &AppState, session: &ClassSession) {
    let entry = ActiveClassEntry {
        class_id: session.id,
        room_id: session.room_id.clone(),
        started_at: session.started_at,
    };
    if let Ok(value) = serde_json::to_string(&entry) {
        let _ = state
            .redis
            .set(
                &active_class_key(session.booking_id),
                &value,
                state.config.active_class_ttl_secs,
            )
            .await;
    }
}

// ---------------------------------------------------------------------------
// POST /classes/start
// ---------------------------------------------------------------------------

pub async fn start_class(
    TeacherUser(auth_user): TeacherUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<StartClassPayload>,
) -> AppResult<Json<ApiResponse<ClassResponse>>> {
    let booking = session_service::find_booking(&state.db, payload.booking_id)?;

    if booking.teacher_auth_id != auth_user.id {
        return Err(AppError::new(
            ErrorCode::NotClassParticipant,
            "only the booked teacher can start this class",
        ));
    }

    // Starting twice returns the running session instead of erroring.
    let active = session_service::active_session(&state.db, booking.id)?;
    let room_id = match session_service::resolve_start(
        active,
        &booking.teacher_name,
        &booking.learner_name,
        Utc::now().timestamp_millis(),
    ) {
        StartDecision::Reuse(session) => {
            let room_url = state.video.room_url(&session.room_id);
            return Ok(Json(ApiResponse::ok_with_message(
                ClassResponse {
                    class_id: session.id,
                    booking_id: booking.id,
                    room_id: session.room_id.clone(),
                    room_url,
                    started_at: session.started_at,
                },
                "class already started",
            )));
        }
        StartDecision::Provision { room_id } => room_id,
    };
    let room_url = state.video.create_room(&room_id).await?;

    let session = session_service::start_session(&state.db, &booking, &room_id)?;

    cache_active_session(&state, &session).await;

    publisher::publish_class_started(
        &state.rabbitmq,
        payloads::ClassStarted {
            class_id: session.id,
            booking_id: booking.id,
            teacher_id: booking.teacher_id,
            learner_id: booking.learner_id,
            room_id: room_id.clone(),
        },
    )
    .await;

    Ok(Json(ApiResponse::ok(ClassResponse {
        class_id: session.id,
        booking_id: booking.id,
        room_id,
        room_url,
        started_at: session.started_at,
    })))
}

// ---------------------------------------------------------------------------
// POST /classes/join
// ---------------------------------------------------------------------------

pub async fn join_class(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<JoinClassPayload>,
) -> AppResult<Json<ApiResponse<JoinClassResponse>>> {
    let booking = session_service::find_booking(&state.db, payload.booking_id)?;

    if booking.learner_auth_id != auth_user.id {
        return Err(AppError::new(
            ErrorCode::NotClassParticipant,
            "only the booked learner can join this class",
        ));
    }

    let session =
        session_service::resolve_join(session_service::active_session(&state.db, booking.id)?)?;

    let join_url = state
        .video
        .join_url(&session.room_id, &booking.learner_name)?;

    Ok(Json(ApiResponse::ok(JoinClassResponse {
        class_id: session.id,
        room_id: session.room_id,
        join_url,
    })))
}

// ---------------------------------------------------------------------------
// GET /classes/status?booking_id=
// ---------------------------------------------------------------------------

pub async fn class_status(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatusQuery>,
) -> AppResult<Json<ApiResponse<ClassStatusResponse>>> {
    let booking = session_service::find_booking(&state.db, query.booking_id)?;
    require_participant(&booking, auth_user.id)?;

    let poll_after_secs = state.config.status_poll_secs;

    // Redis fast path; polling clients mostly never reach the database.
    if let Ok(Some(raw)) = state.redis.get(&active_class_key(booking.id)).await {
        if let Ok(entry) = serde_json::from_str::<ActiveClassEntry>(&raw) {
            return Ok(Json(ApiResponse::ok(ClassStatusResponse {
                active: true,
                class_id: Some(entry.class_id),
                room_id: Some(entry.room_id),
                started_at: Some(entry.started_at),
                poll_after_secs,
            })));
        }
    }

    match session_service::active_session(&state.db, booking.id)? {
        Some(session) => {
            cache_active_session(&state, &session).await;
            Ok(Json(ApiResponse::ok(ClassStatusResponse {
                active: true,
                class_id: Some(session.id),
                room_id: Some(session.room_id),
                started_at: Some(session.started_at),
                poll_after_secs,
            })))
        }
        None => Ok(Json(ApiResponse::ok(ClassStatusResponse {
            active: false,
            class_id: None,
            room_id: None,
            started_at: None,
            poll_after_secs,
        }))),
    }
}

// ---------------------------------------------------------------------------
// POST /classes/end
// ---------------------------------------------------------------------------

pub async fn end_class(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EndClassPayload>,
) -> AppResult<Json<ApiResponse<ClassSession>>> {
    let session = session_service::find_session(&state.db, payload.class_id)?;
    let booking = session_service::find_booking(&state.db, session.booking_id)?;
    require_participant(&booking, auth_user.id)?;

    let updated = session_service::end_session(&state.db, session.id)?;

    // Cleared on every end call; an earlier call's best-effort delete may
    // have failed and left a stale fast-path entry.
    let _ = state.redis.del(&active_class_key(booking.id)).await;

    let ended = match session_service::resolve_end(session, updated) {
        EndDecision::Ended(ended) => ended,
        EndDecision::AlreadyEnded(prior) => {
            return Ok(Json(ApiResponse::ok_with_message(
                prior,
                "class already ended",
            )));
        }
    };

    let duration_secs = ended
        .ended_at
        .map(|at| (at - ended.started_at).num_seconds())
        .unwrap_or(0);

    publisher::publish_class_ended(
        &state.rabbitmq,
        payloads::ClassEnded {
            class_id: ended.id,
            booking_id: booking.id,
            duration_secs,
        },
    )
    .await;

    Ok(Json(ApiResponse::ok(ended)))
}

// ---------------------------------------------------------------------------
// POST /classes/room
// ---------------------------------------------------------------------------

pub async fn create_room(
    _auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateRoomPayload>,
) -> AppResult<Json<ApiResponse<RoomResponse>>> {
    if payload.room_name.trim().is_empty() {
        return Err(AppError::bad_request("room_name must not be empty"));
    }

    let room_url = state.video.create_room(payload.room_name.trim()).await?;
    let join_url = state
        .video
        .join_url(payload.room_name.trim(), &payload.participant_name)?;

    Ok(Json(ApiResponse::ok(RoomResponse { room_url, join_url })))
}
