use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use skillbook_shared::clients::db::DbPool;
use skillbook_shared::errors::{AppError, AppResult, ErrorCode};
use skillbook_shared::types::event::payloads;

use crate::models::{Booking, ClassSession, NewBooking, NewClassSession};
use crate::schema::{bookings, class_sessions};

/// Upserts the local booking mirror row. Redelivered events hit the
/// conflict arm and are dropped silently.
pub fn sync_booking(pool: &DbPool, data: &payloads::BookingCreated) -> AppResult<usize> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let row = NewBooking {
        id: data.booking_id,
        teacher_id: data.teacher_id,
        learner_id: data.learner_id,
        teacher_auth_id: data.teacher_auth_id,
        learner_auth_id: data.learner_auth_id,
        teacher_name: data.teacher_name.clone(),
        learner_name: data.learner_name.clone(),
        booking_date: data.booking_date,
        booking_time: data.booking_time,
        group_booking_id: data.group_booking_id,
    };

    let inserted = diesel::insert_into(bookings::table)
        .values(&row)
        .on_conflict(bookings::id)
        .do_nothing()
        .execute(&mut conn)?;

    Ok(inserted)
}

pub fn find_booking(pool: &DbPool, booking_id: Uuid) -> AppResult<Booking> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    bookings::table
        .find(booking_id)
        .first::<Booking>(&mut conn)
        .optional()?
        .ok_or_else(|| {
            AppError::new(
                ErrorCode::BookingNotSynced,
                "booking not known to the classroom service yet",
            )
        })
}

/// The active session for a booking, if one is running.
pub fn active_session(pool: &DbPool, booking_id: Uuid) -> AppResult<Option<ClassSession>> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let session = class_sessions::table
        .filter(class_sessions::booking_id.eq(booking_id))
        .filter(class_sessions::ended_at.is_null())
        .first::<ClassSession>(&mut conn)
        .optional()?;

    Ok(session)
}

pub fn start_session(pool: &DbPool, booking: &Booking, room_id: &str) -> AppResult<ClassSession> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let new_session = NewClassSession {
        booking_id: booking.id,
        teacher_id: booking.teacher_id,
        learner_id: booking.learner_id,
        room_id: room_id.to_string(),
    };

    let session = diesel::insert_into(class_sessions::table)
        .values(&new_session)
        .get_result::<ClassSession>(&mut conn)?;

    tracing::info!(
        class_id = %session.id,
        booking_id = %booking.id,
        room_id = %room_id,
        "class session started"
    );

    Ok(session)
}

pub fn find_session(pool: &DbPool, class_id: Uuid) -> AppResult<ClassSession> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    class_sessions::table
        .find(class_id)
        .first::<ClassSession>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ClassNotFound, "class not found"))
}

/// Ends a session. The `ended_at IS NULL` guard makes a repeated end call a
/// no-op; `None` means it was already ended.
pub fn end_session(pool: &DbPool, class_id: Uuid) -> AppResult<Option<ClassSession>> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let updated = diesel::update(
        class_sessions::table
            .find(class_id)
            .filter(class_sessions::ended_at.is_null()),
    )
    .set(class_sessions::ended_at.eq(Some(Utc::now())))
    .get_result::<ClassSession>(&mut conn)
    .optional()?;

    Ok(updated)
}

/// Outcome of a start request given the currently active session.
pub enum StartDecision {
    /// A session is already running; return it unchanged.
    Reuse(ClassSession),
    /// No active session; provision this room and insert.
    Provision { room_id: String },
}

pub fn resolve_start(
    active: Option<ClassSession>,
    teacher_name: &str,
    learner_name: &str,
    millis: i64,
) -> StartDecision {
    match active {
        Some(session) => StartDecision::Reuse(session),
        None => StartDecision::Provision {
            room_id: room_name(teacher_name, learner_name, millis),
        },
    }
}

/// Join needs a running session; absence is the "not started yet" case.
pub fn resolve_join(active: Option<ClassSession>) -> AppResult<ClassSession> {
    active.ok_or_else(|| {
        AppError::new(
            ErrorCode::ClassNotStarted,
            "the teacher has not started this class yet",
        )
    })
}

/// Outcome of an end request, given the result of the guarded update.
pub enum EndDecision {
    Ended(ClassSession),
    /// The update matched nothing; the session had already ended.
    AlreadyEnded(ClassSession),
}

pub fn resolve_end(prior: ClassSession, updated: Option<ClassSession>) -> EndDecision {
    match updated {
        Some(ended) => EndDecision::Ended(ended),
        None => EndDecision::AlreadyEnded(prior),
    }
}

/// Room names join the participant names and a millisecond timestamp, with
/// whitespace runs collapsed to single dashes.
pub fn room_name(teacher_name: &str, learner_name: &str, millis: i64) -> String {
    let collapse = |s: &str| s.split_whitespace().collect::<Vec<_>>().join("-");
    format!(
        "{}-{}-{}",
        collapse(teacher_name),
        collapse(learner_name),
        millis
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id_seed: u128) -> ClassSession {
        ClassSession {
            id: Uuid::from_u128(id_seed),
            booking_id: Uuid::from_u128(100),
            teacher_id: Uuid::from_u128(101),
            learner_id: Uuid::from_u128(102),
            room_id: "Asha-Ben-1".to_string(),
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    #[test]
    fn start_twice_reuses_the_running_session() {
        let running = session(7);

        for millis in [1_000, 2_000] {
            match resolve_start(Some(running.clone()), "Asha", "Ben", millis) {
                StartDecision::Reuse(s) => assert_eq!(s.id, running.id),
                StartDecision::Provision { .. } => panic!("must not provision a second room"),
            }
        }
    }

    #[test]
    fn start_without_active_session_provisions_a_room() {
        match resolve_start(None, "Asha Rao", "Ben", 42) {
            StartDecision::Provision { room_id } => assert_eq!(room_id, "Asha-Rao-Ben-42"),
            StartDecision::Reuse(_) => panic!("nothing to reuse"),
        }
    }

    #[test]
    fn join_before_start_is_not_started() {
        let err = resolve_join(None).unwrap_err();
        match err {
            AppError::Known { code, .. } => assert_eq!(code, ErrorCode::ClassNotStarted),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn join_returns_the_active_session() {
        let running = session(9);
        let joined = resolve_join(Some(running.clone())).unwrap();
        assert_eq!(joined.id, running.id);
        assert_eq!(joined.room_id, running.room_id);
    }

    #[test]
    fn repeated_end_is_a_noop_success() {
        let prior = session(11);

        match resolve_end(prior.clone(), None) {
            EndDecision::AlreadyEnded(s) => assert_eq!(s.id, prior.id),
            EndDecision::Ended(_) => panic!("nothing was updated"),
        }
    }

    #[test]
    fn room_name_collapses_whitespace() {
        assert_eq!(
            room_name("Asha Rao", "Ben  Lee", 1700000000000),
            "Asha-Rao-Ben-Lee-1700000000000"
        );
    }

    #[test]
    fn room_name_handles_single_word_names() {
        assert_eq!(room_name("Asha", "Ben", 42), "Asha-Ben-42");
    }

    #[test]
    fn room_name_trims_leading_and_trailing_whitespace() {
        assert_eq!(room_name(" Asha ", "Ben\tLee", 7), "Asha-Ben-Lee-7");
    }
}
