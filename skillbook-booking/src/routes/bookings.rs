use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use skillbook_shared::errors::{AppError, AppResult, ErrorCode};
use skillbook_shared::types::api::ApiResponse;
use skillbook_shared::types::auth::AuthUser;
use skillbook_shared::types::event::payloads;
use skillbook_shared::types::pagination::{Paginated, PaginationParams};

use crate::events::publisher;
use crate::models::{booking_status, Booking, NewBooking};
use crate::routes::teachers::load_teacher;
use crate::services::booking_service::{self, CommitOutcome};
use crate::timeslot::parse_booking_time;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PaymentProof {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingPayload {
    pub teacher_id: Uuid,
    pub booking_date: NaiveDate,
    /// Accepted as `HH:MM AM/PM`, `HH:MM`, or `HH:MM:SS`.
    pub booking_time: String,
    #[validate(length(min = 1, max = 100, message = "learner name must be 1-100 characters"))]
    pub learner_name: String,
    #[validate(email(message = "invalid email format"))]
    pub learner_email: String,
    pub payment: PaymentProof,
}

// ---------------------------------------------------------------------------
// POST /bookings
// ---------------------------------------------------------------------------

/// Commits a booking after checkout. The slot was only advisory until now;
/// everything here runs after the learner has already been charged.
pub async fn create_booking(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateBookingPayload>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    // 1. The signature proves the gateway saw this order/payment pair.
    if !state.payments.verify_signature(
        &payload.payment.order_id,
        &payload.payment.payment_id,
        &payload.payment.signature,
    ) {
        return Err(AppError::new(
            ErrorCode::PaymentVerificationFailed,
            "payment signature verification failed; you have not been charged for a booking",
        ));
    }

    // 2. A retry of the same callback returns the original booking.
    if let Some(existing) =
        booking_service::find_by_payment_order(&state.db, &payload.payment.order_id)?
    {
        return Ok(Json(ApiResponse::ok_with_message(
            existing,
            "booking already committed for this payment",
        )));
    }

    // 3. Parties.
    let learner = booking_service::get_or_create_learner(
        &state.db,
        auth_user.id,
        &payload.learner_name,
        &payload.learner_email,
    )?;
    let teacher = load_teacher(&state, payload.teacher_id).await?;

    // 4. Normalized time is the canonical stored form.
    let booking_time = parse_booking_time(&payload.booking_time)?;

    // 5. Conflict re-check. The money has moved, so a lost slot is its own
    //    error code and an event the refund workflow consumes.
    let conflicts = booking_service::count_slot_conflicts(
        &state.db,
        teacher.id,
        payload.booking_date,
        booking_time,
    )?;
    if conflicts > 0 {
        publisher::publish_payment_orphaned(
            &state.rabbitmq,
            payloads::PaymentOrphaned {
                order_id: payload.payment.order_id.clone(),
                payment_id: payload.payment.payment_id.clone(),
                teacher_auth_id: teacher.auth_id,
                learner_auth_id: learner.auth_id,
                booking_date: payload.booking_date,
                booking_time,
            },
        )
        .await;

        return Err(AppError::new(
            ErrorCode::SlotTakenAfterPayment,
            "slot was taken while your payment completed; a refund will be issued",
        ));
    }

    // 6. Insert. A unique violation here is the same race, just lost at the
    //    database instead of the re-check.
    let new_booking = NewBooking {
        teacher_id: teacher.id,
        learner_id: learner.id,
        teacher_auth_id: teacher.auth_id,
        learner_auth_id: learner.auth_id,
        teacher_name: teacher.name.clone(),
        teacher_skill: teacher.skill.clone(),
        learner_name: learner.name.clone(),
        learner_email: learner.email.clone(),
        booking_date: payload.booking_date,
        booking_time,
        price_per_hour: teacher.price_per_hour,
        status: booking_status::CONFIRMED.to_string(),
        group_booking_id: Uuid::new_v4(),
        payment_order_id: Some(payload.payment.order_id.clone()),
    };

    let booking = match booking_service::commit_booking(&state.db, new_booking) {
        Ok(CommitOutcome::Created(booking)) => booking,
        Ok(CommitOutcome::Duplicate(existing)) => {
            return Ok(Json(ApiResponse::ok_with_message(
                existing,
                "booking already committed for this payment",
            )));
        }
        Err(e) => {
            if matches!(
                &e,
                AppError::Known {
                    code: ErrorCode::SlotTakenAfterPayment,
                    ..
                }
            ) {
                publisher::publish_payment_orphaned(
                    &state.rabbitmq,
                    payloads::PaymentOrphaned {
                        order_id: payload.payment.order_id.clone(),
                        payment_id: payload.payment.payment_id.clone(),
                        teacher_auth_id: teacher.auth_id,
                        learner_auth_id: learner.auth_id,
                        booking_date: payload.booking_date,
                        booking_time,
                    },
                )
                .await;
            }
            return Err(e);
        }
    };

    // 7. Downstream consumers (classroom mirror) learn about the booking.
    publisher::publish_booking_created(
        &state.rabbitmq,
        payloads::BookingCreated {
            booking_id: booking.id,
            teacher_id: booking.teacher_id,
            learner_id: booking.learner_id,
            teacher_auth_id: booking.teacher_auth_id,
            learner_auth_id: booking.learner_auth_id,
            teacher_name: booking.teacher_name.clone(),
            learner_name: booking.learner_name.clone(),
            booking_date: booking.booking_date,
            booking_time: booking.booking_time,
            group_booking_id: booking.group_booking_id,
        },
    )
    .await;

    Ok(Json(ApiResponse::ok(booking)))
}

// ---------------------------------------------------------------------------
// GET /bookings
// ---------------------------------------------------------------------------

pub async fn list_bookings(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<Booking>>>> {
    let bookings = booking_service::list_for_user(&state.db, auth_user.id, &pagination)?;
    Ok(Json(ApiResponse::ok(bookings)))
}
