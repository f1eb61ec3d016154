use std::collections::HashSet;

use chrono::{NaiveDate, NaiveTime};
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use uuid::Uuid;

use skillbook_shared::clients::db::DbPool;
use skillbook_shared::errors::{AppError, AppResult, ErrorCode};
use skillbook_shared::types::pagination::{Paginated, PaginationParams};

use crate::models::{booking_status, Booking, Learner, NewBooking, NewLearner};
use crate::schema::{bookings, learners};

/// Result of attempting to commit a paid booking.
pub enum CommitOutcome {
    Created(Booking),
    /// The same payment order was already committed. Safe retry of the
    /// checkout callback; the original booking is returned unchanged.
    Duplicate(Booking),
}

/// Finds the learner row for an authenticated user, creating it on first
/// booking. Learner rows are provisioned lazily rather than at signup.
pub fn get_or_create_learner(
    pool: &DbPool,
    auth_id: Uuid,
    name: &str,
    email: &str,
) -> AppResult<Learner> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    if let Some(learner) = learners::table
        .filter(learners::auth_id.eq(auth_id))
        .first::<Learner>(&mut conn)
        .optional()?
    {
        return Ok(learner);
    }

    let new_learner = NewLearner {
        auth_id,
        name: name.to_string(),
        email: email.to_string(),
    };

    let learner = diesel::insert_into(learners::table)
        .values(&new_learner)
        .get_result::<Learner>(&mut conn)?;

    tracing::info!(learner_id = %learner.id, auth_id = %auth_id, "learner created");

    Ok(learner)
}

/// Returns the booking previously committed for a payment order, if any.
/// Used to make the checkout callback idempotent.
pub fn find_by_payment_order(pool: &DbPool, order_id: &str) -> AppResult<Option<Booking>> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let booking = bookings::table
        .filter(bookings::payment_order_id.eq(order_id))
        .first::<Booking>(&mut conn)
        .optional()?;

    Ok(booking)
}

/// Counts holds on a specific slot across pending and confirmed bookings.
pub fn count_slot_conflicts(
    pool: &DbPool,
    teacher_id: Uuid,
    date: NaiveDate,
    time: NaiveTime,
) -> AppResult<i64> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let count = bookings::table
        .filter(bookings::teacher_id.eq(teacher_id))
        .filter(bookings::booking_date.eq(date))
        .filter(bookings::booking_time.eq(time))
        .filter(bookings::status.eq_any(booking_status::ACTIVE))
        .count()
        .get_result::<i64>(&mut conn)?;

    Ok(count)
}

/// Times already held on a given date, for subtraction from the candidate
/// grid when resolving open slots.
pub fn booked_times(
    pool: &DbPool,
    teacher_id: Uuid,
    date: NaiveDate,
) -> AppResult<HashSet<NaiveTime>> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let times = bookings::table
        .filter(bookings::teacher_id.eq(teacher_id))
        .filter(bookings::booking_date.eq(date))
        .filter(bookings::status.eq_any(booking_status::ACTIVE))
        .select(bookings::booking_time)
        .load::<NaiveTime>(&mut conn)?;

    Ok(times.into_iter().collect())
}

/// How a unique violation at insert time is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueViolationKind {
    /// The `payment_order_id` constraint fired: a concurrent retry of the
    /// same callback won the insert.
    PaymentOrderRetry,
    /// The slot index fired: another booking holds this slot.
    SlotConflict,
}

pub fn classify_unique_violation(constraint_name: Option<&str>) -> UniqueViolationKind {
    match constraint_name {
        Some(name) if name.contains("payment_order") => UniqueViolationKind::PaymentOrderRetry,
        _ => UniqueViolationKind::SlotConflict,
    }
}

/// Inserts the booking. The slot is protected by a partial unique index over
/// `(teacher_id, booking_date, booking_time)` restricted to active statuses,
/// so a concurrent commit of the same slot surfaces as a unique violation
/// here rather than a double booking.
pub fn commit_booking(pool: &DbPool, new_booking: NewBooking) -> AppResult<CommitOutcome> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    match diesel::insert_into(bookings::table)
        .values(&new_booking)
        .get_result::<Booking>(&mut conn)
    {
        Ok(booking) => {
            tracing::info!(
                booking_id = %booking.id,
                teacher_id = %booking.teacher_id,
                date = %booking.booking_date,
                time = %booking.booking_time,
                "booking committed"
            );
            Ok(CommitOutcome::Created(booking))
        }
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info)) => {
            match classify_unique_violation(info.constraint_name()) {
                UniqueViolationKind::PaymentOrderRetry => {
                    let existing = bookings::table
                        .filter(bookings::payment_order_id.eq(&new_booking.payment_order_id))
                        .first::<Booking>(&mut conn)?;
                    Ok(CommitOutcome::Duplicate(existing))
                }
                UniqueViolationKind::SlotConflict => Err(AppError::new(
                    ErrorCode::SlotTakenAfterPayment,
                    "slot was taken while payment completed",
                )),
            }
        }
        Err(e) => Err(e.into()),
    }
}

/// Bookings visible to an authenticated user, teacher or learner side,
/// newest date first.
pub fn list_for_user(
    pool: &DbPool,
    auth_id: Uuid,
    pagination: &PaginationParams,
) -> AppResult<Paginated<Booking>> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let total = bookings::table
        .filter(
            bookings::teacher_auth_id
                .eq(auth_id)
                .or(bookings::learner_auth_id.eq(auth_id)),
        )
        .count()
        .get_result::<i64>(&mut conn)?;

    let results = bookings::table
        .filter(
            bookings::teacher_auth_id
                .eq(auth_id)
                .or(bookings::learner_auth_id.eq(auth_id)),
        )
        .order((bookings::booking_date.desc(), bookings::booking_time.desc()))
        .offset(pagination.offset() as i64)
        .limit(pagination.limit() as i64)
        .load::<Booking>(&mut conn)?;

    Ok(Paginated::new(results, total as u64, pagination))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_order_constraint_reads_as_callback_retry() {
        assert_eq!(
            classify_unique_violation(Some("bookings_payment_order_id_key")),
            UniqueViolationKind::PaymentOrderRetry
        );
    }

    #[test]
    fn slot_index_reads_as_conflict() {
        assert_eq!(
            classify_unique_violation(Some("bookings_active_slot_idx")),
            UniqueViolationKind::SlotConflict
        );
    }

    #[test]
    fn missing_constraint_name_reads_as_conflict() {
        // A driver that drops the constraint name must not turn a lost slot
        // into a silent duplicate return.
        assert_eq!(
            classify_unique_violation(None),
            UniqueViolationKind::SlotConflict
        );
    }
}
