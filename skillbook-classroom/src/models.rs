use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{bookings, class_sessions};

/// Local mirror of a committed booking, fed by `booking.created` events.
/// Carries exactly the fields needed to authorize and name a class.
#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = bookings)]
pub struct Booking {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub learner_id: Uuid,
    pub teacher_auth_id: Uuid,
    pub learner_auth_id: Uuid,
    pub teacher_name: String,
    pub learner_name: String,
    pub booking_date: NaiveDate,
    pub booking_time: NaiveTime,
    pub group_booking_id: Uuid,
    pub synced_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = bookings)]
pub struct NewBooking {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub learner_id: Uuid,
    pub teacher_auth_id: Uuid,
    pub learner_auth_id: Uuid,
    pub teacher_name: String,
    pub learner_name: String,
    pub booking_date: NaiveDate,
    pub booking_time: NaiveTime,
    pub group_booking_id: Uuid,
}

/// A class run against a booking. Active while `ended_at` is null.
#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = class_sessions)]
pub struct ClassSession {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub teacher_id: Uuid,
    pub learner_id: Uuid,
    pub room_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = class_sessions)]
pub struct NewClassSession {
    pub booking_id: Uuid,
    pub teacher_id: Uuid,
    pub learner_id: Uuid,
    pub room_id: String,
}
