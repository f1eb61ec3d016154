use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{availability_exceptions, bookings, learners, teachers, weekly_availability};

// --- Teacher ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = teachers)]
pub struct Teacher {
    pub id: Uuid,
    pub auth_id: Uuid,
    pub name: String,
    pub email: String,
    pub skill: String,
    pub price_per_hour: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = teachers)]
pub struct NewTeacher {
    pub auth_id: Uuid,
    pub name: String,
    pub email: String,
    pub skill: String,
    pub price_per_hour: i32,
}

// --- Learner ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = learners)]
pub struct Learner {
    pub id: Uuid,
    pub auth_id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = learners)]
pub struct NewLearner {
    pub auth_id: Uuid,
    pub name: String,
    pub email: String,
}

// --- WeeklyAvailability ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = weekly_availability)]
pub struct WeeklyAvailability {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = weekly_availability)]
pub struct NewWeeklyAvailability {
    pub teacher_id: Uuid,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_available: bool,
}

// --- AvailabilityException ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = availability_exceptions)]
pub struct AvailabilityException {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub exception_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub is_available: bool,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = availability_exceptions)]
pub struct NewAvailabilityException {
    pub teacher_id: Uuid,
    pub exception_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub is_available: bool,
    pub reason: Option<String>,
}

// --- Booking ---

pub mod booking_status {
    pub const PENDING: &str = "pending";
    pub const CONFIRMED: &str = "confirmed";
    pub const COMPLETED: &str = "completed";

    /// Statuses that hold a slot against new bookings.
    pub const ACTIVE: [&str; 2] = [PENDING, CONFIRMED];
}

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = bookings)]
pub struct Booking {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub learner_id: Uuid,
    pub teacher_auth_id: Uuid,
    pub learner_auth_id: Uuid,
    pub teacher_name: String,
    pub teacher_skill: String,
    pub learner_name: String,
    pub learner_email: String,
    pub booking_date: NaiveDate,
    pub booking_time: NaiveTime,
    pub price_per_hour: i32,
    pub status: String,
    pub group_booking_id: Uuid,
    pub payment_order_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Deserialize)]
#[diesel(table_name = bookings)]
pub struct NewBooking {
    pub teacher_id: Uuid,
    pub learner_id: Uuid,
    pub teacher_auth_id: Uuid,
    pub learner_auth_id: Uuid,
    pub teacher_name: String,
    pub teacher_skill: String,
    pub learner_name: String,
    pub learner_email: String,
    pub booking_date: NaiveDate,
    pub booking_time: NaiveTime,
    pub price_per_hour: i32,
    pub status: String,
    pub group_booking_id: Uuid,
    pub payment_order_id: Option<String>,
}
