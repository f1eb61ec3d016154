use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// RabbitMQ event envelope wrapping all domain events.
///
/// Routing key format: `skillbook.{domain}.{entity}.{action}`
/// Example: `skillbook.booking.booking.created`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event<T: Serialize> {
    pub id: Uuid,
    pub source: String,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub correlation_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub data: T,
}

impl<T: Serialize> Event<T> {
    pub fn new(source: impl Into<String>, event_type: impl Into<String>, data: T) -> Self {
        Self {
            id: Uuid::now_v7(),
            source: source.into(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            correlation_id: None,
            user_id: None,
            data,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_correlation(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}

/// RabbitMQ routing keys
pub mod routing_keys {
    // Booking events
    pub const BOOKING_CREATED: &str = "skillbook.booking.booking.created";
    pub const BOOKING_PAYMENT_ORPHANED: &str = "skillbook.booking.payment.orphaned";
    pub const TEACHER_REGISTERED: &str = "skillbook.booking.teacher.registered";

    // Classroom events
    pub const CLASS_STARTED: &str = "skillbook.classroom.class.started";
    pub const CLASS_ENDED: &str = "skillbook.classroom.class.ended";
}

/// Common event data payloads
pub mod payloads {
    use super::*;

    /// Everything the classroom service needs to authorize start/join
    /// without calling back into the booking service.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct BookingCreated {
        pub booking_id: Uuid,
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

    /// Payment was verified but the slot was gone at commit time. Consumers
    /// drive the refund / rebooking flow from this.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct PaymentOrphaned {
        pub order_id: String,
        pub payment_id: String,
        pub teacher_auth_id: Uuid,
        pub learner_auth_id: Uuid,
        pub booking_date: NaiveDate,
        pub booking_time: NaiveTime,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct TeacherRegistered {
        pub teacher_id: Uuid,
        pub auth_id: Uuid,
        pub name: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ClassStarted {
        pub class_id: Uuid,
        pub booking_id: Uuid,
        pub teacher_id: Uuid,
        pub learner_id: Uuid,
        pub room_id: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ClassEnded {
        pub class_id: Uuid,
        pub booking_id: Uuid,
        pub duration_secs: i64,
    }
}
