use skillbook_shared::clients::rabbitmq::RabbitMqClient;
use skillbook_shared::types::event::{payloads, routing_keys, Event};

// Publish failures are logged, never surfaced to the API caller. A booking
// that committed stays committed even when the broker is down.

pub async fn publish_booking_created(
    rabbitmq: &RabbitMqClient,
    payload: payloads::BookingCreated,
) {
    let learner_auth_id = payload.learner_auth_id;
    let event = Event::new("skillbook-booking", routing_keys::BOOKING_CREATED, payload)
        .with_user(learner_auth_id);

    if let Err(e) = rabbitmq.publish(routing_keys::BOOKING_CREATED, &event).await {
        tracing::error!(error = %e, "failed to publish booking.created event");
    }
}

pub async fn publish_payment_orphaned(
    rabbitmq: &RabbitMqClient,
    payload: payloads::PaymentOrphaned,
) {
    let learner_auth_id = payload.learner_auth_id;
    let event = Event::new(
        "skillbook-booking",
        routing_keys::BOOKING_PAYMENT_ORPHANED,
        payload,
    )
    .with_user(learner_auth_id);

    if let Err(e) = rabbitmq
        .publish(routing_keys::BOOKING_PAYMENT_ORPHANED, &event)
        .await
    {
        tracing::error!(error = %e, "failed to publish payment.orphaned event");
    }
}

pub async fn publish_teacher_registered(
    rabbitmq: &RabbitMqClient,
    payload: payloads::TeacherRegistered,
) {
    let auth_id = payload.auth_id;
    let event = Event::new(
        "skillbook-booking",
        routing_keys::TEACHER_REGISTERED,
        payload,
    )
    .with_user(auth_id);

    if let Err(e) = rabbitmq
        .publish(routing_keys::TEACHER_REGISTERED, &event)
        .await
    {
        tracing::error!(error = %e, "failed to publish teacher.registered event");
    }
}
