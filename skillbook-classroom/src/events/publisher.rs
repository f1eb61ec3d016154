use skillbook_shared::clients::rabbitmq::RabbitMqClient;
use skillbook_shared::types::event::{payloads, routing_keys, Event};

pub async fn publish_class_started(rabbitmq: &RabbitMqClient, payload: payloads::ClassStarted) {
    let event = Event::new("skillbook-classroom", routing_keys::CLASS_STARTED, payload);

    if let Err(e) = rabbitmq.publish(routing_keys::CLASS_STARTED, &event).await {
        tracing::error!(error = %e, "failed to publish class.started event");
    }
}

pub async fn publish_class_ended(rabbitmq: &RabbitMqClient, payload: payloads::ClassEnded) {
    let event = Event::new("skillbook-classroom", routing_keys::CLASS_ENDED, payload);

    if let Err(e) = rabbitmq.publish(routing_keys::CLASS_ENDED, &event).await {
        tracing::error!(error = %e, "failed to publish class.ended event");
    }
}
