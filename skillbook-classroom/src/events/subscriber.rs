use std::sync::Arc;

use futures_lite::StreamExt;
use lapin::options::BasicAckOptions;

use skillbook_shared::types::event::{payloads, routing_keys, Event};

use crate::services::session_service;
use crate::AppState;

/// Consumes `booking.created` events into the local bookings mirror. The
/// queue is durable, so bookings committed while this service was down are
/// replayed on startup.
pub async fn listen_booking_created(state: Arc<AppState>) -> anyhow::Result<()> {
    let mut consumer = state
        .rabbitmq
        .subscribe(
            "skillbook-classroom.booking.created",
            &[routing_keys::BOOKING_CREATED],
        )
        .await?;

    tracing::info!("listening for booking.created events");

    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                match serde_json::from_slice::<Event<payloads::BookingCreated>>(&delivery.data) {
                    Ok(event) => {
                        let data = &event.data;
                        match session_service::sync_booking(&state.db, data) {
                            Ok(1) => {
                                tracing::info!(
                                    booking_id = %data.booking_id,
                                    "booking mirrored"
                                );
                            }
                            Ok(_) => {
                                tracing::debug!(
                                    booking_id = %data.booking_id,
                                    "booking already mirrored, redelivery dropped"
                                );
                            }
                            Err(e) => {
                                tracing::error!(
                                    error = %e,
                                    booking_id = %data.booking_id,
                                    "failed to mirror booking"
                                );
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to deserialize booking.created event");
                    }
                }
                let _ = delivery.ack(BasicAckOptions::default()).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "consumer error");
            }
        }
    }

    Ok(())
}
