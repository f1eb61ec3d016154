use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use skillbook_shared::errors::AppResult;
use skillbook_shared::types::api::ApiResponse;
use skillbook_shared::types::auth::AuthUser;

use crate::routes::teachers::load_teacher;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateOrderPayload {
    pub teacher_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub order_id: String,
    /// Public key id the checkout widget needs.
    pub key_id: String,
    pub amount: i64,
    pub currency: String,
}

// ---------------------------------------------------------------------------
// POST /payments/order
// ---------------------------------------------------------------------------

pub async fn create_order(
    auth_user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateOrderPayload>,
) -> AppResult<Json<ApiResponse<CreateOrderResponse>>> {
    let teacher = load_teacher(&state, payload.teacher_id).await?;

    // Hourly price is stored in whole currency units; the gateway wants
    // minor units.
    let amount_minor = i64::from(teacher.price_per_hour) * 100;
    let receipt = format!("bk-{}", Uuid::new_v4());
    let notes = serde_json::json!({
        "teacher_id": teacher.id,
        "learner_auth_id": auth_user.id,
    });

    let order_id = state
        .payments
        .create_order(amount_minor, &state.config.payment_currency, &receipt, notes)
        .await?;

    Ok(Json(ApiResponse::ok(CreateOrderResponse {
        order_id,
        key_id: state.payments.key_id().to_string(),
        amount: amount_minor,
        currency: state.config.payment_currency.clone(),
    })))
}
