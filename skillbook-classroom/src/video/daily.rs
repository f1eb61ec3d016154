use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use skillbook_shared::errors::{AppError, AppResult, ErrorCode};

/// Daily-style video room API client.
#[derive(Clone)]
pub struct VideoClient {
    client: Client,
    api_key: String,
    api_base: String,
    domain: String,
}

#[derive(Debug, Deserialize)]
struct RoomResponse {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    info: String,
}

impl VideoClient {
    pub fn new(api_key: &str, api_base: &str, domain: &str) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::internal(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            domain: domain.to_string(),
        })
    }

    /// Creates the named room, returning its URL. A room that already exists
    /// is reused, so repeated calls with the same name are safe.
    pub async fn create_room(&self, name: &str) -> AppResult<String> {
        let body = serde_json::json!({
            "name": name,
            "privacy": "public",
            "properties": {
                "enable_prejoin_ui": false,
                "enable_screenshare": true,
            },
        });

        let response = self
            .client
            .post(format!("{}/rooms", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::upstream(e, "video provider"))?;

        let status = response.status();

        if status.is_success() {
            let room: RoomResponse = response
                .json()
                .await
                .map_err(|e| AppError::upstream(e, "video provider"))?;
            tracing::info!(room = %name, "video room created");
            return Ok(room.url);
        }

        // Conflict means the room survived an earlier attempt.
        if status == StatusCode::CONFLICT {
            return Ok(self.room_url(name));
        }
        if let Ok(err) = response.json::<ApiErrorBody>().await {
            if err.info.contains("already exists") {
                return Ok(self.room_url(name));
            }
            tracing::warn!(status = %status, info = %err.info, "room creation rejected");
        }

        Err(AppError::new(
            ErrorCode::RoomProvisionFailed,
            format!("video provider rejected room creation: {status}"),
        ))
    }

    pub fn room_url(&self, name: &str) -> String {
        format!("https://{}/{}", self.domain, name)
    }

    /// Join URL carrying the participant's display name.
    pub fn join_url(&self, name: &str, participant: &str) -> AppResult<String> {
        let mut url = Url::parse(&self.room_url(name))
            .map_err(|e| AppError::internal(format!("invalid room url: {e}")))?;
        url.query_pairs_mut().append_pair("t", participant);
        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> VideoClient {
        VideoClient::new("key", "https://api.example.com/v1", "skillbook.daily.co").unwrap()
    }

    #[test]
    fn room_url_uses_the_configured_domain() {
        assert_eq!(
            client().room_url("Asha-Ben-7"),
            "https://skillbook.daily.co/Asha-Ben-7"
        );
    }

    #[test]
    fn join_url_encodes_the_participant_name() {
        let url = client().join_url("Asha-Ben-7", "Ben Lee").unwrap();
        assert_eq!(url, "https://skillbook.daily.co/Asha-Ben-7?t=Ben+Lee");
    }
}
