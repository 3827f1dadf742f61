use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{Delivery, MessageGateway, MessagingError, OutgoingMessage};
use crate::config::MessagingConfig;

const SEND_PATH: &str = "/api/whatsapp/send";

/// Posts messages to the club web app's WhatsApp endpoint.
#[derive(Clone)]
pub struct HttpMessageGateway {
    client: Client,
    endpoint: String,
}

impl HttpMessageGateway {
    pub fn new(config: &MessagingConfig) -> Result<Self, MessagingError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| MessagingError::Transport(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            client,
            endpoint: endpoint(&config.api_url),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn endpoint(api_url: &str) -> String {
    format!("{}{SEND_PATH}", api_url.trim_end_matches('/'))
}

#[async_trait]
impl MessageGateway for HttpMessageGateway {
    async fn send_text(&self, message: &OutgoingMessage) -> Result<Delivery, MessagingError> {
        let payload = json!({ "telefone": message.phone, "mensagem": message.message });
        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, "message relay unreachable");
                MessagingError::Transport(err.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "message relay rejected message");
            return Err(MessagingError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let provider_response = response.json::<Value>().await.unwrap_or(Value::Null);
        info!(phone = %message.phone, "whatsapp message sent");
        Ok(Delivery {
            phone: message.phone.clone(),
            provider_response,
        })
    }
}
