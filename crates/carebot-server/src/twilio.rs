//! Outbound WhatsApp messages through the Twilio REST API.

use carebot_core::{Error, Result, TwilioCredentials};
use carebot_protocol::sanitize::whatsapp_address;
use carebot_protocol::{anonymize_phone_number, chunk_message, WHATSAPP_MAX_LENGTH};
use reqwest::Client;
use tracing::{error, info};

const TWILIO_API_BASE: &str = "https://api.twilio.com";

pub struct TwilioClient {
    client: Client,
    credentials: TwilioCredentials,
    base_url: String,
}

impl TwilioClient {
    pub fn new(credentials: TwilioCredentials) -> Self {
        Self {
            client: Client::new(),
            credentials,
            base_url: TWILIO_API_BASE.to_string(),
        }
    }

    /// Point at another API host (e.g. a local mock).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url.trim_end_matches('/'),
            self.credentials.account_sid
        )
    }

    /// Send `body` to `to`, split into WhatsApp-sized chunks. Returns the
    /// message SIDs in send order.
    pub async fn send_message(&self, to: &str, body: &str) -> Result<Vec<String>> {
        let to = whatsapp_address(to);
        let from = whatsapp_address(&self.credentials.phone_number);
        let mut sids = Vec::new();

        for chunk in chunk_message(body, WHATSAPP_MAX_LENGTH) {
            let response = self
                .client
                .post(self.messages_url())
                .basic_auth(&self.credentials.account_sid, Some(&self.credentials.auth_token))
                .form(&[("To", to.as_str()), ("From", from.as_str()), ("Body", chunk.as_str())])
                .send()
                .await
                .map_err(|e| Error::Http(format!("Twilio request failed: {}", e)))?;

            let status = response.status();
            let payload: serde_json::Value = response.json().await.unwrap_or_default();
            if !status.is_success() {
                let msg = payload["message"].as_str().unwrap_or("unknown error");
                error!("Twilio error sending message: {} {}", status, msg);
                return Err(Error::Http(format!("Twilio returned {}: {}", status, msg)));
            }

            let sid = payload["sid"].as_str().unwrap_or_default().to_string();
            info!(
                "Message sent to {} successfully. SID: {}",
                anonymize_phone_number(&to),
                sid
            );
            sids.push(sid);
        }

        Ok(sids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TwilioClient {
        TwilioClient::new(TwilioCredentials {
            account_sid: "AC123".into(),
            auth_token: "token".into(),
            phone_number: "+15550000000".into(),
        })
    }

    #[test]
    fn test_messages_url() {
        assert_eq!(
            client().messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
        assert_eq!(
            client().with_base_url("http://localhost:9/").messages_url(),
            "http://localhost:9/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_http_error() {
        let twilio = client().with_base_url("http://127.0.0.1:9");
        let err = twilio.send_message("+15551112222", "hi").await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}
