//! Twilio channel: outbound messages via the Messages REST API.

use crate::channels::MessageTransport;
use async_trait::async_trait;

const TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Twilio connector: sends WhatsApp messages from the configured sender address.
pub struct TwilioChannel {
    account_sid: Option<String>,
    auth_token: Option<String>,
    sender_address: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl TwilioChannel {
    pub fn new(
        account_sid: Option<String>,
        auth_token: Option<String>,
        sender_address: Option<String>,
    ) -> Self {
        Self {
            account_sid,
            auth_token,
            sender_address,
            base_url: TWILIO_API_BASE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the API base URL (for tests or proxies).
    #[allow(dead_code)]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Send a text message via POST /2010-04-01/Accounts/{sid}/Messages.json.
    pub async fn send_message(&self, to: &str, body: &str) -> Result<(), String> {
        let sid = self
            .account_sid
            .as_ref()
            .ok_or("twilio account sid not configured")?;
        let token = self
            .auth_token
            .as_ref()
            .ok_or("twilio auth token not configured")?;
        let from = self
            .sender_address
            .as_ref()
            .ok_or("twilio sender address not configured")?;
        let url = format!("{}/2010-04-01/Accounts/{}/Messages.json", self.base_url, sid);
        let params = [("From", from.as_str()), ("To", to), ("Body", body)];
        let res = self
            .client
            .post(&url)
            .basic_auth(sid, Some(token))
            .form(&params)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("message send failed: {} {}", status, body));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageTransport for TwilioChannel {
    async fn send(&self, to: &str, body: &str) -> Result<(), String> {
        TwilioChannel::send_message(self, to, body).await
    }
}
