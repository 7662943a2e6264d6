// src/mailer.rs

use reqwest::blocking::Client;
use serde::Serialize;
use thiserror::Error;

const BREVO_SEND_URL: &str = "https://api.brevo.com/v3/smtp/email";

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("API error: status {0}")]
    ApiError(u16),
}

pub struct BrevoMailer {
    api_key: String,
    sender_email: String,
    sender_name: String,
    client: Client,
}

#[derive(Serialize)]
struct BrevoSender<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
struct BrevoRecipient<'a> {
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoPayload<'a> {
    sender: BrevoSender<'a>,
    to: Vec<BrevoRecipient<'a>>,
    subject: &'a str,
    html_content: String,
}

/// Body of the sign-in email.
pub fn magic_link_html(magic_link: &str, ttl_minutes: i64) -> String {
    format!(
        r#"
        <h1>Sign in to Canvass</h1>
        <p>Use the link below to open your campaigns. It expires in {ttl_minutes} minutes and works once.</p>
        <p><a href="{magic_link}">Sign in</a></p>
        <p>If you did not ask for this, you can ignore this email.</p>
    "#
    )
}

impl BrevoMailer {
    pub fn new(api_key: String, sender_email: String, sender_name: String) -> Self {
        Self {
            api_key,
            sender_email,
            sender_name,
            client: Client::new(),
        }
    }

    pub fn send_magic_link(
        &self,
        recipient_email: &str,
        magic_link: &str,
        ttl_minutes: i64,
    ) -> Result<(), MailerError> {
        let payload = BrevoPayload {
            sender: BrevoSender {
                name: &self.sender_name,
                email: &self.sender_email,
            },
            to: vec![BrevoRecipient {
                email: recipient_email,
            }],
            subject: "Your Canvass sign-in link",
            html_content: magic_link_html(magic_link, ttl_minutes),
        };

        let resp = self
            .client
            .post(BREVO_SEND_URL)
            .header("api-key", &self.api_key)
            .json(&payload)
            .send()
            .map_err(|e| MailerError::RequestFailed(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let error_body = resp.text().unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(status, body = %error_body, "brevo refused magic link email");
            return Err(MailerError::ApiError(status));
        }

        tracing::info!(recipient = recipient_email, "magic link email sent");
        Ok(())
    }
}
