use askama::Template;
use chrono::FixedOffset;
use otpauth_core::{Email, EmailClient, OtpEmail};
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, Secret};

#[derive(Clone)]
pub struct PostmarkEmailClient {
    http_client: Client,
    base_url: String,
    sender: Email,
    authorization_token: Secret<String>,
    display_offset: FixedOffset,
}

impl PostmarkEmailClient {
    pub fn new(
        base_url: String,
        sender: Email,
        authorization_token: Secret<String>,
        display_offset: FixedOffset,
        http_client: Client,
    ) -> Self {
        Self {
            http_client,
            base_url,
            sender,
            authorization_token,
            display_offset,
        }
    }
}

#[async_trait::async_trait]
impl EmailClient for PostmarkEmailClient {
    #[tracing::instrument(name = "Sending OTP email", skip_all)]
    async fn send_otp_email(&self, recipient: &Email, email: &OtpEmail) -> Result<(), String> {
        let base = Url::parse(&self.base_url).map_err(|e| e.to_string())?;
        let url = base.join("/email").map_err(|e| e.to_string())?;

        let expires_at = email
            .expires_at
            .with_timezone(&self.display_offset)
            .format("%H:%M")
            .to_string();
        let template = OtpEmailTemplate {
            full_name: email.full_name.as_ref(),
            code: email.code.as_str(),
            expires_at: &expires_at,
        };
        let html_body = template.render().map_err(|e| e.to_string())?;
        let text_body = format!(
            "Hello {}, your one-time code is {}. It expires at {}.",
            email.full_name, email.code, expires_at
        );

        let request_body = SendEmailRequest {
            from: self.sender.as_ref().expose_secret(),
            to: recipient.as_ref().expose_secret(),
            subject: SUBJECT,
            html_body: &html_body,
            text_body: &text_body,
            message_stream: MESSAGE_STREAM,
        };

        let request = self
            .http_client
            .post(url)
            .header(
                POSTMARK_AUTH_HEADER,
                self.authorization_token.expose_secret(),
            )
            .json(&request_body);

        request
            .send()
            .await
            .map_err(|e| e.to_string())?
            .error_for_status()
            .map_err(|e| e.to_string())?;

        Ok(())
    }
}

const SUBJECT: &str = "Your one-time verification code";
const MESSAGE_STREAM: &str = "outbound";
const POSTMARK_AUTH_HEADER: &str = "X-Postmark-Server-Token";

#[derive(Template)]
#[template(path = "otp_email.html")]
struct OtpEmailTemplate<'a> {
    full_name: &'a str,
    code: &'a str,
    expires_at: &'a str,
}

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
    message_stream: &'a str,
}
