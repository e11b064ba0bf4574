use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::MailConfig;

/// Transactional mail the auth flows send.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification_email(&self, to: &str, token: &str) -> anyhow::Result<()>;
    async fn send_password_reset_email(&self, to: &str, token: &str) -> anyhow::Result<()>;
}

pub struct Email {
    pub subject: &'static str,
    /// The action link embedded in `html`.
    pub link: String,
    pub html: String,
}

fn layout(title: &str, intro: &str, url: &str, button: &str, outro: &str, expiry: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
  </head>
  <body style="font-family: system-ui, -apple-system, sans-serif; background-color: #f9fafb; padding: 20px;">
    <div style="max-width: 600px; margin: 0 auto; background-color: white; padding: 40px; border-radius: 8px;">
      <h1 style="color: #111827; font-size: 24px; margin-bottom: 20px;">{title}</h1>
      <p style="color: #374151; font-size: 16px; line-height: 1.5; margin-bottom: 30px;">{intro}</p>
      <a href="{url}" style="display: inline-block; background-color: #2563eb; color: white; text-decoration: none; padding: 12px 24px; border-radius: 6px; font-weight: 500;">{button}</a>
      <p style="color: #6b7280; font-size: 14px; margin-top: 30px; line-height: 1.5;">{outro}</p>
      <p style="color: #9ca3af; font-size: 12px; margin-top: 20px;">{expiry}</p>
    </div>
  </body>
</html>"#
    )
}

pub fn verification_email(app_url: &str, token: &str) -> Email {
    let url = format!("{}/auth/verify?token={}", app_url, token);
    Email {
        subject: "Verify your email address",
        html: layout(
            "Verify your email",
            "Thank you for signing up for Notavex. Please click the button below to verify your email address.",
            &url,
            "Verify Email",
            "If you didn't create an account, you can safely ignore this email.",
            "This link will expire in 24 hours.",
        ),
        link: url,
    }
}

pub fn password_reset_email(app_url: &str, token: &str) -> Email {
    let url = format!("{}/auth/reset-password?token={}", app_url, token);
    Email {
        subject: "Reset your password",
        html: layout(
            "Reset your password",
            "We received a request to reset your password. Click the button below to create a new password.",
            &url,
            "Reset Password",
            "If you didn't request a password reset, you can safely ignore this email.",
            "This link will expire in 1 hour.",
        ),
        link: url,
    }
}

#[derive(Debug, Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Sends through the Resend HTTP API.
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    from: String,
    app_url: String,
}

impl ResendMailer {
    const ENDPOINT: &'static str = "https://api.resend.com/emails";

    pub fn new(api_key: String, from: String, app_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            from,
            app_url,
        }
    }

    async fn send(&self, to: &str, email: Email) -> anyhow::Result<()> {
        let body = ResendRequest {
            from: &self.from,
            to: [to],
            subject: email.subject,
            html: &email.html,
        };
        self.client
            .post(Self::ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("resend request")?
            .error_for_status()
            .context("resend rejected email")?;
        debug!(subject = email.subject, "email sent");
        Ok(())
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send_verification_email(&self, to: &str, token: &str) -> anyhow::Result<()> {
        self.send(to, verification_email(&self.app_url, token))
            .await
            .context("Failed to send verification email")
    }

    async fn send_password_reset_email(&self, to: &str, token: &str) -> anyhow::Result<()> {
        self.send(to, password_reset_email(&self.app_url, token))
            .await
            .context("Failed to send password reset email")
    }
}

/// Development mailer: logs the link instead of sending it.
pub struct LogMailer {
    app_url: String,
}

impl LogMailer {
    pub fn new(app_url: String) -> Self {
        Self { app_url }
    }

    fn log(&self, to: &str, email: Email) {
        info!(to, subject = email.subject, link = %email.link, "email not sent");
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification_email(&self, to: &str, token: &str) -> anyhow::Result<()> {
        self.log(to, verification_email(&self.app_url, token));
        Ok(())
    }

    async fn send_password_reset_email(&self, to: &str, token: &str) -> anyhow::Result<()> {
        self.log(to, password_reset_email(&self.app_url, token));
        Ok(())
    }
}

pub fn from_config(cfg: &MailConfig) -> std::sync::Arc<dyn Mailer> {
    match &cfg.resend_api_key {
        Some(key) => std::sync::Arc::new(ResendMailer::new(
            key.clone(),
            cfg.from.clone(),
            cfg.app_url.clone(),
        )),
        None => {
            tracing::warn!("RESEND_API_KEY not set; emails will only be logged");
            std::sync::Arc::new(LogMailer::new(cfg.app_url.clone()))
        }
    }
}
