use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub session_ttl_minutes: i64,
    /// Adds `Secure` to the session cookie.
    pub secure_cookie: bool,
}

/// Outbound mail settings. Without an API key mail is only logged.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub resend_api_key: Option<String>,
    pub from: String,
    /// Base URL used to build the links placed in emails.
    pub app_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let app_url = std::env::var("APP_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_string();
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "notavex".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "notavex-users".into()),
            session_ttl_minutes: std::env::var("SESSION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 30),
            secure_cookie: std::env::var("SESSION_COOKIE_SECURE")
                .ok()
                .and_then(|v| v.parse::<bool>().ok())
                .unwrap_or_else(|| app_url.starts_with("https://")),
        };
        let mail = MailConfig {
            resend_api_key: std::env::var("RESEND_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            from: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "Notavex <onboarding@resend.dev>".into()),
            app_url,
        };
        Ok(Self {
            database_url,
            jwt,
            mail,
        })
    }
}
