use std::time::Duration;
use thiserror::Error;

/// Start-up configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in {1} environment")]
    MissingSecret(String, String),

    #[error("{0} must not be empty in {1} environment")]
    EmptySecret(String, String),
}

/// SMTP relay settings
///
/// Checked lazily at send time, so a server with email disabled still boots.
#[derive(Debug, Clone)]
pub struct EmailSettings {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    /// STARTTLS on a plain connection
    pub use_tls: bool,
    /// Implicit TLS (port 465 style)
    pub use_ssl: bool,
    pub user: String,
    pub password: String,
    pub from: String,
    pub from_name: String,
    pub reply_to: Option<String>,
    /// Per-attempt timeout, never below 5s
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            smtp_host: "smtp.gmail.com".into(),
            smtp_port: 587,
            use_tls: true,
            use_ssl: false,
            user: String::new(),
            password: String::new(),
            from: String::new(),
            from_name: "SafeLive".into(),
            reply_to: None,
            timeout: Duration::from_secs(15),
            max_retries: 3,
            retry_backoff: Duration::from_secs(2),
        }
    }
}

/// SMS/WhatsApp gateway settings
#[derive(Debug, Clone)]
pub struct MessagingSettings {
    pub api_base: String,
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub sms_from: Option<String>,
    pub whatsapp_from: Option<String>,
    pub timeout: Duration,
    pub default_country_code: String,
}

impl Default for MessagingSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.twilio.com".into(),
            account_sid: None,
            auth_token: None,
            sms_from: None,
            whatsapp_from: None,
            timeout: Duration::from_secs(12),
            default_country_code: "91".into(),
        }
    }
}

/// Stakeholder alert targets for new incidents
#[derive(Debug, Clone, Default)]
pub struct AlertTargets {
    pub email: Option<String>,
    pub sms: Option<String>,
    pub whatsapp: Option<String>,
}

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | ENVIRONMENT | development | development / staging / production |
/// | HTTP_PORT | 8000 | listen port |
/// | DATA_DIR | ./data | directory holding the document store |
/// | JWT_SECRET | dev fallback | token verification key |
/// | PUBLIC_DOMAIN | https://safelive.in | base URL for reset links |
/// | PASSWORD_RESET_EXPIRE_MINUTES | 30 | reset-token lifetime |
/// | EMAIL_* / SMTP_* | see [`EmailSettings`] | mail relay |
/// | TWILIO_* / MESSAGING_* | see [`MessagingSettings`] | SMS/WhatsApp |
/// | EMAIL_ALERT_TO / SMS_ALERT_TO / WHATSAPP_ALERT_TO | - | stakeholder targets |
/// | LOG_LEVEL / LOG_DIR | info / - | logging |
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub http_port: u16,
    pub data_dir: String,
    pub jwt_secret: String,
    pub public_domain: String,
    pub password_reset_expire_minutes: i64,
    pub email: EmailSettings,
    pub messaging: MessagingSettings,
    pub alerts: AlertTargets,
    pub log_level: String,
    pub log_dir: Option<String>,
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env_opt(name).and_then(|v| v.parse().ok())
}

fn env_bool(name: &str, default: bool) -> bool {
    match env_opt(name) {
        Some(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

impl Config {
    /// Require a secret env var: must be set and non-empty in production.
    fn require_secret(name: &str, environment: &str) -> Result<String, ConfigError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment == "production" {
                    return Err(ConfigError::MissingSecret(name.into(), environment.into()));
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment == "production" {
            return Err(ConfigError::EmptySecret(name.into(), environment.into()));
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = env_opt("ENVIRONMENT").unwrap_or_else(|| "development".into());
        let defaults = EmailSettings::default();

        let user = env_opt("EMAIL_USER").unwrap_or_default();
        let password = if environment == "production" {
            Self::require_secret("EMAIL_PASS", &environment)?
        } else {
            env_opt("EMAIL_PASS").unwrap_or_default()
        };

        let email = EmailSettings {
            enabled: env_bool("EMAIL_ENABLED", true),
            smtp_host: env_opt("SMTP_HOST").unwrap_or(defaults.smtp_host),
            smtp_port: env_parse("SMTP_PORT").unwrap_or(defaults.smtp_port),
            use_tls: env_bool("SMTP_USE_TLS", true),
            use_ssl: env_bool("SMTP_USE_SSL", false),
            from: env_opt("EMAIL_FROM").unwrap_or_else(|| user.clone()),
            from_name: env_opt("EMAIL_FROM_NAME").unwrap_or(defaults.from_name),
            reply_to: env_opt("EMAIL_REPLY_TO"),
            timeout: Duration::from_secs(env_parse::<u64>("SMTP_TIMEOUT_SECONDS").unwrap_or(15).max(5)),
            max_retries: env_parse("EMAIL_MAX_RETRIES").unwrap_or(defaults.max_retries),
            retry_backoff: Duration::from_secs_f64(
                env_parse::<f64>("EMAIL_RETRY_BACKOFF_SECONDS")
                    .unwrap_or(2.0)
                    .max(0.0),
            ),
            user: user.clone(),
            password,
        };

        let messaging = MessagingSettings {
            api_base: env_opt("MESSAGING_API_BASE")
                .unwrap_or_else(|| MessagingSettings::default().api_base),
            account_sid: env_opt("TWILIO_ACCOUNT_SID"),
            auth_token: env_opt("TWILIO_AUTH_TOKEN"),
            sms_from: env_opt("TWILIO_SMS_FROM"),
            whatsapp_from: env_opt("TWILIO_WHATSAPP_FROM"),
            timeout: Duration::from_secs(env_parse("MESSAGING_TIMEOUT_SECONDS").unwrap_or(12)),
            default_country_code: env_opt("DEFAULT_COUNTRY_CODE").unwrap_or_else(|| "91".into()),
        };

        let alerts = AlertTargets {
            email: env_opt("EMAIL_ALERT_TO").or_else(|| Some(user).filter(|u| !u.is_empty())),
            sms: env_opt("SMS_ALERT_TO"),
            whatsapp: env_opt("WHATSAPP_ALERT_TO"),
        };

        Ok(Self {
            http_port: env_parse("HTTP_PORT").unwrap_or(8000),
            data_dir: env_opt("DATA_DIR").unwrap_or_else(|| "./data".into()),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            public_domain: env_opt("PUBLIC_DOMAIN")
                .unwrap_or_else(|| "https://safelive.in".into())
                .trim_end_matches('/')
                .to_string(),
            password_reset_expire_minutes: env_parse("PASSWORD_RESET_EXPIRE_MINUTES").unwrap_or(30),
            email,
            messaging,
            alerts,
            log_level: env_opt("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_dir: env_opt("LOG_DIR"),
            environment,
        })
    }

    /// Configuration for tests and tools: development defaults, no env access
    pub fn for_tests() -> Self {
        Self {
            environment: "development".into(),
            http_port: 0,
            data_dir: "./data".into(),
            jwt_secret: "test-secret-with-at-least-32-characters!".into(),
            public_domain: "https://safelive.in".into(),
            password_reset_expire_minutes: 30,
            email: EmailSettings {
                user: "alerts@safelive.in".into(),
                password: "app-password".into(),
                from: "alerts@safelive.in".into(),
                timeout: Duration::from_secs(5),
                retry_backoff: Duration::ZERO,
                ..EmailSettings::default()
            },
            messaging: MessagingSettings::default(),
            alerts: AlertTargets::default(),
            log_level: "info".into(),
            log_dir: None,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Path of the document store file
    pub fn database_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.data_dir).join("civic.redb")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_secret_dev_fallback() {
        let v = Config::require_secret("CIVIC_TEST_UNSET_SECRET", "development").unwrap();
        assert_eq!(v, "dev-CIVIC_TEST_UNSET_SECRET-not-for-production");
    }

    #[test]
    fn test_require_secret_production_missing() {
        let err = Config::require_secret("CIVIC_TEST_UNSET_SECRET", "production").unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret(..)));
    }

    #[test]
    fn test_for_tests_defaults() {
        let config = Config::for_tests();
        assert!(!config.is_production());
        assert_eq!(config.email.max_retries, 3);
        assert_eq!(config.messaging.default_country_code, "91");
        assert!(config.database_path().ends_with("civic.redb"));
    }
}
