use notifications::contracts::send_notification::email::{EmailSettings, SmtpSecurity};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use shared_kernel::configuration::{config, Overrides};
use std::path::{Path, PathBuf};
use thiserror::Error as ThisError;
use url::Url;

#[derive(ThisError, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration from {path}")]
    Load {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub monitored_cities: Vec<String>,
    #[serde(default = "default_pdf_cache_dir")]
    pub pdf_cache_dir: PathBuf,
    #[serde(default)]
    pub email_recipients: Vec<String>,
    #[serde(default = "default_check_days_ahead")]
    pub check_days_ahead: usize,
    #[serde(default = "default_smtp_server")]
    pub smtp_server: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_security: Option<SmtpSecurity>,
    #[serde(default)]
    pub sender_email: String,
    #[serde(default)]
    pub sender_password: Option<Secret<String>>,
    #[serde(default = "default_source_url")]
    pub source_url: String,
}

fn default_pdf_cache_dir() -> PathBuf {
    PathBuf::from("./pdfs")
}

fn default_check_days_ahead() -> usize {
    3
}

fn default_smtp_server() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_source_url() -> String {
    "https://info.ermzapad.bg/".to_string()
}

/// Reads `file`, then `APP_` variables, then the deployment variables
/// `SENDER_EMAIL`, `SENDER_PASSWORD` and `EMAIL_RECIPIENTS`.
pub fn load(file: &Path) -> Result<Settings, ConfigError> {
    load_with_env(file, |key| std::env::var(key).ok())
}

pub fn load_with_env(
    file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings, ConfigError> {
    let recipients = env("EMAIL_RECIPIENTS").map(|recipients| {
        recipients
            .split(',')
            .map(str::trim)
            .filter(|recipient| !recipient.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>()
    });
    let overrides: Overrides = vec![
        ("sender_email", env("SENDER_EMAIL").map(Into::into)),
        ("sender_password", env("SENDER_PASSWORD").map(Into::into)),
        ("email_recipients", recipients.map(Into::into)),
    ];

    config::<Settings>(file, overrides).map_err(|source| ConfigError::Load {
        path: file.to_path_buf(),
        source,
    })
}

impl Settings {
    pub fn smtp_security(&self) -> SmtpSecurity {
        self.smtp_security
            .unwrap_or_else(|| SmtpSecurity::for_port(self.smtp_port))
    }

    /// Collects every problem rather than stopping at the first one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = vec![];

        if self.monitored_cities.is_empty() {
            problems.push("monitored_cities must not be empty".to_string());
        }
        if self.email_recipients.is_empty() {
            problems.push("at least one email recipient is required".to_string());
        }
        for recipient in self.email_recipients.iter() {
            if !validator::validate_email(recipient.as_str()) {
                problems.push(format!("invalid email recipient {recipient:?}"));
            }
        }
        if self.sender_email.is_empty() {
            problems.push("sender_email is required".to_string());
        } else if !validator::validate_email(self.sender_email.as_str()) {
            problems.push(format!("invalid sender_email {:?}", self.sender_email));
        }
        let has_password = self
            .sender_password
            .as_ref()
            .map_or(false, |password| !password.expose_secret().is_empty());
        if !has_password {
            problems.push("sender_password is required".to_string());
        }
        if self.smtp_server.trim().is_empty() {
            problems.push("smtp_server must not be empty".to_string());
        }
        if self.smtp_port == 0 {
            problems.push("smtp_port must not be 0".to_string());
        }
        if self.check_days_ahead < 1 {
            problems.push("check_days_ahead must be at least 1".to_string());
        }
        if let Err(err) = self.source_url() {
            problems.push(format!("invalid source_url {:?}: {err}", self.source_url));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }

    pub fn source_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.source_url)
    }

    pub fn email_settings(&self) -> Result<EmailSettings, ConfigError> {
        let password = self
            .sender_password
            .as_ref()
            .map(|password| Secret::new(password.expose_secret().clone()))
            .ok_or_else(|| ConfigError::Invalid(vec!["sender_password is required".to_string()]))?;

        Ok(EmailSettings {
            server: self.smtp_server.clone(),
            port: self.smtp_port,
            security: self.smtp_security(),
            sender: self.sender_email.clone(),
            password,
            recipients: self.email_recipients.clone(),
        })
    }
}
