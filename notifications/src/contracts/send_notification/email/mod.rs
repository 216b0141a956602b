use crate::contracts::send_notification::{
    AffectedLocation, NotificationMessage, Notifier, NotifyError,
};
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// No encryption at all. Only sensible against a local relay.
    Plain,
    Starttls,
    /// Implicit TLS from the first byte.
    Tls,
}

impl SmtpSecurity {
    pub fn for_port(port: u16) -> Self {
        match port {
            465 => SmtpSecurity::Tls,
            _ => SmtpSecurity::Starttls,
        }
    }
}

#[derive(Debug)]
pub struct EmailSettings {
    pub server: String,
    pub port: u16,
    pub security: SmtpSecurity,
    pub sender: String,
    pub password: Secret<String>,
    pub recipients: Vec<String>,
}

pub struct EmailNotifier {
    settings: EmailSettings,
}

impl EmailNotifier {
    pub fn new(settings: EmailSettings) -> Self {
        Self { settings }
    }

    fn build_email(&self, message: NotificationMessage) -> Result<Message, NotifyError> {
        let mut builder = Message::builder()
            .from(mailbox(&self.settings.sender)?)
            .subject(message.subject);
        for recipient in self.settings.recipients.iter() {
            builder = builder.to(mailbox(recipient)?);
        }

        Ok(builder.multipart(MultiPart::alternative_plain_html(
            message.plain,
            message.html,
        ))?)
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, NotifyError> {
        let server = self.settings.server.as_str();
        let builder = match self.settings.security {
            SmtpSecurity::Plain => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(server),
            SmtpSecurity::Starttls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(server)?,
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(server)?,
        };
        let credentials = Credentials::new(
            self.settings.sender.clone(),
            self.settings.password.expose_secret().clone(),
        );

        Ok(builder
            .port(self.settings.port)
            .credentials(credentials)
            .build())
    }
}

fn mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .parse::<Mailbox>()
        .map_err(|source| NotifyError::InvalidAddress {
            address: address.to_string(),
            source,
        })
}

#[async_trait]
impl Notifier for EmailNotifier {
    #[tracing::instrument(err, skip_all, level = "info")]
    async fn notify(&self, locations: &[AffectedLocation]) -> Result<(), NotifyError> {
        info!(
            server = %self.settings.server,
            port = self.settings.port,
            recipients = self.settings.recipients.len(),
            "Sending notification"
        );
        let email = self.build_email(NotificationMessage::generate(locations))?;
        let transport = self.transport()?;

        transport.send(email).await?;
        info!("Notification sent");
        Ok(())
    }
}
