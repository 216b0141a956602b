pub mod email;
mod message;

pub use message::NotificationMessage;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use lettre::address::AddressError;
use lettre::transport::smtp;
use shared_kernel::date_time::time_frame::TimeFrame;
use thiserror::Error as ThisError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffectedLocation {
    pub date: NaiveDate,
    pub location: String,
    pub region: Option<String>,
    pub municipality: Option<String>,
    pub time_frame: TimeFrame<NaiveTime>,
}

#[derive(ThisError, Debug)]
pub enum NotifyError {
    #[error("invalid email address {address:?}")]
    InvalidAddress {
        address: String,
        #[source]
        source: AddressError,
    },
    #[error("failed to build the notification email")]
    Message(#[from] lettre::error::Error),
    #[error("the smtp server rejected the sender credentials")]
    Authentication(#[source] smtp::Error),
    #[error("failed to reach the smtp server")]
    Connection(#[source] smtp::Error),
    #[error("the smtp server rejected the notification")]
    Rejected(#[source] smtp::Error),
}

impl From<smtp::Error> for NotifyError {
    fn from(error: smtp::Error) -> Self {
        let code = error.status().map(|code| code.to_string());
        match code.as_deref() {
            Some("530" | "534" | "535") => NotifyError::Authentication(error),
            Some(_) => NotifyError::Rejected(error),
            None => NotifyError::Connection(error),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, locations: &[AffectedLocation]) -> Result<(), NotifyError>;
}
