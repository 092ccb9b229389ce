//! [Join](https://joaoapps.com/join/) push and SMS transport.
//!
//! Both message kinds are a GET against the Join send endpoint. SMS goes out
//! through the configured device to the recipient's phone; pushes land on the
//! device itself.

use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{Notifier, NotifyError};
use crate::data::models::Recipient;
use crate::globalsearch::middleware::TransientRetryMiddleware;

/// Title of push notifications.
pub const PUSH_TITLE: &str = "Open Course Section(s)";

pub const DEFAULT_SEND_URL: &str =
    "https://joinjoaomgcd.appspot.com/_ah/api/messaging/v1/sendPush";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(custom_debug_derive::Debug, Clone)]
pub struct JoinOptions {
    pub send_url: String,
    #[debug(with = "crate::fmt::redacted_opt")]
    pub api_key: Option<String>,
    #[debug(with = "crate::fmt::redacted_opt")]
    pub device_id: Option<String>,
    pub max_retries: u32,
    pub retry_backoff_factor: f64,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self {
            send_url: DEFAULT_SEND_URL.to_string(),
            api_key: None,
            device_id: None,
            max_retries: 3,
            retry_backoff_factor: 0.5,
        }
    }
}

#[derive(Deserialize)]
struct JoinResponse {
    success: bool,
    #[serde(rename = "errorMessage")]
    error_message: Option<String>,
}

/// What a single notification turns into on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Delivery<'a> {
    Sms { number: &'a str },
    Push,
}

/// SMS when the recipient prefers phone contact and has an enabled number, push otherwise.
fn delivery_for(recipient: &Recipient) -> Delivery<'_> {
    match (&recipient.phone_number, recipient.is_contact_by_phone) {
        (Some(number), true) => Delivery::Sms { number },
        (None, true) => {
            warn!(
                recipient = recipient.name,
                "Recipient prefers phone contact but has no enabled number, sending push"
            );
            Delivery::Push
        }
        (_, false) => Delivery::Push,
    }
}

#[derive(custom_debug_derive::Debug)]
pub struct JoinNotifier {
    #[debug(skip)]
    client: ClientWithMiddleware,
    options: JoinOptions,
}

impl JoinNotifier {
    pub fn new(options: JoinOptions) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(NotifyError::Client)?;
        let client = ClientBuilder::new(client)
            .with(
                TransientRetryMiddleware::new(options.max_retries, options.retry_backoff_factor)
                    .connect_errors_only(),
            )
            .build();

        Ok(Self { client, options })
    }

    async fn send(&self, params: &[(&str, &str)]) -> Result<(), NotifyError> {
        let response = self
            .client
            .get(&self.options.send_url)
            .query(params)
            .send()
            .await
            .map_err(NotifyError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(NotifyError::Body)?;
        match serde_json::from_str::<JoinResponse>(&body) {
            Ok(JoinResponse { success: true, .. }) => Ok(()),
            Ok(JoinResponse { error_message, .. }) => Err(NotifyError::Rejected(
                error_message.unwrap_or_else(|| "no error message".to_string()),
            )),
            Err(e) => {
                debug!(error = ?e, "Join response was not JSON, assuming success");
                Ok(())
            }
        }
    }
}

#[async_trait]
impl Notifier for JoinNotifier {
    async fn notify(&self, recipient: &Recipient, message: &str) -> Result<(), NotifyError> {
        let api_key = self
            .options
            .api_key
            .as_deref()
            .ok_or(NotifyError::NotConfigured("JOIN_API_KEY"))?;
        let device_id = self
            .options
            .device_id
            .as_deref()
            .ok_or(NotifyError::NotConfigured("JOIN_DEVICE_ID"))?;

        match delivery_for(recipient) {
            Delivery::Sms { number } => {
                self.send(&[
                    ("apikey", api_key),
                    ("smsnumber", number),
                    ("smstext", message),
                    ("deviceId", device_id),
                ])
                .await?;
                info!(recipient = recipient.name, "Sent SMS notification");
            }
            Delivery::Push => {
                self.send(&[
                    ("apikey", api_key),
                    ("title", PUSH_TITLE),
                    ("text", message),
                    ("deviceId", device_id),
                ])
                .await?;
                info!(recipient = recipient.name, "Sent push notification");
            }
        }
        Ok(())
    }
}
