use super::client::{ClientError, HecClient};
use super::event::{HecAck, HecEvent};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[cfg(test)]
use mockall::automock;

/// Raw outcome of one request that reached the collector.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub status: u16,
    /// Parsed acknowledgement; `None` when the body was not one.
    pub ack: Option<HecAck>,
    pub latency: Duration,
    pub bytes_sent: usize,
}

impl Delivery {
    /// The collector accepted the event (no non-zero application code).
    pub fn is_success(&self) -> bool {
        self.ack.as_ref().is_none_or(HecAck::is_success)
    }

    /// The acknowledgement when it carries a non-zero application code.
    pub fn rejection(&self) -> Option<&HecAck> {
        self.ack.as_ref().filter(|ack| !ack.is_success())
    }
}

/// Sends one event to the collector.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, event: HecEvent) -> Result<Delivery, ClientError>;
}

#[async_trait]
impl Transport for HecClient {
    async fn send(&self, event: HecEvent) -> Result<Delivery, ClientError> {
        let start = Instant::now();

        let payload = serde_json::to_vec(&event)
            .map_err(|e| ClientError::SerializationError(e.to_string()))?;
        let bytes_sent = payload.len();

        let response = match self
            .client
            .post(self.endpoint_url.clone())
            .body(payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                self.stats.record_request(false, start.elapsed());
                if e.is_timeout() {
                    return Err(ClientError::RequestTimeout(e.to_string()));
                }
                return Err(ClientError::NetworkError(e));
            }
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                self.stats.record_request(false, start.elapsed());
                warn!("Failed to read collector response: {}", e);
                return Err(ClientError::NetworkError(e));
            }
        };
        let latency = start.elapsed();
        let ack = serde_json::from_slice::<HecAck>(&body).ok();

        if ack.is_none() && !status.is_success() {
            self.stats.record_request(false, latency);
            warn!(
                "Collector answered HTTP {} without an acknowledgement",
                status.as_u16()
            );
            return Err(ClientError::HttpError {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let delivery = Delivery {
            status: status.as_u16(),
            ack,
            latency,
            bytes_sent,
        };
        self.stats.record_request(delivery.is_success(), latency);

        debug!(
            status = delivery.status,
            code = ?delivery.ack.as_ref().map(|ack| ack.code),
            bytes_sent,
            "Sent event to {} in {:?}",
            self.endpoint_url,
            latency
        );

        Ok(delivery)
    }
}
