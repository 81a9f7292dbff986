//! Transport to the Splunk HTTP Event Collector: one POST per event.

pub mod client;
pub mod event;
pub mod transmission;

pub use client::{ClientError, ClientStats, ConnectionStats, HecClient};
pub use event::{EventBody, HecAck, HecEvent};
pub use transmission::{Delivery, Transport};

#[cfg(test)]
pub use transmission::MockTransport;
