//! Progressive output events.
//!
//! A verification session can be rendered as a flat sequence of events for
//! transports that push updates to a client: server-sent events or NDJSON.
//! A session always starts with `start` and ends with either `done` or
//! `error`.

use futures::future;
use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::error::DomainVerifyError;
use crate::types::{Layer, VerificationResult};
use crate::utils::validate_domain;
use crate::verifier::DomainVerifier;

/// One event of a progressive verification session.
///
/// Serialized as a JSON object with a `type` discriminator; a `result`
/// event carries the layer result's fields inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VerificationEvent {
    Start { domain: String },
    Result(VerificationResult),
    Done { domain: String },
    Error { domain: String, message: String },
}

/// A boxed, sendable stream of session events.
pub type EventStream = Pin<Box<dyn Stream<Item = VerificationEvent> + Send>>;

impl VerificationEvent {
    /// Domain the event belongs to.
    pub fn domain(&self) -> &str {
        match self {
            VerificationEvent::Start { domain }
            | VerificationEvent::Done { domain }
            | VerificationEvent::Error { domain, .. } => domain,
            VerificationEvent::Result(result) => &result.domain,
        }
    }

    /// Whether no further events follow this one.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            VerificationEvent::Done { .. } | VerificationEvent::Error { .. }
        )
    }

    /// Render as a single JSON line (no trailing newline).
    pub fn to_json_line(&self) -> Result<String, DomainVerifyError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Render as a server-sent-events frame: `data: <json>\n\n`.
    pub fn to_sse_frame(&self) -> Result<String, DomainVerifyError> {
        Ok(format!("data: {}\n\n", self.to_json_line()?))
    }
}

impl DomainVerifier {
    /// Run a progressive session for `domain` as a stream of events.
    ///
    /// The domain is validated first. An invalid domain yields `start`
    /// followed by `error` and nothing else; no collaborator is touched.
    /// A valid one yields `start`, one `result` per layer and `done`.
    /// Like [`DomainVerifier::verify_progressive`], layers only run as the
    /// stream is polled.
    pub fn event_stream(&self, domain: &str) -> EventStream {
        self.event_stream_through(domain, Layer::Authoritative)
    }

    /// Like [`DomainVerifier::event_stream`], but stops pulling after
    /// `last`; later layers never run. `done` still closes the session.
    pub fn event_stream_through(&self, domain: &str, last: Layer) -> EventStream {
        let requested = domain.trim().to_string();

        let domain = match validate_domain(&requested) {
            Ok(domain) => domain,
            Err(e) => {
                let message = match e {
                    DomainVerifyError::InvalidDomain { reason, .. } => reason,
                    other => other.to_string(),
                };
                return Box::pin(stream::iter(vec![
                    VerificationEvent::Start {
                        domain: requested.clone(),
                    },
                    VerificationEvent::Error {
                        domain: requested,
                        message,
                    },
                ]));
            }
        };

        let start = stream::once(future::ready(VerificationEvent::Start {
            domain: domain.clone(),
        }));
        let results = self
            .verify_progressive(&domain)
            .take(last.number() as usize)
            .map(VerificationEvent::Result);
        let done = stream::once(future::ready(VerificationEvent::Done { domain }));

        Box::pin(start.chain(results).chain(done))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DomainCatalog;
    use crate::fakes::{FakeProber, FakeResolver};
    use crate::types::VerifyConfig;
    use std::sync::Arc;

    fn verifier(resolver: Arc<FakeResolver>) -> DomainVerifier {
        DomainVerifier::with_collaborators(
            VerifyConfig::default(),
            DomainCatalog::builtin(),
            resolver,
            Arc::new(FakeProber::new()),
            None,
        )
    }

    #[test]
    fn test_event_sequence_for_valid_domain() {
        let v = verifier(Arc::new(FakeResolver::new()));
        let events: Vec<_> = tokio_test::block_on(v.event_stream("Acme.com").collect());

        assert_eq!(events.len(), 5);
        assert_eq!(
            events[0],
            VerificationEvent::Start {
                domain: "acme.com".to_string()
            }
        );
        let layers: Vec<Layer> = events[1..4]
            .iter()
            .map(|e| match e {
                VerificationEvent::Result(r) => r.layer,
                other => panic!("expected result, got {:?}", other),
            })
            .collect();
        assert_eq!(layers, vec![Layer::Instant, Layer::Fast, Layer::Authoritative]);
        assert_eq!(
            events[4],
            VerificationEvent::Done {
                domain: "acme.com".to_string()
            }
        );
        assert!(events[4].is_terminal());
    }

    #[test]
    fn test_invalid_domain_yields_start_then_error() {
        let resolver = Arc::new(FakeResolver::new());
        let v = verifier(resolver.clone());
        let events: Vec<_> = tokio_test::block_on(v.event_stream("bad domain").collect());

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], VerificationEvent::Start { .. }));
        match &events[1] {
            VerificationEvent::Error { domain, message } => {
                assert_eq!(domain, "bad domain");
                assert!(!message.is_empty());
            }
            other => panic!("expected error, got {:?}", other),
        }
        assert_eq!(resolver.calls(), 0);
    }

    #[tokio::test]
    async fn test_event_stream_through_stops_early() {
        let resolver = Arc::new(FakeResolver::new());
        let v = verifier(resolver.clone());
        let events: Vec<_> = v
            .event_stream_through("acme.com", Layer::Instant)
            .collect()
            .await;

        assert_eq!(events.len(), 3);
        assert!(matches!(&events[1], VerificationEvent::Result(r) if r.layer == Layer::Instant));
        assert!(matches!(events[2], VerificationEvent::Done { .. }));
        assert_eq!(resolver.queried(), vec![crate::protocols::RecordType::A]);
    }

    #[test]
    fn test_wire_format() {
        let start = VerificationEvent::Start {
            domain: "acme.com".to_string(),
        };
        assert_eq!(
            start.to_json_line().unwrap(),
            r#"{"type":"start","domain":"acme.com"}"#
        );
        assert_eq!(
            start.to_sse_frame().unwrap(),
            "data: {\"type\":\"start\",\"domain\":\"acme.com\"}\n\n"
        );

        let error = VerificationEvent::Error {
            domain: "x".to_string(),
            message: "no dot".to_string(),
        };
        let json: serde_json::Value = serde_json::from_str(&error.to_json_line().unwrap()).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "no dot");
    }

    #[tokio::test]
    async fn test_result_event_carries_fields_inline() {
        let v = verifier(Arc::new(FakeResolver::new()));
        let mut events = v.event_stream("google.com");
        events.next().await;
        let event = events.next().await.unwrap();

        let json: serde_json::Value = serde_json::from_str(&event.to_json_line().unwrap()).unwrap();
        assert_eq!(json["type"], "result");
        assert_eq!(json["domain"], "google.com");
        assert_eq!(json["layer"], 1);
        assert_eq!(json["available"], false);
        assert_eq!(json["confidence"], 99);
        assert_eq!(json["status"], "taken");
        assert!(json["completedAt"].is_string());
        assert_eq!(json["pricing"]["tld"], "com");

        let back: VerificationEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
