//! Batched round trips and response demultiplexing.

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::correlator::{decode_response, CallCorrelator};
use crate::client::transport::Transport;
use crate::errors::RpcError;
use crate::protocol::codec::encode_value;
use crate::protocol::{Call, CallId, MessageCodec, Outcome, SpecVersion};

/// Outcomes keyed by call id, plus faults for elements or calls that could
/// not be paired up.
#[derive(Debug, Default)]
pub struct BatchResponse {
    outcomes: Vec<(CallId, Outcome)>,
    faults: Vec<RpcError>,
}

impl BatchResponse {
    pub fn get(&self, id: &CallId) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|(candidate, _)| candidate == id)
            .map(|(_, outcome)| outcome)
    }

    pub fn outcomes(&self) -> &[(CallId, Outcome)] {
        &self.outcomes
    }

    pub fn faults(&self) -> &[RpcError] {
        &self.faults
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn into_parts(self) -> (Vec<(CallId, Outcome)>, Vec<RpcError>) {
        (self.outcomes, self.faults)
    }
}

pub struct BatchCoordinator {
    codec: MessageCodec,
    calls: Vec<Call>,
}

impl BatchCoordinator {
    pub fn new(codec: MessageCodec, calls: Vec<Call>) -> Self {
        Self { codec, calls }
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// A single call is sent un-batched; its faults propagate directly.
    pub async fn send<T: Transport + ?Sized>(
        &self,
        transport: &T,
    ) -> Result<BatchResponse, RpcError> {
        let mut response = BatchResponse::default();

        match self.calls.as_slice() {
            [] => return Ok(response),
            [call] if call.is_notification() => {
                let payload = self.codec.encode(call)?;
                transport.send(payload).await.map_err(RpcError::Transport)?;
                return Ok(response);
            }
            [call] => {
                let correlator = CallCorrelator::new(self.codec, call.clone());
                let outcome = correlator.send(transport).await?;
                if let Some(id) = call.id.clone() {
                    response.outcomes.push((id, outcome));
                }
                return Ok(response);
            }
            _ => {}
        }

        let wires = self
            .calls
            .iter()
            .map(|call| self.codec.serialize(call))
            .collect::<Result<Vec<_>, _>>()?;
        let payload = encode_value(&Value::Array(wires))?;
        debug!(
            size = self.calls.len(),
            spec = %self.codec.spec(),
            "sending batch"
        );

        let reply = transport.send(payload).await.map_err(RpcError::Transport)?;

        let pending: Vec<CallId> = self.calls.iter().filter_map(|call| call.id.clone()).collect();
        if pending.is_empty() {
            return Ok(response);
        }

        let elements = match decode_response(&reply)? {
            Value::Array(items) => items,
            other => vec![other],
        };
        self.demultiplex(pending, elements, &mut response);
        Ok(response)
    }

    /// Pairing runs in two passes. Elements carrying the exact id of a pending
    /// call are classified against that call first, earliest submission
    /// winning for duplicate ids. Only the elements left over are then tried
    /// against the calls left over, in submission order. Under 1.0, leftover
    /// null-id elements are first taken as replies to the batch's
    /// notifications and discarded.
    fn demultiplex(&self, mut pending: Vec<CallId>, elements: Vec<Value>, response: &mut BatchResponse) {
        let mut leftovers = Vec::new();
        for element in elements {
            let exact = element
                .get("id")
                .and_then(|wire_id| pending.iter().position(|id| id.to_value() == *wire_id));
            let Some(index) = exact else {
                leftovers.push(element);
                continue;
            };

            match self.codec.classify_response(Some(&pending[index]), &element) {
                Ok(outcome) => {
                    let id = pending.remove(index);
                    response.outcomes.push((id, outcome));
                }
                Err(fault) => {
                    warn!(error = %fault, element = %element, "dropping batch response element");
                    response.faults.push(fault);
                }
            }
        }

        let mut unanswered_notifications = match self.codec.spec() {
            SpecVersion::V1 => self.calls.iter().filter(|call| call.is_notification()).count(),
            SpecVersion::V2 => 0,
        };
        for element in leftovers {
            if unanswered_notifications > 0 && element.get("id").is_some_and(Value::is_null) {
                unanswered_notifications -= 1;
                debug!(element = %element, "discarding reply to notification");
                continue;
            }

            let matched = pending.iter().enumerate().find_map(|(index, id)| {
                self.codec
                    .classify_response(Some(id), &element)
                    .ok()
                    .map(|outcome| (index, outcome))
            });
            match matched {
                Some((index, outcome)) => {
                    let id = pending.remove(index);
                    response.outcomes.push((id, outcome));
                }
                None => {
                    let fault = RpcError::Protocol("response element matched no pending call".to_string());
                    warn!(error = %fault, element = %element, "dropping batch response element");
                    response.faults.push(fault);
                }
            }
        }

        for id in pending {
            warn!(id = %id, "batch call received no response");
            response.faults.push(RpcError::Unmatched(id));
        }
    }
}
