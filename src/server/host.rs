use async_trait::async_trait;
use tracing::debug;

use crate::errors::{RpcError, TransportError};
use crate::server::dispatcher::Dispatcher;

/// Listener side of a transport: socket loop, queue consumer and the like.
#[async_trait]
pub trait ServerTransport: Send {
    /// `None` once the peer has gone away.
    async fn receive_request(&mut self) -> Result<Option<Vec<u8>>, TransportError>;

    async fn send_response(&mut self, payload: Vec<u8>) -> Result<(), TransportError>;
}

/// Runs dispatch cycles until the transport closes and returns how many
/// requests were handled.
pub async fn serve<T>(dispatcher: &Dispatcher, transport: &mut T) -> Result<usize, RpcError>
where
    T: ServerTransport + ?Sized,
{
    let mut cycles = 0;
    while let Some(request) = transport
        .receive_request()
        .await
        .map_err(RpcError::Transport)?
    {
        cycles += 1;
        match dispatcher.dispatch(&request) {
            Some(response) => transport
                .send_response(response)
                .await
                .map_err(RpcError::Transport)?,
            None => debug!(cycle = cycles, "no response owed"),
        }
    }
    Ok(cycles)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use serde_json::{json, Value};

    use super::*;
    use crate::protocol::SpecVersion;
    use crate::server::procedures::ProcedureTable;

    #[derive(Default)]
    struct QueueTransport {
        inbound: VecDeque<Vec<u8>>,
        outbound: Vec<Value>,
    }

    #[async_trait]
    impl ServerTransport for QueueTransport {
        async fn receive_request(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
            Ok(self.inbound.pop_front())
        }

        async fn send_response(&mut self, payload: Vec<u8>) -> Result<(), TransportError> {
            self.outbound.push(serde_json::from_slice(&payload)?);
            Ok(())
        }
    }

    struct BrokenTransport;

    #[async_trait]
    impl ServerTransport for BrokenTransport {
        async fn receive_request(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
            Err("socket closed unexpectedly".into())
        }

        async fn send_response(&mut self, _payload: Vec<u8>) -> Result<(), TransportError> {
            Ok(())
        }
    }

    fn dispatcher() -> Dispatcher {
        let table = ProcedureTable::new()
            .with("ping", |_| Ok(json!("pong")))
            .expect("register ping");
        Dispatcher::new(SpecVersion::V2, table)
    }

    #[tokio::test]
    async fn serves_until_transport_closes() {
        let mut transport = QueueTransport::default();
        transport
            .inbound
            .push_back(br#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#.to_vec());
        transport
            .inbound
            .push_back(br#"{"jsonrpc":"2.0","method":"ping"}"#.to_vec());
        transport.inbound.push_back(b"{".to_vec());

        let cycles = serve(&dispatcher(), &mut transport).await.expect("serve");

        assert_eq!(cycles, 3);
        assert_eq!(transport.outbound.len(), 2);
        assert_eq!(
            transport.outbound[0],
            json!({"jsonrpc": "2.0", "id": 1, "result": "pong"})
        );
        assert_eq!(transport.outbound[1]["error"]["code"], json!(-32700));
    }

    #[tokio::test]
    async fn transport_failures_surface() {
        let error = serve(&dispatcher(), &mut BrokenTransport)
            .await
            .expect_err("transport failure");
        assert!(matches!(error, RpcError::Transport(_)));
    }
}
