use async_trait::async_trait;

use crate::errors::TransportError;

/// One request/response exchange of raw bytes. Timeouts and retries belong to
/// implementations.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, payload: Vec<u8>) -> Result<Vec<u8>, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(&self, payload: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        (**self).send(payload).await
    }
}
