//! Line-framed JSON-RPC client channel
//!
//! One JSON message per line. Responses are matched by id; lines that are
//! not the awaited response are skipped.

use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use super::TransportError;
use super::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};

/// Client end of a JSON-RPC conversation over a byte stream
pub struct JsonRpcChannel<R, W> {
    reader: R,
    writer: W,
    next_id: u64,
}

impl<R, W> JsonRpcChannel<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            next_id: 1,
        }
    }

    /// Send a request and wait for the response carrying the same id
    pub async fn request(&mut self, method: &str, params: Option<Value>) -> Result<Value, TransportError> {
        let id = self.next_id;
        self.next_id += 1;
        debug!(%id, %method, "JsonRpcChannel::request: called");

        self.send(&JsonRpcRequest::new(id, method, params)).await?;

        loop {
            let response = match self.read_response().await? {
                Some(r) => r,
                None => continue,
            };

            if response.id != Some(id) {
                debug!(expected = %id, got = ?response.id, "JsonRpcChannel::request: skipping unrelated response");
                continue;
            }

            if let Some(error) = response.error {
                debug!(code = %error.code, "JsonRpcChannel::request: remote error");
                return Err(TransportError::Rpc {
                    code: error.code,
                    message: error.message,
                });
            }

            return Ok(response.result.unwrap_or(Value::Null));
        }
    }

    /// Send a notification; no response is read
    pub async fn notify(&mut self, method: &str, params: Option<Value>) -> Result<(), TransportError> {
        debug!(%method, "JsonRpcChannel::notify: called");
        self.send(&JsonRpcNotification::new(method, params)).await
    }

    async fn send<T: Serialize>(&mut self, message: &T) -> Result<(), TransportError> {
        let mut line = serde_json::to_string(message)?;
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Read one line; `Ok(None)` for lines that are not JSON-RPC responses
    async fn read_response(&mut self) -> Result<Option<JsonRpcResponse>, TransportError> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await?;
        if n == 0 {
            debug!("JsonRpcChannel::read_response: end of stream");
            return Err(TransportError::Closed);
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        match serde_json::from_str::<JsonRpcResponse>(trimmed) {
            Ok(response) => Ok(Some(response)),
            Err(e) => {
                debug!(%e, "JsonRpcChannel::read_response: non-JSON-RPC line");
                Ok(None)
            }
        }
    }
}
