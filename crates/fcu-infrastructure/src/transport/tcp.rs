//! TCP implementation of the remote-call channel.

use async_trait::async_trait;
use fcu_core::session::{Connection, InboundRequest, InboundSender, Transport, TransportError};
use serde_json::Value;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;

use super::frame::Frame;

type PendingCall = oneshot::Sender<Result<Value, TransportError>>;
type PendingCalls = HashMap<u64, PendingCall>;
type ChannelWriter = Box<dyn AsyncWrite + Send + Unpin>;
type ChannelReader = Box<dyn AsyncRead + Send + Unpin>;

/// Connects to the editor's bridge listener.
pub struct TcpTransport {
    address: String,
    client_name: String,
    call_timeout: Duration,
    handshake_timeout: Duration,
}

impl TcpTransport {
    pub fn new(address: impl Into<String>, client_name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            client_name: client_name.into(),
            call_timeout: Duration::from_secs(30),
            handshake_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&self, inbound: InboundSender) -> Result<Arc<dyn Connection>, TransportError> {
        let stream = TcpStream::connect(&self.address)
            .await
            .map_err(|e| TransportError::Refused(format!("{}: {}", self.address, e)))?;
        let _ = stream.set_nodelay(true);
        let (read_half, write_half) = stream.into_split();

        let connection = LineConnection::handshake(
            Box::new(read_half),
            Box::new(write_half),
            &self.client_name,
            self.handshake_timeout,
            self.call_timeout,
            inbound,
        )
        .await?;

        tracing::debug!("[Transport] Connected to {}", self.address);
        Ok(Arc::new(connection))
    }
}

/// JSON-lines connection over any byte stream.
///
/// A reader task routes replies to waiting callers and forwards
/// server-initiated calls to the inbound channel.
pub struct LineConnection {
    writer: Arc<Mutex<ChannelWriter>>,
    pending: Arc<Mutex<PendingCalls>>,
    next_id: AtomicU64,
    closed: Arc<AtomicBool>,
    call_timeout: Duration,
    reader_task: StdMutex<Option<JoinHandle<()>>>,
}

impl LineConnection {
    /// Sends `hello`, waits for `welcome`, then starts the reader task.
    ///
    /// # Errors
    ///
    /// - `TransportError::EndOfStream` if the peer hangs up first
    /// - `TransportError::Timeout` if no welcome arrives in time
    /// - `TransportError::Protocol` for any other first frame
    pub async fn handshake(
        reader: ChannelReader,
        writer: ChannelWriter,
        client_name: &str,
        handshake_timeout: Duration,
        call_timeout: Duration,
        inbound: InboundSender,
    ) -> Result<Self, TransportError> {
        let mut writer = writer;
        let hello = Frame::Hello {
            client: client_name.to_string(),
        };
        write_frame(&mut writer, &hello).await?;

        let mut reader = BufReader::new(reader);
        let mut line = String::new();
        let read = tokio::time::timeout(handshake_timeout, reader.read_line(&mut line))
            .await
            .map_err(|_| TransportError::Timeout(handshake_timeout))?
            .map_err(map_io_error)?;
        if read == 0 {
            return Err(TransportError::EndOfStream);
        }

        match Frame::decode(&line)? {
            Frame::Welcome => {}
            other => {
                return Err(TransportError::Protocol(format!(
                    "expected welcome, got {:?}",
                    other
                )));
            }
        }

        Ok(Self::start(reader, writer, call_timeout, inbound))
    }

    fn start(
        reader: BufReader<ChannelReader>,
        writer: ChannelWriter,
        call_timeout: Duration,
        inbound: InboundSender,
    ) -> Self {
        let pending: Arc<Mutex<PendingCalls>> = Arc::new(Mutex::new(HashMap::new()));
        let closed = Arc::new(AtomicBool::new(false));

        let pending_clone = pending.clone();
        let closed_clone = closed.clone();
        let reader_task = tokio::spawn(async move {
            let mut lines = reader.lines();

            while let Ok(Some(line)) = lines.next_line().await {
                if line.trim().is_empty() {
                    continue;
                }

                let frame = match Frame::decode(&line) {
                    Ok(frame) => frame,
                    Err(err) => {
                        tracing::warn!(error = %err, "[Transport] Dropping malformed frame");
                        continue;
                    }
                };

                match frame {
                    Frame::Call {
                        id,
                        method,
                        payload,
                    } => {
                        let request = InboundRequest {
                            id: Some(id),
                            method,
                            payload,
                        };
                        if inbound.send(request).is_err() {
                            break;
                        }
                    }
                    Frame::Notify { method, payload } => {
                        let request = InboundRequest {
                            id: None,
                            method,
                            payload,
                        };
                        if inbound.send(request).is_err() {
                            break;
                        }
                    }
                    Frame::Reply { id, result, error } => {
                        let outcome = match error {
                            Some(message) => Err(TransportError::Remote(message)),
                            None => Ok(result.unwrap_or(Value::Null)),
                        };
                        match pending_clone.lock().await.remove(&id) {
                            Some(sender) => {
                                let _ = sender.send(outcome);
                            }
                            None => tracing::warn!(id, "[Transport] Reply without pending call"),
                        }
                    }
                    Frame::Ping => {}
                    other => tracing::warn!(frame = ?other, "[Transport] Unexpected frame"),
                }
            }

            closed_clone.store(true, Ordering::SeqCst);
            for (_, sender) in pending_clone.lock().await.drain() {
                let _ = sender.send(Err(TransportError::EndOfStream));
            }
            tracing::debug!("[Transport] Reader finished");
        });

        Self {
            writer: Arc::new(Mutex::new(writer)),
            pending,
            next_id: AtomicU64::new(1),
            closed,
            call_timeout,
            reader_task: StdMutex::new(Some(reader_task)),
        }
    }

    async fn send(&self, frame: &Frame) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::EndOfStream);
        }
        let mut writer = self.writer.lock().await;
        let result = write_frame(&mut *writer, frame).await;
        if matches!(result, Err(TransportError::EndOfStream)) {
            self.closed.store(true, Ordering::SeqCst);
        }
        result
    }
}

#[async_trait]
impl Connection for LineConnection {
    async fn call(&self, method: &str, payload: String) -> Result<Value, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);

        let frame = Frame::Call {
            id,
            method: method.to_string(),
            payload,
        };
        if let Err(err) = self.send(&frame).await {
            self.pending.lock().await.remove(&id);
            return Err(err);
        }

        match tokio::time::timeout(self.call_timeout, rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(TransportError::EndOfStream),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                Err(TransportError::Timeout(self.call_timeout))
            }
        }
    }

    async fn notify(&self, method: &str, payload: String) -> Result<(), TransportError> {
        self.send(&Frame::Notify {
            method: method.to_string(),
            payload,
        })
        .await
    }

    async fn respond(&self, id: u64, result: Result<Value, String>) -> Result<(), TransportError> {
        self.send(&Frame::reply(id, result)).await
    }

    async fn ping(&self) -> Result<(), TransportError> {
        self.send(&Frame::Ping).await
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let _ = self.writer.lock().await.shutdown().await;
        if let Ok(mut task) = self.reader_task.lock() {
            if let Some(task) = task.take() {
                task.abort();
            }
        }
        for (_, sender) in self.pending.lock().await.drain() {
            let _ = sender.send(Err(TransportError::EndOfStream));
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Drop for LineConnection {
    fn drop(&mut self) {
        if let Ok(mut task) = self.reader_task.lock() {
            if let Some(task) = task.take() {
                task.abort();
            }
        }
    }
}

async fn write_frame<W>(writer: &mut W, frame: &Frame) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let line = frame.encode()?;
    writer.write_all(line.as_bytes()).await.map_err(map_io_error)?;
    writer.write_all(b"\n").await.map_err(map_io_error)?;
    writer.flush().await.map_err(map_io_error)
}

fn map_io_error(err: std::io::Error) -> TransportError {
    match err.kind() {
        ErrorKind::UnexpectedEof
        | ErrorKind::BrokenPipe
        | ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted => TransportError::EndOfStream,
        _ => TransportError::Refused(err.to_string()),
    }
}

#[cfg(test)]
#[path = "tcp_test.rs"]
mod tests;
