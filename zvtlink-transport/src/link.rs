//! ZVT link channel
//!
//! One driver task owns the transport for the lifetime of the channel.
//! Outbound packages wait for the terminal's `80 00` acknowledgement;
//! inbound terminal packages are acknowledged on the wire and handed to
//! the registered callback in arrival order. The callback must not
//! block: it runs on the driver task between reads.

use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use zvtlink_core::control::{self, InboundKind};
use zvtlink_core::Package;

use crate::error::{Error, Result};
use crate::Transport;

/// Callback receiving every non-acknowledge inbound package
pub type PackageHandler = Arc<dyn Fn(Package) + Send + Sync>;

/// Result of sending one package over the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Terminal acknowledged receipt of the command
    AcknowledgeReceived,

    /// Link-level negative acknowledge (serial NAK; never produced by
    /// the TCP link, which answers with an `84 xx` package instead)
    NegativeAcknowledge,

    /// No acknowledgement within the configured window
    Timeout,

    /// Transport failed or the channel is closed
    TransportError,

    /// The caller's cancel token fired while waiting
    Cancelled,
}

impl SendOutcome {
    pub fn name(self) -> &'static str {
        match self {
            Self::AcknowledgeReceived => "AcknowledgeReceived",
            Self::NegativeAcknowledge => "NegativeAcknowledge",
            Self::Timeout => "Timeout",
            Self::TransportError => "TransportError",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn is_acknowledged(self) -> bool {
        self == Self::AcknowledgeReceived
    }
}

/// Positive acknowledgement sent for every delivered terminal package
const ACK_PACKAGE: [u8; 3] = [0x80, 0x00, 0x00];

/// Poll interval for the idle receive loop
const IDLE_POLL: Duration = Duration::from_millis(200);

enum LinkRequest {
    Send {
        bytes: Bytes,
        reply: oneshot::Sender<SendOutcome>,
    },
}

/// Channel delivering whole application packages over a [`Transport`]
pub struct LinkChannel {
    requests: mpsc::Sender<LinkRequest>,
    shutdown: CancellationToken,
    driver: Option<JoinHandle<()>>,
}

impl LinkChannel {
    /// Connect the transport (if needed) and start the driver task
    pub async fn open(
        mut transport: Box<dyn Transport>,
        ack_timeout: Duration,
        handler: PackageHandler,
    ) -> Result<Self> {
        if !transport.is_connected() {
            transport.connect().await?;
        }

        let (requests, request_rx) = mpsc::channel(8);
        let shutdown = CancellationToken::new();
        let driver = tokio::spawn(drive(
            transport,
            request_rx,
            shutdown.clone(),
            ack_timeout,
            handler,
        ));

        Ok(Self {
            requests,
            shutdown,
            driver: Some(driver),
        })
    }

    /// Send one encoded package and await the terminal's acknowledgement
    ///
    /// Cancellation abandons the wait but never writes anything further
    /// on the wire.
    pub async fn send(&self, package: Bytes, cancel: &CancellationToken) -> SendOutcome {
        let (reply, response) = oneshot::channel();
        if self
            .requests
            .send(LinkRequest::Send {
                bytes: package,
                reply,
            })
            .await
            .is_err()
        {
            return SendOutcome::TransportError;
        }

        tokio::select! {
            _ = cancel.cancelled() => SendOutcome::Cancelled,
            outcome = response => outcome.unwrap_or(SendOutcome::TransportError),
        }
    }

    /// Stop the driver and release the transport
    pub async fn close(&mut self) {
        self.shutdown.cancel();
        if let Some(driver) = self.driver.take() {
            let _ = driver.await;
        }
    }
}

impl Drop for LinkChannel {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

struct Pending {
    reply: oneshot::Sender<SendOutcome>,
    deadline: Instant,
}

/// One iteration's outcome; the transport is only touched after the
/// select resolves, never from inside a branch
enum Step {
    Shutdown,
    Request(Option<LinkRequest>),
    AckTimeout,
    Received(Result<BytesMut>),
}

async fn drive(
    mut transport: Box<dyn Transport>,
    mut requests: mpsc::Receiver<LinkRequest>,
    shutdown: CancellationToken,
    ack_timeout: Duration,
    handler: PackageHandler,
) {
    let mut rxbuf = BytesMut::new();
    let mut pending: Option<Pending> = None;

    loop {
        let deadline = pending.as_ref().map(|p| p.deadline);

        let step = tokio::select! {
            _ = shutdown.cancelled() => Step::Shutdown,
            request = requests.recv(), if pending.is_none() => Step::Request(request),
            () = sleep_until_deadline(deadline), if deadline.is_some() => Step::AckTimeout,
            received = transport.receive(IDLE_POLL) => Step::Received(received),
        };

        match step {
            Step::Shutdown | Step::Request(None) => break,

            Step::Request(Some(LinkRequest::Send { bytes, reply })) => {
                match transport.send(&bytes).await {
                    Ok(()) => {
                        pending = Some(Pending {
                            reply,
                            deadline: Instant::now() + ack_timeout,
                        });
                    }
                    Err(e) => {
                        warn!("Package send failed: {e}");
                        let _ = reply.send(SendOutcome::TransportError);
                    }
                }
            }

            Step::AckTimeout => {
                if let Some(p) = pending.take() {
                    warn!("No acknowledgement from terminal");
                    let _ = p.reply.send(SendOutcome::Timeout);
                }
            }

            Step::Received(Ok(data)) => {
                rxbuf.extend_from_slice(&data);
                if let Err(e) =
                    deliver(&mut rxbuf, transport.as_mut(), &mut pending, &handler).await
                {
                    warn!("Link failed while acknowledging: {e}");
                    break;
                }
            }

            Step::Received(Err(Error::ReadTimeout)) => {}

            Step::Received(Err(e)) => {
                warn!("Receive failed: {e}");
                break;
            }
        }
    }

    if let Some(p) = pending.take() {
        let _ = p.reply.send(SendOutcome::TransportError);
    }
    let _ = transport.disconnect().await;
    debug!("Link driver stopped");
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Hand every complete package in the buffer to its consumer
async fn deliver(
    rxbuf: &mut BytesMut,
    transport: &mut dyn Transport,
    pending: &mut Option<Pending>,
    handler: &PackageHandler,
) -> Result<()> {
    while let Some(frame) = extract_frame(rxbuf) {
        let package = match Package::decode(&frame) {
            Ok(package) => package,
            Err(e) => {
                warn!("Dropping malformed frame: {e}");
                continue;
            }
        };

        trace!("Received {package}");

        match control::classify(package.control_field) {
            Some(InboundKind::Acknowledge) => match pending.take() {
                Some(p) => {
                    let _ = p.reply.send(SendOutcome::AcknowledgeReceived);
                }
                None => debug!("Unsolicited acknowledge dropped"),
            },
            Some(InboundKind::NotSupported) => {
                // The 84 xx answers the outstanding command; the decoder
                // turns it into the NotSupported terminal event. It is a
                // response, so nothing is acknowledged back.
                if let Some(p) = pending.take() {
                    let _ = p.reply.send(SendOutcome::AcknowledgeReceived);
                }
                handler(package);
            }
            _ => {
                transport.send(&ACK_PACKAGE).await?;
                handler(package);
            }
        }
    }
    Ok(())
}

/// Split one complete wire frame off the front of the buffer
fn extract_frame(buf: &mut BytesMut) -> Option<Bytes> {
    if buf.len() < 3 {
        return None;
    }

    let total = if buf[2] == 0xFF {
        if buf.len() < 5 {
            return None;
        }
        5 + u16::from_le_bytes([buf[3], buf[4]]) as usize
    } else {
        3 + buf[2] as usize
    };

    if buf.len() < total {
        return None;
    }
    Some(buf.split_to(total).freeze())
}
