//! High-level terminal client

use std::sync::Arc;

use parking_lot::Mutex;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use zvtlink_core::{commands, Package, ReplyDecoder, ZvtMessage};
use zvtlink_transport::{LinkChannel, PackageHandler, Transport};
use zvtlink_types::{
    CommandResponse, PrintLine, Receipt, RegistrationConfig, StatusInformation,
};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::events::EventHandlers;
use crate::session::{self, CommandSession, SessionEvent, SessionSlot};

/// Event surfaces exposed by the client
///
/// Handlers fire from the link driver task in wire order, whether or
/// not a command is in flight; unsolicited terminal messages are
/// dispatched the same way.
pub struct ClientEvents {
    /// Transaction status records (04 0F), including those embedded in
    /// a completion
    pub status_information: EventHandlers<StatusInformation>,

    /// Localized intermediate status text (04 FF)
    pub intermediate_status: EventHandlers<String>,

    /// Single print lines (06 D1)
    pub line: EventHandlers<PrintLine>,

    /// Complete receipt blocks (06 D3)
    pub receipt: EventHandlers<Receipt>,
}

impl ClientEvents {
    fn new() -> Self {
        Self {
            status_information: EventHandlers::new(),
            intermediate_status: EventHandlers::new(),
            line: EventHandlers::new(),
            receipt: EventHandlers::new(),
        }
    }

    fn clear_all(&self) {
        self.status_information.clear();
        self.intermediate_status.clear();
        self.line.clear();
        self.receipt.clear();
    }
}

/// ZVT terminal client
///
/// Owns one link channel for its lifetime and enforces at most one
/// in-flight command: the terminal correlates all inbound traffic to
/// the last command, so a second concurrent call fails fast with
/// `Error("Busy")`.
///
/// # Examples
///
/// ```no_run
/// use rust_decimal::Decimal;
/// use tokio_util::sync::CancellationToken;
/// use zvtlink::{ClientConfig, TcpTransport, ZvtClient};
///
/// # async fn example() -> zvtlink::Result<()> {
/// let transport = TcpTransport::new("192.168.1.50", zvtlink::DEFAULT_PORT);
/// let mut client =
///     ZvtClient::connect(Box::new(transport), ClientConfig::new(123456)).await?;
///
/// let response = client
///     .payment(Decimal::new(1250, 2), &CancellationToken::new())
///     .await;
/// println!("{response}");
///
/// client.close().await;
/// # Ok(())
/// # }
/// ```
pub struct ZvtClient {
    link: LinkChannel,
    config: ClientConfig,
    events: Arc<ClientEvents>,
    session_slot: SessionSlot,
}

impl ZvtClient {
    /// Connect the transport and wire the reply decoder to the link
    pub async fn connect(transport: Box<dyn Transport>, config: ClientConfig) -> Result<Self> {
        let events = Arc::new(ClientEvents::new());
        let session_slot: SessionSlot = Arc::new(Mutex::new(None));
        let decoder = ReplyDecoder::new(config.encoding, config.language);

        let handler: PackageHandler = {
            let events = events.clone();
            let slot = session_slot.clone();
            Arc::new(move |package| dispatch(&decoder, &events, &slot, package))
        };

        let link = LinkChannel::open(transport, config.acknowledge_timeout, handler).await?;
        info!("Terminal client connected");

        Ok(Self {
            link,
            config,
            events,
            session_slot,
        })
    }

    /// Event surfaces for subscription
    pub fn events(&self) -> &ClientEvents {
        &self.events
    }

    /// Register the ECR with the terminal (06 00)
    pub async fn registration(
        &self,
        config: &RegistrationConfig,
        cancel: &CancellationToken,
    ) -> CommandResponse {
        self.send_encoded(
            commands::registration(
                self.config.password,
                config,
                self.config.activate_tlv_support,
            ),
            false,
            cancel,
        )
        .await
    }

    /// Authorize a payment (06 01)
    pub async fn payment(&self, amount: Decimal, cancel: &CancellationToken) -> CommandResponse {
        self.send_encoded(commands::payment(amount), false, cancel).await
    }

    /// Reverse the transaction with the given receipt number (06 30)
    pub async fn reversal(
        &self,
        receipt_number: u16,
        cancel: &CancellationToken,
    ) -> CommandResponse {
        self.send_encoded(
            commands::reversal(self.config.password, receipt_number),
            false,
            cancel,
        )
        .await
    }

    /// Refund an amount (06 31), optionally referencing the original
    /// transaction by trace number
    pub async fn refund(
        &self,
        amount: Decimal,
        trace_number: Option<u32>,
        cancel: &CancellationToken,
    ) -> CommandResponse {
        self.send_encoded(
            commands::refund(self.config.password, amount, trace_number),
            false,
            cancel,
        )
        .await
    }

    /// Run the end-of-day batch (06 50)
    pub async fn end_of_day(&self, cancel: &CancellationToken) -> CommandResponse {
        self.send_encoded(commands::end_of_day(self.config.password), false, cancel)
            .await
    }

    /// Request the turnover totals (06 10)
    pub async fn send_turnover_totals(&self, cancel: &CancellationToken) -> CommandResponse {
        self.send_encoded(
            commands::turnover_totals(self.config.password),
            false,
            cancel,
        )
        .await
    }

    /// Repeat the last receipt (06 20)
    pub async fn repeat_last_receipt(&self, cancel: &CancellationToken) -> CommandResponse {
        self.send_encoded(
            commands::repeat_receipt(self.config.password),
            false,
            cancel,
        )
        .await
    }

    /// Log off from the terminal (06 02); resolves on acknowledgement
    pub async fn log_off(&self, cancel: &CancellationToken) -> CommandResponse {
        self.send_command(commands::log_off(), true, cancel).await
    }

    /// Abort the running command at the terminal (06 B0); resolves on
    /// acknowledgement
    pub async fn abort(&self, cancel: &CancellationToken) -> CommandResponse {
        self.send_command(commands::abort(), true, cancel).await
    }

    /// Run a terminal diagnosis (06 70)
    pub async fn diagnosis(&self, cancel: &CancellationToken) -> CommandResponse {
        self.send_command(commands::diagnosis(), false, cancel).await
    }

    /// Trigger a software update (08 10)
    pub async fn software_update(&self, cancel: &CancellationToken) -> CommandResponse {
        self.send_command(commands::software_update(), false, cancel)
            .await
    }

    /// Send an arbitrary command package
    ///
    /// The escape hatch for commands outside the typed set. With
    /// `end_after_ack` the command resolves successfully as soon as the
    /// terminal acknowledges it.
    ///
    /// Cancellation resolves with `Error("Cancelled")` and writes
    /// nothing further on the wire; follow up with [`abort`](Self::abort)
    /// to tell the terminal.
    pub async fn send_command(
        &self,
        package: Package,
        end_after_ack: bool,
        cancel: &CancellationToken,
    ) -> CommandResponse {
        let Some(session) = CommandSession::begin(&self.session_slot) else {
            warn!("Rejecting {package}: a command is already in flight");
            return CommandResponse::error("Busy");
        };

        let bytes = match package.encode() {
            Ok(encoded) => encoded.freeze(),
            Err(e) => return CommandResponse::error(e.to_string()),
        };

        debug!("Sending {package}");
        let outcome = self.link.send(bytes, cancel).await;
        if !outcome.is_acknowledged() {
            debug!("{package} not acknowledged: {}", outcome.name());
            return CommandResponse::error(outcome.name());
        }

        if end_after_ack {
            return CommandResponse::successful();
        }

        session
            .wait(self.config.command_completion_timeout, cancel)
            .await
    }

    /// Unwire all handlers and close the link channel
    pub async fn close(&mut self) {
        self.events.clear_all();
        self.link.close().await;
        info!("Terminal client closed");
    }

    async fn send_encoded(
        &self,
        package: zvtlink_core::Result<Package>,
        end_after_ack: bool,
        cancel: &CancellationToken,
    ) -> CommandResponse {
        match package {
            Ok(package) => self.send_command(package, end_after_ack, cancel).await,
            Err(e) => CommandResponse::error(e.to_string()),
        }
    }
}

/// Decode one inbound package, fan out events and route terminal
/// events to the in-flight session
fn dispatch(
    decoder: &ReplyDecoder,
    events: &ClientEvents,
    slot: &SessionSlot,
    package: Package,
) {
    let message = match decoder.decode(&package) {
        Ok(Some(message)) => message,
        Ok(None) => {
            warn!("Dropping package with unknown control field: {package}");
            return;
        }
        Err(e) => {
            warn!("Dropping undecodable package {package}: {e}");
            return;
        }
    };

    match message {
        ZvtMessage::Status(status) => {
            events.status_information.emit(&status);
            session::notify(slot, SessionEvent::Activity);
        }
        ZvtMessage::IntermediateStatus { message, .. } => {
            events.intermediate_status.emit(&message);
            session::notify(slot, SessionEvent::Activity);
        }
        ZvtMessage::Line(line) => {
            events.line.emit(&line);
            session::notify(slot, SessionEvent::Activity);
        }
        ZvtMessage::Receipt(receipt) => {
            events.receipt.emit(&receipt);
            session::notify(slot, SessionEvent::Activity);
        }
        ZvtMessage::Completion(status) => {
            // Embedded status reaches subscribers before the command resolves
            if let Some(status) = status {
                events.status_information.emit(&status);
            }
            session::notify(slot, SessionEvent::Completed);
        }
        ZvtMessage::Abort { message, .. } => {
            session::notify(slot, SessionEvent::Aborted(message));
        }
        ZvtMessage::NotSupported { code } => {
            debug!("Command not supported by terminal (0x{code:02X})");
            session::notify(slot, SessionEvent::NotSupported);
        }
    }
}
