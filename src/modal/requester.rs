use std::fmt;

use color_eyre::Result;
use color_eyre::eyre::eyre;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::dialog::DialogFactory;
use super::props::Props;

/// A request queued for the modal session.
pub enum ModalRequest {
    Show { factory: DialogFactory, props: Props },
    Close,
}

impl fmt::Debug for ModalRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Show { props, .. } => f.debug_struct("Show").field("props", props).finish(),
            Self::Close => write!(f, "Close"),
        }
    }
}

/// Handle through which any part of the app can request a modal.
///
/// Created once at startup next to the session and cloned into whichever
/// screen needs it. Requests are applied in order by the app loop.
#[derive(Debug, Clone)]
pub struct ModalRequester {
    request_tx: UnboundedSender<ModalRequest>,
}

impl ModalRequester {
    pub fn channel() -> (Self, UnboundedReceiver<ModalRequest>) {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        (Self { request_tx }, request_rx)
    }

    pub fn show(&self, factory: DialogFactory, props: Props) -> Result<()> {
        self.send(ModalRequest::Show { factory, props })
    }

    pub fn close(&self) -> Result<()> {
        self.send(ModalRequest::Close)
    }

    fn send(&self, request: ModalRequest) -> Result<()> {
        self.request_tx
            .send(request)
            .map_err(|_| eyre!("Modal session is no longer running"))
    }
}
