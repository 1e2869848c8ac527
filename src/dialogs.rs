//! Dialogs shown by the launcher.

mod confirm;
mod info;

use std::sync::Arc;

use clap::ValueEnum;

pub use confirm::confirm_factory;
pub use info::info_factory;

use crate::config::KeyResolver;
use crate::modal::{DialogFactory, Props};

/// Dialogs that can be requested from the command line or the launcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialogChoice {
    Confirm,
    Info,
}

impl DialogChoice {
    /// The other dialog kind, used to demonstrate swapping.
    pub const fn other(self) -> Self {
        match self {
            Self::Confirm => Self::Info,
            Self::Info => Self::Confirm,
        }
    }

    /// Factory and sample props for this dialog.
    pub fn request(self, resolver: &Arc<KeyResolver>) -> (DialogFactory, Props) {
        match self {
            Self::Confirm => (
                confirm_factory(Arc::clone(resolver)),
                Props::new()
                    .with("title", "Delete secret")
                    .with("message", "Delete secret \"api-token\" and all of its versions?")
                    .with("confirm_text", "Delete")
                    .with("cancel_text", "Keep")
                    .with("danger", true),
            ),
            Self::Info => (
                info_factory(Arc::clone(resolver)),
                Props::new()
                    .with("title", "Deployment finished")
                    .with("message", "Revision 42 is now serving 100% of traffic."),
            ),
        }
    }
}

/// Props for an error message shown through the info dialog.
pub fn error_props(message: impl Into<String>) -> Props {
    Props::new()
        .with("title", "Error")
        .with("message", message.into())
        .with("error", true)
}
