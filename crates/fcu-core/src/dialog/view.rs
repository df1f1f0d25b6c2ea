//! Dialog seams implemented by the UI layer.
//!
//! The GUI toolkit itself is not part of the bridge; these traits are the
//! surface the registry and the publish flow drive.

use std::sync::Arc;

use super::model::DialogKind;
use crate::error::Result;
use crate::publish::PublishForm;

/// A dialog window that only needs to be shown and closed.
pub trait DialogWindow: Send + Sync {
    fn kind(&self) -> DialogKind;

    fn show(&self);

    fn close(&self);

    /// Whether the user has dismissed the window. Closed windows are
    /// forgotten the next time a dialog is opened.
    fn is_closed(&self) -> bool {
        false
    }
}

/// The publish dialog as seen by the Publish Orchestrator.
pub trait PublishView: Send + Sync {
    fn show(&self);

    fn close(&self);

    /// Snapshot of what the user entered.
    fn form(&self) -> PublishForm;

    /// Progress bar, 0..=100.
    fn set_progress(&self, percent: u8);

    fn show_warning(&self, subject: &str, message: &str);

    fn show_error(&self, message: &str);

    fn show_info(&self, message: &str);

    /// Clears options and comment for the next publish.
    fn reset_options(&self);

    fn is_closed(&self) -> bool {
        false
    }

    /// A view whose form is filled in up front (no user to press the
    /// button) is submitted as soon as it is shown.
    fn submits_on_show(&self) -> bool {
        false
    }
}

/// Builds dialog instances on demand.
pub trait DialogFactory: Send + Sync {
    /// Opens a non-publish dialog.
    fn open(&self, kind: DialogKind) -> Result<Arc<dyn DialogWindow>>;

    fn open_publish(&self) -> Result<Arc<dyn PublishView>>;
}
