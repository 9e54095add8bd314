//! User-facing notifications for rejected cart operations.
//!
//! The cart never returns an error from its operations. Instead, every
//! rejection is reported once to a [`Notifier`] as one of four fixed
//! [`Notice`]s, the way a storefront would pop a toast.

use std::fmt;

use tokio::sync::mpsc::UnboundedSender;

/// A user-facing failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    /// The requested quantity exceeds available stock.
    OutOfStock,
    /// Adding a product failed.
    AddFailed,
    /// Removing a product failed.
    RemoveFailed,
    /// Changing a product quantity failed.
    UpdateFailed,
}

impl Notice {
    /// Message shown to the user.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::OutOfStock => "Requested quantity is out of stock",
            Self::AddFailed => "Failed to add product",
            Self::RemoveFailed => "Failed to remove product",
            Self::UpdateFailed => "Failed to update product quantity",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Fire-and-forget sink for notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Logs notices through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        tracing::warn!(notice = ?notice, "{notice}");
    }
}

/// Forwards notices to a UI loop. A closed receiver drops them silently.
impl Notifier for UnboundedSender<Notice> {
    fn notify(&self, notice: Notice) {
        let _ = self.send(notice);
    }
}
