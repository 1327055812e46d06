//! User-facing notifications.
//!
//! Failures reach the user as toasts: a short message they can dismiss,
//! which by default disappears on its own. The technical detail of an
//! error toast is logged, never displayed.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use uuid::Uuid;

use billsplit_shared::constants::TOAST_AUTO_HIDE_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToastId(Uuid);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToastKind {
    Error {
        /// Shown to the user.
        user_error: String,
        /// Logged only.
        system_error: String,
    },
    Warning(String),
    Info(String),
    Success(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    /// `None` keeps the toast until it is dismissed.
    pub auto_hide: Option<Duration>,
}

impl Toast {
    fn new(kind: ToastKind) -> Self {
        Self {
            kind,
            auto_hide: Some(Duration::from_millis(TOAST_AUTO_HIDE_MS)),
        }
    }

    pub fn error(user_error: impl Into<String>, system_error: impl Into<String>) -> Self {
        Self::new(ToastKind::Error {
            user_error: user_error.into(),
            system_error: system_error.into(),
        })
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Warning(message.into()))
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Info(message.into()))
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Success(message.into()))
    }

    pub fn auto_hide_after(mut self, after: Duration) -> Self {
        self.auto_hide = Some(after);
        self
    }

    pub fn persistent(mut self) -> Self {
        self.auto_hide = None;
        self
    }

    /// The message to display.
    pub fn text(&self) -> &str {
        match &self.kind {
            ToastKind::Error { user_error, .. } => user_error,
            ToastKind::Warning(m) | ToastKind::Info(m) | ToastKind::Success(m) => m,
        }
    }
}

/// The set of visible toasts, in the order they were shown.
#[derive(Debug, Clone, Default)]
pub struct Toaster {
    toasts: Arc<Mutex<Vec<(ToastId, Toast)>>>,
}

impl Toaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `toast`, scheduling its removal if it auto-hides. Must be
    /// called within a tokio runtime when the toast auto-hides.
    pub fn show(&self, toast: Toast) -> ToastId {
        if let ToastKind::Error {
            user_error,
            system_error,
        } = &toast.kind
        {
            tracing::error!(%system_error, "{user_error}");
        }

        let id = ToastId(Uuid::new_v4());
        let auto_hide = toast.auto_hide;
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, toast));

        if let Some(after) = auto_hide {
            let toaster = self.clone();
            tokio::spawn(async move {
                tokio::time::sleep(after).await;
                toaster.dismiss(id);
            });
        }

        id
    }

    /// Remove a toast. Returns `false` if it was already gone.
    pub fn dismiss(&self, id: ToastId) -> bool {
        let mut toasts = self.toasts.lock().unwrap_or_else(PoisonError::into_inner);
        let before = toasts.len();
        toasts.retain(|(t, _)| *t != id);
        toasts.len() != before
    }

    pub fn visible(&self) -> Vec<(ToastId, Toast)> {
        self.toasts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_text_is_the_user_message() {
        let toast = Toast::error("Failed to save line item", "HTTP 500");
        assert_eq!(toast.text(), "Failed to save line item");
        assert_eq!(toast.auto_hide, Some(Duration::from_millis(5000)));
    }

    #[tokio::test(start_paused = true)]
    async fn toasts_auto_hide() {
        let toaster = Toaster::new();
        toaster.show(Toast::info("Saved"));
        toaster.show(Toast::warning("Careful").auto_hide_after(Duration::from_secs(10)));
        assert_eq!(toaster.visible().len(), 2);

        tokio::time::sleep(Duration::from_millis(5001)).await;
        let visible = toaster.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].1.text(), "Careful");

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(toaster.visible().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_toasts_wait_for_dismissal() {
        let toaster = Toaster::new();
        let id = toaster.show(Toast::success("Bill created").persistent());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(toaster.visible().len(), 1);

        assert!(toaster.dismiss(id));
        assert!(!toaster.dismiss(id));
        assert!(toaster.visible().is_empty());
    }
}
