/// Title shown above every alert.
pub const ALERT_TITLE: &str = "SDK Event";

/// Single-slot alert. A new message overwrites whatever is showing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertPresenter {
    last_message: Option<String>,
    visible: bool,
}

impl AlertPresenter {
    pub fn show(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.visible {
            tracing::debug!(replaced = ?self.last_message, "alert overwritten before acknowledgement");
        }
        self.last_message = Some(message);
        self.visible = true;
    }

    /// Hides the alert; the last message stays readable.
    pub fn acknowledge(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }
}
