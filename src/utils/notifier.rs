//! Outbound notifications.
//!
//! Workflow services hand a [`Notification`] and a recipient list to a
//! [`Notifier`]. Delivery is best-effort: callers log and count failures and
//! never propagate them.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    ExpertApproved,
    ExpertRejected,
    MeetingScheduled {
        start_time: DateTime<Utc>,
        link: String,
    },
}

impl Notification {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ExpertApproved => "expert_approved",
            Self::ExpertRejected => "expert_rejected",
            Self::MeetingScheduled { .. } => "meeting_scheduled",
        }
    }

    pub fn subject(&self) -> &'static str {
        match self {
            Self::ExpertApproved => "Your expert application was approved",
            Self::ExpertRejected => "Your expert application was not approved",
            Self::MeetingScheduled { .. } => "Your consultation meeting is scheduled",
        }
    }

    pub fn text_body(&self) -> String {
        match self {
            Self::ExpertApproved => "Hi,\n\n\
                 Your application to become an expert on Mindflow has been approved.\n\
                 Mentees can now find you and request consultations.\n\n\
                 Best regards,\n\
                 Mindflow Team"
                .to_string(),
            Self::ExpertRejected => "Hi,\n\n\
                 Thank you for applying to become an expert on Mindflow.\n\
                 Unfortunately your application was not approved this time.\n\n\
                 Best regards,\n\
                 Mindflow Team"
                .to_string(),
            Self::MeetingScheduled { start_time, link } => format!(
                "Hi,\n\n\
                 A meeting for your consultation has been scheduled.\n\n\
                 When: {}\n\
                 Link: {}\n\n\
                 Best regards,\n\
                 Mindflow Team",
                start_time.format("%Y-%m-%d %H:%M UTC"),
                link
            ),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("failed to build message: {0}")]
    Build(String),
    #[error("delivery failed: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(
        &self,
        recipients: &[String],
        notification: &Notification,
    ) -> Result<(), NotificationError>;
}

#[cfg(any(test, feature = "test-utils"))]
pub use recording::RecordingNotifier;

#[cfg(any(test, feature = "test-utils"))]
mod recording {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    /// Captures every dispatch; optionally fails them all.
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        sent: Mutex<Vec<(Vec<String>, Notification)>>,
        pub fail: AtomicBool,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn sent(&self) -> Vec<(Vec<String>, Notification)> {
            self.sent
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(
            &self,
            recipients: &[String],
            notification: &Notification,
        ) -> Result<(), NotificationError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(NotificationError::Transport("smtp unreachable".to_string()));
            }
            let mut sent = self
                .sent
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            sent.push((recipients.to_vec(), notification.clone()));
            Ok(())
        }
    }
}
