//! Outbound email notifications.
//!
//! Notifications are best-effort. Delivery failures are logged and never
//! surfaced to API callers.

mod smtp_mailer;

use async_trait::async_trait;

pub use smtp_mailer::SmtpMailer;

/// Sink for report lifecycle notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Notify a report author that their report changed status.
    async fn notify_status_change(
        &self,
        recipient: &str,
        report_id: i64,
        report_title: &str,
        new_status: &str,
        note: Option<&str>,
    ) -> anyhow::Result<()>;
}
