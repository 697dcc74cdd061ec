use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

use crate::core::config::SmtpConfig;
use crate::core::error::AppError;
use crate::modules::mailer::Notifier;

/// SMTP-backed notifier.
///
/// When the SMTP section of the configuration is incomplete the mailer runs
/// in disabled mode: sends become debug-logged no-ops so the rest of the
/// application works without a mail server.
pub struct SmtpMailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, AppError> {
        let from: Mailbox = config
            .from_address
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid SMTP from address: {}", e)))?;

        let transport = if config.is_configured() {
            let username = config.username.clone().unwrap_or_default();
            let password = config.password.clone().unwrap_or_default();

            let transport =
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)
                    .map_err(|e| {
                        AppError::Internal(format!("Failed to build SMTP transport: {}", e))
                    })?
                    .port(config.port)
                    .credentials(Credentials::new(username, password))
                    .build();

            info!("SMTP mailer enabled, relay: {}:{}", config.server, config.port);
            Some(transport)
        } else {
            info!("SMTP credentials not configured, email notifications disabled");
            None
        };

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Notifier for SmtpMailer {
    async fn notify_status_change(
        &self,
        recipient: &str,
        report_id: i64,
        report_title: &str,
        new_status: &str,
        note: Option<&str>,
    ) -> anyhow::Result<()> {
        let Some(transport) = &self.transport else {
            debug!(
                "Mailer disabled, skipping status notification for report {}",
                report_id
            );
            return Ok(());
        };

        let mut body = format!(
            "Halo,\n\n\
             Status laporan Anda \"{}\" (#{}) telah diperbarui menjadi: {}.\n",
            report_title, report_id, new_status
        );
        if let Some(note) = note {
            body.push_str(&format!("\nCatatan petugas: {}\n", note));
        }
        body.push_str("\nTerima kasih telah melapor.\n");

        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient.parse()?)
            .subject(format!("Update Laporan #{}: {}", report_id, new_status))
            .body(body)?;

        transport.send(message).await?;
        debug!(
            "Sent status notification for report {} to {}",
            report_id, recipient
        );
        Ok(())
    }
}
