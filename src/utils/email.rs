//! SMTP delivery for [`Notification`]s.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use mindflow_config::EmailConfig;
use tracing::{info, instrument};

use super::notifier::{Notification, NotificationError, Notifier};

pub struct EmailNotifier {
    config: EmailConfig,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn build_message(
        &self,
        recipients: &[String],
        notification: &Notification,
    ) -> Result<Message, NotificationError> {
        let from: Mailbox = format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .map_err(|e| NotificationError::InvalidAddress(format!("from: {}", e)))?;

        let mut builder = Message::builder().from(from).subject(notification.subject());
        for recipient in recipients {
            let to: Mailbox = recipient
                .parse()
                .map_err(|e| NotificationError::InvalidAddress(format!("{}: {}", recipient, e)))?;
            builder = builder.to(to);
        }

        let text_body = notification.text_body();
        let html_body = html_template(notification.subject(), &text_body);

        builder
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )
            .map_err(|e| NotificationError::Build(e.to_string()))
    }

    fn transport(&self) -> Result<SmtpTransport, NotificationError> {
        if self.config.smtp_username.is_empty() {
            return Ok(SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build());
        }

        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );

        Ok(SmtpTransport::relay(&self.config.smtp_host)
            .map_err(|e| NotificationError::Transport(format!("relay: {}", e)))?
            .port(self.config.smtp_port)
            .credentials(creds)
            .build())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    #[instrument(skip(self, recipients, notification), fields(recipients = recipients.len(), notification = %notification))]
    async fn notify(
        &self,
        recipients: &[String],
        notification: &Notification,
    ) -> Result<(), NotificationError> {
        if recipients.is_empty() {
            return Ok(());
        }

        let message = self.build_message(recipients, notification)?;

        if !self.config.enabled {
            info!("SMTP disabled, notification not sent");
            return Ok(());
        }

        let mailer = self.transport()?;
        tokio::task::spawn_blocking(move || mailer.send(&message))
            .await
            .map_err(|e| NotificationError::Transport(format!("task join: {}", e)))?
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        info!("Notification sent");
        Ok(())
    }
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn html_template(title: &str, text_body: &str) -> String {
    let title = escape_html(title);
    let paragraphs: String = text_body
        .split("\n\n")
        .map(|p| format!("<p>{}</p>", escape_html(p).replace('\n', "<br>")))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
</head>
<body style="margin: 0; padding: 20px; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="600" align="center" cellpadding="0" cellspacing="0" style="background-color: #ffffff; border-radius: 8px;">
        <tr>
            <td style="background-color: #0F766E; padding: 24px; text-align: center;">
                <h1 style="margin: 0; color: #ffffff; font-size: 26px;">Mindflow</h1>
            </td>
        </tr>
        <tr>
            <td style="padding: 32px; color: #333333; font-size: 16px; line-height: 1.5;">
                {paragraphs}
            </td>
        </tr>
        <tr>
            <td style="padding: 16px; text-align: center; color: #888888; font-size: 12px;">
                This is an automated email from Mindflow. Please do not reply.
            </td>
        </tr>
    </table>
</body>
</html>"#
    )
}
