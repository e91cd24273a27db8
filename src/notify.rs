//! Outbound mail for membership decisions.

use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use parking_lot::Mutex;

use crate::{config::MailSmtp, Error};

/// A mail waiting to be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl Mail {
    /// The notice sent when a membership is approved or rejected.
    pub fn membership_decision(to: &str, membership_type: &str, year: &str, approved: bool) -> Self {
        let verdict = if approved { "approved" } else { "rejected" };
        Self {
            to: to.to_owned(),
            subject: format!("Your {membership_type} membership for {year} was {verdict}"),
            text: format!(
                "Hello,\n\nyour {membership_type} membership for the {year} academic year has been {verdict}.\n"
            ),
            html: format!(
                "<p>Hello,</p><p>your <b>{membership_type}</b> membership for the {year} academic year has been <b>{verdict}</b>.</p>"
            ),
        }
    }
}

pub enum Notifier {
    Smtp {
        transport: AsyncSmtpTransport<Tokio1Executor>,
        from: Mailbox,
    },
    /// Keeps every mail in memory. Used when no SMTP server is configured.
    Outbox(Mutex<Vec<Mail>>),
}

impl Notifier {
    pub fn from_config(config: Option<&MailSmtp>) -> Result<Self, Error> {
        let Some(config) = config else {
            tracing::warn!("no smtp server configured, mails are kept in the outbox");
            return Ok(Self::outbox());
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.server)?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();
        Ok(Self::Smtp {
            transport,
            from: Mailbox::new(Some("Climbing Club".to_owned()), config.address.clone()),
        })
    }

    #[inline]
    pub fn outbox() -> Self {
        Self::Outbox(Mutex::new(Vec::new()))
    }

    /// Delivers a mail. Failures are logged and never reach the caller.
    pub async fn notify(&self, mail: Mail) {
        match self {
            Notifier::Smtp { transport, from } => {
                if let Err(err) = Self::send(transport, from, &mail).await {
                    tracing::error!("failed to mail {}: {err}", mail.to);
                }
            }
            Notifier::Outbox(outbox) => {
                tracing::info!("outbox: \"{}\" to {}", mail.subject, mail.to);
                outbox.lock().push(mail);
            }
        }
    }

    async fn send(
        transport: &AsyncSmtpTransport<Tokio1Executor>,
        from: &Mailbox,
        mail: &Mail,
    ) -> Result<(), Error> {
        let message = Message::builder()
            .from(from.clone())
            .to(Mailbox::new(None, mail.to.parse()?))
            .subject(mail.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                mail.text.clone(),
                mail.html.clone(),
            ))?;
        transport.send(message).await?;
        Ok(())
    }

    /// Mails kept so far. Always empty when delivering over SMTP.
    pub fn sent(&self) -> Vec<Mail> {
        match self {
            Notifier::Smtp { .. } => Vec::new(),
            Notifier::Outbox(outbox) => outbox.lock().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn outbox_keeps_mails() {
        let notifier = Notifier::from_config(None).unwrap();
        notifier
            .notify(Mail::membership_decision(
                "alex@climb.test",
                "basic",
                "2026/2027",
                true,
            ))
            .await;

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "alex@climb.test");
        assert!(sent[0].subject.contains("approved"));
    }
}
