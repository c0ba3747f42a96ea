//! Best-effort e-mail dispatch.
//!
//! The transport is optional: without SMTP configuration every send is a
//! logged no-op, and with one a failed send is logged and swallowed. No
//! caller may observe a mail failure; the triggering state transition is
//! the durable fact, delivery is not.

use lettre::{
    message::Mailbox,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::Config;

#[derive(Clone)]
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Option<Mailbox>,
}

impl Mailer {
    pub fn from_config(config: &Config) -> Self {
        let transport = match &config.smtp_host {
            Some(host) => {
                let builder = match AsyncSmtpTransport::<Tokio1Executor>::relay(host) {
                    Ok(b) => b,
                    Err(e) => {
                        tracing::warn!("Invalid SMTP host {}, mail disabled: {}", host, e);
                        return Self { transport: None, from: None };
                    }
                };
                let builder = match (&config.smtp_username, &config.smtp_password) {
                    (Some(user), Some(pass)) => {
                        builder.credentials(Credentials::new(user.clone(), pass.clone()))
                    }
                    _ => builder,
                };
                Some(builder.build())
            }
            None => None,
        };

        let from = config.mail_from.as_deref().and_then(|addr| {
            addr.parse::<Mailbox>()
                .map_err(|e| tracing::warn!("Invalid MAIL_FROM {}: {}", addr, e))
                .ok()
        });

        Self { transport, from }
    }

    /// A mailer that drops everything. Used in tests.
    pub fn disabled() -> Self {
        Self { transport: None, from: None }
    }

    async fn send(&self, to: &str, subject: &str, body: String) {
        let (Some(transport), Some(from)) = (&self.transport, &self.from) else {
            tracing::debug!("Mail disabled, skipping \"{}\" to {}", subject, to);
            return;
        };

        let mailbox: Mailbox = match to.parse() {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("Invalid recipient address {}: {}", to, e);
                return;
            }
        };

        let message = match Message::builder()
            .from(from.clone())
            .to(mailbox)
            .subject(subject)
            .body(body)
        {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("Failed to build mail \"{}\" to {}: {}", subject, to, e);
                return;
            }
        };

        if let Err(e) = transport.send(message).await {
            tracing::warn!("Failed to send mail \"{}\" to {}: {}", subject, to, e);
        }
    }

    pub async fn send_welcome(&self, to: &str, name: &str, password: &str) {
        self.send(
            to,
            "Welcome to Waveport",
            format!(
                "Hi {name},\n\nYour Waveport account is ready.\n\
                 Login: {to}\nTemporary password: {password}\n\n\
                 Please change the password after your first login."
            ),
        )
        .await;
    }

    pub async fn send_password_changed(&self, to: &str, name: &str) {
        self.send(
            to,
            "Your Waveport password was changed",
            format!(
                "Hi {name},\n\nThe password for your account was just changed.\n\
                 If this was not you, contact support immediately."
            ),
        )
        .await;
    }

    pub async fn send_release_status(
        &self,
        to: &str,
        name: &str,
        release_title: &str,
        approved: bool,
        upc: Option<&str>,
        rejection_reason: Option<&str>,
    ) {
        let (subject, body) = if approved {
            (
                format!("Release approved: {release_title}"),
                format!(
                    "Hi {name},\n\nYour release \"{release_title}\" was approved \
                     and is on its way to the stores.\nUPC: {}",
                    upc.unwrap_or("-")
                ),
            )
        } else {
            (
                format!("Release rejected: {release_title}"),
                format!(
                    "Hi {name},\n\nYour release \"{release_title}\" was rejected.\n\
                     Reason: {}",
                    rejection_reason.unwrap_or("-")
                ),
            )
        };
        self.send(to, &subject, body).await;
    }

    pub async fn send_payout_paid(&self, to: &str, name: &str, amount: i64) {
        self.send(
            to,
            "Payout processed",
            format!("Hi {name},\n\nYour payout request for {amount} has been processed."),
        )
        .await;
    }

    pub async fn send_analytics_ready(&self, to: &str, name: &str, quarter: &str) {
        self.send(
            to,
            "New analytics available",
            format!("Hi {name},\n\nYour streaming analytics for {quarter} are ready."),
        )
        .await;
    }

    pub async fn send_request_status(&self, to: &str, name: &str, request_type: &str, done: bool) {
        let (subject, verdict) = if done {
            (format!("Request completed: {request_type}"), "completed")
        } else {
            (format!("Request rejected: {request_type}"), "rejected")
        };
        self.send(
            to,
            &subject,
            format!("Hi {name},\n\nYour request \"{request_type}\" was {verdict}."),
        )
        .await;
    }
}
