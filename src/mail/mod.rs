//! Outbound mail hand-off.
//!
//! Delivery is fire-and-forget: composition happens inline, the hand-off
//! runs on a detached task, and any failure is logged and swallowed. A
//! mail problem never fails the request that triggered it. The actual
//! relay is an external collaborator; this module emits the composed
//! message to the log stream it is wired to.

use tracing::{debug, info};

use crate::config::MailConfig;

#[derive(Clone)]
pub struct Mailer {
    config: MailConfig,
}

impl Mailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    /// Verification mail for self-registered accounts
    pub fn send_verification(&self, to: &str, token: &str) {
        self.deliver(to, "Welcome to Apartments", self.verification_body(token));
    }

    /// Invitation mail for admin-created accounts
    pub fn send_invitation(&self, to: &str, token: &str) {
        self.deliver(to, "You are invited to Apartments", self.verification_body(token));
    }

    fn verification_body(&self, token: &str) -> String {
        format!(
            "Please verify your email by opening {}?token={}. This link expires in 24 hours.",
            self.config.verify_url, token
        )
    }

    fn deliver(&self, to: &str, subject: &str, body: String) {
        if !self.config.enabled {
            debug!("mail disabled, skipping \"{}\" to {}", subject, to);
            return;
        }

        let from = self.config.from.clone();
        let to = to.to_string();
        let subject = subject.to_string();

        tokio::spawn(async move {
            info!(%from, %to, %subject, "outbound mail: {}", body);
        });
    }
}
