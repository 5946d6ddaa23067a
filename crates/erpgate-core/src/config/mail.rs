//! Outbound mail settings.
//!
//! erpgate never sends mail itself. These values are loaded and validated
//! here so the notification sender can be handed a complete set.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Settings consumed by the email-sending collaborator.
#[derive(Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Sender mailbox address.
    #[serde(default)]
    pub sender_address: Option<String>,
    /// Credential for the sender mailbox.
    #[serde(default)]
    pub sender_credential: Option<String>,
    /// SMTP relay host.
    #[serde(default)]
    pub smtp_host: Option<String>,
    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
}

impl MailConfig {
    /// Whether every value needed to send mail is present.
    pub fn is_configured(&self) -> bool {
        self.present_fields().iter().all(|(_, set)| *set)
    }

    /// Mail settings are optional, but a partial set is a mistake.
    pub fn validate(&self) -> Result<(), AppError> {
        let fields = self.present_fields();
        if fields.iter().all(|(_, set)| !*set) {
            return Ok(());
        }

        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, set)| !*set)
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(AppError::configuration(format!(
                "Incomplete mail configuration. Ensure {} are set",
                missing.join(", ")
            )));
        }

        if self.smtp_port == 0 {
            return Err(AppError::configuration("mail.smtp_port must be non-zero"));
        }

        Ok(())
    }

    fn present_fields(&self) -> [(&'static str, bool); 3] {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        [
            ("mail.sender_address", set(&self.sender_address)),
            ("mail.sender_credential", set(&self.sender_credential)),
            ("mail.smtp_host", set(&self.smtp_host)),
        ]
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            sender_address: None,
            sender_credential: None,
            smtp_host: None,
            smtp_port: default_smtp_port(),
        }
    }
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("sender_address", &self.sender_address)
            .field(
                "sender_credential",
                &self.sender_credential.as_ref().map(|_| "<redacted>"),
            )
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .finish()
    }
}

fn default_smtp_port() -> u16 {
    587
}
