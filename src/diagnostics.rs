//! Fire-and-forget diagnostics hooks.
//!
//! A hook runs on its own task with its own error channel: whatever it
//! does, the basket operation that spawned it neither waits for it nor
//! sees its failure.

use async_trait::async_trait;

/// A side probe fired during reads. Implementations log their own
/// outcome; there is nothing to return.
#[async_trait]
pub trait Diagnostics: Send + Sync {
    async fn probe(&self);
}

#[cfg(feature = "secrets")]
pub use secret_probe::SecretProbe;

#[cfg(feature = "secrets")]
mod secret_probe {
    use async_trait::async_trait;
    use tracing::{debug, warn};

    use super::Diagnostics;

    /// Checks that a Secrets Manager secret is reachable. Logs the secret
    /// name and version id on success, a warning on failure; never the
    /// secret payload.
    pub struct SecretProbe {
        client: aws_sdk_secretsmanager::Client,
        secret_name: String,
    }

    impl SecretProbe {
        /// Create a probe from the ambient AWS configuration.
        pub async fn new(secret_name: impl Into<String>) -> Self {
            let sdk_config =
                aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
            Self {
                client: aws_sdk_secretsmanager::Client::new(&sdk_config),
                secret_name: secret_name.into(),
            }
        }

        /// Create from a pre-built client (for testing).
        pub fn from_client(client: aws_sdk_secretsmanager::Client, secret_name: String) -> Self {
            Self {
                client,
                secret_name,
            }
        }
    }

    #[async_trait]
    impl Diagnostics for SecretProbe {
        async fn probe(&self) {
            match self
                .client
                .get_secret_value()
                .secret_id(&self.secret_name)
                .send()
                .await
            {
                Ok(value) => {
                    debug!(
                        secret = %self.secret_name,
                        version = ?value.version_id(),
                        "Secret probe succeeded"
                    );
                }
                Err(e) => {
                    warn!(secret = %self.secret_name, error = %e, "Secret probe failed");
                }
            }
        }
    }
}
