//! Error types for identity resolution and account binding.

/// Errors that can occur while turning a provider code into an account.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The identity provider answered, but rejected the code (bad code,
    /// expired code, wrong app credentials...). Carries the provider's own
    /// error code and message for diagnostics. Not retried.
    #[error("{provider} rejected the code: {message} (code {code})")]
    Provider {
        provider: &'static str,
        code: i64,
        message: String,
    },

    /// The provider could not be reached: transport failure, timeout,
    /// non-2xx HTTP status or an unreadable response body.
    #[error("{provider} unreachable: {reason}")]
    Network {
        provider: &'static str,
        reason: String,
    },

    /// No account is bound to the external identity and creation was not
    /// requested.
    #[error("no account bound to external id {0}")]
    AccountNotFound(String),

    /// The requested username already belongs to another account.
    #[error("username {0} is already taken")]
    UsernameTaken(String),

    /// The account store could not complete the operation.
    #[error("account store unavailable: {0}")]
    Unavailable(String),
}

impl IdentityError {
    /// Returns `true` for failures where trying again later might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Unavailable(_))
    }
}
