// Error types for the banking library
//
// AccountError is the single invalid-argument kind raised by Account itself.
// The registry, configuration and scenario layers wrap or add to it.

use thiserror::Error;

/// Invalid-argument errors raised by `Account` operations.
///
/// `Display` yields the literal message the caller sees; the fields carry the
/// offending values for anyone who wants more than the message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccountError {
    #[error("Deposit amount must be positive")]
    NonPositiveDeposit { amount: f64 },

    #[error("Withdrawal amount must be positive")]
    NonPositiveWithdrawal { amount: f64 },

    #[error("Amount must be a finite number")]
    NonFiniteAmount { amount: f64 },

    #[error("Insufficient funds")]
    InsufficientFunds { requested: f64, available: f64 },
}

impl AccountError {
    /// Kind marker: every account error is an invalid argument. Nothing was
    /// mutated and retrying the same call fails the same way.
    pub fn is_invalid_argument(&self) -> bool {
        true
    }
}

/// Errors raised by `AccountRegistry`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Account already exists: {0}")]
    DuplicateAccount(String),

    #[error("Cannot transfer to the same account")]
    SelfTransfer,

    #[error(transparent)]
    Account(#[from] AccountError),
}

impl RegistryError {
    /// True when the account itself rejected the amount, as opposed to the
    /// registry failing to resolve or pair the accounts.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, RegistryError::Account(_))
    }
}

/// Errors raised while reading `ReplayConfig` from the environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors raised while loading a replay scenario.
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Failed to read scenario file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed scenario: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type AccountResult<T> = Result<T, AccountError>;
pub type RegistryResult<T> = Result<T, RegistryError>;
