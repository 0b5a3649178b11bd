use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NetworkMismatch,
    MissingSession,
    ConnectInProgress,
    ConnectFailure,
    SignerUnavailable,
    TransactionFailure,
    ReadFailure,
}

#[derive(Debug, Error)]
pub enum DappError {
    #[error("wallet is on chain {actual} but the dapp targets chain {expected}")]
    NetworkMismatch { expected: u64, actual: u64 },
    #[error("no wallet session established; connect a wallet first")]
    MissingSession,
    #[error("a wallet connection attempt is already in flight")]
    ConnectInProgress,
    #[error("wallet connection failed: {0}")]
    Connect(String),
    #[error("session is read-only; a signing key is required for this operation")]
    SignerUnavailable,
    #[error("transaction failed: {0}")]
    Transaction(String),
    #[error("chain read failed: {0}")]
    Read(String),
}

impl DappError {
    pub fn code(&self) -> ErrorCode {
        match self {
            DappError::NetworkMismatch { .. } => ErrorCode::NetworkMismatch,
            DappError::MissingSession => ErrorCode::MissingSession,
            DappError::ConnectInProgress => ErrorCode::ConnectInProgress,
            DappError::Connect(_) => ErrorCode::ConnectFailure,
            DappError::SignerUnavailable => ErrorCode::SignerUnavailable,
            DappError::Transaction(_) => ErrorCode::TransactionFailure,
            DappError::Read(_) => ErrorCode::ReadFailure,
        }
    }

    pub fn connect(source: impl std::fmt::Display) -> Self {
        DappError::Connect(source.to_string())
    }

    pub fn transaction(source: impl std::fmt::Display) -> Self {
        DappError::Transaction(source.to_string())
    }

    pub fn read(source: impl std::fmt::Display) -> Self {
        DappError::Read(source.to_string())
    }
}
