//! UI/backend events and error modeling for the desktop GUI.

use dapp_core::Alert;
use shared::{
    domain::{ConnectionState, PendingTx, TokenStats, TxKind},
    error::ErrorCode,
};

pub enum UiEvent {
    BackendReady,
    Connected(ConnectionState),
    Stats(TokenStats),
    TxPending(PendingTx),
    TxConfirmed { kind: TxKind, tx_hash: String },
    Alert(Alert),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Session,
    Network,
    Transaction,
    Read,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Connect,
    Mint,
    Claim,
    Refresh,
    General,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_code(context: UiErrorContext, code: ErrorCode, message: impl Into<String>) -> Self {
        let category = match code {
            ErrorCode::MissingSession
            | ErrorCode::ConnectInProgress
            | ErrorCode::SignerUnavailable => UiErrorCategory::Session,
            ErrorCode::NetworkMismatch | ErrorCode::ConnectFailure => UiErrorCategory::Network,
            ErrorCode::TransactionFailure => UiErrorCategory::Transaction,
            ErrorCode::ReadFailure => UiErrorCategory::Read,
        };
        Self {
            category,
            context,
            message: message.into(),
        }
    }

    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        Self {
            category: UiErrorCategory::Unknown,
            context,
            message: message.into(),
        }
    }

    /// Session-level failures mean the connect action should be offered again.
    pub fn requires_reconnect(&self) -> bool {
        self.category == UiErrorCategory::Session
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
