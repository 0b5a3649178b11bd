//! Pure derivation of the action area from the current view state.

use shared::domain::{claimable_display_tokens, ConnectionState, TokenStats};

/// Snapshot of everything the page renders from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewModel {
    pub connection: ConnectionState,
    pub loading: bool,
    pub stats: TokenStats,
    pub mint_input: u64,
    pub last_failure: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    /// No session: offer the connect action.
    Connect,
    /// A transaction is awaiting confirmation: disabled loading indicator.
    Loading,
    /// Tokens are owed: claim action with the owed token display value.
    Claim { claimable: u64, display_tokens: u64 },
    /// Default: numeric input plus mint action.
    Mint { amount: u64, submit_enabled: bool },
}

/// Strict priority: disconnected, then loading, then claimable, then mint.
pub fn render_state(view: &ViewModel) -> RenderState {
    if !view.connection.connected {
        return RenderState::Connect;
    }
    if view.loading {
        return RenderState::Loading;
    }
    if view.stats.claimable_count > 0 {
        return RenderState::Claim {
            claimable: view.stats.claimable_count,
            display_tokens: claimable_display_tokens(view.stats.claimable_count),
        };
    }
    RenderState::Mint {
        amount: view.mint_input,
        submit_enabled: view.mint_input > 0,
    }
}
