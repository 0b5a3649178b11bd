use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use chain_integration::{ChainHandles, NftContract, TokenContract, WalletConnector};
use shared::{
    domain::{ChainId, ConnectionState, PendingTx, TokenStats, TxKind, TxOutcome},
    error::{DappError, ErrorCode},
};
use tokio::sync::broadcast;
use tracing::warn;

pub mod config;
mod reader;
mod render;
mod session;
mod submitter;

pub use config::{load_settings, Settings};
pub use reader::ChainStateReader;
pub use render::{render_state, RenderState, ViewModel};
pub use session::{SessionContext, SessionManager};
pub use submitter::TransactionSubmitter;

/// Blocking notifications the UI surfaces as modal dialogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    NetworkMismatch { expected: u64, actual: u64 },
    TxSuccess { kind: TxKind },
}

#[derive(Debug, Clone)]
pub enum DappEvent {
    Connected(ConnectionState),
    StatsUpdated(TokenStats),
    TxSubmitted(PendingTx),
    TxConfirmed { kind: TxKind, outcome: TxOutcome },
    AlertRequested(Alert),
    Failure {
        context: &'static str,
        code: ErrorCode,
        reason: String,
    },
}

struct ViewState {
    connection: ConnectionState,
    stats: TokenStats,
    mint_input: u64,
    last_failure: Option<String>,
}

/// Orchestrates session setup, chain-state polling, transaction submission,
/// and render-state derivation. All collaborators are injected.
pub struct DappController {
    session: SessionManager,
    reader: ChainStateReader,
    submitter: TransactionSubmitter,
    view: Mutex<ViewState>,
    loading: AtomicBool,
    events: broadcast::Sender<DappEvent>,
}

/// Clears the loading flag on every exit path of a transaction scope.
struct LoadingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> LoadingGuard<'a> {
    fn engage(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self { flag }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

impl DappController {
    pub fn new(
        target_chain: ChainId,
        connector: Arc<dyn WalletConnector>,
        token: Arc<dyn TokenContract>,
        nft: Arc<dyn NftContract>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            session: SessionManager::new(connector, target_chain),
            reader: ChainStateReader::new(Arc::clone(&token), nft),
            submitter: TransactionSubmitter::new(token),
            view: Mutex::new(ViewState {
                connection: ConnectionState::default(),
                stats: TokenStats::default(),
                mint_input: 0,
                last_failure: None,
            }),
            loading: AtomicBool::new(false),
            events,
        })
    }

    pub fn from_handles(target_chain: ChainId, handles: ChainHandles) -> Arc<Self> {
        Self::new(target_chain, handles.connector, handles.token, handles.nft)
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DappEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> ViewModel {
        let view = self.view.lock().expect("view state poisoned");
        ViewModel {
            connection: view.connection,
            loading: self.loading.load(Ordering::SeqCst),
            stats: view.stats,
            mint_input: view.mint_input,
            last_failure: view.last_failure.clone(),
        }
    }

    pub fn render_state(&self) -> RenderState {
        render_state(&self.snapshot())
    }

    pub fn set_mint_input(&self, amount: u64) {
        self.view.lock().expect("view state poisoned").mint_input = amount;
    }

    /// Connects the wallet and, on success, refetches the stats. A network
    /// mismatch aborts the connect and raises a blocking alert; connected
    /// state stays false.
    pub async fn connect(&self) -> Result<ConnectionState, DappError> {
        match self.session.connect().await {
            Ok(context) => {
                let connection = ConnectionState {
                    connected: true,
                    chain_id: Some(context.chain_id),
                };
                {
                    let mut view = self.view.lock().expect("view state poisoned");
                    view.connection = connection;
                    view.last_failure = None;
                }
                let _ = self.events.send(DappEvent::Connected(connection));
                if let Err(err) = self.refresh_stats().await {
                    warn!("stats refresh after connect failed: {err}");
                }
                Ok(connection)
            }
            Err(err) => {
                if let DappError::NetworkMismatch { expected, actual } = err {
                    let _ = self
                        .events
                        .send(DappEvent::AlertRequested(Alert::NetworkMismatch {
                            expected,
                            actual,
                        }));
                }
                self.record_failure("connect", &err);
                Err(err)
            }
        }
    }

    /// Full refetch of total minted, caller balance, and claimable count.
    /// Prior displayed values stay in place on failure.
    pub async fn refresh_stats(&self) -> Result<TokenStats, DappError> {
        let result = self.refresh_stats_inner().await;
        if let Err(err) = &result {
            self.record_failure("refresh_stats", err);
        }
        result
    }

    async fn refresh_stats_inner(&self) -> Result<TokenStats, DappError> {
        let context = self.session.context(false).await?;
        let stats = self.reader.token_stats(context.address).await?;
        self.view.lock().expect("view state poisoned").stats = stats;
        let _ = self.events.send(DappEvent::StatsUpdated(stats));
        Ok(stats)
    }

    pub async fn mint(&self, amount: u64) -> Result<TxOutcome, DappError> {
        let result = self.submit(TxKind::Mint, Some(amount)).await;
        if let Err(err) = &result {
            self.record_failure("mint", err);
        }
        result
    }

    pub async fn claim(&self) -> Result<TxOutcome, DappError> {
        let result = self.submit(TxKind::Claim, None).await;
        if let Err(err) = &result {
            self.record_failure("claim", err);
        }
        result
    }

    async fn submit(&self, kind: TxKind, amount: Option<u64>) -> Result<TxOutcome, DappError> {
        let _context = self.session.context(true).await?;

        let pending = PendingTx { kind, amount };
        let guard = LoadingGuard::engage(&self.loading);
        let _ = self.events.send(DappEvent::TxSubmitted(pending));
        let result = match kind {
            TxKind::Mint => self.submitter.mint(amount.unwrap_or(0)).await,
            TxKind::Claim => self.submitter.claim().await,
        };
        drop(guard);

        let outcome = result?;
        let _ = self.events.send(DappEvent::TxConfirmed {
            kind,
            outcome: outcome.clone(),
        });
        let _ = self
            .events
            .send(DappEvent::AlertRequested(Alert::TxSuccess { kind }));
        // Balances are never adjusted locally; refetch everything.
        if let Err(err) = self.refresh_stats().await {
            warn!("stats refresh after {} failed: {err}", kind.label());
        }
        Ok(outcome)
    }

    fn record_failure(&self, context: &'static str, err: &DappError) {
        warn!(context, code = ?err.code(), "operation failed: {err}");
        self.view
            .lock()
            .expect("view state poisoned")
            .last_failure = Some(err.to_string());
        let _ = self.events.send(DappEvent::Failure {
            context,
            code: err.code(),
            reason: err.to_string(),
        });
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
