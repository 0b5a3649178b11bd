//! Wallet session lifecycle: connect, target-network gate, capability access.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use chain_integration::{WalletConnector, WalletSession};
use ethers::types::Address;
use shared::{domain::ChainId, error::DappError};
use tokio::sync::Mutex;
use tracing::info;

#[derive(Debug, Clone, Copy)]
pub struct SessionContext {
    pub address: Address,
    pub chain_id: ChainId,
}

/// Owns the single wallet session. Injected everywhere it is needed instead
/// of living in module-level state.
pub struct SessionManager {
    connector: Arc<dyn WalletConnector>,
    target_chain: ChainId,
    session: Mutex<Option<Arc<dyn WalletSession>>>,
    connect_in_flight: AtomicBool,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SessionManager {
    pub fn new(connector: Arc<dyn WalletConnector>, target_chain: ChainId) -> Self {
        Self {
            connector,
            target_chain,
            session: Mutex::new(None),
            connect_in_flight: AtomicBool::new(false),
        }
    }

    pub fn target_chain(&self) -> ChainId {
        self.target_chain
    }

    pub async fn is_connected(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Negotiates a wallet session and admits it only on the target network.
    /// A second call while one is in flight is rejected instead of opening a
    /// second wallet prompt.
    pub async fn connect(&self) -> Result<SessionContext, DappError> {
        if self.connect_in_flight.swap(true, Ordering::SeqCst) {
            return Err(DappError::ConnectInProgress);
        }
        let _in_flight = InFlightGuard(&self.connect_in_flight);

        let session = self
            .connector
            .connect()
            .await
            .map_err(DappError::connect)?;
        let chain_id = session.chain_id().await.map_err(DappError::connect)?;
        if chain_id != self.target_chain {
            return Err(DappError::NetworkMismatch {
                expected: self.target_chain.0,
                actual: chain_id.0,
            });
        }

        let context = SessionContext {
            address: session.address(),
            chain_id,
        };
        *self.session.lock().await = Some(session);
        info!(chain_id = chain_id.0, "wallet connected on target network");
        Ok(context)
    }

    /// Sole accessor for downstream operations; `need_signer` requests the
    /// read+write capability.
    pub async fn context(&self, need_signer: bool) -> Result<SessionContext, DappError> {
        let guard = self.session.lock().await;
        let session = guard.as_ref().ok_or(DappError::MissingSession)?;
        if need_signer && !session.can_sign() {
            return Err(DappError::SignerUnavailable);
        }
        Ok(SessionContext {
            address: session.address(),
            chain_id: self.target_chain,
        })
    }
}
