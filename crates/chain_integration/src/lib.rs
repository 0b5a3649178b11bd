use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use ethers::types::Address;
use shared::domain::{ChainId, TokenId, TxOutcome};

mod contracts;
mod wallet;

pub use contracts::{EthersNftContract, EthersTokenContract};
pub use wallet::{build_chain_handles, ChainHandleOptions, LocalWalletConnector};

/// Read/write capability handle produced by a wallet connector. The chain id
/// is re-queried per call so a network switch under the session is observed.
#[async_trait]
pub trait WalletSession: Send + Sync {
    async fn chain_id(&self) -> anyhow::Result<ChainId>;
    fn address(&self) -> Address;
    fn can_sign(&self) -> bool;
}

#[async_trait]
pub trait WalletConnector: Send + Sync {
    async fn connect(&self) -> anyhow::Result<Arc<dyn WalletSession>>;
}

/// ERC20-style token contract surface: supply/balance/claim-flag reads plus
/// the two state-changing operations. Amounts cross this boundary as wei.
#[async_trait]
pub trait TokenContract: Send + Sync {
    async fn total_supply(&self) -> anyhow::Result<u128>;
    async fn balance_of(&self, owner: Address) -> anyhow::Result<u128>;
    async fn token_ids_claimed(&self, token_id: TokenId) -> anyhow::Result<bool>;
    async fn mint(&self, amount: u64, value_wei: u128) -> anyhow::Result<TxOutcome>;
    async fn claim(&self) -> anyhow::Result<TxOutcome>;
}

/// Enumerable ERC721 surface used to walk the caller's NFTs.
#[async_trait]
pub trait NftContract: Send + Sync {
    async fn balance_of(&self, owner: Address) -> anyhow::Result<u64>;
    async fn token_of_owner_by_index(&self, owner: Address, index: u64)
        -> anyhow::Result<TokenId>;
}

pub struct MissingWalletConnector;

#[async_trait]
impl WalletConnector for MissingWalletConnector {
    async fn connect(&self) -> anyhow::Result<Arc<dyn WalletSession>> {
        Err(anyhow!("wallet backend unavailable"))
    }
}

pub struct MissingTokenContract;

#[async_trait]
impl TokenContract for MissingTokenContract {
    async fn total_supply(&self) -> anyhow::Result<u128> {
        Err(anyhow!("token contract backend unavailable"))
    }

    async fn balance_of(&self, _owner: Address) -> anyhow::Result<u128> {
        Err(anyhow!("token contract backend unavailable"))
    }

    async fn token_ids_claimed(&self, token_id: TokenId) -> anyhow::Result<bool> {
        Err(anyhow!(
            "token contract backend unavailable for token id {}",
            token_id.0
        ))
    }

    async fn mint(&self, _amount: u64, _value_wei: u128) -> anyhow::Result<TxOutcome> {
        Err(anyhow!("token contract backend unavailable"))
    }

    async fn claim(&self) -> anyhow::Result<TxOutcome> {
        Err(anyhow!("token contract backend unavailable"))
    }
}

pub struct MissingNftContract;

#[async_trait]
impl NftContract for MissingNftContract {
    async fn balance_of(&self, _owner: Address) -> anyhow::Result<u64> {
        Err(anyhow!("nft contract backend unavailable"))
    }

    async fn token_of_owner_by_index(
        &self,
        _owner: Address,
        index: u64,
    ) -> anyhow::Result<TokenId> {
        Err(anyhow!(
            "nft contract backend unavailable for owner index {index}"
        ))
    }
}

/// Everything an application needs to drive the dapp against one network.
pub struct ChainHandles {
    pub connector: Arc<dyn WalletConnector>,
    pub token: Arc<dyn TokenContract>,
    pub nft: Arc<dyn NftContract>,
}
