//! Typed bindings and trait implementations for the two deployed contracts.

use std::sync::Arc;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use ethers::{
    contract::abigen,
    middleware::SignerMiddleware,
    providers::{Http, Provider},
    signers::LocalWallet,
    types::{Address, TransactionReceipt, U256, U64},
};
use shared::domain::{TokenId, TxOutcome};
use tracing::info;

use crate::{NftContract, TokenContract};

abigen!(
    IcoToken,
    r#"[
        function totalSupply() external view returns (uint256)
        function balanceOf(address owner) external view returns (uint256)
        function tokenIdsClaimed(uint256 tokenId) external view returns (bool)
        function mint(uint256 amount) external payable
        function claim() external
    ]"#
);

abigen!(
    IcoNft,
    r#"[
        function balanceOf(address owner) external view returns (uint256)
        function tokenOfOwnerByIndex(address owner, uint256 index) external view returns (uint256)
    ]"#
);

type ReadClient = Provider<Http>;
type WriteClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Token contract handle. Reads go through the bare provider; writes require
/// the signer-backed binding and fail with a plain error without one.
pub struct EthersTokenContract {
    read: IcoToken<ReadClient>,
    write: Option<IcoToken<WriteClient>>,
}

impl EthersTokenContract {
    pub fn new(
        address: Address,
        provider: Arc<ReadClient>,
        signer: Option<Arc<WriteClient>>,
    ) -> Self {
        Self {
            read: IcoToken::new(address, provider),
            write: signer.map(|client| IcoToken::new(address, client)),
        }
    }

    fn write_binding(&self) -> anyhow::Result<&IcoToken<WriteClient>> {
        self.write
            .as_ref()
            .ok_or_else(|| anyhow!("no signing key configured; token writes unavailable"))
    }
}

#[async_trait]
impl TokenContract for EthersTokenContract {
    async fn total_supply(&self) -> anyhow::Result<u128> {
        let supply = self
            .read
            .total_supply()
            .call()
            .await
            .context("totalSupply call failed")?;
        u256_to_u128(supply, "total supply")
    }

    async fn balance_of(&self, owner: Address) -> anyhow::Result<u128> {
        let balance = self
            .read
            .balance_of(owner)
            .call()
            .await
            .context("token balanceOf call failed")?;
        u256_to_u128(balance, "token balance")
    }

    async fn token_ids_claimed(&self, token_id: TokenId) -> anyhow::Result<bool> {
        self.read
            .token_ids_claimed(U256::from(token_id.0))
            .call()
            .await
            .with_context(|| format!("tokenIdsClaimed({}) call failed", token_id.0))
    }

    async fn mint(&self, amount: u64, value_wei: u128) -> anyhow::Result<TxOutcome> {
        let call = self
            .write_binding()?
            .mint(U256::from(amount))
            .value(U256::from(value_wei));
        let pending = call.send().await.context("mint submission failed")?;
        let tx_hash = *pending;
        info!(amount, value_wei, tx_hash = ?tx_hash, "mint submitted; awaiting confirmation");
        let receipt = pending
            .confirmations(1)
            .await
            .context("mint confirmation failed")?
            .ok_or_else(|| anyhow!("mint transaction dropped before confirmation"))?;
        receipt_to_outcome(receipt, "mint")
    }

    async fn claim(&self) -> anyhow::Result<TxOutcome> {
        let call = self.write_binding()?.claim();
        let pending = call.send().await.context("claim submission failed")?;
        let tx_hash = *pending;
        info!(tx_hash = ?tx_hash, "claim submitted; awaiting confirmation");
        let receipt = pending
            .confirmations(1)
            .await
            .context("claim confirmation failed")?
            .ok_or_else(|| anyhow!("claim transaction dropped before confirmation"))?;
        receipt_to_outcome(receipt, "claim")
    }
}

pub struct EthersNftContract {
    read: IcoNft<ReadClient>,
}

impl EthersNftContract {
    pub fn new(address: Address, provider: Arc<ReadClient>) -> Self {
        Self {
            read: IcoNft::new(address, provider),
        }
    }
}

#[async_trait]
impl NftContract for EthersNftContract {
    async fn balance_of(&self, owner: Address) -> anyhow::Result<u64> {
        let balance = self
            .read
            .balance_of(owner)
            .call()
            .await
            .context("nft balanceOf call failed")?;
        if balance > U256::from(u64::MAX) {
            return Err(anyhow!("nft balance {balance} exceeds enumerable range"));
        }
        Ok(balance.as_u64())
    }

    async fn token_of_owner_by_index(
        &self,
        owner: Address,
        index: u64,
    ) -> anyhow::Result<TokenId> {
        let token_id = self
            .read
            .token_of_owner_by_index(owner, U256::from(index))
            .call()
            .await
            .with_context(|| format!("tokenOfOwnerByIndex({index}) call failed"))?;
        Ok(TokenId(u256_to_u128(token_id, "nft token id")?))
    }
}

fn receipt_to_outcome(receipt: TransactionReceipt, kind: &str) -> anyhow::Result<TxOutcome> {
    if receipt.status != Some(U64::from(1)) {
        return Err(anyhow!(
            "{kind} transaction {:?} reverted on-chain",
            receipt.transaction_hash
        ));
    }
    Ok(TxOutcome {
        tx_hash: format!("{:?}", receipt.transaction_hash),
        block_number: receipt.block_number.map(|block| block.as_u64()),
    })
}

fn u256_to_u128(value: U256, what: &str) -> anyhow::Result<u128> {
    if value.bits() > 128 {
        return Err(anyhow!("{what} {value} does not fit in 128 bits"));
    }
    Ok(value.as_u128())
}
