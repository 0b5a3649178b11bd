//! Read-only aggregation of on-chain state across the two contracts.

use std::sync::Arc;

use chain_integration::{NftContract, TokenContract};
use ethers::types::Address;
use shared::{domain::TokenStats, error::DappError};
use tracing::debug;

pub struct ChainStateReader {
    token: Arc<dyn TokenContract>,
    nft: Arc<dyn NftContract>,
}

impl ChainStateReader {
    pub fn new(token: Arc<dyn TokenContract>, nft: Arc<dyn NftContract>) -> Self {
        Self { token, nft }
    }

    /// Refetches the full stats snapshot. Values are never derived from the
    /// previous snapshot.
    pub async fn token_stats(&self, owner: Address) -> Result<TokenStats, DappError> {
        let total_minted_wei = self.token.total_supply().await.map_err(DappError::read)?;
        let caller_balance_wei = self
            .token
            .balance_of(owner)
            .await
            .map_err(DappError::read)?;
        let claimable_count = self.claimable_count(owner).await?;
        debug!(
            total_minted_wei,
            caller_balance_wei, claimable_count, "token stats refetched"
        );
        Ok(TokenStats {
            total_minted_wei,
            caller_balance_wei,
            claimable_count,
        })
    }

    /// Counts the owner's NFTs whose claim flag is still unset on the token
    /// contract. Sequential reads, bounded by the wallet's NFT count.
    pub async fn claimable_count(&self, owner: Address) -> Result<u64, DappError> {
        let nft_balance = self.nft.balance_of(owner).await.map_err(DappError::read)?;
        if nft_balance == 0 {
            return Ok(0);
        }

        let mut claimable = 0u64;
        for index in 0..nft_balance {
            let token_id = self
                .nft
                .token_of_owner_by_index(owner, index)
                .await
                .map_err(DappError::read)?;
            let claimed = self
                .token
                .token_ids_claimed(token_id)
                .await
                .map_err(DappError::read)?;
            if !claimed {
                claimable += 1;
            }
        }
        Ok(claimable)
    }
}
