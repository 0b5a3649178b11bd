//! State-changing contract calls: mint and claim.

use std::sync::Arc;

use chain_integration::TokenContract;
use shared::{
    domain::{mint_value_wei, TxOutcome},
    error::DappError,
};
use tracing::info;

pub struct TransactionSubmitter {
    token: Arc<dyn TokenContract>,
}

impl TransactionSubmitter {
    pub fn new(token: Arc<dyn TokenContract>) -> Self {
        Self { token }
    }

    /// Mints `amount` tokens, paying exactly `amount x 0.001` ether. The
    /// payment is computed client-side in integer wei; no price oracle.
    pub async fn mint(&self, amount: u64) -> Result<TxOutcome, DappError> {
        if amount == 0 {
            return Err(DappError::transaction("mint amount must be positive"));
        }
        let value_wei = mint_value_wei(amount);
        let outcome = self
            .token
            .mint(amount, value_wei)
            .await
            .map_err(DappError::transaction)?;
        info!(amount, value_wei, tx_hash = %outcome.tx_hash, "mint confirmed");
        Ok(outcome)
    }

    pub async fn claim(&self) -> Result<TxOutcome, DappError> {
        let outcome = self.token.claim().await.map_err(DappError::transaction)?;
        info!(tx_hash = %outcome.tx_hash, "claim confirmed");
        Ok(outcome)
    }
}
