//! Wallet-provider session negotiation over a JSON-RPC endpoint.

use std::sync::Arc;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::Address,
};
use shared::domain::ChainId;
use tracing::info;

use crate::{
    ChainHandles, EthersNftContract, EthersTokenContract, WalletConnector, WalletSession,
};

#[derive(Debug, Clone)]
pub struct ChainHandleOptions {
    pub rpc_url: String,
    pub token_address: String,
    pub nft_address: String,
    pub private_key: Option<String>,
}

/// Connector backed by an HTTP provider and a locally held signing key, the
/// desktop stand-in for a browser extension wallet.
pub struct LocalWalletConnector {
    provider: Arc<Provider<Http>>,
    wallet: LocalWallet,
}

impl LocalWalletConnector {
    pub fn new(provider: Arc<Provider<Http>>, wallet: LocalWallet) -> Self {
        Self { provider, wallet }
    }
}

#[async_trait]
impl WalletConnector for LocalWalletConnector {
    async fn connect(&self) -> anyhow::Result<Arc<dyn WalletSession>> {
        // Counterpart of the extension modal: the first round-trip to the
        // endpoint establishes which network the wallet is actually on.
        let chain_id = self
            .provider
            .get_chainid()
            .await
            .context("wallet connect: chain id negotiation failed")?;
        let address = self.wallet.address();
        info!(chain_id = chain_id.as_u64(), ?address, "wallet session established");
        Ok(Arc::new(EthersWalletSession {
            provider: Arc::clone(&self.provider),
            address,
        }))
    }
}

struct EthersWalletSession {
    provider: Arc<Provider<Http>>,
    address: Address,
}

#[async_trait]
impl WalletSession for EthersWalletSession {
    async fn chain_id(&self) -> anyhow::Result<ChainId> {
        let chain_id = self
            .provider
            .get_chainid()
            .await
            .context("chain id query failed")?;
        Ok(ChainId(chain_id.as_u64()))
    }

    fn address(&self) -> Address {
        self.address
    }

    fn can_sign(&self) -> bool {
        true
    }
}

/// Builds the connector and both contract handles against one endpoint.
/// Without a private key the handles are read-only and `connect` is refused,
/// mirroring a wallet that is installed but holds no account.
pub async fn build_chain_handles(options: &ChainHandleOptions) -> anyhow::Result<ChainHandles> {
    let token_address = parse_address(&options.token_address, "token contract address")?;
    let nft_address = parse_address(&options.nft_address, "nft contract address")?;

    let provider = Provider::<Http>::try_from(options.rpc_url.as_str())
        .with_context(|| format!("invalid rpc url '{}'", options.rpc_url))?;
    let provider = Arc::new(provider);

    let signer_pair = match &options.private_key {
        Some(private_key) => {
            let chain_id = provider
                .get_chainid()
                .await
                .context("chain id query failed while arming the signing key")?;
            let wallet = private_key
                .parse::<LocalWallet>()
                .context("invalid private key")?
                .with_chain_id(chain_id.as_u64());
            let client = Arc::new(SignerMiddleware::new(
                Provider::<Http>::try_from(options.rpc_url.as_str())
                    .with_context(|| format!("invalid rpc url '{}'", options.rpc_url))?,
                wallet.clone(),
            ));
            Some((wallet, client))
        }
        None => None,
    };

    let token = Arc::new(EthersTokenContract::new(
        token_address,
        Arc::clone(&provider),
        signer_pair.as_ref().map(|(_, client)| Arc::clone(client)),
    ));
    let nft = Arc::new(EthersNftContract::new(nft_address, Arc::clone(&provider)));

    let connector: Arc<dyn WalletConnector> = match signer_pair {
        Some((wallet, _)) => Arc::new(LocalWalletConnector::new(Arc::clone(&provider), wallet)),
        None => Arc::new(crate::MissingWalletConnector),
    };

    Ok(ChainHandles {
        connector,
        token,
        nft,
    })
}

pub fn parse_address(raw: &str, what: &str) -> anyhow::Result<Address> {
    raw.trim()
        .parse::<Address>()
        .map_err(|err| anyhow!("invalid {what} '{raw}': {err}"))
}
