use super::*;
use async_trait::async_trait;
use chain_integration::{NftContract, TokenContract, WalletConnector, WalletSession};
use ethers::types::Address;
use shared::domain::{TokenId, TOKEN_UNIT_PRICE_WEI};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex},
};
use tokio::sync::Notify;

const TARGET_CHAIN: ChainId = ChainId(31337);

fn caller() -> Address {
    Address::from_low_u64_be(0xBEEF)
}

struct TestWalletSession {
    chain_id: u64,
    can_sign: bool,
}

#[async_trait]
impl WalletSession for TestWalletSession {
    async fn chain_id(&self) -> anyhow::Result<ChainId> {
        Ok(ChainId(self.chain_id))
    }

    fn address(&self) -> Address {
        caller()
    }

    fn can_sign(&self) -> bool {
        self.can_sign
    }
}

struct TestWalletConnector {
    chain_id: u64,
    can_sign: bool,
    gate: Option<ConnectGate>,
}

/// Lets a test observe that connect() has started and hold it open.
struct ConnectGate {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

impl TestWalletConnector {
    fn on_chain(chain_id: u64) -> Self {
        Self {
            chain_id,
            can_sign: true,
            gate: None,
        }
    }

    fn read_only(chain_id: u64) -> Self {
        Self {
            chain_id,
            can_sign: false,
            gate: None,
        }
    }

    fn gated(chain_id: u64, entered: Arc<Notify>, release: Arc<Notify>) -> Self {
        Self {
            chain_id,
            can_sign: true,
            gate: Some(ConnectGate { entered, release }),
        }
    }
}

#[async_trait]
impl WalletConnector for TestWalletConnector {
    async fn connect(&self) -> anyhow::Result<Arc<dyn WalletSession>> {
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        Ok(Arc::new(TestWalletSession {
            chain_id: self.chain_id,
            can_sign: self.can_sign,
        }))
    }
}

#[derive(Default)]
struct TokenCallLog {
    total_supply_calls: u32,
    balance_calls: u32,
    claim_flag_calls: u32,
    mints: Vec<(u64, u128)>,
    claims: u32,
}

struct TestTokenContract {
    total_supply: u128,
    balance: u128,
    claimed: HashMap<u128, bool>,
    fail_writes_with: Option<String>,
    log: Arc<StdMutex<TokenCallLog>>,
}

impl TestTokenContract {
    fn new(total_supply: u128, balance: u128) -> Self {
        Self {
            total_supply,
            balance,
            claimed: HashMap::new(),
            fail_writes_with: None,
            log: Arc::new(StdMutex::new(TokenCallLog::default())),
        }
    }

    fn with_claimed(mut self, claimed: &[(u128, bool)]) -> Self {
        self.claimed = claimed.iter().copied().collect();
        self
    }

    fn failing_writes(mut self, reason: &str) -> Self {
        self.fail_writes_with = Some(reason.to_string());
        self
    }

    fn log(&self) -> Arc<StdMutex<TokenCallLog>> {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl TokenContract for TestTokenContract {
    async fn total_supply(&self) -> anyhow::Result<u128> {
        self.log.lock().unwrap().total_supply_calls += 1;
        Ok(self.total_supply)
    }

    async fn balance_of(&self, _owner: Address) -> anyhow::Result<u128> {
        self.log.lock().unwrap().balance_calls += 1;
        Ok(self.balance)
    }

    async fn token_ids_claimed(&self, token_id: TokenId) -> anyhow::Result<bool> {
        self.log.lock().unwrap().claim_flag_calls += 1;
        Ok(self.claimed.get(&token_id.0).copied().unwrap_or(false))
    }

    async fn mint(&self, amount: u64, value_wei: u128) -> anyhow::Result<TxOutcome> {
        if let Some(reason) = &self.fail_writes_with {
            return Err(anyhow::anyhow!(reason.clone()));
        }
        self.log.lock().unwrap().mints.push((amount, value_wei));
        Ok(TxOutcome {
            tx_hash: "0xmint".to_string(),
            block_number: Some(1),
        })
    }

    async fn claim(&self) -> anyhow::Result<TxOutcome> {
        if let Some(reason) = &self.fail_writes_with {
            return Err(anyhow::anyhow!(reason.clone()));
        }
        self.log.lock().unwrap().claims += 1;
        Ok(TxOutcome {
            tx_hash: "0xclaim".to_string(),
            block_number: Some(2),
        })
    }
}

#[derive(Default)]
struct NftCallLog {
    balance_calls: u32,
    index_calls: u32,
}

struct TestNftContract {
    token_ids: Vec<u128>,
    log: Arc<StdMutex<NftCallLog>>,
}

impl TestNftContract {
    fn owning(token_ids: &[u128]) -> Self {
        Self {
            token_ids: token_ids.to_vec(),
            log: Arc::new(StdMutex::new(NftCallLog::default())),
        }
    }

    fn log(&self) -> Arc<StdMutex<NftCallLog>> {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl NftContract for TestNftContract {
    async fn balance_of(&self, _owner: Address) -> anyhow::Result<u64> {
        self.log.lock().unwrap().balance_calls += 1;
        Ok(self.token_ids.len() as u64)
    }

    async fn token_of_owner_by_index(
        &self,
        _owner: Address,
        index: u64,
    ) -> anyhow::Result<TokenId> {
        self.log.lock().unwrap().index_calls += 1;
        self.token_ids
            .get(index as usize)
            .map(|id| TokenId(*id))
            .ok_or_else(|| anyhow::anyhow!("owner index {index} out of range"))
    }
}

fn controller_with(
    connector: TestWalletConnector,
    token: TestTokenContract,
    nft: TestNftContract,
) -> Arc<DappController> {
    DappController::new(
        TARGET_CHAIN,
        Arc::new(connector),
        Arc::new(token),
        Arc::new(nft),
    )
}

fn drain_events(rx: &mut broadcast::Receiver<DappEvent>) -> Vec<DappEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn connect_rejects_foreign_chain_and_stays_disconnected() {
    let controller = controller_with(
        TestWalletConnector::on_chain(1),
        TestTokenContract::new(0, 0),
        TestNftContract::owning(&[]),
    );
    let mut rx = controller.subscribe_events();

    let err = controller.connect().await.unwrap_err();
    assert!(matches!(
        err,
        DappError::NetworkMismatch {
            expected: 31337,
            actual: 1
        }
    ));
    assert!(!controller.snapshot().connection.connected);
    assert_eq!(controller.render_state(), RenderState::Connect);

    let events = drain_events(&mut rx);
    assert!(events.iter().any(|event| matches!(
        event,
        DappEvent::AlertRequested(Alert::NetworkMismatch {
            expected: 31337,
            actual: 1
        })
    )));
    assert!(!events
        .iter()
        .any(|event| matches!(event, DappEvent::Connected(_))));
}

#[tokio::test]
async fn second_connect_while_first_in_flight_is_rejected() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let controller = controller_with(
        TestWalletConnector::gated(TARGET_CHAIN.0, Arc::clone(&entered), Arc::clone(&release)),
        TestTokenContract::new(0, 0),
        TestNftContract::owning(&[]),
    );

    let background = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.connect().await })
    };
    entered.notified().await;

    let err = controller.connect().await.unwrap_err();
    assert!(matches!(err, DappError::ConnectInProgress));

    release.notify_one();
    let first = background.await.unwrap();
    assert!(first.is_ok());
    assert!(controller.snapshot().connection.connected);
}

#[tokio::test]
async fn zero_nft_balance_short_circuits_claimable_scan() {
    let token = TestTokenContract::new(100, 0);
    let token_log = token.log();
    let nft = TestNftContract::owning(&[]);
    let nft_log = nft.log();
    let controller = controller_with(TestWalletConnector::on_chain(TARGET_CHAIN.0), token, nft);

    controller.connect().await.unwrap();

    assert_eq!(controller.snapshot().stats.claimable_count, 0);
    assert_eq!(nft_log.lock().unwrap().index_calls, 0);
    assert_eq!(token_log.lock().unwrap().claim_flag_calls, 0);
}

#[tokio::test]
async fn claimable_count_is_owned_minus_already_claimed() {
    let token =
        TestTokenContract::new(0, 0).with_claimed(&[(10, true), (11, false), (12, true), (13, false), (14, false)]);
    let nft = TestNftContract::owning(&[10, 11, 12, 13, 14]);
    let controller = controller_with(TestWalletConnector::on_chain(TARGET_CHAIN.0), token, nft);

    controller.connect().await.unwrap();

    assert_eq!(controller.snapshot().stats.claimable_count, 3);
}

#[tokio::test]
async fn mint_pays_exactly_amount_times_unit_price() {
    let token = TestTokenContract::new(0, 0);
    let token_log = token.log();
    let controller = controller_with(
        TestWalletConnector::on_chain(TARGET_CHAIN.0),
        token,
        TestNftContract::owning(&[]),
    );

    controller.connect().await.unwrap();
    controller.mint(7).await.unwrap();

    let log = token_log.lock().unwrap();
    assert_eq!(log.mints, vec![(7, 7 * TOKEN_UNIT_PRICE_WEI)]);
}

#[tokio::test]
async fn successful_mint_refetches_every_stat() {
    let token = TestTokenContract::new(50, 5);
    let token_log = token.log();
    let nft = TestNftContract::owning(&[]);
    let nft_log = nft.log();
    let controller = controller_with(TestWalletConnector::on_chain(TARGET_CHAIN.0), token, nft);
    controller.connect().await.unwrap();

    let after_connect = {
        let log = token_log.lock().unwrap();
        (log.total_supply_calls, log.balance_calls)
    };
    assert_eq!(after_connect, (1, 1));

    controller.mint(1).await.unwrap();

    let log = token_log.lock().unwrap();
    assert_eq!(log.total_supply_calls, 2);
    assert_eq!(log.balance_calls, 2);
    assert_eq!(nft_log.lock().unwrap().balance_calls, 2);
}

#[tokio::test]
async fn successful_claim_refetches_every_stat() {
    let token = TestTokenContract::new(50, 5).with_claimed(&[(7, false)]);
    let token_log = token.log();
    let controller = controller_with(
        TestWalletConnector::on_chain(TARGET_CHAIN.0),
        token,
        TestNftContract::owning(&[7]),
    );
    controller.connect().await.unwrap();

    controller.claim().await.unwrap();

    let log = token_log.lock().unwrap();
    assert_eq!(log.claims, 1);
    assert_eq!(log.total_supply_calls, 2);
    assert_eq!(log.balance_calls, 2);
}

#[tokio::test]
async fn three_nfts_with_one_unclaimed_renders_claim_for_ten_tokens() {
    let token = TestTokenContract::new(0, 0).with_claimed(&[(1, true), (2, false), (3, true)]);
    let controller = controller_with(
        TestWalletConnector::on_chain(TARGET_CHAIN.0),
        token,
        TestNftContract::owning(&[1, 2, 3]),
    );

    controller.connect().await.unwrap();

    assert_eq!(controller.snapshot().stats.claimable_count, 1);
    assert_eq!(
        controller.render_state(),
        RenderState::Claim {
            claimable: 1,
            display_tokens: 10
        }
    );
}

#[tokio::test]
async fn failed_mint_resets_loading_and_surfaces_reason() {
    let token = TestTokenContract::new(0, 0).failing_writes("user rejected signature");
    let controller = controller_with(
        TestWalletConnector::on_chain(TARGET_CHAIN.0),
        token,
        TestNftContract::owning(&[]),
    );
    controller.connect().await.unwrap();
    let mut rx = controller.subscribe_events();

    let err = controller.mint(2).await.unwrap_err();
    assert!(matches!(err, DappError::Transaction(_)));

    let snapshot = controller.snapshot();
    assert!(!snapshot.loading);
    assert!(snapshot
        .last_failure
        .as_deref()
        .is_some_and(|reason| reason.contains("user rejected signature")));

    let events = drain_events(&mut rx);
    assert!(events.iter().any(|event| matches!(
        event,
        DappEvent::Failure {
            code: ErrorCode::TransactionFailure,
            ..
        }
    )));
    assert!(!events
        .iter()
        .any(|event| matches!(event, DappEvent::TxConfirmed { .. })));
}

#[tokio::test]
async fn writes_require_a_signing_session() {
    let controller = controller_with(
        TestWalletConnector::read_only(TARGET_CHAIN.0),
        TestTokenContract::new(0, 0),
        TestNftContract::owning(&[]),
    );
    controller.connect().await.unwrap();

    let err = controller.mint(1).await.unwrap_err();
    assert!(matches!(err, DappError::SignerUnavailable));

    let err = controller.claim().await.unwrap_err();
    assert!(matches!(err, DappError::SignerUnavailable));
}

#[tokio::test]
async fn zero_amount_mint_is_rejected_before_submission() {
    let token = TestTokenContract::new(0, 0);
    let token_log = token.log();
    let controller = controller_with(
        TestWalletConnector::on_chain(TARGET_CHAIN.0),
        token,
        TestNftContract::owning(&[]),
    );
    controller.connect().await.unwrap();

    let err = controller.mint(0).await.unwrap_err();
    assert!(matches!(err, DappError::Transaction(_)));
    assert!(token_log.lock().unwrap().mints.is_empty());
}

#[tokio::test]
async fn operations_before_connect_fail_with_missing_session() {
    let controller = controller_with(
        TestWalletConnector::on_chain(TARGET_CHAIN.0),
        TestTokenContract::new(0, 0),
        TestNftContract::owning(&[]),
    );

    assert!(matches!(
        controller.refresh_stats().await.unwrap_err(),
        DappError::MissingSession
    ));
    assert!(matches!(
        controller.mint(1).await.unwrap_err(),
        DappError::MissingSession
    ));
    assert!(matches!(
        controller.claim().await.unwrap_err(),
        DappError::MissingSession
    ));
}

#[tokio::test]
async fn successful_transaction_emits_lifecycle_events() {
    let token = TestTokenContract::new(0, 0);
    let controller = controller_with(
        TestWalletConnector::on_chain(TARGET_CHAIN.0),
        token,
        TestNftContract::owning(&[]),
    );
    controller.connect().await.unwrap();
    let mut rx = controller.subscribe_events();

    controller.mint(3).await.unwrap();

    let events = drain_events(&mut rx);
    assert!(events.iter().any(|event| matches!(
        event,
        DappEvent::TxSubmitted(PendingTx {
            kind: TxKind::Mint,
            amount: Some(3)
        })
    )));
    assert!(events.iter().any(|event| matches!(
        event,
        DappEvent::TxConfirmed {
            kind: TxKind::Mint,
            ..
        }
    )));
    assert!(events.iter().any(|event| matches!(
        event,
        DappEvent::AlertRequested(Alert::TxSuccess { kind: TxKind::Mint })
    )));
    assert!(events
        .iter()
        .any(|event| matches!(event, DappEvent::StatsUpdated(_))));
}
