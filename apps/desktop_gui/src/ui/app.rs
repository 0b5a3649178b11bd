//! Single-page ICO dapp UI and the backend worker driving it.

use std::{thread, time::Duration};

use chain_integration::{build_chain_handles, ChainHandleOptions};
use crossbeam_channel::{Receiver, Sender};
use dapp_core::{render_state, Alert, DappController, DappEvent, RenderState, ViewModel};
use eframe::egui;
use shared::domain::{
    format_token_amount, ChainId, ConnectionState, TokenStats, TxKind, MAX_TOKEN_SUPPLY,
};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;

pub struct DappGuiApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    connection: ConnectionState,
    stats: TokenStats,
    loading: bool,
    mint_input: String,
    last_failure: Option<String>,
    active_alert: Option<Alert>,
    status: String,
}

impl DappGuiApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            connection: ConnectionState::default(),
            stats: TokenStats::default(),
            loading: false,
            mint_input: String::new(),
            last_failure: None,
            active_alert: None,
            status: "Backend worker starting...".to_string(),
        }
    }

    fn drain_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::BackendReady => {
                    self.status = "Ready. Connect your wallet.".to_string();
                }
                UiEvent::Connected(connection) => {
                    self.connection = connection;
                    self.last_failure = None;
                    self.status = "Wallet connected.".to_string();
                }
                UiEvent::Stats(stats) => {
                    self.stats = stats;
                }
                UiEvent::TxPending(pending) => {
                    self.loading = true;
                    self.status = format!("Waiting for {} confirmation...", pending.kind.label());
                }
                UiEvent::TxConfirmed { kind, tx_hash } => {
                    self.loading = false;
                    self.status = format!("{} confirmed in {tx_hash}", kind.label());
                }
                UiEvent::Alert(alert) => {
                    self.active_alert = Some(alert);
                }
                UiEvent::Error(err) => {
                    if matches!(
                        err.context(),
                        UiErrorContext::Mint | UiErrorContext::Claim
                    ) {
                        self.loading = false;
                    }
                    self.last_failure = Some(err.message().to_string());
                    self.status = err.message().to_string();
                }
            }
        }
    }

    fn view_model(&self) -> ViewModel {
        ViewModel {
            connection: self.connection,
            loading: self.loading,
            stats: self.stats,
            mint_input: parse_mint_amount(&self.mint_input),
            last_failure: self.last_failure.clone(),
        }
    }

    fn render_action_area(&mut self, ui: &mut egui::Ui) {
        match render_state(&self.view_model()) {
            RenderState::Connect => {
                if ui.button("Connect your wallet").clicked() {
                    dispatch_backend_command(
                        &self.cmd_tx,
                        BackendCommand::Connect,
                        &mut self.status,
                    );
                }
            }
            RenderState::Loading => {
                ui.add_enabled(false, egui::Button::new("Loading..."));
            }
            RenderState::Claim { display_tokens, .. } => {
                ui.label(format!("{display_tokens} tokens can be claimed!"));
                if ui.button("Claim Tokens").clicked() {
                    dispatch_backend_command(&self.cmd_tx, BackendCommand::Claim, &mut self.status);
                }
            }
            RenderState::Mint {
                amount,
                submit_enabled,
            } => {
                ui.horizontal(|ui| {
                    ui.label("Amount of tokens:");
                    ui.text_edit_singleline(&mut self.mint_input);
                });
                if ui
                    .add_enabled(submit_enabled, egui::Button::new("Mint Tokens"))
                    .clicked()
                {
                    dispatch_backend_command(
                        &self.cmd_tx,
                        BackendCommand::Mint { amount },
                        &mut self.status,
                    );
                }
            }
        }
    }

    fn render_alert(&mut self, ctx: &egui::Context) {
        let Some(alert) = self.active_alert else {
            return;
        };
        let text = match alert {
            Alert::NetworkMismatch { expected, actual } => format!(
                "Wrong network: wallet is on chain {actual}, switch it to chain {expected}."
            ),
            Alert::TxSuccess { kind } => match kind {
                TxKind::Mint => "Successfully minted tokens".to_string(),
                TxKind::Claim => "Successfully claimed tokens".to_string(),
            },
        };

        let mut dismissed = false;
        egui::Window::new("Notice")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(text);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.active_alert = None;
        }
    }
}

impl eframe::App for DappGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_ui_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Welcome to the Token ICO!");
            ui.label("You can claim or mint tokens here");
            ui.separator();

            if self.connection.connected {
                ui.label(format!(
                    "You have minted {} tokens",
                    format_token_amount(self.stats.caller_balance_wei)
                ));
                ui.label(format!(
                    "Overall {}/{} have been minted",
                    format_token_amount(self.stats.total_minted_wei),
                    MAX_TOKEN_SUPPLY
                ));
                ui.add_space(8.0);
            }
            self.render_action_area(ui);

            ui.add_space(12.0);
            ui.label(&self.status);
        });

        self.render_alert(ctx);
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}

/// Sanitizes the numeric mint input; anything non-numeric reads as zero,
/// which keeps the mint action disabled.
pub fn parse_mint_amount(input: &str) -> u64 {
    input.trim().parse::<u64>().unwrap_or(0)
}

fn failure_context(context: &'static str) -> UiErrorContext {
    match context {
        "connect" => UiErrorContext::Connect,
        "mint" => UiErrorContext::Mint,
        "claim" => UiErrorContext::Claim,
        "refresh_stats" => UiErrorContext::Refresh,
        _ => UiErrorContext::General,
    }
}

pub fn start_backend_bridge(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let settings = dapp_core::load_settings();
            let handles = match build_chain_handles(&ChainHandleOptions {
                rpc_url: settings.rpc_url.clone(),
                token_address: settings.token_address.clone(),
                nft_address: settings.nft_address.clone(),
                private_key: settings.private_key.clone(),
            })
            .await
            {
                Ok(handles) => handles,
                Err(err) => {
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        format!("backend worker startup failure: {err}"),
                    )));
                    tracing::error!("failed to build chain handles: {err}");
                    return;
                }
            };
            let controller = DappController::from_handles(ChainId(settings.chain_id), handles);
            let _ = ui_tx.try_send(UiEvent::BackendReady);

            let mut events = controller.subscribe_events();
            let ui_tx_clone = ui_tx.clone();
            let forward_task = tokio::spawn(async move {
                while let Ok(event) = events.recv().await {
                    let evt = match event {
                        DappEvent::Connected(connection) => UiEvent::Connected(connection),
                        DappEvent::StatsUpdated(stats) => UiEvent::Stats(stats),
                        DappEvent::TxSubmitted(pending) => UiEvent::TxPending(pending),
                        DappEvent::TxConfirmed { kind, outcome } => UiEvent::TxConfirmed {
                            kind,
                            tx_hash: outcome.tx_hash,
                        },
                        DappEvent::AlertRequested(alert) => UiEvent::Alert(alert),
                        DappEvent::Failure {
                            context,
                            code,
                            reason,
                        } => UiEvent::Error(UiError::from_code(
                            failure_context(context),
                            code,
                            reason,
                        )),
                    };
                    let _ = ui_tx_clone.try_send(evt);
                }
            });

            // Failures surface through the controller's event stream; the
            // command loop itself only sequences the calls.
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Connect => {
                        tracing::info!("backend: connect");
                        let _ = controller.connect().await;
                    }
                    BackendCommand::RefreshStats => {
                        tracing::info!("backend: refresh_stats");
                        let _ = controller.refresh_stats().await;
                    }
                    BackendCommand::Mint { amount } => {
                        tracing::info!(amount, "backend: mint");
                        let _ = controller.mint(amount).await;
                    }
                    BackendCommand::Claim => {
                        tracing::info!("backend: claim");
                        let _ = controller.claim().await;
                    }
                }
            }
            forward_task.abort();
        });
    });
}
