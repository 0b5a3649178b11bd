use std::{collections::HashMap, fs};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub rpc_url: String,
    pub chain_id: u64,
    pub token_address: String,
    pub nft_address: String,
    pub private_key: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        // Local dev-node defaults: first two deterministic deploy addresses.
        Self {
            rpc_url: "http://127.0.0.1:8545".into(),
            chain_id: 31337,
            token_address: "0x5FbDB2315678afecb367f032d93F642f64180aa3".into(),
            nft_address: "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512".into(),
            private_key: None,
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("dapp.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            apply_file_overrides(&mut settings, &file_cfg);
        }
    }

    if let Ok(v) = std::env::var("RPC_URL") {
        settings.rpc_url = v;
    }
    if let Ok(v) = std::env::var("DAPP__RPC_URL") {
        settings.rpc_url = v;
    }

    if let Ok(v) = std::env::var("CHAIN_ID") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.chain_id = parsed;
        }
    }
    if let Ok(v) = std::env::var("DAPP__CHAIN_ID") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.chain_id = parsed;
        }
    }

    if let Ok(v) = std::env::var("TOKEN_CONTRACT_ADDRESS") {
        settings.token_address = v;
    }
    if let Ok(v) = std::env::var("DAPP__TOKEN_ADDRESS") {
        settings.token_address = v;
    }

    if let Ok(v) = std::env::var("NFT_CONTRACT_ADDRESS") {
        settings.nft_address = v;
    }
    if let Ok(v) = std::env::var("DAPP__NFT_ADDRESS") {
        settings.nft_address = v;
    }

    if let Ok(v) = std::env::var("PRIVATE_KEY") {
        settings.private_key = Some(v);
    }
    if let Ok(v) = std::env::var("DAPP__PRIVATE_KEY") {
        settings.private_key = Some(v);
    }

    settings
}

fn apply_file_overrides(settings: &mut Settings, file_cfg: &HashMap<String, String>) {
    if let Some(v) = file_cfg.get("rpc_url") {
        settings.rpc_url = v.clone();
    }
    if let Some(v) = file_cfg.get("chain_id") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.chain_id = parsed;
        }
    }
    if let Some(v) = file_cfg.get("token_address") {
        settings.token_address = v.clone();
    }
    if let Some(v) = file_cfg.get("nft_address") {
        settings.nft_address = v.clone();
    }
    if let Some(v) = file_cfg.get("private_key") {
        settings.private_key = Some(v.clone());
    }
}
