use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident, $inner:ty) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub $inner);
    };
}

id_newtype!(ChainId, u64);
id_newtype!(TokenId, u128);

/// Wei paid per minted token unit (0.001 ether).
pub const TOKEN_UNIT_PRICE_WEI: u128 = 1_000_000_000_000_000;

/// Whole tokens owed per unclaimed NFT.
pub const TOKENS_PER_CLAIM: u64 = 10;

/// Display denominator for the supply line ("minted / 10000").
pub const MAX_TOKEN_SUPPLY: u64 = 10_000;

const WEI_PER_TOKEN: u128 = 1_000_000_000_000_000_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionState {
    pub connected: bool,
    pub chain_id: Option<ChainId>,
}

/// On-chain values shown on the page. Always refetched as a whole; fields are
/// never incremented locally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenStats {
    pub total_minted_wei: u128,
    pub caller_balance_wei: u128,
    pub claimable_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    Mint,
    Claim,
}

impl TxKind {
    pub fn label(self) -> &'static str {
        match self {
            TxKind::Mint => "mint",
            TxKind::Claim => "claim",
        }
    }
}

/// A submitted transaction awaiting its single confirmation. Dropped on
/// confirmation or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTx {
    pub kind: TxKind,
    pub amount: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutcome {
    pub tx_hash: String,
    pub block_number: Option<u64>,
}

/// Payment due for minting `amount` tokens, in wei.
pub fn mint_value_wei(amount: u64) -> u128 {
    u128::from(amount) * TOKEN_UNIT_PRICE_WEI
}

/// Whole tokens owed for `claimable_count` unclaimed NFTs.
pub fn claimable_display_tokens(claimable_count: u64) -> u64 {
    claimable_count * TOKENS_PER_CLAIM
}

/// Renders an 18-decimal wei amount as a decimal token count, trimming
/// trailing fraction zeros ("2", "0.5", "12.345").
pub fn format_token_amount(wei: u128) -> String {
    let whole = wei / WEI_PER_TOKEN;
    let fraction = wei % WEI_PER_TOKEN;
    if fraction == 0 {
        return whole.to_string();
    }
    let fraction = format!("{fraction:018}");
    let fraction = fraction.trim_end_matches('0');
    format!("{whole}.{fraction}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mint_value_is_exactly_amount_times_unit_price() {
        assert_eq!(mint_value_wei(0), 0);
        assert_eq!(mint_value_wei(1), 1_000_000_000_000_000);
        assert_eq!(mint_value_wei(7), 7_000_000_000_000_000);
        assert_eq!(mint_value_wei(10_000), 10_000_000_000_000_000_000);
    }

    #[test]
    fn claimable_display_scales_by_tokens_per_claim() {
        assert_eq!(claimable_display_tokens(0), 0);
        assert_eq!(claimable_display_tokens(1), 10);
        assert_eq!(claimable_display_tokens(3), 30);
    }

    #[test]
    fn formats_whole_token_amounts_without_fraction() {
        assert_eq!(format_token_amount(0), "0");
        assert_eq!(format_token_amount(2 * WEI_PER_TOKEN), "2");
    }

    #[test]
    fn formats_fractional_token_amounts_trimmed() {
        assert_eq!(format_token_amount(WEI_PER_TOKEN / 2), "0.5");
        assert_eq!(
            format_token_amount(12 * WEI_PER_TOKEN + 345_000_000_000_000_000),
            "12.345"
        );
        assert_eq!(format_token_amount(1), "0.000000000000000001");
    }
}
