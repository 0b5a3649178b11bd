use anyhow::Result;
use chain_integration::{build_chain_handles, ChainHandleOptions};
use clap::{Parser, Subcommand};
use dapp_core::{load_settings, DappController};
use shared::domain::{format_token_amount, ChainId, MAX_TOKEN_SUPPLY, TOKENS_PER_CLAIM};

#[derive(Parser, Debug)]
#[command(about = "Headless client for the token ICO dapp")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Connect the wallet and print the current token stats.
    Status,
    /// Mint tokens, paying 0.001 ether per token.
    Mint {
        #[arg(long)]
        amount: u64,
    },
    /// Claim the tokens owed for unclaimed NFTs.
    Claim,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let settings = load_settings();
    let handles = build_chain_handles(&ChainHandleOptions {
        rpc_url: settings.rpc_url.clone(),
        token_address: settings.token_address.clone(),
        nft_address: settings.nft_address.clone(),
        private_key: settings.private_key.clone(),
    })
    .await?;
    let controller = DappController::from_handles(ChainId(settings.chain_id), handles);

    let connection = controller.connect().await?;
    println!(
        "Connected on chain {}",
        connection.chain_id.map(|chain| chain.0).unwrap_or_default()
    );
    print_stats(&controller);

    match args.command {
        Command::Status => {}
        Command::Mint { amount } => {
            let outcome = controller.mint(amount).await?;
            println!("Minted {amount} token(s) in tx {}", outcome.tx_hash);
            print_stats(&controller);
        }
        Command::Claim => {
            let claimable = controller.snapshot().stats.claimable_count;
            if claimable == 0 {
                println!("Nothing to claim.");
                return Ok(());
            }
            let outcome = controller.claim().await?;
            println!(
                "Claimed {} token(s) in tx {}",
                claimable * TOKENS_PER_CLAIM,
                outcome.tx_hash
            );
            print_stats(&controller);
        }
    }

    Ok(())
}

fn print_stats(controller: &DappController) {
    let stats = controller.snapshot().stats;
    println!(
        "Your balance: {} tokens",
        format_token_amount(stats.caller_balance_wei)
    );
    println!(
        "Overall {}/{} minted",
        format_token_amount(stats.total_minted_wei),
        MAX_TOKEN_SUPPLY
    );
    println!(
        "Claimable: {} token(s)",
        stats.claimable_count * TOKENS_PER_CLAIM
    );
}
