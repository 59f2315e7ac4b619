use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::Value;

use tron_rpc::blockchain::{StatusPoller, StatusSource, Trc20, Wallet};
use tron_rpc::codec::address::{base58_to_hex, hex_to_base58, validate_base58};
use tron_rpc::config::{load_config, ClientConfig, Namespace};
use tron_rpc::lifecycle::{signals, Cancellation};
use tron_rpc::observability::logging;
use tron_rpc::rpc::api::address_param;
use tron_rpc::{RpcClient, TronAddress};

#[derive(Parser)]
#[command(name = "tron-cli")]
#[command(about = "Command line client for a TRON node HTTP API", long_about = None)]
struct Cli {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Node base URL (overrides the config file)
    #[arg(short, long)]
    url: Option<String>,

    /// TronGrid API key (overrides the config file)
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// Route calls under /walletsolidity
    #[arg(long)]
    solidity: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Address conversion and key utilities
    Address {
        #[command(subcommand)]
        command: AddressCommands,
    },
    /// Print the current status of a transaction
    Status { tx_id: String },
    /// Poll a transaction until it succeeds, fails, or the deadline passes
    Wait {
        tx_id: String,
        /// Deadline in seconds (defaults to the config value)
        #[arg(long)]
        max_wait: Option<u64>,
    },
    /// TRX balance in sun, or a TRC20 balance with --token
    Balance {
        address: String,
        #[arg(long)]
        token: Option<String>,
    },
    /// Build and sign a TRX transfer from the TRON_PRIVATE_KEY wallet
    Transfer {
        to: String,
        /// Amount in sun
        amount: i64,
        /// Send the signed transaction instead of printing it
        #[arg(long)]
        broadcast: bool,
    },
    /// Call any API method with an optional JSON body
    Call { method: String, body: Option<String> },
}

#[derive(Subcommand)]
enum AddressCommands {
    /// Base58Check to hex
    ToHex { address: String },
    /// Hex to Base58Check
    ToBase58 { hex: String },
    /// Check a Base58Check address
    Validate { address: String },
    /// Generate a new key pair
    Generate,
    /// Derive the address of a private key (falls back to TRON_PRIVATE_KEY)
    FromKey { key: Option<String> },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    if let Some(url) = &cli.url {
        config.rpc.base_url = url.clone();
    }
    if let Some(key) = &cli.api_key {
        config.rpc.api_key = Some(key.clone());
    }
    if cli.solidity {
        config.rpc.namespace = Namespace::WalletSolidity;
    }

    logging::init_logging(&config.observability.log_level);

    match cli.command {
        Commands::Address { command } => run_address(command)?,
        Commands::Status { tx_id } => {
            let client = RpcClient::from_config(&config)?;
            let status = client.transaction_status(&tx_id).await?;
            println!("{}", status);
        }
        Commands::Wait { tx_id, max_wait } => {
            let cancellation = Cancellation::new();
            signals::cancel_on_ctrl_c(cancellation.clone());

            let client = RpcClient::from_config(&config)?.with_cancel(cancellation.signal());
            let max_wait = max_wait
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.polling.max_wait());
            let poller = StatusPoller::new(config.polling.interval(), max_wait)
                .with_cancel(cancellation.signal());

            let status = poller.wait(&client, &tx_id).await?;
            println!("{}", status);
        }
        Commands::Balance { address, token } => {
            let client = RpcClient::from_config(&config)?;
            let owner: TronAddress = address.parse()?;
            match token {
                Some(token) => {
                    let token = Trc20::new(client, token.parse()?);
                    println!("{}", token.balance_of(&owner).await?);
                }
                None => {
                    let text = address_param(&owner, client.visible());
                    println!("{}", client.balance_at(&text).await?);
                }
            }
        }
        Commands::Transfer { to, amount, broadcast } => {
            let client = RpcClient::from_config(&config)?;
            let wallet = Wallet::from_env()?;
            let to: TronAddress = to.parse()?;

            let unsigned = client.build_transfer_trx(&wallet.address(), &to, amount).await?;
            let signed = wallet.sign_json(unsigned).await?;
            if broadcast {
                let response = client.broadcast_transaction(&signed).await?;
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&signed)?);
            }
        }
        Commands::Call { method, body } => {
            let client = RpcClient::from_config(&config)?;
            let body: Value = match body {
                Some(text) => serde_json::from_str(&text)?,
                None => Value::Null,
            };
            let response: Value = client.call(&method, &body).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

fn run_address(command: AddressCommands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        AddressCommands::ToHex { address } => println!("{}", base58_to_hex(&address)?),
        AddressCommands::ToBase58 { hex } => println!("{}", hex_to_base58(&hex)?),
        AddressCommands::Validate { address } => match validate_base58(&address) {
            Ok(()) => println!("valid"),
            Err(e) => {
                eprintln!("invalid: {}", e);
                std::process::exit(1);
            }
        },
        AddressCommands::Generate => {
            let wallet = Wallet::random();
            println!("address:     {}", wallet.address());
            println!("hex:         {}", wallet.address().to_hex());
            println!("private key: {}", wallet.private_key_hex());
        }
        AddressCommands::FromKey { key } => {
            let wallet = match key {
                Some(key) => Wallet::from_private_key(&key)?,
                None => Wallet::from_env()?,
            };
            println!("{}", wallet.address());
        }
    }
    Ok(())
}
