//! Operator CLI for a running tally node.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use tally_kernel::Chain;
use tally_node::api::{BlockData, Peerage};
use tally_node::errors::NodeError;
use tally_node::network::client::NodeClient;

#[derive(Parser, Debug)]
#[command(name = "tally-client", version, about = "tally client code")]
struct Args {
    /// endpoint to address
    #[arg(short = 'e', long, default_value = "http://localhost:1337")]
    endpoint: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// get chain
    ChainGet,
    /// put chain
    ChainPut {
        /// file holding the chain JSON
        #[arg(short, long)]
        file: PathBuf,
    },
    /// compare a chain against the node's
    ChainCompare {
        /// file holding the chain JSON
        #[arg(short, long)]
        file: PathBuf,
    },
    /// puts data in the chain
    BlockAppend {
        /// file with the data; if not present, reads from stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// puts the peer list
    PeerPut {
        /// list of the peers
        #[arg(short, long)]
        file: PathBuf,
    },
    /// gets the peer list
    PeerGet,
    /// request a sweep
    PeerSweep,
    /// enable automatic sweeps
    PeerSweepEnable,
    /// disable automatic sweeps
    PeerSweepDisable,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let client = NodeClient::new();
    if let Err(e) = run(&client, &args.endpoint, args.command).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(client: &NodeClient, endpoint: &str, command: Command) -> Result<(), NodeError> {
    match command {
        Command::ChainGet => {
            let chain = client.get_chain(endpoint).await?;
            println!("{}", pretty(&chain)?);
        }
        Command::ChainPut { file } => {
            let chain: Chain = read_json(&file)?;
            client.put_chain(endpoint, &chain).await?;
        }
        Command::ChainCompare { file } => {
            let chain: Chain = read_json(&file)?;
            if client.compare_chain(endpoint, &chain).await? {
                println!("submitted chain is newer");
            } else {
                println!("contained chain is at least equal, if not newer");
            }
        }
        Command::BlockAppend { file } => {
            let input = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .map_err(|e| NodeError::Decode(e.to_string()))?,
                None => std::io::read_to_string(std::io::stdin())
                    .map_err(|e| NodeError::Decode(e.to_string()))?,
            };
            client.put_block(endpoint, &BlockData { data: input }).await?;
            println!("completed");
        }
        Command::PeerPut { file } => {
            let peerage: Peerage = read_json(&file)?;
            client.put_peers(endpoint, &peerage).await?;
        }
        Command::PeerGet => {
            let peerage = client.get_peers(endpoint).await?;
            println!("{}", pretty(&peerage)?);
        }
        Command::PeerSweep => client.post_sweep(endpoint).await?,
        Command::PeerSweepEnable => client.enable_auto_sweep(endpoint).await?,
        Command::PeerSweepDisable => client.disable_auto_sweep(endpoint).await?,
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<T, NodeError> {
    let bytes = std::fs::read(path).map_err(|e| NodeError::Decode(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| NodeError::Decode(e.to_string()))
}

fn pretty<T: serde::Serialize>(value: &T) -> Result<String, NodeError> {
    serde_json::to_string_pretty(value).map_err(|e| NodeError::Decode(e.to_string()))
}
