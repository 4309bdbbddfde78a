use std::path::PathBuf;

use alloy::primitives::Address;
use clap::Parser;
use serde::Serialize;
use url::Url;

use crate::procedure::{DEFAULT_FACTORY, DEFAULT_LIBRARY};

#[derive(Clone, Parser, Serialize)]
pub struct BaseConfig {
    /// Node host
    #[arg(long, env = "NODE_HOST", default_value = "localhost")]
    pub node_host: String,

    /// Node port
    #[arg(long, env = "NODE_PORT", default_value = "8545")]
    pub node_port: String,

    /// Owner private key (with or without 0x prefix)
    #[arg(long, env = "OWNER_KEY")]
    #[serde(skip_serializing)]
    pub owner_key: String,

    /// Chain ID
    #[arg(long, env = "CHAIN_ID")]
    pub chain_id: u64,

    /// Path to the compiled Hardhat artifacts
    #[arg(long, env = "ARTIFACTS_DIR", default_value = "artifacts")]
    pub artifacts_dir: PathBuf,
}

impl BaseConfig {
    pub fn node_url(&self) -> Result<Url, url::ParseError> {
        let node_url = format!("http://{}:{}", self.node_host, self.node_port);
        Url::parse(&node_url)
    }
}

/// Deploy the DtravelEIP712 library and the DtravelFactory linked against it.
#[derive(Clone, Parser, Serialize)]
#[command(author, version, about, long_about = None)]
pub struct DeployConfig {
    #[clap(flatten)]
    pub base: BaseConfig,

    /// Library contract name, bare or fully qualified
    #[arg(long, env = "LIBRARY_CONTRACT", default_value = DEFAULT_LIBRARY)]
    pub library: String,

    /// Factory contract name, bare or fully qualified
    #[arg(long, env = "FACTORY_CONTRACT", default_value = DEFAULT_FACTORY)]
    pub factory: String,

    /// Address passed to the factory constructor
    #[arg(
        long,
        env = "REGISTRY_ADDRESS",
        default_value = "0xe8167D79F5E7bc460Ebdd830bA9cc6Ca43799feD"
    )]
    pub registry: Address,

    /// Write a JSON record of the deployment under this directory
    #[arg(long, env = "RECORD_DIR")]
    pub record_dir: Option<PathBuf>,
}

impl DeployConfig {
    pub fn node_url(&self) -> Result<Url, url::ParseError> {
        self.base.node_url()
    }
}
