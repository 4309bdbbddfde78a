use std::str::FromStr;

use alloy::{
    providers::Provider,
    signers::local::PrivateKeySigner,
    transports::http::{Client, Http},
};
use anyhow::{ensure, Ok, Result};
use artifact::ArtifactStore;
use clap::Parser;
use deployer::{
    backend::NetworkDeployer,
    cli::DeployConfig,
    env::{create_provider, init_console_subscriber},
    procedure::{deploy, Plan},
    record::{DeploymentRecord, Recorder},
};
use tracing::info;

async fn deploy_contracts(config: DeployConfig) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(&config)?);

    let store = ArtifactStore::new(&config.base.artifacts_dir);
    let plan = Plan::load(&store, &config.library, &config.factory, config.registry)?;

    let owner = PrivateKeySigner::from_str(config.base.owner_key.as_str())?;
    let node_url = config.node_url()?;
    let provider = create_provider(node_url, owner.clone());
    let chain_id = provider.get_chain_id().await?;
    ensure!(
        chain_id == config.base.chain_id,
        "Node reports chain id {} but {} was configured",
        chain_id,
        config.base.chain_id
    );

    let deployer = NetworkDeployer::<_, Http<Client>>::new(provider, owner.address());
    let deployment = deploy(&plan, &deployer, &mut std::io::stdout()).await?;

    if let Some(record_dir) = &config.record_dir {
        let recorder = Recorder::new(record_dir, chain_id);
        recorder.save(&DeploymentRecord {
            chain_id,
            deployment,
        })?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_console_subscriber();
    let config = DeployConfig::parse();
    deploy_contracts(config).await
}
