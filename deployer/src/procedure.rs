use std::io::Write;

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{address, Address, TxHash},
};
use anyhow::{Context, Ok, Result};
use artifact::{Artifact, ArtifactStore, ContractFactory, Libraries};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::backend::{Deployer, PendingDeployment};

pub const DEFAULT_LIBRARY: &str = "DtravelEIP712";
pub const DEFAULT_FACTORY: &str = "DtravelFactory";
pub const DEFAULT_REGISTRY: Address = address!("e8167D79F5E7bc460Ebdd830bA9cc6Ca43799feD");

/// What to deploy: the library, the factory linking it, and the address handed
/// to the factory constructor.
#[derive(Debug, Clone)]
pub struct Plan {
    pub library: Artifact,
    pub factory: Artifact,
    pub registry: Address,
}

impl Plan {
    pub fn new(library: Artifact, factory: Artifact, registry: Address) -> Self {
        Self {
            library,
            factory,
            registry,
        }
    }

    pub fn load(
        store: &ArtifactStore,
        library: &str,
        factory: &str,
        registry: Address,
    ) -> Result<Self> {
        let library = store
            .artifact(library)
            .with_context(|| format!("Failed to load library {}", library))?;
        let factory = store
            .artifact(factory)
            .with_context(|| format!("Failed to load factory {}", factory))?;
        Ok(Self::new(library, factory, registry))
    }

    fn libraries(&self, library: Address) -> Libraries {
        Libraries::new().with(self.library.fully_qualified_name(), library)
    }

    // Build both init codes against a placeholder library address, so bad
    // artifacts fail before anything is sent.
    fn check(&self) -> Result<()> {
        ContractFactory::new(&self.library, &Libraries::new())?.init_code(&[])?;
        ContractFactory::new(&self.factory, &self.libraries(Address::ZERO))?
            .init_code(&[DynSolValue::Address(self.registry)])?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedContract {
    pub name: String,
    pub address: Address,
    pub tx_hash: TxHash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub library: DeployedContract,
    pub factory: DeployedContract,
    pub registry: Address,
}

/// Deploy the library, then the factory linked against it.
///
/// The factory's address and creation transaction hash are written to `out`
/// as soon as the factory transaction is submitted, one per line. Any failure
/// stops the run; a library that was already mined stays on chain.
pub async fn deploy<D: Deployer>(
    plan: &Plan,
    deployer: &D,
    out: &mut impl Write,
) -> Result<Deployment> {
    plan.check()?;

    let library = ContractFactory::new(&plan.library, &Libraries::new())?;
    info!("Deploying {}", library.name());
    let pending = deployer
        .submit(library.name(), library.init_code(&[])?)
        .await
        .with_context(|| format!("Failed to deploy {}", library.name()))?;
    let library_tx = pending.tx_hash();
    let library_address = pending
        .deployed()
        .await
        .with_context(|| format!("Failed to deploy {}", library.name()))?;

    let factory = ContractFactory::new(&plan.factory, &plan.libraries(library_address))?;
    info!(
        "Deploying {} with {} at {:#}, registry {:#}",
        factory.name(),
        library.name(),
        library_address,
        plan.registry
    );
    let init_code = factory.init_code(&[DynSolValue::Address(plan.registry)])?;
    let pending = deployer
        .submit(factory.name(), init_code)
        .await
        .with_context(|| format!("Failed to deploy {}", factory.name()))?;
    let factory_tx = pending.tx_hash();

    writeln!(out, "{}", pending.address())?;
    writeln!(out, "{}", factory_tx)?;
    out.flush()?;

    let factory_address = pending
        .deployed()
        .await
        .with_context(|| format!("Failed to deploy {}", factory.name()))?;

    Ok(Deployment {
        library: DeployedContract {
            name: library.name().to_string(),
            address: library_address,
            tx_hash: library_tx,
        },
        factory: DeployedContract {
            name: factory.name().to_string(),
            address: factory_address,
            tx_hash: factory_tx,
        },
        registry: plan.registry,
    })
}
