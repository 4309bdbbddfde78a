use std::{future::Future, marker::PhantomData};

use alloy::{
    network::{Ethereum, ReceiptResponse, TransactionBuilder},
    primitives::{Address, Bytes, TxHash},
    providers::{PendingTransactionBuilder, Provider},
    rpc::types::TransactionRequest,
    transports::Transport,
};
use anyhow::{anyhow, ensure, Context, Ok, Result};
use tracing::info;

/// Submits contract-creation transactions.
pub trait Deployer {
    type Pending: PendingDeployment;

    /// Send a creation transaction carrying `init_code`. Resolves once the
    /// transaction is accepted by the node, not when it is mined.
    fn submit(
        &self,
        contract: &str,
        init_code: Bytes,
    ) -> impl Future<Output = Result<Self::Pending>>;
}

/// A submitted deployment that may not be mined yet.
pub trait PendingDeployment {
    /// The address the contract will have once mined.
    fn address(&self) -> Address;

    fn tx_hash(&self) -> TxHash;

    /// Wait for the deployment to be mined and return the contract address.
    fn deployed(self) -> impl Future<Output = Result<Address>>;
}

/// Deploys through a JSON-RPC node, signing as `sender`.
pub struct NetworkDeployer<P, T> {
    provider: P,
    sender: Address,
    _transport: PhantomData<T>,
}

impl<P, T> NetworkDeployer<P, T>
where
    P: Provider<T, Ethereum> + Clone,
    T: Transport + Clone,
{
    pub fn new(provider: P, sender: Address) -> Self {
        Self {
            provider,
            sender,
            _transport: PhantomData,
        }
    }

    pub fn sender(&self) -> Address {
        self.sender
    }
}

impl<P, T> Deployer for NetworkDeployer<P, T>
where
    P: Provider<T, Ethereum> + Clone,
    T: Transport + Clone,
{
    type Pending = NetworkPending<T>;

    async fn submit(&self, contract: &str, init_code: Bytes) -> Result<NetworkPending<T>> {
        // Pin the nonce so the CREATE address is known before mining
        let nonce = self
            .provider
            .get_transaction_count(self.sender)
            .pending()
            .await
            .context("Failed to fetch deployer nonce")?;
        let address = self.sender.create(nonce);
        let tx = TransactionRequest::default()
            .with_from(self.sender)
            .with_nonce(nonce)
            .with_deploy_code(init_code);
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .with_context(|| format!("Failed to submit {} deployment", contract))?;
        info!(
            "Submitted {} deployment in {:#} (nonce {})",
            contract,
            pending.tx_hash(),
            nonce
        );
        Ok(NetworkPending {
            contract: contract.to_string(),
            address,
            pending,
        })
    }
}

pub struct NetworkPending<T> {
    contract: String,
    address: Address,
    pending: PendingTransactionBuilder<T, Ethereum>,
}

impl<T: Transport + Clone> PendingDeployment for NetworkPending<T> {
    fn address(&self) -> Address {
        self.address
    }

    fn tx_hash(&self) -> TxHash {
        *self.pending.tx_hash()
    }

    async fn deployed(self) -> Result<Address> {
        let tx_hash = self.tx_hash();
        let receipt = self
            .pending
            .get_receipt()
            .await
            .with_context(|| format!("Failed to confirm {} deployment", self.contract))?;
        ensure!(
            receipt.status(),
            "{} deployment reverted in {}",
            self.contract,
            tx_hash
        );
        let address = receipt
            .contract_address()
            .ok_or_else(|| anyhow!("Receipt for {} has no contract address", tx_hash))?;
        ensure!(
            address == self.address,
            "{} deployed at {} but {} was expected",
            self.contract,
            address,
            self.address
        );
        info!(
            "Deployed {} at {:#} (gas used: {})",
            self.contract,
            address,
            receipt.gas_used()
        );
        Ok(address)
    }
}
