use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt},
    json_abi::JsonAbi,
    primitives::Bytes,
};

use crate::{link, Artifact, ArtifactError, Libraries};

/// A linked, deployable contract.
#[derive(Debug, Clone)]
pub struct ContractFactory {
    name: String,
    abi: JsonAbi,
    bytecode: Bytes,
}

impl ContractFactory {
    pub fn new(artifact: &Artifact, libraries: &Libraries) -> Result<Self, ArtifactError> {
        if !artifact.is_deployable() {
            return Err(ArtifactError::NotDeployable(
                artifact.fully_qualified_name(),
            ));
        }
        let bytecode = link(artifact, libraries)?;
        Ok(Self {
            name: artifact.contract_name.clone(),
            abi: artifact.abi.clone(),
            bytecode,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytecode(&self) -> &Bytes {
        &self.bytecode
    }

    /// Creation code followed by the ABI-encoded constructor arguments.
    pub fn init_code(&self, args: &[DynSolValue]) -> Result<Bytes, ArtifactError> {
        let expected = self
            .abi
            .constructor
            .as_ref()
            .map_or(0, |c| c.inputs.len());
        if expected != args.len() {
            return Err(ArtifactError::ConstructorArity {
                contract: self.name.clone(),
                expected,
                got: args.len(),
            });
        }

        let encoded = match &self.abi.constructor {
            Some(constructor) => {
                constructor
                    .abi_encode_input(args)
                    .map_err(|e| ArtifactError::Constructor {
                        contract: self.name.clone(),
                        reason: e.to_string(),
                    })?
            }
            None => Vec::new(),
        };

        let mut code = self.bytecode.to_vec();
        code.extend_from_slice(&encoded);
        Ok(code.into())
    }
}
