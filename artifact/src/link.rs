use std::collections::BTreeMap;

use alloy::{
    hex,
    primitives::{Address, Bytes},
};

use crate::{Artifact, ArtifactError};

const ADDRESS_LEN: usize = 20;

/// Library addresses to link into a contract's bytecode, keyed by library
/// name (`DtravelEIP712`) or fully qualified name
/// (`contracts/DtravelEIP712.sol:DtravelEIP712`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Libraries {
    bindings: BTreeMap<String, Address>,
}

impl Libraries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, address: Address) -> Self {
        self.insert(name, address);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, address: Address) {
        self.bindings.insert(name.into(), address);
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Address)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Replace every library placeholder in `artifact`'s creation code with the
/// bound address and decode the result.
pub fn link(artifact: &Artifact, libraries: &Libraries) -> Result<Bytes, ArtifactError> {
    let contract = artifact.contract_name.as_str();
    let resolved = resolve(artifact, libraries)?;

    let code = artifact.bytecode.trim();
    let mut code = code.strip_prefix("0x").unwrap_or(code).to_string();
    if !code.is_ascii() {
        return Err(ArtifactError::InvalidBytecode {
            contract: contract.to_string(),
            reason: "non-ascii characters".to_string(),
        });
    }

    for (source, libs) in &artifact.link_references {
        for (library, refs) in libs {
            let fqn = format!("{source}:{library}");
            let address = resolved
                .get(&fqn)
                .ok_or_else(|| ArtifactError::MissingLibrary {
                    contract: contract.to_string(),
                    library: fqn.clone(),
                })?;
            let encoded = hex::encode(address);
            for r in refs {
                let range = r
                    .start
                    .checked_mul(2)
                    .zip(r.start.checked_add(r.length).and_then(|e| e.checked_mul(2)))
                    .filter(|(_, end)| r.length == ADDRESS_LEN && *end <= code.len());
                let Some((begin, end)) = range else {
                    return Err(ArtifactError::InvalidLinkReference {
                        contract: contract.to_string(),
                        library: fqn,
                        start: r.start,
                    });
                };
                code.replace_range(begin..end, &encoded);
            }
        }
    }

    hex::decode(&code)
        .map(Bytes::from)
        .map_err(|e| ArtifactError::InvalidBytecode {
            contract: contract.to_string(),
            reason: e.to_string(),
        })
}

// Map each binding onto exactly one `source:Library` reference of the artifact.
fn resolve(
    artifact: &Artifact,
    libraries: &Libraries,
) -> Result<BTreeMap<String, Address>, ArtifactError> {
    let contract = artifact.contract_name.as_str();
    let mut resolved = BTreeMap::new();

    for (name, address) in libraries.iter() {
        let matches: Vec<String> = artifact
            .link_references
            .iter()
            .flat_map(|(source, libs)| libs.keys().map(move |lib| (source, lib)))
            .filter(|(source, lib)| match name.rsplit_once(':') {
                Some((s, l)) => s == source.as_str() && l == lib.as_str(),
                None => name == lib.as_str(),
            })
            .map(|(source, lib)| format!("{source}:{lib}"))
            .collect();

        let fqn = match matches.as_slice() {
            [] => {
                return Err(ArtifactError::UnneededLibrary {
                    contract: contract.to_string(),
                    library: name.to_string(),
                })
            }
            [fqn] => fqn.clone(),
            _ => {
                return Err(ArtifactError::AmbiguousLibrary {
                    contract: contract.to_string(),
                    library: name.to_string(),
                    candidates: matches,
                })
            }
        };

        if resolved.insert(fqn.clone(), *address).is_some() {
            return Err(ArtifactError::DuplicateLibrary {
                contract: contract.to_string(),
                library: fqn,
            });
        }
    }

    Ok(resolved)
}
