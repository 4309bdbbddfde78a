use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::BufReader,
    path::{Component, Path, PathBuf},
};

use alloy::json_abi::JsonAbi;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ArtifactError;

/// Byte range in the creation bytecode that holds a library address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct LinkReference {
    pub start: usize,
    pub length: usize,
}

/// A compiled contract as Hardhat writes it under `artifacts/`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub contract_name: String,
    pub source_name: String,
    pub abi: JsonAbi,
    /// Hex creation code. Unlinked library slots are `__$...$__` placeholders,
    /// so this is not decodable until linked.
    pub bytecode: String,
    /// source file -> library name -> slots
    #[serde(default)]
    pub link_references: BTreeMap<String, BTreeMap<String, Vec<LinkReference>>>,
}

impl Artifact {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }

    pub fn is_deployable(&self) -> bool {
        let code = self.bytecode.trim();
        !(code.is_empty() || code == "0x")
    }

    pub fn needs_linking(&self) -> bool {
        self.link_references.values().any(|libs| !libs.is_empty())
    }
}

/// Resolves contract names against a Hardhat artifacts directory.
pub struct ArtifactStore {
    root_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Load the artifact for `name`, either a bare contract name or a fully
    /// qualified `contracts/File.sol:Name`.
    pub fn artifact(&self, name: &str) -> Result<Artifact, ArtifactError> {
        let path = self.resolve(name)?;
        debug!("Loading artifact for {} from {:#}", name, path.display());
        let file = File::open(&path).map_err(|source| ArtifactError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|source| ArtifactError::Malformed { path, source })
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, ArtifactError> {
        if let Some((source, contract)) = name.rsplit_once(':') {
            // Qualified names must stay inside the artifacts directory
            let escapes = Path::new(source)
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
            if escapes || contract.contains(['/', '\\']) {
                return Err(ArtifactError::InvalidName(name.to_string()));
            }
            let path = self.root_dir.join(source).join(format!("{contract}.json"));
            return if path.is_file() {
                Ok(path)
            } else {
                Err(ArtifactError::NotFound(name.to_string()))
            };
        }

        let file_name = format!("{name}.json");
        let mut candidates = Vec::new();
        collect(&self.root_dir, &file_name, &mut candidates)?;
        match candidates.len() {
            0 => Err(ArtifactError::NotFound(name.to_string())),
            1 => Ok(candidates.remove(0)),
            _ => {
                let mut candidates: Vec<String> = candidates
                    .iter()
                    .map(|p| {
                        p.strip_prefix(&self.root_dir)
                            .unwrap_or(p)
                            .display()
                            .to_string()
                    })
                    .collect();
                candidates.sort();
                Err(ArtifactError::Ambiguous {
                    name: name.to_string(),
                    candidates,
                })
            }
        }
    }
}

fn collect(dir: &Path, file_name: &str, out: &mut Vec<PathBuf>) -> Result<(), ArtifactError> {
    let io_err = |source| ArtifactError::Io {
        path: dir.to_path_buf(),
        source,
    };
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_dir() {
            // build-info holds compiler input/output, never artifacts
            if path.file_name().is_some_and(|n| n == "build-info") {
                continue;
            }
            collect(&path, file_name, out)?;
        } else if path.file_name().is_some_and(|n| n == file_name) {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBRARY: &str = r#"{
        "_format": "hh-sol-artifact-1",
        "contractName": "DtravelEIP712",
        "sourceName": "contracts/DtravelEIP712.sol",
        "abi": [],
        "bytecode": "0x600080f3",
        "deployedBytecode": "0x",
        "linkReferences": {},
        "deployedLinkReferences": {}
    }"#;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn finds_artifact_by_bare_name() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "contracts/DtravelEIP712.sol/DtravelEIP712.json",
            LIBRARY,
        );
        write(
            dir.path(),
            "contracts/DtravelEIP712.sol/DtravelEIP712.dbg.json",
            "{}",
        );
        write(dir.path(), "build-info/DtravelEIP712.json", "{}");

        let store = ArtifactStore::new(dir.path());
        let artifact = store.artifact("DtravelEIP712").unwrap();
        assert_eq!(artifact.contract_name, "DtravelEIP712");
        assert_eq!(
            artifact.fully_qualified_name(),
            "contracts/DtravelEIP712.sol:DtravelEIP712"
        );
        assert!(artifact.is_deployable());
        assert!(!artifact.needs_linking());
    }

    #[test]
    fn finds_artifact_by_qualified_name() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "contracts/DtravelEIP712.sol/DtravelEIP712.json",
            LIBRARY,
        );
        let store = ArtifactStore::new(dir.path());
        let artifact = store
            .artifact("contracts/DtravelEIP712.sol:DtravelEIP712")
            .unwrap();
        assert_eq!(artifact.source_name, "contracts/DtravelEIP712.sol");

        let err = store.artifact("contracts/Other.sol:DtravelEIP712");
        assert!(matches!(err, Err(ArtifactError::NotFound(_))));
    }

    #[test]
    fn qualified_names_stay_inside_the_store() {
        let root = tempfile::tempdir().unwrap();
        let store_dir = root.path().join("artifacts");
        write(root.path(), "outside/Evil.sol/DtravelEIP712.json", LIBRARY);
        write(
            &store_dir,
            "contracts/DtravelEIP712.sol/DtravelEIP712.json",
            LIBRARY,
        );
        let store = ArtifactStore::new(&store_dir);

        let absolute = format!(
            "{}:DtravelEIP712",
            root.path().join("outside/Evil.sol").display()
        );
        for name in [
            "../outside/Evil.sol:DtravelEIP712",
            "contracts/../../outside/Evil.sol:DtravelEIP712",
            absolute.as_str(),
            "contracts/DtravelEIP712.sol:../DtravelEIP712.sol/DtravelEIP712",
        ] {
            assert!(
                matches!(store.artifact(name), Err(ArtifactError::InvalidName(n)) if n == name),
                "{} was not rejected",
                name
            );
        }
        assert!(store
            .artifact("./contracts/DtravelEIP712.sol:DtravelEIP712")
            .is_ok());
    }

    #[test]
    fn missing_and_ambiguous_names() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "contracts/DtravelEIP712.sol/DtravelEIP712.json",
            LIBRARY,
        );
        write(
            dir.path(),
            "contracts/legacy/DtravelEIP712.sol/DtravelEIP712.json",
            LIBRARY,
        );
        let store = ArtifactStore::new(dir.path());

        assert!(matches!(
            store.artifact("DtravelFactory"),
            Err(ArtifactError::NotFound(name)) if name == "DtravelFactory"
        ));
        match store.artifact("DtravelEIP712") {
            Err(ArtifactError::Ambiguous { candidates, .. }) => assert_eq!(candidates.len(), 2),
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn malformed_artifact_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "contracts/Broken.sol/Broken.json", "{ not json");
        let store = ArtifactStore::new(dir.path());
        assert!(matches!(
            store.artifact("Broken"),
            Err(ArtifactError::Malformed { .. })
        ));
    }

    #[test]
    fn interface_is_not_deployable() {
        let artifact = Artifact::from_json(
            r#"{
                "contractName": "IDtravelFactory",
                "sourceName": "contracts/IDtravelFactory.sol",
                "abi": [],
                "bytecode": "0x"
            }"#,
        )
        .unwrap();
        assert!(!artifact.is_deployable());
    }
}
