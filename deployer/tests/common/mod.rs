use std::{
    fs,
    path::Path,
    process::{Command, Output},
};

/// Hardhat artifacts for a library that deploys empty code and a factory that
/// embeds the library address (PUSH20 <library> POP) and takes one address.
pub fn write_artifacts(root: &Path) {
    let library = r#"{
        "_format": "hh-sol-artifact-1",
        "contractName": "DtravelEIP712",
        "sourceName": "contracts/DtravelEIP712.sol",
        "abi": [],
        "bytecode": "0x600080f3",
        "linkReferences": {}
    }"#;
    let factory = r#"{
        "_format": "hh-sol-artifact-1",
        "contractName": "DtravelFactory",
        "sourceName": "contracts/DtravelFactory.sol",
        "abi": [{
            "type": "constructor",
            "stateMutability": "nonpayable",
            "inputs": [{ "name": "_backend", "type": "address", "internalType": "address" }]
        }],
        "bytecode": "0x73__$2a7b4c4e1f2d5b8e6a3c9f0d1e2b3a4c5d$__50600080f3",
        "linkReferences": {
            "contracts/DtravelEIP712.sol": {
                "DtravelEIP712": [{ "start": 1, "length": 20 }]
            }
        }
    }"#;
    for (rel, json) in [
        ("contracts/DtravelEIP712.sol/DtravelEIP712.json", library),
        ("contracts/DtravelFactory.sol/DtravelFactory.json", factory),
    ] {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, json).unwrap();
    }
}

/// Run the deploy binary with only the given flags as configuration.
pub fn run_deploy(args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_deploy-factory"));
    for var in [
        "NODE_HOST",
        "NODE_PORT",
        "OWNER_KEY",
        "CHAIN_ID",
        "ARTIFACTS_DIR",
        "LIBRARY_CONTRACT",
        "FACTORY_CONTRACT",
        "REGISTRY_ADDRESS",
        "RECORD_DIR",
    ] {
        cmd.env_remove(var);
    }
    cmd.args(args).output().unwrap()
}
