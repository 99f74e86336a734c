//! Contract fixture loader.
//!
//! Loads golden files from `contracts/http/` so in-process router tests and the
//! contract harness assert the same contracts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

/// One HTTP contract: the request to send and the response to expect.
#[derive(Debug, Clone, Deserialize)]
pub struct Contract {
    pub service: String,
    pub id: String,
    pub description: String,
    pub request: ContractRequest,
    pub expect: ContractExpect,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContractRequest {
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// JSON body. A string value is sent verbatim (used for malformed-JSON cases).
    pub body: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContractExpect {
    pub status: u16,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
}

/// Loader for the contract fixtures under the workspace root.
///
/// # Example
/// ```no_run
/// use cheatplace_testing::fixture::Fixture;
/// let contracts = Fixture::contracts("verification");
/// ```
pub struct Fixture;

impl Fixture {
    /// Load every contract under `contracts/http/{service}/`, sorted by id.
    ///
    /// Panics on unreadable directories or fixtures that do not parse.
    pub fn contracts(service: &str) -> Vec<Contract> {
        let dir = workspace_root().join("contracts/http").join(service);
        let mut contracts: Vec<Contract> = std::fs::read_dir(&dir)
            .unwrap_or_else(|e| panic!("cannot read {}: {}", dir.display(), e))
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .map(|p| {
                let contents = std::fs::read_to_string(&p)
                    .unwrap_or_else(|e| panic!("cannot read {}: {}", p.display(), e));
                serde_json::from_str(&contents)
                    .unwrap_or_else(|e| panic!("invalid contract {}: {}", p.display(), e))
            })
            .collect();
        contracts.sort_by(|a, b| a.id.cmp(&b.id));
        contracts
    }
}

/// Walk up from the crate under test to the directory holding `Cargo.lock`.
fn workspace_root() -> PathBuf {
    std::env::var("CARGO_MANIFEST_DIR")
        .map(|dir| {
            let p = Path::new(&dir);
            p.ancestors()
                .find(|a| a.join("Cargo.lock").exists() || a.join("contracts").is_dir())
                .unwrap_or(p)
                .to_path_buf()
        })
        .unwrap_or_else(|_| std::env::current_dir().unwrap())
}
