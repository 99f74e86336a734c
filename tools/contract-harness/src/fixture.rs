//! Contract fixture format and loader.
//!
//! Each file at `contracts/http/{service}/{id}.json` describes one HTTP
//! assertion: the request to send and the response to expect.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    /// Directory name under `contracts/http/`.
    pub service: String,
    /// Unique within the service (matches the filename stem).
    pub id: String,
    pub description: String,
    pub request: Request,
    pub expect: Expect,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// JSON body. A string is sent verbatim, which is how malformed payloads
    /// are expressed.
    pub body: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Expect {
    pub status: u16,
    /// Subset match; extra response headers are fine.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Exact JSON match when present.
    pub body: Option<Value>,
}

/// Load every fixture under `{root}/contracts/http/`, optionally only one service.
pub fn load_all(root: &Path, service: Option<&str>) -> Result<Vec<Fixture>> {
    let http_dir = root.join("contracts/http");

    let service_dirs: Vec<_> = match service {
        Some(svc) => vec![http_dir.join(svc)],
        None => fs::read_dir(&http_dir)
            .with_context(|| format!("cannot open {}", http_dir.display()))?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
            .map(|e| e.path())
            .collect(),
    };

    let mut fixtures = Vec::new();
    for dir in service_dirs.iter().filter(|d| d.exists()) {
        for entry in fs::read_dir(dir)
            .with_context(|| format!("cannot read {}", dir.display()))?
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "json") {
                fixtures.push(parse(&path)?);
            }
        }
    }

    fixtures.sort_by(|a, b| a.service.cmp(&b.service).then(a.id.cmp(&b.id)));
    Ok(fixtures)
}

fn parse(path: &Path) -> Result<Fixture> {
    let content =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("invalid fixture JSON in {}", path.display()))
}
