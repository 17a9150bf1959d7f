use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    content: HashMap<String, String>,
    configs: HashMap<String, String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a>(map: &'a HashMap<String, String>, kind: &str, name: &str) -> Result<&'a str> {
    map.get(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// Page content records (the site's static JSON copy).
pub mod content {
    use super::*;

    /// One entry of the numbers section.
    #[derive(Debug, Clone, Deserialize)]
    pub struct NumberItem {
        pub value: String,
        pub unit: String,
        pub label: String,
    }

    /// Any record with a stable id (services, members, positions).
    #[derive(Debug, Clone, Deserialize)]
    pub struct Record {
        pub id: String,
        #[serde(default)]
        pub title: Option<String>,
        #[serde(default)]
        pub name: Option<String>,
    }

    pub fn keys() -> Vec<String> {
        MANIFEST.content.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        read_to_string(lookup(&MANIFEST.content, "content", name)?)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        super::load_json(lookup(&MANIFEST.content, "content", name)?)
    }

    /// Items of the numbers section of `name`.
    pub fn number_items(name: &str) -> Result<Vec<NumberItem>> {
        let doc: serde_json::Value = load(name)?;
        let items = doc
            .pointer("/numbers/items")
            .cloned()
            .ok_or_else(|| anyhow!("content fixture '{name}' has no numbers.items"))?;
        serde_json::from_value(items).context("numbers.items should be a list of number items")
    }

    /// Ordered records under a JSON pointer, e.g. `/business/services`.
    pub fn records(name: &str, pointer: &str) -> Result<Vec<Record>> {
        let doc: serde_json::Value = load(name)?;
        let list = doc
            .pointer(pointer)
            .cloned()
            .ok_or_else(|| anyhow!("content fixture '{name}' has nothing at {pointer}"))?;
        serde_json::from_value(list).with_context(|| format!("{pointer} should be a list of records"))
    }
}

/// Config presets as raw JSON (parsed by the crate under test).
pub mod configs {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.configs.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        read_to_string(lookup(&MANIFEST.configs, "config", name)?)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Ok(resolve_path(lookup(&MANIFEST.configs, "config", name)?))
    }
}
