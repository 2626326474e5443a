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
    configs: HashMap<String, String>,
    responses: HashMap<String, String>,
    layouts: HashMap<String, String>,
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

/// Page configs (partial JSON; missing fields take their defaults).
pub mod configs {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.configs.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        read_to_string(lookup(&MANIFEST.configs, "config", name)?)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        super::load_json(lookup(&MANIFEST.configs, "config", name)?)
    }
}

/// Canned endpoint replies.
pub mod responses {
    use super::*;

    /// Status code and raw body of a stub endpoint reply.
    #[derive(Debug, Clone, Deserialize)]
    pub struct StubResponse {
        pub status: u16,
        pub body: String,
    }

    pub fn keys() -> Vec<String> {
        MANIFEST.responses.keys().cloned().collect()
    }

    pub fn load(name: &str) -> Result<StubResponse> {
        super::load_json(lookup(&MANIFEST.responses, "response", name)?)
    }
}

/// Page layouts: how many scroll targets and which load-stage elements a page has.
pub mod layouts {
    use super::*;

    #[derive(Debug, Clone, Deserialize)]
    pub struct Layout {
        pub scroll_targets: usize,
        pub load_stage: Vec<LoadStageEntry>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(tag = "kind", rename_all = "snake_case")]
    pub enum LoadStageEntry {
        Generic,
        Brand,
        Navigation { links: usize },
        PrimaryBanner,
    }

    pub fn keys() -> Vec<String> {
        MANIFEST.layouts.keys().cloned().collect()
    }

    pub fn load(name: &str) -> Result<Layout> {
        super::load_json(lookup(&MANIFEST.layouts, "layout", name)?)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Ok(resolve_path(lookup(&MANIFEST.layouts, "layout", name)?))
    }
}
