// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model catalog: a static JSON file merged with the provider's live listing.
//!
//! The local file is read once at startup. Remote entries replace local ones
//! with the same name; new remote names are appended. The merged view is
//! published through an [`ArcSwap`] so readers never block a refresh.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use qwenmux_config::model::CatalogConfig;
use qwenmux_core::types::{ModelListRequest, RemoteModel};
use qwenmux_core::{Credential, GenerationProvider, QwenmuxError};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{debug, info, warn};

/// Pricing bucket of a model.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CostCategory {
    Free,
    Low,
    Standard,
    Premium,
    /// Not reported. Remote entries always land here.
    #[default]
    #[serde(other)]
    Unknown,
}

/// One model known to the selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub capabilities: BTreeSet<String>,
    #[serde(default)]
    pub cost_category: CostCategory,
    #[serde(default)]
    pub free_tier_eligible: bool,
}

impl ModelDescriptor {
    /// Build a descriptor from a remote listing entry.
    ///
    /// The listing carries no pricing data, so remote entries are never
    /// free-tier eligible.
    pub fn from_remote(remote: RemoteModel) -> Self {
        Self {
            name: remote.name,
            description: remote.description,
            capabilities: BTreeSet::new(),
            cost_category: CostCategory::Unknown,
            free_tier_eligible: false,
        }
    }

    /// True for models suitable as a cheap evaluator: "turbo" models that
    /// are not a floating "latest" alias.
    pub fn is_evaluation_candidate(&self) -> bool {
        self.name.contains("turbo") && !self.name.contains("latest")
    }
}

/// Ordered, name-unique list of model descriptors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<ModelDescriptor>,
}

impl Catalog {
    /// Build a catalog, keeping the last entry for any duplicated name at
    /// the position of its first occurrence.
    pub fn from_entries(entries: impl IntoIterator<Item = ModelDescriptor>) -> Self {
        let mut catalog = Self::default();
        for entry in entries {
            catalog.upsert(entry);
        }
        catalog
    }

    /// Read the local catalog file.
    ///
    /// A missing or unparseable file yields an empty catalog. Individual
    /// entries that fail to parse or have an empty name are skipped.
    pub fn load_local(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "model catalog not readable, starting empty");
                return Self::default();
            }
        };

        match Self::parse(&content) {
            Ok(catalog) => {
                info!(path = %path.display(), models = catalog.len(), "model catalog loaded");
                catalog
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "model catalog malformed, starting empty");
                Self::default()
            }
        }
    }

    /// Parse catalog JSON: a top-level array of descriptor objects.
    pub fn parse(content: &str) -> Result<Self, QwenmuxError> {
        let raw: Vec<serde_json::Value> =
            serde_json::from_str(content).map_err(|e| QwenmuxError::Catalog {
                message: format!("catalog is not a JSON array: {e}"),
                source: Some(Box::new(e)),
            })?;

        let entries = raw.into_iter().filter_map(|value| {
            match serde_json::from_value::<ModelDescriptor>(value) {
                Ok(d) if d.name.trim().is_empty() => {
                    warn!("skipping catalog entry with empty name");
                    None
                }
                Ok(d) => Some(d),
                Err(e) => {
                    warn!(error = %e, "skipping malformed catalog entry");
                    None
                }
            }
        });
        Ok(Self::from_entries(entries))
    }

    /// Merge remote entries over this catalog.
    pub fn merged_with(&self, remote: impl IntoIterator<Item = ModelDescriptor>) -> Self {
        let mut merged = self.clone();
        for entry in remote {
            merged.upsert(entry);
        }
        merged
    }

    fn upsert(&mut self, entry: ModelDescriptor) {
        match self.entries.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Look up a model by exact name.
    pub fn get(&self, name: &str) -> Option<&ModelDescriptor> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// True when `name` is present and free-tier eligible.
    pub fn is_free_tier(&self, name: &str) -> bool {
        self.get(name).is_some_and(|e| e.free_tier_eligible)
    }

    /// Free-tier entries in catalog order.
    pub fn free_tier(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.entries.iter().filter(|e| e.free_tier_eligible)
    }

    /// Names of models usable as evaluators, in catalog order.
    pub fn evaluation_candidates(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.is_evaluation_candidate())
            .map(|e| e.name.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Holds the local catalog and publishes the merged local + remote view.
pub struct CatalogStore {
    local: Catalog,
    current: ArcSwap<Catalog>,
    last_refresh: Mutex<Option<Instant>>,
    refresh_interval: Duration,
    page_size: u32,
    provider: Arc<dyn GenerationProvider>,
}

impl CatalogStore {
    /// Create a store seeded with the local catalog.
    pub fn new(local: Catalog, provider: Arc<dyn GenerationProvider>) -> Self {
        Self {
            current: ArcSwap::from_pointee(local.clone()),
            local,
            last_refresh: Mutex::new(None),
            refresh_interval: Duration::ZERO,
            page_size: 100,
            provider,
        }
    }

    /// Create a store from the `[catalog]` config section, reading the local file.
    pub fn from_config(config: &CatalogConfig, provider: Arc<dyn GenerationProvider>) -> Self {
        let local = Catalog::load_local(Path::new(&config.path));
        Self::new(local, provider)
            .with_refresh_interval(Duration::from_secs(config.refresh_interval_secs))
            .with_page_size(config.remote_page_size)
    }

    /// Minimum time between remote refreshes. Zero refreshes every time.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Page size requested from the listing endpoint.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// The merged catalog as of the last successful refresh.
    pub fn current(&self) -> Arc<Catalog> {
        self.current.load_full()
    }

    /// The local catalog as read at startup.
    pub fn local(&self) -> &Catalog {
        &self.local
    }

    /// True when no refresh has succeeded within the refresh interval.
    pub fn is_stale(&self) -> bool {
        let last = *self
            .last_refresh
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match last {
            None => true,
            Some(at) => self.refresh_interval.is_zero() || at.elapsed() >= self.refresh_interval,
        }
    }

    /// Fetch the first page of the remote listing and publish `local ∪ remote`.
    ///
    /// On failure the previously published catalog is left untouched.
    /// Returns the number of remote entries merged.
    pub async fn refresh(&self, credential: &Credential) -> Result<usize, QwenmuxError> {
        let listing = self
            .provider
            .list_models(ModelListRequest {
                page: 1,
                page_size: self.page_size,
                credential: credential.clone(),
            })
            .await?;

        let remote: Vec<ModelDescriptor> = listing
            .models
            .into_iter()
            .filter(|m| !m.name.trim().is_empty())
            .map(ModelDescriptor::from_remote)
            .collect();
        let count = remote.len();
        let merged = self.local.merged_with(remote);

        debug!(
            remote = count,
            total = listing.total,
            merged = merged.len(),
            "model catalog refreshed"
        );
        self.current.store(Arc::new(merged));
        *self
            .last_refresh
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Instant::now());
        Ok(count)
    }

    /// Refresh when stale. Failures are logged and swallowed.
    pub async fn refresh_if_stale(&self, credential: &Credential) {
        if !self.is_stale() {
            return;
        }
        if let Err(e) = self.refresh(credential).await {
            warn!(error = %e, "model catalog refresh failed, keeping previous catalog");
        }
    }
}

impl std::fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStore")
            .field("local", &self.local.len())
            .field("current", &self.current.load().len())
            .field("refresh_interval", &self.refresh_interval)
            .field("provider", &self.provider.name())
            .finish()
    }
}
