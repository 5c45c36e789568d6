// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! An in-process content-delivery backend.
//!
//! Everything a remote CDN would hold lives in memory: hosted content,
//! catalogs, labels, staged catalog updates and externally published catalogs.
//! Downloads are simulated per address, one step per pending entry.

mod fault;
mod stats;

pub use self::fault::{DeliveryCall, Fault};
pub use self::stats::DeliveryStats;

use async_trait::async_trait;
use parking_lot::Mutex;
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};
use stowage_core::{
    asset::{Asset, AssetHandle, ErasedAsset, Instance, Placement},
    delivery::{
        CatalogHandle, DownloadTarget, Operation, ProgressSender, ResourceLocation,
        ResourceLocator,
    },
    ContentDelivery,
};

const DEFAULT_CATALOG_ID: &str = "memory";

type PrefabBuilder = Arc<dyn Fn(Instance) -> Instance + Send + Sync>;

enum Payload {
    Asset(ErasedAsset),
    Prefab(PrefabBuilder),
}

struct Content {
    payload: Payload,
    size: u64,
    downloaded: bool,
}

struct MemoryState {
    content: HashMap<String, Content>,
    /// Active catalogs. The first one is the main catalog.
    catalogs: Vec<ResourceLocator>,
    staged: BTreeMap<String, Vec<String>>,
    labels: HashMap<String, Vec<String>>,
    remote: HashMap<String, ResourceLocator>,
    faults: HashMap<DeliveryCall, Fault>,
    stats: DeliveryStats,
}

impl MemoryState {
    fn is_listed(&self, key: &str) -> bool {
        self.catalogs
            .iter()
            .any(|catalog| catalog.keys.iter().any(|listed| listed == key))
    }

    fn list(&mut self, catalog_id: &str, key: String) {
        let catalog = match self.catalogs.iter().position(|c| c.id == catalog_id) {
            Some(index) => &mut self.catalogs[index],
            None => {
                self.catalogs
                    .push(ResourceLocator::new(catalog_id, Vec::<String>::new()));
                let last = self.catalogs.len() - 1;
                &mut self.catalogs[last]
            }
        };
        if !catalog.keys.contains(&key) {
            catalog.keys.push(key);
        }
    }

    /// Hosted addresses behind `key`: the address itself, or a label's members.
    fn addresses_for(&self, key: &str) -> Vec<String> {
        match self.labels.get(key) {
            Some(members) => members.clone(),
            None if self.content.contains_key(key) => vec![key.to_owned()],
            None => Vec::new(),
        }
    }

    fn target_addresses(&self, target: &DownloadTarget) -> Option<Vec<String>> {
        match target {
            DownloadTarget::Locations(locations) => Some(
                locations
                    .iter()
                    .map(|location| location.primary_key.clone())
                    .collect(),
            ),
            DownloadTarget::Label(label) => self.labels.get(label).cloned(),
        }
    }

    fn pending_size(&self, addresses: &[String]) -> u64 {
        addresses
            .iter()
            .filter_map(|address| self.content.get(address))
            .filter(|content| !content.downloaded)
            .map(|content| content.size)
            .sum()
    }
}

fn location(address: &str) -> ResourceLocation {
    ResourceLocation {
        primary_key: address.to_owned(),
        internal_id: format!("memory://{}", address),
    }
}

/// A [`ContentDelivery`] backend that serves content from memory.
///
/// Content is first *hosted*, then made visible by listing it in a catalog.
/// [`insert_asset`](Self::insert_asset) does both at once, into the main
/// catalog. Everything is mutable through `&self` so a backend shared with a
/// loader can still be reconfigured by tests.
pub struct MemoryContentDelivery {
    catalog_id: String,
    state: Mutex<MemoryState>,
}

impl MemoryContentDelivery {
    /// Creates an empty backend whose main catalog is `"memory"`.
    pub fn new() -> Self {
        Self::with_catalog_id(DEFAULT_CATALOG_ID)
    }

    /// Creates an empty backend with a custom main catalog id.
    pub fn with_catalog_id(catalog_id: impl Into<String>) -> Self {
        let catalog_id = catalog_id.into();
        Self {
            state: Mutex::new(MemoryState {
                content: HashMap::new(),
                catalogs: vec![ResourceLocator::new(
                    catalog_id.clone(),
                    Vec::<String>::new(),
                )],
                staged: BTreeMap::new(),
                labels: HashMap::new(),
                remote: HashMap::new(),
                faults: HashMap::new(),
                stats: DeliveryStats::default(),
            }),
            catalog_id,
        }
    }

    /// Hosts an asset without listing it in any catalog.
    pub fn host_asset<T: Asset>(&self, address: impl Into<String>, asset: T) -> AssetHandle<T> {
        let handle = AssetHandle::new(asset);
        self.state.lock().content.insert(
            address.into(),
            Content {
                payload: Payload::Asset(handle.erase()),
                size: 0,
                downloaded: false,
            },
        );
        handle
    }

    /// Hosts an asset and lists it in the main catalog.
    pub fn insert_asset<T: Asset>(&self, address: impl Into<String>, asset: T) -> AssetHandle<T> {
        let address = address.into();
        let handle = self.host_asset(address.clone(), asset);
        self.state.lock().list(&self.catalog_id, address);
        handle
    }

    /// Hosts a prefab without listing it. Each instantiation passes a fresh
    /// empty [`Instance`] through `build`.
    pub fn host_prefab<F>(&self, address: impl Into<String>, build: F)
    where
        F: Fn(Instance) -> Instance + Send + Sync + 'static,
    {
        self.state.lock().content.insert(
            address.into(),
            Content {
                payload: Payload::Prefab(Arc::new(build)),
                size: 0,
                downloaded: false,
            },
        );
    }

    /// Hosts a prefab and lists it in the main catalog.
    pub fn insert_prefab<F>(&self, address: impl Into<String>, build: F)
    where
        F: Fn(Instance) -> Instance + Send + Sync + 'static,
    {
        let address = address.into();
        self.host_prefab(address.clone(), build);
        self.state.lock().list(&self.catalog_id, address);
    }

    /// Sets how many bytes downloading `address` costs. Returns `false` if
    /// nothing is hosted there.
    pub fn set_download_size(&self, address: &str, bytes: u64) -> bool {
        match self.state.lock().content.get_mut(address) {
            Some(content) => {
                content.size = bytes;
                content.downloaded = false;
                true
            }
            None => false,
        }
    }

    /// Returns `true` once the content of `address` has been downloaded.
    pub fn is_downloaded(&self, address: &str) -> bool {
        self.state
            .lock()
            .content
            .get(address)
            .is_some_and(|content| content.downloaded)
    }

    /// Tags hosted addresses with `label` and lists the label in the main
    /// catalog.
    pub fn label<I, S>(&self, label: impl Into<String>, addresses: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let label = label.into();
        let mut state = self.state.lock();
        let members = state.labels.entry(label.clone()).or_default();
        for address in addresses {
            let address = address.into();
            if !members.contains(&address) {
                members.push(address);
            }
        }
        state.list(&self.catalog_id, label);
    }

    /// Prepares a remote update of `catalog_id` that lists `addresses`.
    /// The update is reported by the next catalog check and applied by
    /// `update_catalogs`.
    pub fn stage_catalog_update<I, S>(&self, catalog_id: impl Into<String>, addresses: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .lock()
            .staged
            .entry(catalog_id.into())
            .or_default()
            .extend(addresses.into_iter().map(Into::into));
    }

    /// Makes `locator` loadable through `load_content_catalog(path)`.
    pub fn publish_remote_catalog(&self, path: impl Into<String>, locator: ResourceLocator) {
        self.state.lock().remote.insert(path.into(), locator);
    }

    /// Makes every subsequent `call` return `fault`, until cleared.
    pub fn inject_fault(&self, call: DeliveryCall, fault: Fault) {
        self.state.lock().faults.insert(call, fault);
    }

    /// Restores normal behavior for `call`.
    pub fn clear_fault(&self, call: DeliveryCall) {
        self.state.lock().faults.remove(&call);
    }

    /// A snapshot of the call statistics.
    pub fn stats(&self) -> DeliveryStats {
        self.state.lock().stats.clone()
    }

    fn fault<T>(&self, call: DeliveryCall) -> Option<Operation<T>> {
        let fault = self.state.lock().faults.get(&call).cloned()?;
        log::debug!("Injected fault on {:?}: {:?}", call, fault);
        Some(fault.into_operation())
    }
}

impl Default for MemoryContentDelivery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentDelivery for MemoryContentDelivery {
    async fn initialize(&self) -> Operation<CatalogHandle> {
        if let Some(fault) = self.fault(DeliveryCall::Initialize) {
            return fault;
        }
        self.state.lock().stats.initializations += 1;
        Operation::Succeeded(CatalogHandle {
            catalog_id: self.catalog_id.clone(),
        })
    }

    async fn check_for_catalog_updates(&self) -> Operation<Vec<String>> {
        if let Some(fault) = self.fault(DeliveryCall::CheckForCatalogUpdates) {
            return fault;
        }
        Operation::Succeeded(self.state.lock().staged.keys().cloned().collect())
    }

    async fn update_catalogs(&self, catalog_ids: &[String]) -> Operation<Vec<ResourceLocator>> {
        if let Some(fault) = self.fault(DeliveryCall::UpdateCatalogs) {
            return fault;
        }
        let mut state = self.state.lock();
        for catalog_id in catalog_ids {
            let Some(addresses) = state.staged.remove(catalog_id) else {
                log::warn!("No update staged for catalog '{}'", catalog_id);
                continue;
            };
            for address in addresses {
                state.list(catalog_id, address);
            }
        }
        Operation::Succeeded(state.catalogs.clone())
    }

    fn resource_locators(&self) -> Vec<ResourceLocator> {
        self.state.lock().catalogs.clone()
    }

    async fn resolve_locations(&self, keys: &[String]) -> Operation<Vec<ResourceLocation>> {
        if let Some(fault) = self.fault(DeliveryCall::ResolveLocations) {
            return fault;
        }
        let state = self.state.lock();
        let mut seen = HashSet::new();
        let locations = keys
            .iter()
            .flat_map(|key| state.addresses_for(key))
            .filter(|address| seen.insert(address.clone()))
            .map(|address| location(&address))
            .collect();
        Operation::Succeeded(locations)
    }

    async fn download_size(&self, target: &DownloadTarget) -> Operation<u64> {
        if let Some(fault) = self.fault(DeliveryCall::DownloadSize) {
            return fault;
        }
        let state = self.state.lock();
        match state.target_addresses(target) {
            Some(addresses) => Operation::Succeeded(state.pending_size(&addresses)),
            None => Operation::failed(format!("Unknown download target {:?}", target)),
        }
    }

    async fn download_dependencies(
        &self,
        target: &DownloadTarget,
        progress: &ProgressSender,
    ) -> Operation<()> {
        if let Some(fault) = self.fault(DeliveryCall::DownloadDependencies) {
            return fault;
        }
        let pending: Vec<String> = {
            let state = self.state.lock();
            let Some(addresses) = state.target_addresses(target) else {
                return Operation::failed(format!("Unknown download target {:?}", target));
            };
            addresses
                .into_iter()
                .filter(|address| {
                    state
                        .content
                        .get(address)
                        .is_some_and(|content| !content.downloaded)
                })
                .collect()
        };

        let total = pending.len();
        for (index, address) in pending.iter().enumerate() {
            if let Some(content) = self.state.lock().content.get_mut(address) {
                content.downloaded = true;
            }
            let _ = progress.send((index + 1) as f32 / total as f32);
            tokio::task::yield_now().await;
        }

        self.state.lock().stats.downloads += 1;
        log::debug!("Downloaded {} entries for {:?}", total, target);
        Operation::Succeeded(())
    }

    async fn load_asset(&self, address: &str) -> Operation<ErasedAsset> {
        if let Some(fault) = self.fault(DeliveryCall::LoadAsset) {
            return fault;
        }
        let mut state = self.state.lock();
        if !state.is_listed(address) {
            return Operation::failed(format!("Invalid key '{}'", address));
        }
        let asset = match state.content.get(address).map(|content| &content.payload) {
            Some(Payload::Asset(asset)) => asset.clone(),
            Some(Payload::Prefab(_)) => {
                return Operation::failed(format!(
                    "'{}' is a prefab and must be instantiated",
                    address
                ));
            }
            None => return Operation::failed(format!("Nothing hosted at '{}'", address)),
        };
        *state.stats.loads.entry(address.to_owned()).or_default() += 1;
        Operation::Succeeded(asset)
    }

    async fn instantiate(&self, address: &str, placement: Placement) -> Operation<Arc<Instance>> {
        if let Some(fault) = self.fault(DeliveryCall::Instantiate) {
            return fault;
        }
        let build = {
            let state = self.state.lock();
            if !state.is_listed(address) {
                return Operation::failed(format!("Invalid key '{}'", address));
            }
            match state.content.get(address).map(|content| &content.payload) {
                Some(Payload::Prefab(build)) => build.clone(),
                Some(Payload::Asset(_)) => {
                    return Operation::failed(format!("'{}' is not instantiable", address))
                }
                None => return Operation::failed(format!("Nothing hosted at '{}'", address)),
            }
        };

        let instance = Arc::new(build(Instance::new(address, placement)));
        let mut state = self.state.lock();
        *state.stats.instantiations.entry(address.to_owned()).or_default() += 1;
        state.stats.live_instances.insert(instance.id());
        Operation::Succeeded(instance)
    }

    fn release(&self, asset: &ErasedAsset) {
        self.state.lock().stats.released_assets.push(asset.key());
    }

    fn release_instance(&self, instance: &Instance) {
        let mut state = self.state.lock();
        if !state.stats.live_instances.remove(&instance.id()) {
            log::warn!("Instance {} is not alive", instance.id());
        }
        state.stats.released_instances.push(instance.id());
    }

    async fn load_content_catalog(&self, path: &str) -> Operation<ResourceLocator> {
        if let Some(fault) = self.fault(DeliveryCall::LoadContentCatalog) {
            return fault;
        }
        let mut state = self.state.lock();
        let Some(locator) = state.remote.get(path).cloned() else {
            return Operation::failed(format!("No catalog published at '{}'", path));
        };
        if !state.catalogs.iter().any(|catalog| catalog.id == locator.id) {
            state.catalogs.push(locator.clone());
        }
        Operation::Succeeded(locator)
    }
}

#[cfg(test)]
mod tests;
