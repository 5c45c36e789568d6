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

//! The cache-aware loader sitting between the asset service and the backend.

use super::catalog::{CatalogState, LoaderState};
use super::download::track_progress;
use parking_lot::RwLock;
use std::{any::type_name, sync::Arc};
use stowage_core::{
    asset::{Asset, AssetHandle, AssetPolicy, ErasedAsset, Instance, Placement},
    delivery::{DownloadSize, DownloadTarget, Operation, ResourceLocation, ResourceLocator},
    AssetError, AssetResult, CacheStrategy, ContentDelivery, DownloadReporter,
};
use tokio::sync::watch;

/// Validates a backend outcome, logging why it cannot be used.
fn check<T>(operation: Operation<T>, name: &str) -> Option<T> {
    match operation.into_result(name) {
        Ok(value) => {
            log::debug!("{} succeeded", name);
            Some(value)
        }
        Err(error) => {
            log::error!("{}", error);
            None
        }
    }
}

fn downcast<T: Asset>(policy: &AssetPolicy, asset: &ErasedAsset) -> AssetResult<AssetHandle<T>> {
    asset
        .downcast::<T>()
        .ok_or_else(|| AssetError::TypeMismatch {
            address: policy.address().to_owned(),
            expected: type_name::<T>(),
            found: asset.type_name(),
        })
}

fn fallback<T: Asset>(
    policy: &AssetPolicy,
    strategy: &dyn CacheStrategy,
) -> AssetResult<Option<AssetHandle<T>>> {
    strategy
        .default_asset()
        .map(|asset| downcast::<T>(policy, &asset))
        .transpose()
}

/// Loads, instantiates and releases remote assets through a
/// [`ContentDelivery`] backend, consulting a [`CacheStrategy`] first.
///
/// The loader also owns the catalog lifecycle: until [`initialize`] or
/// [`update_catalogs`] has run, no address is resolvable and every request
/// yields the strategy's default without reaching the backend.
///
/// Failed backend operations never surface as errors: they are logged and
/// degrade into a neutral value (`None`, `false`, a zero size). Errors are
/// reserved for caller mistakes such as asking for the wrong type.
///
/// [`initialize`]: Self::initialize
/// [`update_catalogs`]: Self::update_catalogs
pub struct AssetLoader {
    delivery: Arc<dyn ContentDelivery>,
    reporter: RwLock<Option<Arc<dyn DownloadReporter>>>,
    catalog: RwLock<CatalogState>,
}

impl AssetLoader {
    /// Creates an uninitialized loader over `delivery`.
    pub fn new(delivery: Arc<dyn ContentDelivery>) -> Self {
        Self {
            delivery,
            reporter: RwLock::new(None),
            catalog: RwLock::new(CatalogState::default()),
        }
    }

    /// Attaches the reporter that receives download progress.
    pub fn with_reporter(self, reporter: Arc<dyn DownloadReporter>) -> Self {
        self.set_reporter(Some(reporter));
        self
    }

    /// Replaces (or removes) the download reporter.
    pub fn set_reporter(&self, reporter: Option<Arc<dyn DownloadReporter>>) {
        *self.reporter.write() = reporter;
    }

    /// The current download reporter, if any.
    pub fn reporter(&self) -> Option<Arc<dyn DownloadReporter>> {
        self.reporter.read().clone()
    }

    /// The backend this loader talks to.
    pub fn delivery(&self) -> &Arc<dyn ContentDelivery> {
        &self.delivery
    }

    /// The current lifecycle state.
    pub fn state(&self) -> LoaderState {
        self.catalog.read().state
    }

    /// Returns `true` if some known catalog can resolve `address`.
    pub fn is_resolvable(&self, address: &str) -> bool {
        self.catalog.read().is_resolvable(address)
    }

    /// The locators adopted by the last catalog update.
    pub fn resource_locators(&self) -> Vec<ResourceLocator> {
        self.catalog.read().locators()
    }

    fn set_state(&self, state: LoaderState) {
        self.catalog.write().state = state;
    }

    // --- Catalog lifecycle ---

    /// Starts the backend, then brings the catalogs up to date.
    ///
    /// Returns `true` once the loader is [`LoaderState::Ready`]. On backend
    /// failure the loader goes back to [`LoaderState::Uninitialized`].
    pub async fn initialize(&self) -> bool {
        self.set_state(LoaderState::Initializing);
        log::info!("Initializing content delivery...");

        let Some(handle) = check(self.delivery.initialize().await, "Initialization") else {
            self.set_state(LoaderState::Uninitialized);
            return false;
        };

        log::info!("Content delivery initialized from catalog '{}'", handle.catalog_id);
        self.set_state(LoaderState::CatalogSynced);
        self.update_catalogs().await
    }

    /// Checks for catalog updates, applies them if any, and rebuilds the set
    /// of resolvable addresses.
    ///
    /// Calling this before [`initialize`](Self::initialize) is allowed: a
    /// warning is logged and the backend is assumed to be started already.
    pub async fn update_catalogs(&self) -> bool {
        if self.state() == LoaderState::Uninitialized {
            log::warn!("Updating catalogs of an uninitialized loader, skipping backend start");
        }
        let Some(catalog_ids) = check(
            self.delivery.check_for_catalog_updates().await,
            "Check for catalog updates",
        ) else {
            return false;
        };

        let locators = if catalog_ids.is_empty() {
            log::info!("Catalogs are up to date");
            self.delivery.resource_locators()
        } else {
            log::info!("Updating {} catalog(s): {:?}", catalog_ids.len(), catalog_ids);
            match check(
                self.delivery.update_catalogs(&catalog_ids).await,
                "Update catalogs",
            ) {
                Some(locators) => locators,
                None => return false,
            }
        };

        let mut catalog = self.catalog.write();
        catalog.adopt(locators);
        catalog.state = LoaderState::Ready;
        log::info!(
            "Asset loader ready with {} resolvable key(s)",
            catalog.address_count()
        );
        true
    }

    async fn resolve(&self, keys: &[String], name: &str) -> Option<Vec<ResourceLocation>> {
        if keys.is_empty() {
            return Some(Vec::new());
        }
        check(self.delivery.resolve_locations(keys).await, name)
    }

    async fn download(&self, target: DownloadTarget, name: &str) -> bool {
        let (sender, receiver) = watch::channel(0.0_f32);
        let reporter = self.reporter();
        let outcome = track_progress(
            self.delivery.download_dependencies(&target, &sender),
            receiver,
            reporter.as_deref(),
        )
        .await;
        check(outcome, name).is_some()
    }

    async fn size_of(&self, target: DownloadTarget, name: &str) -> Option<DownloadSize> {
        if matches!(&target, DownloadTarget::Locations(locations) if locations.is_empty()) {
            return Some(DownloadSize::ZERO);
        }
        check(self.delivery.download_size(&target).await, name).map(DownloadSize::from_bytes)
    }

    /// Downloads the content of every known key that is out of date.
    ///
    /// Catalogs are updated first if none are known yet.
    pub async fn update_content(&self) -> bool {
        let has_locators = self.catalog.read().has_locators();
        if !has_locators && !self.update_catalogs().await {
            return false;
        }

        let keys = self.catalog.read().keys();
        let Some(locations) = self.resolve(&keys, "Resolve content locations").await else {
            return false;
        };
        if locations.is_empty() {
            log::info!("No content to update");
            return true;
        }

        log::info!("Updating content for {} location(s)", locations.len());
        self.download(DownloadTarget::Locations(locations), "Content update")
            .await
    }

    /// Downloads the content tagged with each label, in order. Stops at the
    /// first label that fails.
    pub async fn update_content_for_labels<I, S>(&self, labels: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for label in labels {
            let label = label.into();
            log::info!("Updating content for label '{}'", label);
            let name = format!("Content update for label '{}'", label);
            if !self.download(DownloadTarget::Label(label), &name).await {
                return false;
            }
        }
        true
    }

    /// How much content still has to be downloaded for every known key.
    pub async fn content_download_size(&self) -> DownloadSize {
        let keys = self.catalog.read().keys();
        let Some(locations) = self.resolve(&keys, "Resolve content locations").await else {
            return DownloadSize::ZERO;
        };
        let size = self
            .size_of(DownloadTarget::Locations(locations), "Content download size")
            .await
            .unwrap_or(DownloadSize::ZERO);
        log::info!("Content download size: {}", size);
        size
    }

    /// How much content still has to be downloaded for the given labels.
    ///
    /// Any failing query makes the whole result zero.
    pub async fn download_size_for_labels<I, S>(&self, labels: I) -> DownloadSize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut total = DownloadSize::ZERO;
        for label in labels {
            let label = label.into();
            let name = format!("Download size for label '{}'", label);
            let Some(size) = self.size_of(DownloadTarget::Label(label.clone()), &name).await
            else {
                return DownloadSize::ZERO;
            };
            log::info!("Download size for label '{}': {}", label, size);
            total = total + size;
        }
        total
    }

    /// Loads an additional catalog. The loader's own catalog state is left
    /// untouched.
    pub async fn load_content_catalog(&self, path: &str) -> Option<ResourceLocator> {
        if path.is_empty() {
            log::error!("Cannot load a content catalog from an empty path");
            return None;
        }
        let name = format!("Load content catalog '{}'", path);
        check(self.delivery.load_content_catalog(path).await, &name)
    }

    /// How much content of an external catalog still has to be downloaded.
    pub async fn catalog_download_size(&self, locator: &ResourceLocator) -> DownloadSize {
        let Some(locations) = self
            .resolve(&locator.keys, "Resolve catalog locations")
            .await
        else {
            return DownloadSize::ZERO;
        };
        let name = format!("Download size of catalog '{}'", locator.id);
        self.size_of(DownloadTarget::Locations(locations), &name)
            .await
            .unwrap_or(DownloadSize::ZERO)
    }

    /// Downloads the content of an external catalog.
    pub async fn download_catalog_dependencies(&self, locator: &ResourceLocator) -> bool {
        let Some(locations) = self
            .resolve(&locator.keys, "Resolve catalog locations")
            .await
        else {
            return false;
        };
        if locations.is_empty() {
            return true;
        }
        let name = format!("Download of catalog '{}'", locator.id);
        self.download(DownloadTarget::Locations(locations), &name)
            .await
    }

    // --- Assets ---

    /// Returns the asset behind `policy`: from `strategy` if cached,
    /// otherwise from the backend, caching the result.
    ///
    /// Unresolvable addresses and backend failures yield
    /// `strategy.default_asset()`, which is never cached.
    pub async fn load<T: Asset>(
        &self,
        policy: &AssetPolicy,
        strategy: &dyn CacheStrategy,
    ) -> AssetResult<Option<AssetHandle<T>>> {
        if let Some(cached) = strategy.get(policy) {
            log::debug!("Cache hit for '{}'", policy);
            return downcast::<T>(policy, &cached).map(Some);
        }
        if !self.is_resolvable(policy.address()) {
            log::debug!("'{}' is not in any catalog, using the strategy default", policy);
            return fallback(policy, strategy);
        }

        let name = format!("Load '{}'", policy);
        let Some(asset) = check(self.delivery.load_asset(policy.address()).await, &name) else {
            return fallback(policy, strategy);
        };

        let handle = match downcast::<T>(policy, &asset) {
            Ok(handle) => handle,
            Err(error) => {
                self.delivery.release(&asset);
                return Err(error);
            }
        };
        Ok(Some(self.keep(policy, strategy, handle, asset)))
    }

    /// Blocking variant of [`load`](Self::load). Must not be called from
    /// inside an async task.
    pub fn load_blocking<T: Asset>(
        &self,
        policy: &AssetPolicy,
        strategy: &dyn CacheStrategy,
    ) -> AssetResult<Option<AssetHandle<T>>> {
        pollster::block_on(self.load(policy, strategy))
    }

    /// Creates an instance of the resource behind `policy` at `placement`.
    ///
    /// Follows the same cache and fallback rules as [`load`](Self::load).
    pub async fn instantiate(
        &self,
        policy: &AssetPolicy,
        strategy: &dyn CacheStrategy,
        placement: Placement,
    ) -> AssetResult<Option<AssetHandle<Instance>>> {
        if let Some(cached) = strategy.get(policy) {
            log::debug!("Cache hit for instance '{}'", policy);
            return downcast::<Instance>(policy, &cached).map(Some);
        }
        if !self.is_resolvable(policy.address()) {
            log::debug!("'{}' is not in any catalog, using the strategy default", policy);
            return fallback(policy, strategy);
        }

        let name = format!("Instantiate '{}'", policy);
        let Some(instance) = check(
            self.delivery.instantiate(policy.address(), placement).await,
            &name,
        ) else {
            return fallback(policy, strategy);
        };

        let handle = AssetHandle::from_arc(instance);
        let erased = handle.erase();
        Ok(Some(self.keep(policy, strategy, handle, erased)))
    }

    /// Blocking variant of [`instantiate`](Self::instantiate).
    pub fn instantiate_blocking(
        &self,
        policy: &AssetPolicy,
        strategy: &dyn CacheStrategy,
        placement: Placement,
    ) -> AssetResult<Option<AssetHandle<Instance>>> {
        pollster::block_on(self.instantiate(policy, strategy, placement))
    }

    /// Offers a freshly fetched asset to the strategy. If a concurrent load
    /// already cached another value, that value wins and ours is released.
    fn keep<T: Asset>(
        &self,
        policy: &AssetPolicy,
        strategy: &dyn CacheStrategy,
        handle: AssetHandle<T>,
        asset: ErasedAsset,
    ) -> AssetHandle<T> {
        strategy.add(policy, asset.clone());
        match strategy.get(policy) {
            Some(winner) if winner != asset => match winner.downcast::<T>() {
                Some(cached) => {
                    log::debug!("'{}' was cached concurrently, using the cached value", policy);
                    self.release(&asset);
                    cached
                }
                None => handle,
            },
            _ => handle,
        }
    }

    /// Returns an asset to the backend.
    ///
    /// Instances, and components extracted from an instance, release the
    /// whole instance.
    pub fn release(&self, asset: &ErasedAsset) {
        match asset.releasable_instance() {
            Some(instance) => {
                log::debug!("Releasing instance {} of '{}'", instance.id(), instance.address());
                self.delivery.release_instance(&instance);
            }
            None => {
                log::debug!("Releasing {:?}", asset);
                self.delivery.release(asset);
            }
        }
    }
}
