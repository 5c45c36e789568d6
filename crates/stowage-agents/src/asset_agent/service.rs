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

//! The asset management service.

use super::config::AssetServiceConfig;
use super::registry::ContextRegistry;
use parking_lot::RwLock;
use std::{any::type_name, collections::HashMap, collections::HashSet, sync::Arc};
use stowage_core::{
    asset::{
        Asset, AssetHandle, AssetKey, AssetPolicy, ErasedAsset, InstanceId, Placement, PolicyId,
    },
    AssetError, AssetResult, CacheStrategy, ContentDelivery, ContextKind, DownloadReporter,
};
use stowage_data::AssetContext;
use stowage_lanes::asset_lane::AssetLoader;

/// The entry point for requesting and releasing remote assets.
///
/// Every request names a policy (what to fetch) and a context kind (who asked).
/// The service picks the cache strategy bound to the policy, falls back to one
/// of its two defaults otherwise, lets the [`AssetLoader`] do the fetching,
/// and records the result in the caller's context.
///
/// All methods take `&self`; internal state sits behind locks that are never
/// held across an `.await`.
pub struct AssetManagementService {
    loader: AssetLoader,
    config: AssetServiceConfig,
    asset_strategy: Arc<dyn CacheStrategy>,
    instance_strategy: Arc<dyn CacheStrategy>,
    strategies: RwLock<HashMap<PolicyId, Arc<dyn CacheStrategy>>>,
    contexts: RwLock<ContextRegistry>,
}

impl AssetManagementService {
    /// Creates a service over `delivery` with the default configuration.
    pub fn new(delivery: Arc<dyn ContentDelivery>) -> Self {
        Self::from_config(delivery, AssetServiceConfig::default())
    }

    /// Creates a service over `delivery` configured by `config`.
    pub fn from_config(delivery: Arc<dyn ContentDelivery>, config: AssetServiceConfig) -> Self {
        log::info!(
            "Creating asset service (assets: {:?}, instances: {:?}, auto contexts: {})",
            config.asset_strategy,
            config.instance_strategy,
            config.auto_register_contexts
        );
        Self {
            loader: AssetLoader::new(delivery),
            asset_strategy: config.asset_strategy.build(),
            instance_strategy: config.instance_strategy.build(),
            config,
            strategies: RwLock::new(HashMap::new()),
            contexts: RwLock::new(ContextRegistry::default()),
        }
    }

    /// Replaces both default strategies with custom ones.
    pub fn with_default_strategies(
        mut self,
        asset_strategy: Arc<dyn CacheStrategy>,
        instance_strategy: Arc<dyn CacheStrategy>,
    ) -> Self {
        self.asset_strategy = asset_strategy;
        self.instance_strategy = instance_strategy;
        self
    }

    /// Attaches the reporter that receives content download progress.
    pub fn with_reporter(self, reporter: Arc<dyn DownloadReporter>) -> Self {
        self.loader.set_reporter(Some(reporter));
        self
    }

    /// The loader, for catalog lifecycle and content download calls.
    pub fn loader(&self) -> &AssetLoader {
        &self.loader
    }

    /// The configuration this service was built with.
    pub fn config(&self) -> &AssetServiceConfig {
        &self.config
    }

    // --- Strategies ---

    /// Binds `strategy` to `policy`.
    ///
    /// Returns `false` and keeps the existing binding if one is already
    /// registered for the same policy id.
    pub fn register_strategy(
        &self,
        policy: &AssetPolicy,
        strategy: Arc<dyn CacheStrategy>,
    ) -> bool {
        let mut strategies = self.strategies.write();
        if strategies.contains_key(&policy.id()) {
            log::warn!("A cache strategy is already registered for '{}'", policy);
            return false;
        }
        strategies.insert(policy.id(), strategy);
        log::info!("Registered cache strategy for '{}'", policy);
        true
    }

    /// The strategy used when loading `policy`.
    pub fn asset_strategy_for(&self, policy: &AssetPolicy) -> Arc<dyn CacheStrategy> {
        self.bound_strategy(policy)
            .unwrap_or_else(|| self.asset_strategy.clone())
    }

    /// The strategy used when instantiating `policy`.
    pub fn instance_strategy_for(&self, policy: &AssetPolicy) -> Arc<dyn CacheStrategy> {
        self.bound_strategy(policy)
            .unwrap_or_else(|| self.instance_strategy.clone())
    }

    fn bound_strategy(&self, policy: &AssetPolicy) -> Option<Arc<dyn CacheStrategy>> {
        self.strategies.read().get(&policy.id()).cloned()
    }

    /// Clears both default strategies and every bound strategy. Assets already
    /// handed out are left alone.
    pub fn clear_cache(&self) {
        self.asset_strategy.clear();
        self.instance_strategy.clear();
        let strategies = self.strategies.read();
        for strategy in strategies.values() {
            strategy.clear();
        }
        log::info!("Cleared default and {} bound cache strategies", strategies.len());
    }

    // --- Contexts ---

    /// Registers the context `C`. Registering twice only logs a warning.
    pub fn register_context<C: ContextKind>(&self) {
        let mut contexts = self.contexts.write();
        if contexts.register::<C>() {
            log::info!(
                "Registered asset context '{}' ({} in total)",
                C::name(),
                contexts.len()
            );
        } else {
            log::warn!("Asset context '{}' is already registered", C::name());
        }
    }

    /// Returns `true` if `C` is registered.
    pub fn has_context<C: ContextKind>(&self) -> bool {
        self.contexts.read().contains::<C>()
    }

    /// Runs `f` on the context `C`, if registered.
    pub fn with_context<C: ContextKind, R>(&self, f: impl FnOnce(&AssetContext) -> R) -> Option<R> {
        self.contexts.read().get::<C>().map(f)
    }

    /// Makes sure `C` exists before anything is fetched on its behalf.
    fn ensure_context<C: ContextKind>(&self) -> AssetResult<()> {
        if self.has_context::<C>() {
            return Ok(());
        }
        if !self.config.auto_register_contexts {
            log::error!("Asset context '{}' is not registered", C::name());
            return Err(AssetError::ContextNotRegistered { context: C::name() });
        }
        if self.contexts.write().register::<C>() {
            log::info!("Registered asset context '{}' on first use", C::name());
        }
        Ok(())
    }

    fn remember<C: ContextKind>(&self, asset: ErasedAsset) {
        if let Some(context) = self.contexts.write().get_mut::<C>() {
            context.register_asset(asset);
        }
    }

    // --- Loading ---

    /// Loads the asset behind `policy` on behalf of context `C`.
    ///
    /// Resolves to `Ok(None)` when the asset does not exist or the backend
    /// failed, unless the strategy supplies a default.
    pub async fn load<T: Asset, C: ContextKind>(
        &self,
        policy: &AssetPolicy,
    ) -> AssetResult<Option<AssetHandle<T>>> {
        self.ensure_context::<C>()?;
        let strategy = self.asset_strategy_for(policy);

        let loaded = self.loader.load::<T>(policy, strategy.as_ref()).await?;
        if let Some(handle) = &loaded {
            self.remember::<C>(handle.erase());
        }
        Ok(loaded)
    }

    /// Blocking variant of [`load`](Self::load). Must not be called from
    /// inside an async task.
    pub fn load_blocking<T: Asset, C: ContextKind>(
        &self,
        policy: &AssetPolicy,
    ) -> AssetResult<Option<AssetHandle<T>>> {
        pollster::block_on(self.load::<T, C>(policy))
    }

    /// Instantiates the resource behind `policy` and returns its `T`
    /// component, registered in context `C`.
    ///
    /// Requesting [`Instance`](stowage_core::asset::Instance) returns the
    /// instance itself. An instance lacking a `T` component is released and
    /// yields `Ok(None)`.
    pub async fn instantiate<T: Asset, C: ContextKind>(
        &self,
        policy: &AssetPolicy,
        placement: Placement,
    ) -> AssetResult<Option<AssetHandle<T>>> {
        self.ensure_context::<C>()?;
        let strategy = self.instance_strategy_for(policy);

        let Some(instance) = self
            .loader
            .instantiate(policy, strategy.as_ref(), placement)
            .await?
        else {
            return Ok(None);
        };

        let Some(component) = instance.component::<T>() else {
            log::warn!(
                "Instance of '{}' has no {} component",
                policy,
                type_name::<T>()
            );
            let erased = instance.erase();
            if strategy.get(policy).as_ref() != Some(&erased) {
                self.loader.release(&erased);
            }
            return Ok(None);
        };

        self.remember::<C>(component.erase());
        Ok(Some(component))
    }

    /// Blocking variant of [`instantiate`](Self::instantiate).
    pub fn instantiate_blocking<T: Asset, C: ContextKind>(
        &self,
        policy: &AssetPolicy,
        placement: Placement,
    ) -> AssetResult<Option<AssetHandle<T>>> {
        pollster::block_on(self.instantiate::<T, C>(policy, placement))
    }

    // --- Releasing ---

    /// Releases an asset obtained from this service.
    ///
    /// The asset leaves the first context holding it, then goes back to the
    /// backend. Passing `None` only logs a warning.
    ///
    /// Releasing does not evict the cache strategy: a cached asset keeps being
    /// served by [`load`](Self::load) until [`clear_cache`](Self::clear_cache)
    /// runs.
    pub fn release<'a, T: Asset>(&self, asset: impl Into<Option<&'a AssetHandle<T>>>) {
        match asset.into() {
            Some(handle) => self.release_erased(&handle.erase()),
            None => log::warn!("Ignoring release of a missing {}", type_name::<T>()),
        }
    }

    /// Type-erased variant of [`release`](Self::release).
    pub fn release_erased(&self, asset: &ErasedAsset) {
        match self.contexts.write().unregister_first(asset) {
            Some(context) => log::debug!("Removed {:?} from context '{}'", asset, context),
            None => log::debug!("{:?} was not held by any context", asset),
        }
        self.loader.release(asset);
    }

    /// Releases every asset held by context `C`, then empties it.
    pub fn release_context_assets<C: ContextKind>(&self) {
        let drained = self
            .contexts
            .write()
            .get_mut::<C>()
            .map(AssetContext::drain);
        match drained {
            Some(assets) => {
                log::info!("Releasing {} asset(s) of context '{}'", assets.len(), C::name());
                self.release_batch(&assets);
            }
            None => log::warn!("Asset context '{}' is not registered", C::name()),
        }
    }

    /// Releases and empties every registered context.
    ///
    /// An asset shared by several contexts goes back to the backend once.
    pub fn release_all_context_assets(&self) {
        let drained = self.contexts.write().drain_all();
        for (name, assets) in &drained {
            log::info!("Releasing {} asset(s) of context '{}'", assets.len(), name);
        }
        self.release_batch(drained.iter().flat_map(|(_, assets)| assets));
    }

    /// Releases each distinct asset once. Components of the same instance
    /// release that instance a single time.
    fn release_batch<'a>(&self, assets: impl IntoIterator<Item = &'a ErasedAsset>) {
        let mut released = HashSet::new();
        for asset in assets {
            let target = match asset.releasable_instance() {
                Some(instance) => ReleaseTarget::Instance(instance.id()),
                None => ReleaseTarget::Asset(asset.key()),
            };
            if released.insert(target) {
                self.loader.release(asset);
            }
        }
    }
}

/// What a single backend release returns: an instantiated object or a plain
/// asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ReleaseTarget {
    Instance(InstanceId),
    Asset(AssetKey),
}
