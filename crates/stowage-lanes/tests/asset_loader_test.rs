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

use anyhow::Result;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use stowage_core::{
    asset::{Asset, AssetHandle, AssetPolicy, ErasedAsset, Placement, Vec3},
    delivery::ResourceLocator,
    reporter::AssetDownloadReporter,
    AssetError, CacheStrategy, DownloadReporter,
};
use stowage_data::{DynamicCache, NoCache};
use stowage_infra::delivery::{DeliveryCall, Fault, MemoryContentDelivery};
use stowage_lanes::asset_lane::{AssetLoader, LoaderState};

#[derive(Debug, PartialEq)]
struct Sprite(&'static str);
impl Asset for Sprite {}

#[derive(Debug, PartialEq)]
struct Health(u32);
impl Asset for Health {}

/// A strategy handing out a placeholder for missing content.
struct Placeholder {
    sentinel: ErasedAsset,
    inner: DynamicCache,
}

impl CacheStrategy for Placeholder {
    fn get(&self, policy: &AssetPolicy) -> Option<ErasedAsset> {
        self.inner.get(policy)
    }
    fn add(&self, policy: &AssetPolicy, asset: ErasedAsset) {
        self.inner.add(policy, asset)
    }
    fn clear(&self) {
        self.inner.clear()
    }
    fn default_asset(&self) -> Option<ErasedAsset> {
        Some(self.sentinel.clone())
    }
    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// A strategy that misses once, as if another load were still in flight,
/// then serves the value that load cached.
struct Contended {
    missed: AtomicBool,
    inner: DynamicCache,
}

impl Contended {
    fn seeded(policy: &AssetPolicy, winner: ErasedAsset) -> Self {
        let inner = DynamicCache::new();
        inner.add(policy, winner);
        Self {
            missed: AtomicBool::new(false),
            inner,
        }
    }
}

impl CacheStrategy for Contended {
    fn get(&self, policy: &AssetPolicy) -> Option<ErasedAsset> {
        if !self.missed.swap(true, Ordering::SeqCst) {
            return None;
        }
        self.inner.get(policy)
    }
    fn add(&self, policy: &AssetPolicy, asset: ErasedAsset) {
        self.inner.add(policy, asset)
    }
    fn clear(&self) {
        self.inner.clear()
    }
    fn len(&self) -> usize {
        self.inner.len()
    }
}

fn setup() -> (Arc<MemoryContentDelivery>, AssetLoader) {
    let delivery = Arc::new(MemoryContentDelivery::new());
    let loader = AssetLoader::new(delivery.clone());
    (delivery, loader)
}

#[tokio::test]
async fn initialize_reaches_ready() {
    // --- ARRANGE ---
    let (delivery, loader) = setup();
    delivery.insert_asset("ui/icon", Sprite("icon"));
    assert_eq!(loader.state(), LoaderState::Uninitialized);

    // --- ACT ---
    let ready = loader.initialize().await;

    // --- ASSERT ---
    assert!(ready);
    assert_eq!(loader.state(), LoaderState::Ready);
    assert!(loader.is_resolvable("ui/icon"));
    assert!(!loader.is_resolvable("hero/prefab"));
    assert_eq!(delivery.stats().initializations, 1);
}

#[tokio::test]
async fn failed_initialization_returns_to_uninitialized() {
    let (delivery, loader) = setup();
    delivery.inject_fault(DeliveryCall::Initialize, Fault::Failed("no network".into()));

    assert!(!loader.initialize().await);
    assert_eq!(loader.state(), LoaderState::Uninitialized);

    delivery.clear_fault(DeliveryCall::Initialize);
    delivery.inject_fault(DeliveryCall::Initialize, Fault::Invalid);
    assert!(!loader.initialize().await);
    assert_eq!(loader.state(), LoaderState::Uninitialized);
}

#[tokio::test]
async fn nothing_reaches_the_backend_before_initialization() -> Result<()> {
    let (delivery, loader) = setup();
    delivery.insert_asset("ui/icon", Sprite("icon"));
    let cache = DynamicCache::new();

    let loaded = loader.load::<Sprite>(&AssetPolicy::new("ui/icon"), &cache).await?;

    assert!(loaded.is_none());
    assert_eq!(delivery.stats().load_count("ui/icon"), 0);
    Ok(())
}

#[tokio::test]
async fn second_load_is_served_from_cache() -> Result<()> {
    // --- ARRANGE ---
    let (delivery, loader) = setup();
    let icon = delivery.insert_asset("ui/icon", Sprite("icon"));
    loader.initialize().await;
    let cache = DynamicCache::new();
    let policy = AssetPolicy::new("ui/icon");

    // --- ACT ---
    let first = loader.load::<Sprite>(&policy, &cache).await?;
    let second = loader.load::<Sprite>(&policy, &cache).await?;

    // --- ASSERT ---
    let first = first.expect("first load");
    let second = second.expect("second load");
    assert!(first.ptr_eq(&icon));
    assert!(second.ptr_eq(&icon));
    assert_eq!(cache.get(&policy), Some(icon.erase()));
    assert_eq!(delivery.stats().load_count("ui/icon"), 1);
    Ok(())
}

#[tokio::test]
async fn no_cache_fetches_every_time() -> Result<()> {
    let (delivery, loader) = setup();
    delivery.insert_asset("ui/icon", Sprite("icon"));
    loader.initialize().await;
    let policy = AssetPolicy::new("ui/icon");

    loader.load::<Sprite>(&policy, &NoCache).await?;
    loader.load::<Sprite>(&policy, &NoCache).await?;

    assert_eq!(delivery.stats().load_count("ui/icon"), 2);
    Ok(())
}

#[tokio::test]
async fn absent_address_yields_default_and_is_not_cached() -> Result<()> {
    let (delivery, loader) = setup();
    loader.initialize().await;
    let cache = DynamicCache::new();
    let policy = AssetPolicy::new("hero/prefab");

    let loaded = loader.load::<Sprite>(&policy, &cache).await?;

    assert!(loaded.is_none());
    assert!(cache.get(&policy).is_none());
    assert_eq!(delivery.stats().load_count("hero/prefab"), 0);
    Ok(())
}

#[tokio::test]
async fn backend_failure_falls_back_without_caching() -> Result<()> {
    let (delivery, loader) = setup();
    delivery.insert_asset("ui/icon", Sprite("icon"));
    loader.initialize().await;
    let strategy = Placeholder {
        sentinel: ErasedAsset::new(Sprite("missing")),
        inner: DynamicCache::new(),
    };
    let policy = AssetPolicy::new("ui/icon");
    delivery.inject_fault(DeliveryCall::LoadAsset, Fault::Failed("timeout".into()));

    let loaded = loader.load::<Sprite>(&policy, &strategy).await?;

    assert_eq!(loaded.as_deref(), Some(&Sprite("missing")));
    assert!(strategy.is_empty());

    // No negative caching: the next attempt goes to the backend again.
    delivery.clear_fault(DeliveryCall::LoadAsset);
    let loaded = loader.load::<Sprite>(&policy, &strategy).await?;
    assert_eq!(loaded.as_deref(), Some(&Sprite("icon")));
    assert_eq!(strategy.len(), 1);
    Ok(())
}

#[tokio::test]
async fn wrong_type_is_reported_and_released() {
    let (delivery, loader) = setup();
    let icon = delivery.insert_asset("ui/icon", Sprite("icon"));
    loader.initialize().await;
    let cache = DynamicCache::new();

    let outcome = loader.load::<Health>(&AssetPolicy::new("ui/icon"), &cache).await;

    assert!(matches!(outcome, Err(AssetError::TypeMismatch { .. })));
    assert!(cache.is_empty());
    assert_eq!(delivery.stats().release_count_of(icon.key()), 1);
}

#[tokio::test]
async fn instantiated_components_release_their_instance() -> Result<()> {
    // --- ARRANGE ---
    let (delivery, loader) = setup();
    delivery.insert_prefab("hero", |instance| instance.with_component(Health(100)));
    loader.initialize().await;
    let placement = Placement::at(Vec3::new(0.0, 1.0, 0.0));

    // --- ACT ---
    let instance = loader
        .instantiate(&AssetPolicy::new("hero"), &NoCache, placement)
        .await?
        .expect("instance");
    let health = instance.component::<Health>().expect("health component");
    loader.release(&health.erase());

    // --- ASSERT ---
    assert_eq!(*health, Health(100));
    assert_eq!(instance.placement(), placement);
    let stats = delivery.stats();
    assert_eq!(stats.released_instances, vec![instance.id()]);
    assert!(stats.released_assets.is_empty());
    assert!(stats.live_instances.is_empty());
    Ok(())
}

#[test]
fn blocking_variants_work_outside_a_runtime() -> Result<()> {
    let (delivery, loader) = setup();
    delivery.insert_asset("ui/icon", Sprite("icon"));
    delivery.insert_prefab("hero", |instance| instance);
    assert!(pollster::block_on(loader.initialize()));

    let icon = loader.load_blocking::<Sprite>(&AssetPolicy::new("ui/icon"), &NoCache)?;
    let hero =
        loader.instantiate_blocking(&AssetPolicy::new("hero"), &NoCache, Placement::default())?;

    assert_eq!(icon.as_deref(), Some(&Sprite("icon")));
    assert_eq!(hero.map(|hero| hero.address().to_owned()).as_deref(), Some("hero"));
    Ok(())
}

#[tokio::test]
async fn catalog_update_makes_staged_content_resolvable() -> Result<()> {
    let (delivery, loader) = setup();
    loader.initialize().await;
    delivery.host_asset("dlc/map", Sprite("map"));
    delivery.stage_catalog_update("dlc", ["dlc/map"]);
    let policy = AssetPolicy::new("dlc/map");

    assert!(loader.load::<Sprite>(&policy, &NoCache).await?.is_none());
    assert!(loader.update_catalogs().await);

    assert!(loader.is_resolvable("dlc/map"));
    assert!(loader.load::<Sprite>(&policy, &NoCache).await?.is_some());
    assert!(loader.resource_locators().iter().any(|l| l.id == "dlc"));
    Ok(())
}

#[tokio::test]
async fn update_content_reports_progress_and_resets() {
    // --- ARRANGE ---
    let (delivery, loader) = setup();
    for (address, bytes) in [("a", 1024_u64), ("b", 2048), ("c", 4096)] {
        delivery.insert_asset(address, Sprite("x"));
        delivery.set_download_size(address, bytes);
    }
    let reporter = Arc::new(AssetDownloadReporter::new());
    let updates = reporter.subscribe();
    let loader = loader.with_reporter(reporter.clone());

    // --- ACT ---
    let size_before = loader.content_download_size().await;
    let updated = loader.update_content().await;

    // --- ASSERT ---
    assert_eq!(size_before.bytes(), 0, "nothing is known before catalogs are synced");
    assert!(updated);
    assert_eq!(loader.state(), LoaderState::Ready);
    let seen: Vec<f32> = updates.drain().collect();
    assert!(!seen.is_empty());
    assert!(seen.iter().all(|value| (0.0..=1.0).contains(value)));
    assert_eq!(seen.last(), Some(&1.0));
    assert_eq!(reporter.progress(), 0.0);
    assert!(delivery.is_downloaded("a") && delivery.is_downloaded("c"));
    assert!(loader.content_download_size().await.is_zero());
}

#[tokio::test]
async fn size_queries_return_zero_on_failure() {
    let (delivery, loader) = setup();
    delivery.insert_asset("a", Sprite("a"));
    delivery.set_download_size("a", 3 * 1024 * 1024);
    delivery.label("level", ["a"]);
    loader.initialize().await;

    let size = loader.content_download_size().await;
    assert_eq!(size.megabytes(), 3.0);
    assert_eq!(loader.download_size_for_labels(["level"]).await.bytes(), 3 * 1024 * 1024);

    assert!(loader.download_size_for_labels(["level", "unknown"]).await.is_zero());

    delivery.inject_fault(DeliveryCall::DownloadSize, Fault::Invalid);
    assert!(loader.content_download_size().await.is_zero());
    assert!(loader.download_size_for_labels(["level"]).await.is_zero());

    delivery.clear_fault(DeliveryCall::DownloadSize);
    delivery.inject_fault(DeliveryCall::ResolveLocations, Fault::Failed("offline".into()));
    assert!(loader.content_download_size().await.is_zero());
}

#[tokio::test]
async fn label_updates_stop_at_first_failure() {
    let (delivery, loader) = setup();
    delivery.insert_asset("a", Sprite("a"));
    delivery.insert_asset("b", Sprite("b"));
    delivery.label("first", ["a"]);
    delivery.label("last", ["b"]);
    loader.initialize().await;

    let updated = loader
        .update_content_for_labels(["first", "missing", "last"])
        .await;

    assert!(!updated);
    assert!(delivery.is_downloaded("a"));
    assert!(!delivery.is_downloaded("b"));
    assert_eq!(delivery.stats().downloads, 1);
}

#[tokio::test]
async fn external_catalogs_are_independent_of_loader_state() {
    let (delivery, loader) = setup();
    delivery.host_asset("remote/skin", Sprite("skin"));
    delivery.set_download_size("remote/skin", 512);
    delivery.publish_remote_catalog(
        "cdn/skins.json",
        ResourceLocator::new("skins", ["remote/skin"]),
    );

    assert!(loader.load_content_catalog("").await.is_none());
    let locator = loader
        .load_content_catalog("cdn/skins.json")
        .await
        .expect("remote catalog");

    assert_eq!(loader.state(), LoaderState::Uninitialized);
    assert_eq!(loader.catalog_download_size(&locator).await.bytes(), 512);
    assert!(loader.download_catalog_dependencies(&locator).await);
    assert!(delivery.is_downloaded("remote/skin"));
    assert!(!loader.is_resolvable("remote/skin"));
}

#[tokio::test]
async fn concurrently_cached_value_wins_and_duplicate_is_released() -> Result<()> {
    // --- ARRANGE ---
    let (delivery, loader) = setup();
    let fetched = delivery.insert_asset("ui/icon", Sprite("fetched"));
    assert!(loader.initialize().await);
    let policy = AssetPolicy::new("ui/icon");
    let winner = AssetHandle::new(Sprite("winner"));
    let strategy = Contended::seeded(&policy, winner.erase());

    // --- ACT ---
    let loaded = loader.load::<Sprite>(&policy, &strategy).await?.expect("sprite");

    // --- ASSERT ---
    assert!(loaded.ptr_eq(&winner));
    assert_eq!(*loaded, Sprite("winner"));
    let stats = delivery.stats();
    assert_eq!(stats.load_count("ui/icon"), 1);
    assert_eq!(stats.released_assets, vec![fetched.key()]);
    assert_eq!(stats.release_count_of(winner.key()), 0);
    assert_eq!(strategy.len(), 1);
    Ok(())
}

#[tokio::test]
async fn update_catalogs_without_initialize_still_becomes_ready() {
    let (delivery, loader) = setup();
    delivery.insert_asset("ui/icon", Sprite("icon"));

    assert!(loader.update_catalogs().await);

    assert_eq!(loader.state(), LoaderState::Ready);
    assert!(loader.is_resolvable("ui/icon"));
    assert_eq!(delivery.stats().initializations, 0);
}
