use anyhow::{Context, Result};
use std::{path::PathBuf, sync::Arc};
use stowage_agents::{AssetManagementService, AssetServiceConfig};
use stowage_core::{
    asset::{Asset, AssetPolicy, Placement, Vec3},
    delivery::ResourceLocator,
    reporter::AssetDownloadReporter,
    ContextKind,
};
use stowage_infra::MemoryContentDelivery;

#[derive(Debug)]
struct Texture {
    width: u32,
    height: u32,
}
impl Asset for Texture {}

#[derive(Debug)]
struct Health(u32);
impl Asset for Health {}

struct MenuAssets;
impl ContextKind for MenuAssets {}

struct LevelAssets;
impl ContextKind for LevelAssets {}

/// Populates the backend with what a remote CDN would serve.
fn build_backend() -> Arc<MemoryContentDelivery> {
    let delivery = Arc::new(MemoryContentDelivery::with_catalog_id("sandbox"));

    delivery.insert_asset("ui/logo", Texture { width: 512, height: 128 });
    delivery.insert_asset("ui/cursor", Texture { width: 32, height: 32 });
    delivery.insert_prefab("actors/goblin", |goblin| goblin.with_component(Health(30)));
    for (address, bytes) in [("ui/logo", 256 * 1024), ("ui/cursor", 4 * 1024)] {
        delivery.set_download_size(address, bytes);
    }
    delivery.label("menu", ["ui/logo", "ui/cursor"]);

    // Content shipped after launch.
    delivery.host_asset("levels/crypt", Texture { width: 2048, height: 2048 });
    delivery.set_download_size("levels/crypt", 12 * 1024 * 1024);
    delivery.stage_catalog_update("season-1", ["levels/crypt"]);

    delivery.host_asset("skins/gold", Texture { width: 1024, height: 1024 });
    delivery.set_download_size("skins/gold", 3 * 1024 * 1024);
    delivery.publish_remote_catalog(
        "https://cdn.example.com/skins.json",
        ResourceLocator::new("skins", ["skins/gold"]),
    );

    delivery
}

fn load_config() -> Result<AssetServiceConfig> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets.ron"));
    AssetServiceConfig::load(&path)
        .with_context(|| format!("Failed to load sandbox config from {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let delivery = build_backend();
    let reporter = Arc::new(AssetDownloadReporter::new());
    let progress = reporter.subscribe();
    let service = AssetManagementService::from_config(delivery.clone(), load_config()?)
        .with_reporter(reporter);

    // Listeners detach on reset, so this follows the first download only.
    let watcher = tokio::task::spawn_blocking(move || {
        for value in progress.iter() {
            log::info!("Download progress: {:>3.0}%", value * 100.0);
        }
    });

    let loader = service.loader();
    anyhow::ensure!(loader.initialize().await, "Content delivery failed to initialize");

    let size = loader.download_size_for_labels(["menu"]).await;
    log::info!("Menu content to download: {}", size);
    loader.update_content_for_labels(["menu"]).await;

    // Cached after the first request.
    let logo = service
        .load::<Texture, MenuAssets>(&AssetPolicy::new("ui/logo"))
        .await?
        .context("ui/logo should exist")?;
    let again = service
        .load::<Texture, MenuAssets>(&AssetPolicy::new("ui/logo"))
        .await?
        .context("ui/logo should exist")?;
    log::info!(
        "Loaded logo {}x{} (same handle twice: {})",
        logo.width,
        logo.height,
        logo.ptr_eq(&again)
    );

    let missing = service
        .load::<Texture, MenuAssets>(&AssetPolicy::new("levels/crypt"))
        .await?;
    log::info!("levels/crypt before the catalog update: {:?}", missing.map(|_| "found"));

    loader.update_catalogs().await;
    log::info!("Content left to download: {}", loader.content_download_size().await);
    loader.update_content().await;
    if let Some(crypt) = service
        .load::<Texture, LevelAssets>(&AssetPolicy::new("levels/crypt"))
        .await?
    {
        log::info!("Loaded crypt texture {}x{}", crypt.width, crypt.height);
    }

    for x in 0..3 {
        let placement = Placement::at(Vec3::new(x as f32 * 2.0, 0.0, 0.0));
        if let Some(health) = service
            .instantiate::<Health, LevelAssets>(&AssetPolicy::new("actors/goblin"), placement)
            .await?
        {
            log::info!("Spawned goblin with {} hp", health.0);
        }
    }

    if let Some(skins) = loader
        .load_content_catalog("https://cdn.example.com/skins.json")
        .await
    {
        log::info!("Skins catalog needs {}", loader.catalog_download_size(&skins).await);
        loader.download_catalog_dependencies(&skins).await;
    }

    service.release(&logo);
    service.release_all_context_assets();
    service.clear_cache();

    let stats = delivery.stats();
    log::info!(
        "Backend saw {} load(s) of ui/logo, {} released asset(s), {} released instance(s)",
        stats.load_count("ui/logo"),
        stats.released_assets.len(),
        stats.released_instances.len()
    );

    drop(service);
    watcher.await?;
    Ok(())
}
