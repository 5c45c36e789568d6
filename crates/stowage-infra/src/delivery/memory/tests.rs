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

use super::*;
use pollster::block_on;
use stowage_core::asset::Vec3;
use tokio::sync::watch;

#[derive(Debug, PartialEq)]
struct Health(u32);
impl Asset for Health {}

fn keys(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|key| key.to_string()).collect()
}

#[test]
fn insert_asset_is_listed_and_loadable() {
    let delivery = MemoryContentDelivery::new();
    let icon = delivery.insert_asset("ui/icon", String::from("icon"));

    let locators = delivery.resource_locators();
    assert_eq!(locators.len(), 1);
    assert_eq!(locators[0].keys, vec!["ui/icon"]);

    let Operation::Succeeded(loaded) = block_on(delivery.load_asset("ui/icon")) else {
        panic!("load failed");
    };
    assert_eq!(loaded, icon.erase());
    assert_eq!(delivery.stats().load_count("ui/icon"), 1);
}

#[test]
fn hosted_but_unlisted_content_cannot_be_loaded() {
    let delivery = MemoryContentDelivery::new();
    delivery.host_asset("dlc/map", String::from("map"));

    let outcome = block_on(delivery.load_asset("dlc/map"));

    assert!(outcome.is_valid());
    assert!(!outcome.is_succeeded());
    assert_eq!(delivery.stats().load_count("dlc/map"), 0);
}

#[test]
fn staged_update_is_reported_then_applied() {
    let delivery = MemoryContentDelivery::new();
    delivery.host_asset("dlc/map", String::from("map"));
    delivery.stage_catalog_update("dlc", ["dlc/map"]);

    let pending = block_on(delivery.check_for_catalog_updates());
    assert_eq!(pending, Operation::Succeeded(keys(&["dlc"])));

    let Operation::Succeeded(locators) = block_on(delivery.update_catalogs(&keys(&["dlc"]))) else {
        panic!("update failed");
    };
    assert!(locators.iter().any(|l| l.id == "dlc" && l.keys == keys(&["dlc/map"])));
    assert_eq!(
        block_on(delivery.check_for_catalog_updates()),
        Operation::Succeeded(Vec::new())
    );
    assert!(block_on(delivery.load_asset("dlc/map")).is_succeeded());
}

#[test]
fn labels_resolve_to_their_members() {
    let delivery = MemoryContentDelivery::new();
    delivery.insert_asset("a", String::from("a"));
    delivery.insert_asset("b", String::from("b"));
    delivery.label("level-1", ["a", "b"]);

    let outcome = block_on(delivery.resolve_locations(&keys(&["level-1", "a", "missing"])));
    let Operation::Succeeded(locations) = outcome else {
        panic!("resolve failed");
    };
    let primary: Vec<_> = locations.iter().map(|l| l.primary_key.as_str()).collect();
    assert_eq!(primary, vec!["a", "b"]);
}

#[test]
fn download_size_counts_only_pending_content() {
    let delivery = MemoryContentDelivery::new();
    delivery.insert_asset("a", String::from("a"));
    delivery.insert_asset("b", String::from("b"));
    delivery.set_download_size("a", 100);
    delivery.set_download_size("b", 50);
    delivery.label("all", ["a", "b"]);
    let target = DownloadTarget::Label("all".into());

    assert_eq!(block_on(delivery.download_size(&target)), Operation::Succeeded(150));

    let (sender, receiver) = watch::channel(0.0);
    let outcome = block_on(delivery.download_dependencies(&target, &sender));

    assert!(outcome.is_succeeded());
    assert_eq!(*receiver.borrow(), 1.0);
    assert!(delivery.is_downloaded("a") && delivery.is_downloaded("b"));
    assert_eq!(block_on(delivery.download_size(&target)), Operation::Succeeded(0));
    assert_eq!(delivery.stats().downloads, 1);
}

#[test]
fn unknown_label_fails() {
    let delivery = MemoryContentDelivery::new();
    let target = DownloadTarget::Label("nope".into());
    let (sender, _receiver) = watch::channel(0.0);

    assert!(!block_on(delivery.download_size(&target)).is_succeeded());
    assert!(!block_on(delivery.download_dependencies(&target, &sender)).is_succeeded());
}

#[test]
fn instantiate_builds_fresh_instances() {
    let delivery = MemoryContentDelivery::new();
    delivery.insert_prefab("hero", |instance| instance.with_component(Health(10)));
    let placement = Placement::at(Vec3::new(1.0, 2.0, 3.0));

    let Operation::Succeeded(first) = block_on(delivery.instantiate("hero", placement)) else {
        panic!("instantiate failed");
    };
    let Operation::Succeeded(second) = block_on(delivery.instantiate("hero", placement)) else {
        panic!("instantiate failed");
    };

    assert_ne!(first.id(), second.id());
    assert_eq!(first.placement(), placement);
    assert_eq!(first.component::<Health>().as_deref(), Some(&Health(10)));
    assert_eq!(delivery.stats().instantiate_count("hero"), 2);
    assert!(!block_on(delivery.load_asset("hero")).is_succeeded());

    delivery.release_instance(&first);
    let stats = delivery.stats();
    assert_eq!(stats.released_instances, vec![first.id()]);
    assert_eq!(stats.live_instances.len(), 1);
}

#[test]
fn release_is_recorded_by_identity() {
    let delivery = MemoryContentDelivery::new();
    let icon = delivery.insert_asset("ui/icon", String::from("icon"));

    delivery.release(&icon.erase());

    assert_eq!(delivery.stats().release_count_of(icon.key()), 1);
}

#[test]
fn injected_faults_apply_until_cleared() {
    let delivery = MemoryContentDelivery::new();
    delivery.insert_asset("ui/icon", String::from("icon"));

    delivery.inject_fault(DeliveryCall::LoadAsset, Fault::Invalid);
    assert_eq!(block_on(delivery.load_asset("ui/icon")), Operation::Invalid);

    delivery.inject_fault(DeliveryCall::LoadAsset, Fault::Failed("offline".into()));
    assert_eq!(
        block_on(delivery.load_asset("ui/icon")),
        Operation::failed("offline")
    );

    delivery.clear_fault(DeliveryCall::LoadAsset);
    assert!(block_on(delivery.load_asset("ui/icon")).is_succeeded());
}

#[test]
fn remote_catalog_becomes_active_once_loaded() {
    let delivery = MemoryContentDelivery::new();
    delivery.host_asset("remote/skin", String::from("skin"));
    let locator = ResourceLocator::new("remote", ["remote/skin"]);
    delivery.publish_remote_catalog("https://cdn.example/remote.json", locator.clone());

    assert!(!block_on(delivery.load_content_catalog("elsewhere")).is_succeeded());
    assert_eq!(
        block_on(delivery.load_content_catalog("https://cdn.example/remote.json")),
        Operation::Succeeded(locator)
    );
    assert!(block_on(delivery.load_asset("remote/skin")).is_succeeded());
}
