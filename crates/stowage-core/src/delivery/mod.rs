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

//! The contract between the asset loader and the content-delivery backend.
//!
//! The backend owns everything network- and storage-related: catalogs, bundle
//! downloads, and producing concrete objects. The loader only sees the
//! [`ContentDelivery`] trait and the [`Operation`] outcomes it returns.
//!
//! A concrete in-process implementation lives in `stowage-infra`.

mod catalog;
mod operation;
mod size;

pub use self::catalog::{CatalogHandle, DownloadTarget, ResourceLocation, ResourceLocator};
pub use self::operation::{DeliveryError, Operation};
pub use self::size::DownloadSize;

use crate::asset::{ErasedAsset, Instance, Placement};
use async_trait::async_trait;
use std::sync::Arc;

/// The sending half through which a backend publishes download progress.
///
/// Values are fractions in `[0, 1]`. The receiving side only ever sees the
/// latest value.
pub type ProgressSender = tokio::sync::watch::Sender<f32>;

/// An asynchronous content-delivery backend.
///
/// Every fallible call returns an [`Operation`] which the caller validates
/// before using the payload. Implementations must not panic on failure; they
/// report it through the operation instead.
#[async_trait]
pub trait ContentDelivery: Send + Sync {
    /// Starts the backend runtime and loads its initial catalog.
    async fn initialize(&self) -> Operation<CatalogHandle>;

    /// Returns the ids of catalogs that have a newer remote version.
    async fn check_for_catalog_updates(&self) -> Operation<Vec<String>>;

    /// Applies the updates for `catalog_ids` and returns the resulting
    /// locators.
    async fn update_catalogs(&self, catalog_ids: &[String]) -> Operation<Vec<ResourceLocator>>;

    /// The locators currently active in the backend.
    fn resource_locators(&self) -> Vec<ResourceLocator>;

    /// Resolves `keys` to the locations of their content (union of all keys).
    async fn resolve_locations(&self, keys: &[String]) -> Operation<Vec<ResourceLocation>>;

    /// Number of bytes that still need downloading for `target`.
    async fn download_size(&self, target: &DownloadTarget) -> Operation<u64>;

    /// Downloads the content behind `target`, publishing progress on
    /// `progress` while the operation is pending.
    async fn download_dependencies(
        &self,
        target: &DownloadTarget,
        progress: &ProgressSender,
    ) -> Operation<()>;

    /// Loads the asset at `address`.
    async fn load_asset(&self, address: &str) -> Operation<ErasedAsset>;

    /// Creates a new instance of the resource at `address`.
    async fn instantiate(&self, address: &str, placement: Placement) -> Operation<Arc<Instance>>;

    /// Releases a loaded asset.
    fn release(&self, asset: &ErasedAsset);

    /// Destroys an instantiated object.
    fn release_instance(&self, instance: &Instance);

    /// Loads an additional catalog from `path`.
    async fn load_content_catalog(&self, path: &str) -> Operation<ResourceLocator>;
}
