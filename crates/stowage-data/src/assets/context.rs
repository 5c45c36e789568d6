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

//! A duplicate-free set of loaded asset handles.

use std::collections::HashMap;
use stowage_core::asset::{AssetKey, ErasedAsset};

/// The assets loaded on behalf of one subsystem.
///
/// This structure maps the identity of each asset to a strong handle on it, so
/// that an asset registered twice is only held once. Holding a handle here keeps
/// the asset alive until it is unregistered or the context is cleared.
#[derive(Debug, Default, Clone)]
pub struct AssetContext {
    assets: HashMap<AssetKey, ErasedAsset>,
}

impl AssetContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an asset. Registering an asset that is already a member does nothing.
    pub fn register_asset(&mut self, asset: ErasedAsset) {
        self.assets.entry(asset.key()).or_insert(asset);
    }

    /// Adds every asset of the batch.
    pub fn register_assets<I>(&mut self, assets: I)
    where
        I: IntoIterator<Item = ErasedAsset>,
    {
        for asset in assets {
            self.register_asset(asset);
        }
    }

    /// Removes an asset, returning `true` if it was a member.
    pub fn unregister_asset(&mut self, asset: &ErasedAsset) -> bool {
        self.assets.remove(&asset.key()).is_some()
    }

    /// Removes every asset of the batch. Non-members are skipped.
    pub fn unregister_assets<'a, I>(&mut self, assets: I)
    where
        I: IntoIterator<Item = &'a ErasedAsset>,
    {
        for asset in assets {
            self.unregister_asset(asset);
        }
    }

    /// Checks if the asset is a member of this context.
    pub fn has_asset(&self, asset: &ErasedAsset) -> bool {
        self.assets.contains_key(&asset.key())
    }

    /// Drops every membership.
    pub fn clear(&mut self) {
        self.assets.clear();
    }

    /// A read-only view of the members, in no particular order.
    pub fn loaded_assets(&self) -> impl Iterator<Item = &ErasedAsset> + '_ {
        self.assets.values()
    }

    /// Removes and returns every member.
    pub fn drain(&mut self) -> Vec<ErasedAsset> {
        self.assets.drain().map(|(_, asset)| asset).collect()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Returns `true` if the context holds nothing.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
