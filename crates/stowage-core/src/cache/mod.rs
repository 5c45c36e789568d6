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

//! The contract every cache strategy fulfils.
//!
//! A strategy decides whether a resource that was fetched once is kept around
//! for the next request. The loader consults it before touching the backend and
//! feeds it after a successful fetch. Concrete strategies live in
//! `stowage-data`.

use crate::asset::{AssetPolicy, ErasedAsset};

/// A pluggable, per-asset caching policy.
///
/// Strategy instances are shared (`Arc<dyn CacheStrategy>`) by every caller
/// bound to them, and several loads may hit the same instance concurrently.
/// Implementations that mutate state must synchronize internally.
pub trait CacheStrategy: Send + Sync {
    /// Looks up the asset cached for `policy.id()`.
    ///
    /// This is a purely local lookup and must never block on I/O.
    fn get(&self, policy: &AssetPolicy) -> Option<ErasedAsset>;

    /// Stores `asset` under `policy.id()` unless an entry already exists.
    ///
    /// A second `add` for the same id keeps the first value.
    fn add(&self, policy: &AssetPolicy, asset: ErasedAsset);

    /// Drops every entry. Handles already given out stay valid.
    fn clear(&self);

    /// The value handed out when a resource is known not to exist in the
    /// backend. `None` unless the strategy supplies a sentinel.
    fn default_asset(&self) -> Option<ErasedAsset> {
        None
    }

    /// Number of assets the strategy loaded ahead of time.
    fn preloaded_asset_count(&self) -> usize {
        0
    }

    /// Number of entries currently held.
    fn len(&self) -> usize;

    /// Returns `true` if the strategy holds no entry.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
