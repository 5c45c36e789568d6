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

//! Provides the foundational traits and primitive types for Stowage's asset system.
//!
//! This module defines the "common language" for every asset-related operation.
//! It contains the core contracts that other crates implement or use, but it has
//! no knowledge of how assets are fetched, cached, or grouped.
//!
//! The key components are:
//! - The [`Asset`] trait: a marker for all types that can be handed out as assets.
//! - [`AssetPolicy`]: the address of a resource plus its derived cache key.
//! - [`AssetHandle`] and [`ErasedAsset`]: typed and type-erased shared handles.
//! - [`Instance`]: a composite object produced by instantiating a prefab-like resource.

mod handle;
mod instance;
mod policy;

pub use handle::*;
pub use instance::*;
pub use policy::*;

/// A marker trait for types that can be managed by the asset system.
///
/// The supertraits enforce critical safety guarantees:
/// - `Send` + `Sync`: the asset can be shared between the caller and the
///   threads on which backend operations complete.
/// - `'static`: the asset holds no borrowed data, so it can live in a cache
///   for as long as the cache keeps it.
///
/// # Examples
///
/// ```
/// use stowage_core::asset::Asset;
///
/// struct Icon {
///     // ... fields
/// }
///
/// impl Asset for Icon {}
/// ```
pub trait Asset: Send + Sync + 'static {}

impl Asset for String {}
impl Asset for Vec<u8> {}
