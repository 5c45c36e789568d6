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

use super::{Asset, Instance};
use std::{
    any::{type_name, Any},
    fmt,
    ops::Deref,
    sync::Arc,
};

/// The identity of a loaded asset: the address of its shared allocation.
///
/// Every clone of a handle, typed or erased, reports the same key. Contexts use
/// it to suppress duplicates and to find the asset again on release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetKey(usize);

/// A thread-safe, reference-counted handle to a loaded asset.
///
/// This acts as a smart pointer, providing shared ownership of an asset's data.
/// Cloning a handle is cheap, as it only increments the reference count
/// and does not duplicate the underlying asset data.
///
/// A handle obtained from an instantiated object also keeps its owning
/// [`Instance`], so releasing the handle releases the whole instance.
pub struct AssetHandle<T: Asset> {
    asset: Arc<T>,
    owner: Option<Arc<Instance>>,
}

impl<T: Asset> AssetHandle<T> {
    /// Creates a new `AssetHandle` that takes ownership of the asset data.
    pub fn new(asset: T) -> Self {
        Self::from_arc(Arc::new(asset))
    }

    /// Wraps an already shared asset.
    pub fn from_arc(asset: Arc<T>) -> Self {
        Self { asset, owner: None }
    }

    /// Wraps a component that lives inside `owner`.
    pub fn owned_by(asset: Arc<T>, owner: Arc<Instance>) -> Self {
        Self {
            asset,
            owner: Some(owner),
        }
    }

    /// The identity of the underlying asset.
    pub fn key(&self) -> AssetKey {
        AssetKey(Arc::as_ptr(&self.asset) as *const () as usize)
    }

    /// Returns `true` if both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.asset, &other.asset)
    }

    /// The instance this handle was extracted from, if any.
    pub fn owner(&self) -> Option<&Arc<Instance>> {
        self.owner.as_ref()
    }

    /// The shared pointer behind the handle.
    pub fn as_arc(&self) -> &Arc<T> {
        &self.asset
    }

    /// Produces a type-erased clone of this handle.
    pub fn erase(&self) -> ErasedAsset {
        ErasedAsset {
            value: self.asset.clone(),
            type_name: type_name::<T>(),
            owner: self.owner.clone(),
        }
    }
}

impl AssetHandle<Instance> {
    /// Extracts the component of type `C` from this instance.
    ///
    /// Requesting `Instance` itself returns a clone of this handle.
    pub fn component<C: Asset>(&self) -> Option<AssetHandle<C>> {
        if let Some(itself) = self.erase().downcast::<C>() {
            return Some(itself);
        }
        self.asset
            .component::<C>()
            .map(|component| AssetHandle::owned_by(component, self.asset.clone()))
    }
}

impl<T: Asset> Clone for AssetHandle<T> {
    fn clone(&self) -> Self {
        Self {
            asset: self.asset.clone(),
            owner: self.owner.clone(),
        }
    }
}

impl<T: Asset> Deref for AssetHandle<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.asset
    }
}

impl<T: Asset> fmt::Debug for AssetHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetHandle")
            .field("type", &type_name::<T>())
            .field("key", &self.key())
            .field("owned", &self.owner.is_some())
            .finish()
    }
}

/// A type-erased handle, as stored by cache strategies and contexts.
///
/// Equality is identity: two erased handles are equal iff they share the same
/// allocation.
#[derive(Clone)]
pub struct ErasedAsset {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    owner: Option<Arc<Instance>>,
}

impl ErasedAsset {
    /// Erases a freshly created asset.
    pub fn new<T: Asset>(asset: T) -> Self {
        AssetHandle::new(asset).erase()
    }

    /// The identity of the underlying asset.
    pub fn key(&self) -> AssetKey {
        AssetKey(Arc::as_ptr(&self.value) as *const () as usize)
    }

    /// The Rust type name of the underlying asset, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the underlying asset is a `T`.
    pub fn is<T: Asset>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Recovers a typed handle, or `None` if the asset is not a `T`.
    pub fn downcast<T: Asset>(&self) -> Option<AssetHandle<T>> {
        self.value
            .clone()
            .downcast::<T>()
            .ok()
            .map(|asset| AssetHandle {
                asset,
                owner: self.owner.clone(),
            })
    }

    /// The instance that owns this asset, if it is a component.
    pub fn owner(&self) -> Option<&Arc<Instance>> {
        self.owner.as_ref()
    }

    /// The instantiated object that must be released together with this
    /// asset: its owner, or the asset itself when it is an [`Instance`].
    pub fn releasable_instance(&self) -> Option<Arc<Instance>> {
        self.owner
            .clone()
            .or_else(|| self.value.clone().downcast::<Instance>().ok())
    }
}

impl PartialEq for ErasedAsset {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ErasedAsset {}

impl<T: Asset> From<AssetHandle<T>> for ErasedAsset {
    fn from(handle: AssetHandle<T>) -> Self {
        handle.erase()
    }
}

impl<T: Asset> From<&AssetHandle<T>> for ErasedAsset {
    fn from(handle: &AssetHandle<T>) -> Self {
        handle.erase()
    }
}

impl fmt::Debug for ErasedAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedAsset")
            .field("type", &self.type_name)
            .field("key", &self.key())
            .field("owned", &self.owner.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Placement;

    #[derive(Debug, PartialEq)]
    struct Texture(u32);
    impl Asset for Texture {}

    #[derive(Debug, PartialEq)]
    struct Health(i32);
    impl Asset for Health {}

    #[test]
    fn clones_share_identity() {
        let handle = AssetHandle::new(Texture(7));
        let clone = handle.clone();
        assert!(handle.ptr_eq(&clone));
        assert_eq!(handle.key(), clone.key());
        assert_eq!(handle.erase(), clone.erase());
    }

    #[test]
    fn separate_assets_have_distinct_keys() {
        let a = ErasedAsset::new(Texture(1));
        let b = ErasedAsset::new(Texture(1));
        assert_ne!(a, b);
    }

    #[test]
    fn downcast_respects_the_concrete_type() {
        let erased = ErasedAsset::new(Texture(3));
        assert!(erased.is::<Texture>());
        assert_eq!(*erased.downcast::<Texture>().unwrap(), Texture(3));
        assert!(erased.downcast::<Health>().is_none());
        assert_eq!(erased.downcast::<Texture>().unwrap().key(), erased.key());
    }

    #[test]
    fn component_handles_keep_their_instance() {
        let instance = AssetHandle::new(
            Instance::new("hero/prefab", Placement::default()).with_component(Health(10)),
        );
        let health = instance.component::<Health>().unwrap();

        assert_eq!(*health, Health(10));
        assert!(Arc::ptr_eq(health.owner().unwrap(), instance.as_arc()));

        let erased = health.erase();
        let released = erased.releasable_instance().unwrap();
        assert!(Arc::ptr_eq(&released, instance.as_arc()));
    }

    #[test]
    fn instance_itself_is_releasable() {
        let instance = AssetHandle::new(Instance::new("hero/prefab", Placement::default()));
        let erased = instance.erase();
        assert!(erased.owner().is_none());
        assert!(erased.releasable_instance().is_some());
        assert!(instance.component::<Instance>().unwrap().ptr_eq(&instance));
    }

    #[test]
    fn plain_assets_are_not_instances() {
        assert!(ErasedAsset::new(Texture(0)).releasable_instance().is_none());
    }
}
