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

use super::Asset;
use serde::{Deserialize, Serialize};
use std::{
    any::{type_name, Any, TypeId},
    collections::HashMap,
    fmt,
    sync::Arc,
};
use uuid::Uuid;

/// A unique identifier for one instantiated object.
///
/// Unlike a [`PolicyId`](super::PolicyId), which names a resource definition,
/// every instantiation gets a fresh (version 4) id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(Uuid);

impl InstanceId {
    /// Creates a new, random `InstanceId`.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A position in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
}

impl Vec3 {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a new vector.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Where an instantiated object is placed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Placement {
    /// World-space position of the new instance.
    pub position: Vec3,
    /// The instance this one is attached to, if any.
    pub parent: Option<InstanceId>,
}

impl Placement {
    /// A placement at `position` with no parent.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            parent: None,
        }
    }

    /// Attaches the placement to `parent`.
    pub fn with_parent(mut self, parent: InstanceId) -> Self {
        self.parent = Some(parent);
        self
    }
}

struct ComponentSlot {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

/// A composite object produced by the content-delivery backend when a
/// resource is instantiated rather than loaded.
///
/// An instance owns a set of components, at most one per type. Callers usually
/// ask the asset service for one of these components and the service keeps
/// track of the instance behind it.
pub struct Instance {
    id: InstanceId,
    address: String,
    placement: Placement,
    components: HashMap<TypeId, ComponentSlot>,
}

impl Asset for Instance {}

impl Instance {
    /// Creates an empty instance of the resource at `address`.
    pub fn new(address: impl Into<String>, placement: Placement) -> Self {
        Self {
            id: InstanceId::new(),
            address: address.into(),
            placement,
            components: HashMap::new(),
        }
    }

    /// Builder-style variant of [`insert_component`](Self::insert_component).
    pub fn with_component<C: Asset>(mut self, component: C) -> Self {
        self.insert_component(component);
        self
    }

    /// Adds a component, replacing any previous component of the same type.
    pub fn insert_component<C: Asset>(&mut self, component: C) {
        self.components.insert(
            TypeId::of::<C>(),
            ComponentSlot {
                value: Arc::new(component),
                type_name: type_name::<C>(),
            },
        );
    }

    /// Returns the component of type `C`, if present.
    pub fn component<C: Asset>(&self) -> Option<Arc<C>> {
        self.components
            .get(&TypeId::of::<C>())
            .and_then(|slot| slot.value.clone().downcast::<C>().ok())
    }

    /// Checks whether a component of type `C` is present.
    pub fn has_component<C: Asset>(&self) -> bool {
        self.components.contains_key(&TypeId::of::<C>())
    }

    /// Number of components attached to the instance.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// The unique id of this instance.
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// The address of the resource this instance was created from.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Where the instance was placed.
    pub fn placement(&self) -> Placement {
        self.placement
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let components: Vec<&str> = self.components.values().map(|slot| slot.type_name).collect();
        f.debug_struct("Instance")
            .field("id", &self.id)
            .field("address", &self.address)
            .field("placement", &self.placement)
            .field("components", &components)
            .finish()
    }
}
