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

//! Context kinds: the type-level names under which loaded assets are grouped.

use std::any::{type_name, TypeId};

/// A marker type naming one group of loaded assets.
///
/// Each subsystem declares its own kind, and the asset service keeps one
/// context per kind, keyed by [`TypeId`] and resolved once at registration.
///
/// ```
/// use stowage_core::context::ContextKind;
///
/// struct UiAssets;
/// impl ContextKind for UiAssets {}
///
/// assert!(UiAssets::name().ends_with("UiAssets"));
/// ```
pub trait ContextKind: 'static {
    /// A readable name for logs and errors.
    fn name() -> &'static str {
        type_name::<Self>()
    }

    /// The registry key of this kind.
    fn key() -> TypeId {
        TypeId::of::<Self>()
    }
}
