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

//! Acts as the **[A]gent** for the asset subsystem.
//!
//! This module provides the high-level logic for asset management. It is the
//! public-facing API for requesting assets and releasing them, but it delegates
//! the heavy lifting of fetching to the `asset_lane`.
//!
//! Its responsibilities are:
//! - Binding cache strategies to individual policies, with per-service defaults.
//! - Grouping everything it hands out into contexts, so a subsystem can release
//!   all of its assets at once.

mod config;
mod registry;
mod service;

pub use self::config::{AssetServiceConfig, ConfigError, StrategyKind};
pub use self::service::AssetManagementService;
