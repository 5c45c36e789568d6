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

//! Progress reporting for content downloads.
//!
//! The loader pushes fractional progress into a [`DownloadReporter`] while a
//! download is in flight and resets it once the download settles. UI code
//! observes the reporter either by polling [`DownloadReporter::progress`] or
//! by subscribing to [`AssetDownloadReporter`] notifications.

mod progress;

pub use self::progress::AssetDownloadReporter;

/// An observable progress sink with reset semantics.
pub trait DownloadReporter: Send + Sync {
    /// The last reported progress, in `[0, 1]`.
    fn progress(&self) -> f32;

    /// Records a new progress value and notifies listeners.
    fn report(&self, progress: f32);

    /// Returns to the idle state: progress goes back to 0 and every listener
    /// is detached.
    fn reset(&self);
}
