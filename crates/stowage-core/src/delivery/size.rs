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

use std::{fmt, iter::Sum, ops::Add};

const BYTES_IN_KILOBYTE: f64 = 1024.0;
const BYTES_IN_MEGABYTE: f64 = 1024.0 * 1024.0;

/// An amount of content still to be downloaded, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DownloadSize(u64);

impl DownloadSize {
    /// Nothing to download.
    pub const ZERO: Self = Self(0);

    /// Wraps a byte count.
    pub const fn from_bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    /// The size in bytes.
    pub const fn bytes(self) -> u64 {
        self.0
    }

    /// The size in kibibytes.
    pub fn kilobytes(self) -> f64 {
        self.0 as f64 / BYTES_IN_KILOBYTE
    }

    /// The size in mebibytes.
    pub fn megabytes(self) -> f64 {
        self.0 as f64 / BYTES_IN_MEGABYTE
    }

    /// Returns `true` if there is nothing to download.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Add for DownloadSize {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for DownloadSize {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for DownloadSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} Mb", self.megabytes())
    }
}
