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

//! Forwarding of backend download progress to a [`DownloadReporter`].

use std::future::Future;
use stowage_core::{delivery::Operation, DownloadReporter};
use tokio::sync::watch;

/// Drives `download` to completion while relaying every progress value
/// published on `progress` to `reporter`.
///
/// Once the download settles, a valid operation reports `1.0`, and the
/// reporter is reset whatever the outcome.
pub(crate) async fn track_progress<F>(
    download: F,
    mut progress: watch::Receiver<f32>,
    reporter: Option<&dyn DownloadReporter>,
) -> Operation<()>
where
    F: Future<Output = Operation<()>>,
{
    tokio::pin!(download);

    let outcome = loop {
        tokio::select! {
            outcome = &mut download => break outcome,
            changed = progress.changed() => match changed {
                Ok(()) => {
                    let value = *progress.borrow_and_update();
                    if let Some(reporter) = reporter {
                        reporter.report(value);
                    }
                }
                // Publisher gone: nothing more to relay.
                Err(_) => break (&mut download).await,
            },
        }
    };

    if let Some(reporter) = reporter {
        if outcome.is_valid() {
            reporter.report(1.0);
        }
        reporter.reset();
    }
    outcome
}
