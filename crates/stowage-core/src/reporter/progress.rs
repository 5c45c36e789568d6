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

use super::DownloadReporter;
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct ReporterState {
    progress: f32,
    listeners: Vec<flume::Sender<f32>>,
}

/// The default [`DownloadReporter`].
///
/// Each call to [`report`](DownloadReporter::report) raises a "progress
/// updated" notification: the new value is sent to every channel handed out by
/// [`subscribe`](Self::subscribe). [`reset`](DownloadReporter::reset) drops
/// all senders, so subscribers see their channel disconnect.
#[derive(Debug, Default)]
pub struct AssetDownloadReporter {
    state: Mutex<ReporterState>,
}

impl AssetDownloadReporter {
    /// Creates an idle reporter with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener and returns the receiving end of its channel.
    pub fn subscribe(&self) -> flume::Receiver<f32> {
        let (sender, receiver) = flume::unbounded();
        self.state.lock().listeners.push(sender);
        receiver
    }

    /// Number of attached listeners.
    pub fn listener_count(&self) -> usize {
        self.state.lock().listeners.len()
    }
}

impl DownloadReporter for AssetDownloadReporter {
    fn progress(&self) -> f32 {
        self.state.lock().progress
    }

    fn report(&self, progress: f32) {
        let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
        let mut state = self.state.lock();
        state.progress = progress;
        // Listeners whose receiver is gone are dropped on the way.
        state.listeners.retain(|listener| listener.send(progress).is_ok());
        log::trace!("Download progress: {:.0}%", progress * 100.0);
    }

    fn reset(&self) {
        let mut state = self.state.lock();
        state.progress = 0.0;
        state.listeners.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flume::TryRecvError;
    use std::{sync::Arc, thread};

    #[test]
    fn report_updates_progress_and_notifies() {
        let reporter = AssetDownloadReporter::new();
        let receiver = reporter.subscribe();

        reporter.report(0.25);
        reporter.report(0.5);

        assert_eq!(reporter.progress(), 0.5);
        assert_eq!(receiver.try_recv(), Ok(0.25));
        assert_eq!(receiver.try_recv(), Ok(0.5));
        assert_eq!(receiver.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn values_are_clamped_to_unit_range() {
        let reporter = AssetDownloadReporter::new();
        reporter.report(1.7);
        assert_eq!(reporter.progress(), 1.0);
        reporter.report(-3.0);
        assert_eq!(reporter.progress(), 0.0);
        reporter.report(f32::NAN);
        assert_eq!(reporter.progress(), 0.0);
    }

    #[test]
    fn reset_zeroes_progress_and_detaches_listeners() {
        let reporter = AssetDownloadReporter::new();
        let receiver = reporter.subscribe();
        reporter.report(0.9);

        reporter.reset();

        assert_eq!(reporter.progress(), 0.0);
        assert_eq!(reporter.listener_count(), 0);
        assert_eq!(receiver.try_recv(), Ok(0.9));
        assert_eq!(receiver.try_recv(), Err(TryRecvError::Disconnected));
    }

    #[test]
    fn dropped_receivers_are_pruned() {
        let reporter = AssetDownloadReporter::new();
        let receiver = reporter.subscribe();
        let _kept = reporter.subscribe();
        drop(receiver);

        reporter.report(0.1);
        assert_eq!(reporter.listener_count(), 1);
    }

    #[test]
    fn report_from_another_thread() {
        let reporter = Arc::new(AssetDownloadReporter::new());
        let receiver = reporter.subscribe();

        let worker = {
            let reporter = reporter.clone();
            thread::spawn(move || reporter.report(0.75))
        };
        worker.join().expect("Thread join failed");

        assert_eq!(receiver.recv(), Ok(0.75));
    }
}
