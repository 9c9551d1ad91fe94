use crate::descriptor::DeviceDescriptor;
use futures_util::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

/// Receiver for thermostats found by a discovery run
///
/// Yields zero or more descriptors and then ends. Listener failures are
/// logged, never delivered. Dropping the stream stops the listener the next
/// time it has a descriptor to deliver.
pub struct DiscoveryStream {
    rx: mpsc::Receiver<DeviceDescriptor>,
}

impl DiscoveryStream {
    pub(crate) fn new(rx: mpsc::Receiver<DeviceDescriptor>) -> Self {
        Self { rx }
    }

    /// Receive the next discovered thermostat
    ///
    /// Returns `None` once the discovery deadline has passed and every
    /// queued descriptor has been received.
    pub async fn recv(&mut self) -> Option<DeviceDescriptor> {
        self.rx.recv().await
    }

    /// Take a queued descriptor without waiting
    ///
    /// Returns `None` if nothing is queued right now, which does not mean
    /// discovery has finished.
    pub fn try_recv(&mut self) -> Option<DeviceDescriptor> {
        self.rx.try_recv().ok()
    }

    /// Drain the stream, collecting everything found before the deadline
    pub async fn collect_all(mut self) -> Vec<DeviceDescriptor> {
        let mut found = Vec::new();
        while let Some(device) = self.recv().await {
            found.push(device);
        }
        found
    }
}

impl Stream for DiscoveryStream {
    type Item = DeviceDescriptor;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
