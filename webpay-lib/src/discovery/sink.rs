//! Result delivery.
//!
//! A discovery run reports each resolved app exactly once and then signals
//! completion exactly once, always in that order. A cancelled run stops
//! emitting and never signals completion.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// An installed app trusted to handle some of the requested methods.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPaymentApp {
    /// Package name of the app.
    pub app_identifier: String,
    /// The app's human-readable name.
    pub label: String,
    /// Requested methods the app may handle, as the merchant spelled them.
    /// Never empty.
    pub enabled_method_names: BTreeSet<String>,
    /// Whether the app can be asked if it is ready to pay.
    pub ready_to_pay_service: bool,
}

/// Receives the output of a discovery run.
pub trait ResultSink: Send + Sync {
    /// One app finished resolving.
    fn on_app_resolved(&self, app: ResolvedPaymentApp);

    /// All work has settled. Called at most once per run.
    fn on_complete(&self);
}

/// Sink that stores everything it receives.
#[derive(Debug, Default)]
pub struct CollectingSink {
    apps: Mutex<Vec<ResolvedPaymentApp>>,
    completions: AtomicUsize,
}

impl CollectingSink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apps received so far, in arrival order.
    pub fn apps(&self) -> Vec<ResolvedPaymentApp> {
        self.apps.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Take the received apps, leaving the sink empty.
    pub fn take_apps(&self) -> Vec<ResolvedPaymentApp> {
        std::mem::take(&mut *self.apps.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// Whether completion has been signalled.
    pub fn is_complete(&self) -> bool {
        self.completion_count() > 0
    }

    /// How many times completion was signalled.
    pub fn completion_count(&self) -> usize {
        self.completions.load(Ordering::SeqCst)
    }
}

impl ResultSink for CollectingSink {
    fn on_app_resolved(&self, app: ResolvedPaymentApp) {
        self.apps
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(app);
    }

    fn on_complete(&self) {
        self.completions.fetch_add(1, Ordering::SeqCst);
    }
}

/// Events forwarded by a [`ChannelSink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiscoveryEvent {
    /// One resolved app.
    AppResolved(ResolvedPaymentApp),
    /// The run completed.
    Completed,
}

/// Sink that forwards events to an async consumer.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<DiscoveryEvent>,
}

impl ChannelSink {
    /// A sink and the receiver it feeds.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DiscoveryEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: DiscoveryEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("discovery event dropped, receiver closed");
        }
    }
}

impl ResultSink for ChannelSink {
    fn on_app_resolved(&self, app: ResolvedPaymentApp) {
        self.send(DiscoveryEvent::AppResolved(app));
    }

    fn on_complete(&self) {
        self.send(DiscoveryEvent::Completed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(id: &str) -> ResolvedPaymentApp {
        ResolvedPaymentApp {
            app_identifier: id.into(),
            label: id.into(),
            enabled_method_names: ["basic-card".to_string()].into_iter().collect(),
            ready_to_pay_service: false,
        }
    }

    #[test]
    fn test_collecting_sink() {
        let sink = CollectingSink::new();
        sink.on_app_resolved(resolved("com.bobpay"));
        assert!(!sink.is_complete());
        sink.on_complete();
        assert_eq!(sink.completion_count(), 1);
        assert_eq!(sink.take_apps().len(), 1);
        assert!(sink.apps().is_empty());
    }

    #[tokio::test]
    async fn test_channel_sink_forwards_in_order() {
        let (sink, mut rx) = ChannelSink::new();
        sink.on_app_resolved(resolved("com.bobpay"));
        sink.on_complete();

        assert_eq!(
            rx.recv().await,
            Some(DiscoveryEvent::AppResolved(resolved("com.bobpay")))
        );
        assert_eq!(rx.recv().await, Some(DiscoveryEvent::Completed));
    }

    #[test]
    fn test_channel_sink_survives_closed_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.on_complete();
    }
}
