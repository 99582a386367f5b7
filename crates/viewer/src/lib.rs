//! The single view and its fetch trigger.
//!
//! Invariants:
//! - `DisplayState` is owned by `ViewerApp` and only changes through
//!   `trigger_fetch` (the loading message) or `on_core_event` (the outcome).
//! - Both run on the UI thread. Background work reaches this crate only as
//!   `CoreEvent`s drained by the platform host.
//! - Completions are not gated by request id: whichever completion is
//!   drained last decides the displayed text.
//! - Every activation logs an `Interaction`; every completion that moved
//!   bytes logs a `TrafficReport` with running totals.

use std::sync::mpsc;

use app_api::{RepaintHandle, UiApp};
use bus::{CoreCommand, CoreEvent};
use core_types::{ProductId, RequestId};
use egui::Context;
use net::TrafficStats;

mod interaction;
pub mod view;

pub use interaction::Interaction;

pub const PLACEHOLDER: &str = "Click a button to fetch todo info";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayState {
    text: String,
}

impl DisplayState {
    pub fn text(&self) -> &str {
        &self.text
    }

    fn set(&mut self, text: String) {
        self.text = text;
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            text: PLACEHOLDER.into(),
        }
    }
}

pub struct ViewerApp {
    display: DisplayState,
    next_request_id: RequestId,
    traffic: TrafficStats,

    cmd_tx: Option<mpsc::Sender<CoreCommand>>,
    repaint: Option<RepaintHandle>,
}

impl ViewerApp {
    pub fn new() -> Self {
        Self {
            display: DisplayState::default(),
            next_request_id: 1,
            traffic: TrafficStats::new(),
            cmd_tx: None,
            repaint: None,
        }
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn traffic(&self) -> &TrafficStats {
        &self.traffic
    }

    fn alloc_request_id(&mut self) -> RequestId {
        let id = self.next_request_id;
        self.next_request_id = self.next_request_id.wrapping_add(1);
        id
    }

    /// Shows the loading message right away, then hands the GET to the net
    /// runtime. Earlier requests still in flight are left alone.
    pub fn trigger_fetch(&mut self, product: ProductId) {
        log::info!("{}", Interaction::button(product));
        self.display.set(format!("Loading product {product}..."));

        let request_id = self.alloc_request_id();
        let sent = match &self.cmd_tx {
            Some(tx) => tx
                .send(CoreCommand::FetchProduct { request_id, product })
                .is_ok(),
            None => false,
        };
        if !sent {
            log::error!("request {request_id}: no net runtime to fetch product {product}");
            self.display.set(format!(
                "Error fetching product {product}: network runtime unavailable"
            ));
        }
        self.poke_redraw();
    }

    fn poke_redraw(&self) {
        if let Some(h) = &self.repaint {
            h.request_repaint();
        }
    }
}

impl Default for ViewerApp {
    fn default() -> Self {
        Self::new()
    }
}

impl UiApp for ViewerApp {
    fn ui(&mut self, ctx: &Context) {
        if let Some(product) = view::content(ctx, self.display.text()) {
            self.trigger_fetch(product);
        }
    }

    fn set_bus_sender(&mut self, tx: mpsc::Sender<CoreCommand>) {
        self.cmd_tx = Some(tx);
    }

    fn on_core_event(&mut self, evt: CoreEvent) {
        match evt {
            CoreEvent::FetchFinished { request_id, result } => {
                log::debug!("request {request_id}: product {} finished", result.product);
                if let Some(report) = self.traffic.record_result(&result) {
                    log::info!("{report}");
                }
                self.display.set(result.display_message());
            }
        }
    }

    fn set_repaint_handle(&mut self, h: RepaintHandle) {
        self.repaint = Some(h);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use net::{FetchError, FetchResult};

    fn finished(request_id: RequestId, product: ProductId, body: Result<String, FetchError>) -> CoreEvent {
        CoreEvent::FetchFinished {
            request_id,
            result: FetchResult {
                product,
                url: String::new(),
                status: body.as_ref().ok().map(|_| 200),
                bytes: body.as_ref().map(|b| b.len()).unwrap_or(0),
                sent_bytes: if body.is_ok() { 50 } else { 0 },
                duration_ms: 0,
                body,
            },
        }
    }

    #[test]
    fn starts_with_the_placeholder() {
        assert_eq!(ViewerApp::new().display().text(), PLACEHOLDER);
    }

    #[test]
    fn trigger_sets_loading_and_sends_one_command() {
        let (tx, rx) = mpsc::channel();
        let mut app = ViewerApp::new();
        app.set_bus_sender(tx);

        for product in ProductId::ALL {
            app.trigger_fetch(product);
            assert_eq!(app.display().text(), format!("Loading product {product}..."));
            match rx.try_recv().unwrap() {
                CoreCommand::FetchProduct { product: sent, .. } => assert_eq!(sent, product),
            }
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn request_ids_increase_per_activation() {
        let (tx, rx) = mpsc::channel();
        let mut app = ViewerApp::new();
        app.set_bus_sender(tx);

        app.trigger_fetch(ProductId::One);
        app.trigger_fetch(ProductId::One);
        let ids: Vec<_> = rx
            .try_iter()
            .map(|CoreCommand::FetchProduct { request_id, .. }| request_id)
            .collect();
        assert_eq!(ids, [1, 2]);
    }

    #[test]
    fn missing_runtime_shows_an_error() {
        let mut app = ViewerApp::new();
        app.trigger_fetch(ProductId::Two);
        assert_eq!(
            app.display().text(),
            "Error fetching product 2: network runtime unavailable"
        );
    }

    #[test]
    fn closed_runtime_shows_an_error() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut app = ViewerApp::new();
        app.set_bus_sender(tx);
        app.trigger_fetch(ProductId::Three);
        assert_eq!(
            app.display().text(),
            "Error fetching product 3: network runtime unavailable"
        );
    }

    #[test]
    fn last_drained_completion_wins_even_if_older() {
        let mut app = ViewerApp::new();
        app.on_core_event(finished(2, ProductId::Two, Ok("two".into())));
        app.on_core_event(finished(1, ProductId::One, Ok("one".into())));
        assert_eq!(app.display().text(), "one");
    }

    #[test]
    fn each_outcome_maps_to_its_message() {
        let mut app = ViewerApp::new();

        app.on_core_event(finished(1, ProductId::Two, Err(FetchError::Transport("timed out".into()))));
        assert_eq!(app.display().text(), "Error fetching product 2: timed out");

        app.on_core_event(finished(2, ProductId::Three, Err(FetchError::EmptyBody)));
        assert_eq!(app.display().text(), "No data received for product 3");

        app.on_core_event(finished(3, ProductId::Three, Err(FetchError::UndecodableBody)));
        assert_eq!(app.display().text(), "No data received for product 3");
    }

    #[test]
    fn completions_feed_the_traffic_tally() {
        use net::Traffic;

        let mut app = ViewerApp::new();
        app.on_core_event(finished(1, ProductId::One, Ok("abcd".into())));
        app.on_core_event(finished(2, ProductId::One, Ok("ef".into())));
        app.on_core_event(finished(3, ProductId::Two, Err(FetchError::Transport("refused".into()))));

        assert_eq!(app.traffic().total(ProductId::One), Traffic { bytes_in: 6, bytes_out: 100 });
        assert_eq!(app.traffic().total(ProductId::Two), Traffic::default());
    }

    #[test]
    fn trigger_wakes_the_ui() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let (tx, _rx) = mpsc::channel();
        let mut app = ViewerApp::new();
        app.set_bus_sender(tx);
        app.set_repaint_handle(RepaintHandle::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        app.trigger_fetch(ProductId::One);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
