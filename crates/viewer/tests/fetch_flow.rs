//! End-to-end flow: button activation -> net runtime -> drained completion.
//!
//! The platform host is replaced by `Harness::pump`, which drains the event
//! channel on the test thread exactly like the host does before each frame.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use app_api::UiApp;
use bus::{Bus, CoreEvent};
use core_types::ProductId;
use net::{FetchConfig, FetchError, HttpResponse, Transport, Url};
use runtime_net::start_net_runtime;
use viewer::ViewerApp;

const WAIT: Duration = Duration::from_secs(5);
const TODO_1: &str = r#"{"userId":1,"id":1,"title":"delectus aut autem","completed":false}"#;

/// Answers by the last path segment; unknown ids fail like a refused socket.
struct StubTransport {
    routes: HashMap<&'static str, Result<HttpResponse, FetchError>>,
}

impl StubTransport {
    fn standard() -> Self {
        let mut routes = HashMap::new();
        routes.insert(
            "1",
            Ok(HttpResponse {
                status: 200,
                body: TODO_1.as_bytes().to_vec(),
            }),
        );
        routes.insert(
            "2",
            Err(FetchError::Transport("dns error: failed to lookup address information".into())),
        );
        routes.insert(
            "3",
            Ok(HttpResponse {
                status: 200,
                body: Vec::new(),
            }),
        );
        Self { routes }
    }
}

impl Transport for StubTransport {
    fn get(&self, url: &Url) -> Result<HttpResponse, FetchError> {
        let id = url.path().rsplit('/').next().unwrap_or_default();
        self.routes
            .get(id)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Transport("connection refused".into())))
    }
}

struct Harness {
    app: ViewerApp,
    evt_rx: Receiver<CoreEvent>,
}

impl Harness {
    fn new(transport: StubTransport) -> Self {
        let Bus { cmd_tx, cmd_rx, evt_tx, evt_rx } = Bus::new();
        start_net_runtime(cmd_rx, evt_tx, Arc::new(transport), FetchConfig::default(), None);
        let mut app = ViewerApp::new();
        app.set_bus_sender(cmd_tx);
        Self { app, evt_rx }
    }

    fn pump(&mut self, expected: usize) {
        for _ in 0..expected {
            let evt = self.evt_rx.recv_timeout(WAIT).expect("completion");
            self.app.on_core_event(evt);
        }
    }

    fn text(&self) -> &str {
        self.app.display().text()
    }
}

fn is_well_formed(text: &str) -> bool {
    text == TODO_1
        || text.starts_with("Error fetching product ")
        || text.starts_with("No data received for product ")
}

#[test]
fn loading_message_precedes_any_completion() {
    let mut h = Harness::new(StubTransport::standard());
    for product in ProductId::ALL {
        h.app.trigger_fetch(product);
        assert_eq!(h.text(), format!("Loading product {}...", product.number()));
        h.pump(1);
    }
}

#[test]
fn successful_body_is_shown_verbatim() {
    let mut h = Harness::new(StubTransport::standard());
    h.app.trigger_fetch(ProductId::One);
    h.pump(1);
    assert_eq!(h.text(), TODO_1);
    assert_eq!(h.app.traffic().total(ProductId::One).bytes_in, TODO_1.len() as u64);
}

#[test]
fn transport_failure_is_shown_with_its_description() {
    let mut h = Harness::new(StubTransport::standard());
    h.app.trigger_fetch(ProductId::Two);
    h.pump(1);
    assert_eq!(
        h.text(),
        "Error fetching product 2: dns error: failed to lookup address information"
    );
}

#[test]
fn empty_body_is_shown_as_no_data() {
    let mut h = Harness::new(StubTransport::standard());
    h.app.trigger_fetch(ProductId::Three);
    h.pump(1);
    assert_eq!(h.text(), "No data received for product 3");
}

#[test]
fn undecodable_body_is_shown_as_no_data() {
    let mut routes = HashMap::new();
    routes.insert(
        "3",
        Ok(HttpResponse {
            status: 200,
            body: vec![0xFF, 0xFE, 0xFD],
        }),
    );
    let mut h = Harness::new(StubTransport { routes });
    h.app.trigger_fetch(ProductId::Three);
    h.pump(1);
    assert_eq!(h.text(), "No data received for product 3");
}

#[test]
fn repeated_activation_converges() {
    let mut h = Harness::new(StubTransport::standard());
    let mut seen = Vec::new();
    for _ in 0..3 {
        h.app.trigger_fetch(ProductId::One);
        h.pump(1);
        seen.push(h.text().to_string());
    }
    assert!(seen.iter().all(|t| t == TODO_1));
    assert_eq!(h.app.traffic().total(ProductId::One).bytes_in, 3 * TODO_1.len() as u64);
}

#[test]
fn rapid_mixed_activations_end_well_formed() {
    let mut h = Harness::new(StubTransport::standard());
    let sequence = [
        ProductId::One,
        ProductId::Three,
        ProductId::Two,
        ProductId::Two,
        ProductId::One,
        ProductId::Three,
        ProductId::One,
    ];
    for product in sequence {
        h.app.trigger_fetch(product);
    }
    h.pump(sequence.len());
    assert!(is_well_formed(h.text()), "unexpected display: {}", h.text());
}
