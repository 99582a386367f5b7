use std::sync::{
    Arc,
    mpsc::{Receiver, Sender},
};
use std::thread;

use app_api::RepaintHandle;
use bus::{CoreCommand, CoreEvent};
use net::{FetchConfig, FetchResult, Transport, fetch_product};

/// Receives fetch commands until every command sender is dropped.
///
/// Each command gets its own worker so overlapping requests never queue
/// behind each other. Completions are posted on `evt_tx` in the order they
/// finish, not the order they were issued; nothing is cancelled or
/// de-duplicated.
pub fn start_net_runtime(
    cmd_rx: Receiver<CoreCommand>,
    evt_tx: Sender<CoreEvent>,
    transport: Arc<dyn Transport>,
    config: FetchConfig,
    repaint: Option<RepaintHandle>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                CoreCommand::FetchProduct { request_id, product } => {
                    log::debug!("request {request_id}: fetching product {product}");
                    let evt_tx = evt_tx.clone();
                    let repaint = repaint.clone();

                    fetch_product(
                        transport.clone(),
                        config.clone(),
                        product,
                        Arc::new(move |result: FetchResult| {
                            // UI may already be gone on shutdown.
                            let _ = evt_tx.send(CoreEvent::FetchFinished { request_id, result });
                            if let Some(repaint) = &repaint {
                                repaint.request_repaint();
                            }
                        }),
                    );
                }
            }
        }
        log::debug!("net runtime: command channel closed");
    })
}
