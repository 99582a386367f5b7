use std::process::ExitCode;
use std::sync::Arc;

use app_api::UiApp;
use bus::Bus;
use net::{FetchConfig, ReqwestTransport};
use platform::Platform;
use runtime_net::start_net_runtime;
use viewer::ViewerApp;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let platform = match Platform::new(viewer::view::TITLE) {
        Ok(p) => p,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let repaint = platform.repaint_handle();

    let config = FetchConfig::default();
    let transport = match ReqwestTransport::new(&config) {
        Ok(t) => Arc::new(t),
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let Bus { cmd_tx, cmd_rx, evt_tx, evt_rx } = Bus::new();
    start_net_runtime(cmd_rx, evt_tx, transport, config, Some(repaint.clone()));

    let mut app = ViewerApp::new();
    app.set_bus_sender(cmd_tx);
    app.set_repaint_handle(repaint);

    log::info!("starting {}", viewer::view::TITLE);
    match platform.run(Box::new(app), evt_rx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
