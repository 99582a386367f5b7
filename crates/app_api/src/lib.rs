use std::fmt;
use std::sync::Arc;
use std::sync::mpsc::Sender;

use bus::{CoreCommand, CoreEvent};
use egui::Context;

/// Wakes the UI thread so it drains pending `CoreEvent`s and repaints.
/// Safe to call from any thread.
#[derive(Clone)]
pub struct RepaintHandle(Arc<dyn Fn() + Send + Sync>);

impl RepaintHandle {
    pub fn new(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn request_repaint(&self) {
        (self.0)()
    }
}

impl fmt::Debug for RepaintHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RepaintHandle")
    }
}

/// What the platform host drives. All methods run on the UI thread.
pub trait UiApp {
    fn ui(&mut self, ctx: &Context);
    fn set_bus_sender(&mut self, tx: Sender<CoreCommand>);
    fn on_core_event(&mut self, evt: CoreEvent);
    fn set_repaint_handle(&mut self, h: RepaintHandle);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn repaint_handle_clones_share_the_waker() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let handle = RepaintHandle::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let other = handle.clone();
        std::thread::spawn(move || other.request_repaint()).join().unwrap();
        handle.request_repaint();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
