use std::io::IsTerminal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::{debug, warn};

use probr_common::signal::AbortSignal;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Keyboard listener that triggers the abort signal on `q` or Ctrl-C.
///
/// Raw mode stays on while the handle lives.
pub struct InputHandle {
    stop: Arc<AtomicBool>,
    listener: Option<JoinHandle<()>>,
}

impl InputHandle {
    pub fn start(abort: AbortSignal, disabled: bool) -> Self {
        let stop: Arc<AtomicBool> = Arc::new(AtomicBool::new(false));

        if disabled || !std::io::stdin().is_terminal() {
            return Self { stop, listener: None };
        }

        if let Err(e) = enable_raw_mode() {
            debug!("Keyboard input unavailable: {e}");
            return Self { stop, listener: None };
        }

        let flag = stop.clone();
        let listener = thread::spawn(move || listen(abort, flag));

        Self {
            stop,
            listener: Some(listener),
        }
    }
}

impl Drop for InputHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(listener) = self.listener.take() {
            let _ = listener.join();
            let _ = disable_raw_mode();
        }
    }
}

fn listen(abort: AbortSignal, stop: Arc<AtomicBool>) {
    while !stop.load(Ordering::Relaxed) && !abort.is_triggered() {
        match event::poll(POLL_INTERVAL) {
            Ok(true) => {
                if let Ok(Event::Key(key)) = event::read() {
                    if is_abort_key(&key) {
                        warn!("Finishing early, waiting for in-flight probes");
                        abort.trigger();
                    }
                }
            }
            Ok(false) => {}
            Err(e) => {
                debug!("Stopped reading keyboard input: {e}");
                break;
            }
        }
    }
}

pub fn is_abort_key(key: &KeyEvent) -> bool {
    let is_q = key.code == KeyCode::Char('q');
    let is_ctrl_c =
        key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);

    (is_q || is_ctrl_c) && key.kind == KeyEventKind::Press
}

/// Triggers `abort` on SIGINT when raw mode is not swallowing Ctrl-C.
pub fn watch_ctrl_c(abort: AbortSignal) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, waiting for in-flight probes");
            abort.trigger();
        }
    });
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
