use crate::domain::outcome::EngineState;
use crate::domain::ports::ProgressSink;
use std::io::Write;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

const FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
const TICK: Duration = Duration::from_millis(100);

/// Animated stderr spinner showing the engine's current state.
///
/// The animation runs on its own task. A terminal state stops it and its
/// closing line is written before `transition` returns, so the line is on
/// stderr even if the spinner is dropped right after.
pub struct Spinner {
    state: watch::Sender<EngineState>,
    handle: JoinHandle<()>,
}

impl Spinner {
    /// Must be called from within a tokio runtime.
    pub fn start() -> Self {
        let (state, rx) = watch::channel(EngineState::Idle);
        let handle = tokio::spawn(animate(rx));
        Self { state, handle }
    }
}

async fn animate(rx: watch::Receiver<EngineState>) {
    let mut ticker = tokio::time::interval(TICK);
    for frame in FRAMES.iter().cycle() {
        ticker.tick().await;
        // The state is read under the stderr lock; the closing line is
        // written under the same lock, so no frame can follow it.
        let mut stderr = std::io::stderr().lock();
        let state = *rx.borrow();
        if state.is_terminal() {
            return;
        }
        let _ = write!(stderr, "\r{} {}\x1b[K", frame, state);
        let _ = stderr.flush();
    }
}

fn closing_line(state: EngineState) -> String {
    let mark = if state == EngineState::Converged { '✔' } else { '✘' };
    format!("\r{} {}\x1b[K\n", mark, state)
}

impl ProgressSink for Spinner {
    fn transition(&self, state: EngineState) {
        if !state.is_terminal() {
            self.state.send_replace(state);
            return;
        }
        let mut stderr = std::io::stderr().lock();
        self.state.send_replace(state);
        self.handle.abort();
        let _ = stderr.write_all(closing_line(state).as_bytes());
        let _ = stderr.flush();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
