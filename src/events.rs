//! Event types and the main event loop driver.
//!
//! Three enums flow through the application:
//!
//! * [`Event`] is what the main loop receives: terminal input, ticks, and the
//!   completions of network work started by the runtime.
//! * [`Action`] is what the controllers react to. Gestures and key presses
//!   are translated into actions by [`App`](crate::app::App).
//! * [`Effect`] is the I/O a controller asks for. The
//!   [`Dispatcher`](crate::runtime::Dispatcher) performs it and answers with
//!   an [`Event`].

use crate::api::ApiError;
use crate::models::{AnalysisRequest, AnalysisResult, HistoryItem};
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind, MouseEvent};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::error;

/// Events processed by the application event loop.
#[derive(Debug)]
pub enum Event {
    /// Periodic tick used to redraw.
    Tick,
    /// User key press from the terminal.
    Input(KeyEvent),
    /// Mouse click, drag or release.
    Mouse(MouseEvent),
    /// Terminal size changed.
    Resize,
    /// A reverse geocode lookup finished.
    LocationResolved {
        /// Sequence number handed out when the lookup was issued.
        seq: u64,
        /// `Ok(None)` means the provider answered without a display name.
        outcome: Result<Option<String>, ApiError>,
    },
    /// `GET /api/history` finished.
    HistoryLoaded(Result<Vec<HistoryItem>, ApiError>),
    /// `POST /api/historical_averages` finished.
    AnalysisFinished(Result<AnalysisResult, ApiError>),
}

/// Where a location change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// Click on the map; the marker has to jump to the click.
    Click,
    /// Marker drag released; the marker is already there.
    DragEnd,
    /// Arrow key in map focus.
    Nudge,
}

/// User intents the controllers react to.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    LocationChanged { lat: f64, lon: f64, origin: ChangeOrigin },
    HistorySelected(usize),
    SubmitRequested,
}

/// Network work requested by a controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ReverseGeocode { seq: u64, lat: f64, lon: f64 },
    FetchHistory,
    SubmitAnalysis(AnalysisRequest),
}

/// Multiplexes terminal input and ticks into a single event stream.
///
/// The sender ([`tx`](EventHandler::tx)) is cloned into the dispatcher so
/// network completions land on the same channel as key presses.
pub struct EventHandler {
    pub tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Creates a new event handler and spawns the input/tick task.
    ///
    /// The task polls crossterm with a timeout of `tick_rate_ms`. If the
    /// terminal stops answering the task logs the error and exits, which
    /// closes the input side of the channel.
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        tokio::spawn(async move {
            let tick_rate = Duration::from_millis(tick_rate_ms);
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::from_secs(0));
                match event::poll(timeout) {
                    Ok(true) => match event::read() {
                        Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                            event_tx.send(Event::Input(key)).ok();
                        }
                        Ok(CrosstermEvent::Mouse(mouse)) => {
                            event_tx.send(Event::Mouse(mouse)).ok();
                        }
                        Ok(CrosstermEvent::Resize(_, _)) => {
                            event_tx.send(Event::Resize).ok();
                        }
                        Ok(_) => {}
                        Err(e) => {
                            error!("Terminal read failed: {}", e);
                            break;
                        }
                    },
                    Ok(false) => {}
                    Err(e) => {
                        error!("Terminal poll failed: {}", e);
                        break;
                    }
                }
                if last_tick.elapsed() >= tick_rate {
                    if event_tx.send(Event::Tick).is_err() {
                        break;
                    }
                    last_tick = Instant::now();
                }
            }
        });

        Self { tx, rx }
    }

    /// Receives the next event from the channel.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}
