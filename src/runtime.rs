//! Executes [`Effect`]s.
//!
//! Each effect runs on its own tokio task and reports back through the
//! event channel. Tasks never touch application state, so ordering is
//! decided entirely by the main loop.

use crate::api::{Geocoder, WeatherApi};
use crate::events::{Effect, Event};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct Dispatcher {
    api: Arc<WeatherApi>,
    geocoder: Arc<Geocoder>,
    tx: UnboundedSender<Event>,
}

impl Dispatcher {
    pub fn new(api: WeatherApi, geocoder: Geocoder, tx: UnboundedSender<Event>) -> Self {
        Self {
            api: Arc::new(api),
            geocoder: Arc::new(geocoder),
            tx,
        }
    }

    pub fn run(&self, effect: Effect) {
        debug!("Effect: {:?}", effect);
        let tx = self.tx.clone();
        match effect {
            Effect::ReverseGeocode { seq, lat, lon } => {
                let geocoder = Arc::clone(&self.geocoder);
                tokio::spawn(async move {
                    let outcome = geocoder.reverse(lat, lon).await;
                    send(&tx, Event::LocationResolved { seq, outcome });
                });
            }
            Effect::FetchHistory => {
                let api = Arc::clone(&self.api);
                tokio::spawn(async move {
                    let outcome = api.fetch_history().await;
                    send(&tx, Event::HistoryLoaded(outcome));
                });
            }
            Effect::SubmitAnalysis(request) => {
                let api = Arc::clone(&self.api);
                tokio::spawn(async move {
                    let outcome = api.request_analysis(&request).await;
                    send(&tx, Event::AnalysisFinished(outcome));
                });
            }
        }
    }
}

fn send(tx: &UnboundedSender<Event>, event: Event) {
    if tx.send(event).is_err() {
        warn!("Event loop is gone, dropping network result");
    }
}
