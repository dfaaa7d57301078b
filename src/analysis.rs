//! The analysis form and its results pane.
//!
//! Flow: `Idle -> Submitting -> (success | failure) -> Idle`. The trigger is
//! disabled for the whole `Submitting` phase and is restored by
//! [`AnalysisController::finish`] on both paths.

use crate::api::ApiError;
use crate::events::Effect;
use crate::models::{AnalysisRequest, AnalysisResult, Category, SelectedLocation};
use tracing::{debug, error, info};

pub const IDLE_LABEL: &str = "Get historical weather";
pub const BUSY_LABEL: &str = "Analyzing 20 years of data...";
pub const UNTITLED_EVENT: &str = "Untitled event";
pub const MISSING_DATE: &str = "Please select a date for the analysis.";
pub const INITIAL_PLACEHOLDER: &str = "Pick a place and a date, then run the analysis.";
pub const UNKNOWN_ERROR: &str = "Unknown";

/// Text fields of the query form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub title: String,
    pub date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub enabled: bool,
    pub label: String,
}

/// Display slots of the results pane.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultsView {
    pub pleasant_score: String,
    pub avg_temp: String,
    pub min_temp: String,
    pub max_temp: String,
    pub avg_precip: String,
    pub avg_wind: String,
}

impl From<&AnalysisResult> for ResultsView {
    fn from(r: &AnalysisResult) -> Self {
        Self {
            pleasant_score: r.pleasant_score.to_string(),
            avg_temp: format!("{} °C", r.avg_temp_max),
            min_temp: format!("{} °C", r.historical_min_temp),
            max_temp: format!("{} °C", r.historical_max_temp),
            avg_precip: format!("{} mm", r.avg_precip),
            avg_wind: format!("{} km/h", r.avg_wind),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertView {
    pub title: String,
    pub recommendation: String,
    pub category: Category,
}

/// Result of pressing the trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Sent(Effect),
    /// Validation failed; the message must block until acknowledged.
    Rejected(&'static str),
    /// A request is already in flight.
    Ignored,
}

pub struct AnalysisController {
    phase: Phase,
    trigger: Trigger,
    placeholder: String,
    placeholder_visible: bool,
    results: ResultsView,
    results_visible: bool,
    alert: Option<AlertView>,
}

impl Default for AnalysisController {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisController {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            trigger: Trigger {
                enabled: true,
                label: IDLE_LABEL.to_string(),
            },
            placeholder: INITIAL_PLACEHOLDER.to_string(),
            placeholder_visible: true,
            results: ResultsView::default(),
            results_visible: false,
            alert: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder_visible.then_some(self.placeholder.as_str())
    }

    pub fn results(&self) -> Option<&ResultsView> {
        self.results_visible.then_some(&self.results)
    }

    pub fn alert(&self) -> Option<&AlertView> {
        self.alert.as_ref()
    }

    pub fn submit(&mut self, location: &SelectedLocation, form: &FormState) -> Submission {
        if !self.trigger.enabled {
            debug!("Submit ignored, a request is already running");
            return Submission::Ignored;
        }
        if form.date.trim().is_empty() {
            return Submission::Rejected(MISSING_DATE);
        }

        let title = if form.title.is_empty() {
            UNTITLED_EVENT.to_string()
        } else {
            form.title.clone()
        };
        let request = AnalysisRequest {
            lat: location.lat,
            lon: location.lon,
            date: form.date.trim().to_string(),
            title,
            location_name: location.name.clone(),
        };
        info!(
            "Requesting analysis for {} at ({}, {})",
            request.date, request.lat, request.lon
        );

        self.phase = Phase::Submitting;
        self.trigger = Trigger {
            enabled: false,
            label: BUSY_LABEL.to_string(),
        };
        self.alert = None;
        Submission::Sent(Effect::SubmitAnalysis(request))
    }

    /// Applies the server's answer. A success asks for a history refresh.
    pub fn finish(&mut self, outcome: Result<AnalysisResult, ApiError>) -> Option<Effect> {
        let follow_up = match outcome {
            Ok(result) => {
                self.results = ResultsView::from(&result);
                self.alert = result.alert.map(|a| AlertView {
                    title: a.title,
                    recommendation: a.recommendation,
                    category: a.category,
                });
                self.placeholder_visible = false;
                self.results_visible = true;
                Some(Effect::FetchHistory)
            }
            Err(e) => {
                error!("Analysis failed: {}", e);
                let message = e.server_message().unwrap_or(UNKNOWN_ERROR);
                self.placeholder = format!("Error: {}", message);
                self.placeholder_visible = true;
                self.results_visible = false;
                None
            }
        };

        self.phase = Phase::Idle;
        self.trigger = Trigger {
            enabled: true,
            label: IDLE_LABEL.to_string(),
        };
        follow_up
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Reading, WeatherAlert};

    fn location() -> SelectedLocation {
        SelectedLocation {
            lat: 28.6329,
            lon: -106.0691,
            name: "Chihuahua".into(),
        }
    }

    fn form(title: &str, date: &str) -> FormState {
        FormState {
            title: title.into(),
            date: date.into(),
        }
    }

    fn result(alert: Option<WeatherAlert>) -> AnalysisResult {
        AnalysisResult {
            pleasant_score: Reading::from("82"),
            avg_temp_max: Reading::from("18"),
            historical_min_temp: Reading::from("2"),
            historical_max_temp: Reading::from("24"),
            avg_precip: Reading::from("0.5"),
            avg_wind: Reading::from("10"),
            alert,
        }
    }

    #[test]
    fn empty_date_is_rejected_without_request() {
        let mut analysis = AnalysisController::new();
        let submission = analysis.submit(&location(), &form("Posada", ""));
        assert_eq!(submission, Submission::Rejected(MISSING_DATE));
        assert_eq!(analysis.phase(), Phase::Idle);
        assert!(analysis.trigger().enabled);
    }

    #[test]
    fn submit_builds_payload_and_disables_trigger() {
        let mut analysis = AnalysisController::new();
        let submission = analysis.submit(&location(), &form("", "2025-12-25"));
        assert_eq!(
            submission,
            Submission::Sent(Effect::SubmitAnalysis(AnalysisRequest {
                lat: 28.6329,
                lon: -106.0691,
                date: "2025-12-25".into(),
                title: UNTITLED_EVENT.into(),
                location_name: "Chihuahua".into(),
            }))
        );
        assert_eq!(analysis.phase(), Phase::Submitting);
        assert_eq!(
            analysis.trigger(),
            &Trigger {
                enabled: false,
                label: BUSY_LABEL.into()
            }
        );
        assert_eq!(
            analysis.submit(&location(), &form("", "2025-12-25")),
            Submission::Ignored
        );
    }

    #[test]
    fn success_copies_readings_and_requests_history() {
        let mut analysis = AnalysisController::new();
        analysis.submit(&location(), &form("Posada", "2025-12-25"));
        let follow_up = analysis.finish(Ok(result(None)));

        assert_eq!(follow_up, Some(Effect::FetchHistory));
        let view = analysis.results().unwrap();
        assert_eq!(view.pleasant_score, "82");
        assert_eq!(view.avg_temp, "18 °C");
        assert_eq!(view.min_temp, "2 °C");
        assert_eq!(view.max_temp, "24 °C");
        assert_eq!(view.avg_precip, "0.5 mm");
        assert_eq!(view.avg_wind, "10 km/h");
        assert!(analysis.alert().is_none());
        assert!(analysis.placeholder().is_none());
        assert_eq!(analysis.trigger().label, IDLE_LABEL);
        assert!(analysis.trigger().enabled);
    }

    #[test]
    fn alert_is_shown_only_when_present() {
        let mut analysis = AnalysisController::new();
        analysis.submit(&location(), &form("Picnic", "2025-07-01"));
        analysis.finish(Ok(result(Some(WeatherAlert {
            title: "VERY HOT DAY".into(),
            recommendation: "Bring a hat.".into(),
            category: Category::Warning,
        }))));
        let alert = analysis.alert().unwrap();
        assert_eq!(alert.title, "VERY HOT DAY");
        assert_eq!(alert.category, Category::Warning);

        analysis.submit(&location(), &form("Picnic", "2025-07-02"));
        assert!(analysis.alert().is_none());
        analysis.finish(Ok(result(None)));
        assert!(analysis.alert().is_none());
    }

    #[test]
    fn server_error_message_is_shown() {
        let mut analysis = AnalysisController::new();
        analysis.submit(&location(), &form("Posada", "2025-12-25"));
        let follow_up = analysis.finish(Err(ApiError::Status {
            status: 404,
            message: Some("No historical data.".into()),
        }));
        assert_eq!(follow_up, None);
        assert_eq!(analysis.placeholder(), Some("Error: No historical data."));
        assert!(analysis.results().is_none());
        assert_eq!(analysis.trigger().label, IDLE_LABEL);
        assert!(analysis.trigger().enabled);
    }

    #[test]
    fn failure_without_message_says_unknown() {
        let mut analysis = AnalysisController::new();
        analysis.submit(&location(), &form("Posada", "2025-12-25"));
        analysis.finish(Ok(result(None)));

        analysis.submit(&location(), &form("Posada", "2025-12-26"));
        let decode_error = serde_json::from_str::<AnalysisResult>("not json").unwrap_err();
        analysis.finish(Err(ApiError::Decode(decode_error)));
        assert_eq!(analysis.placeholder(), Some("Error: Unknown"));
        assert!(analysis.results().is_none());
        assert_eq!(analysis.phase(), Phase::Idle);
    }
}
