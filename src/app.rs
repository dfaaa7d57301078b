use crate::analysis::{AnalysisController, FormState, Submission};
use crate::config::Config;
use crate::events::{Action, ChangeOrigin, Effect, Event};
use crate::history::HistoryPanel;
use crate::map::MapController;
use crate::models::SelectedLocation;
use crate::ui::{self, HISTORY_ROW_HEIGHT};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::debug;

/// Which part of the screen receives key presses.
#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub enum Focus {
    #[default]
    Map,
    Title,
    Date,
    History,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Map => Focus::Title,
            Focus::Title => Focus::Date,
            Focus::Date => Focus::History,
            Focus::History => Focus::Map,
        }
    }

    fn previous(self) -> Self {
        match self {
            Focus::Map => Focus::History,
            Focus::Title => Focus::Map,
            Focus::Date => Focus::Title,
            Focus::History => Focus::Date,
        }
    }
}

/// Owns the three controllers and routes actions between them.
///
/// No method here does I/O. Work that needs the network is queued as an
/// [`Effect`] and collected by the main loop through [`App::take_effects`].
pub struct App {
    pub map: MapController,
    pub history: HistoryPanel,
    pub analysis: AnalysisController,
    pub form: FormState,
    pub focus: Focus,
    /// Blocking message; swallows the next key press.
    pub notice: Option<String>,
    pub tick_count: usize,
    pub should_quit: bool,
    effects: Vec<Effect>,
}

impl App {
    /// Builds the app centered on `(lat, lon)`.
    pub fn new(config: &Config, lat: f64, lon: f64) -> Self {
        Self {
            map: MapController::from_config(&config.map, lat, lon),
            history: HistoryPanel::new(),
            analysis: AnalysisController::new(),
            form: FormState::default(),
            focus: Focus::default(),
            notice: None,
            tick_count: 0,
            should_quit: false,
            effects: Vec::new(),
        }
    }

    /// Startup work: name the starting point and load the history list.
    pub fn start(&mut self) {
        let lookup = self.map.initialize();
        self.effects.push(lookup);
        self.effects.push(self.history.refresh());
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn dispatch(&mut self, action: Action) {
        debug!("Action: {:?}", action);
        match action {
            Action::LocationChanged { lat, lon, origin } => {
                let lookup = self.map.on_location_change(lat, lon, origin);
                self.effects.push(lookup);
            }
            Action::HistorySelected(index) => {
                let Some(item) = self.history.get(index).cloned() else {
                    return;
                };
                self.history.select(index);
                self.form.title = item.title;
                self.form.date = item.date;
                let lookup = self.map.recenter(SelectedLocation {
                    lat: item.location.lat,
                    lon: item.location.lon,
                    name: item.location.name,
                });
                self.effects.push(lookup);
                self.dispatch(Action::SubmitRequested);
            }
            Action::SubmitRequested => {
                match self.analysis.submit(self.map.selected(), &self.form) {
                    Submission::Sent(effect) => self.effects.push(effect),
                    Submission::Rejected(message) => self.notice = Some(message.to_string()),
                    Submission::Ignored => {}
                }
            }
        }
    }

    /// Handles one event from the main loop. `frame` is the current
    /// terminal size, needed to hit-test mouse events.
    pub fn on_event(&mut self, event: Event, frame: Rect) {
        match event {
            Event::Tick => self.tick_count += 1,
            Event::Input(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse, frame),
            Event::Resize => {}
            Event::LocationResolved { seq, outcome } => {
                self.map.on_name_resolved(seq, outcome);
            }
            Event::HistoryLoaded(outcome) => self.history.on_loaded(outcome),
            Event::AnalysisFinished(outcome) => {
                if let Some(effect) = self.analysis.finish(outcome) {
                    self.effects.push(effect);
                }
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.notice.take().is_some() {
            return;
        }

        let ctrl_c = key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');
        if ctrl_c || key.code == KeyCode::Esc {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.previous();
                return;
            }
            _ => {}
        }

        match self.focus {
            Focus::Title | Focus::Date => self.handle_text_key(key),
            Focus::Map => self.handle_map_key(key),
            Focus::History => self.handle_history_key(key),
        }
    }

    fn handle_text_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Enter {
            self.dispatch(Action::SubmitRequested);
            return;
        }
        let field = if self.focus == Focus::Title {
            &mut self.form.title
        } else {
            &mut self.form.date
        };
        match key.code {
            KeyCode::Char(c) => field.push(c),
            KeyCode::Backspace => {
                field.pop();
            }
            _ => {}
        }
    }

    fn handle_map_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Enter => self.dispatch(Action::SubmitRequested),
            KeyCode::Char('r') => self.effects.push(self.history.refresh()),
            KeyCode::Char('+') | KeyCode::Char('=') => self.map.zoom_in(),
            KeyCode::Char('-') => self.map.zoom_out(),
            KeyCode::Up => self.nudge(1, 0),
            KeyCode::Down => self.nudge(-1, 0),
            KeyCode::Right => self.nudge(0, 1),
            KeyCode::Left => self.nudge(0, -1),
            _ => {}
        }
    }

    fn nudge(&mut self, north: i32, east: i32) {
        let lookup = self.map.nudge(north, east);
        self.effects.push(lookup);
    }

    fn handle_history_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') => self.effects.push(self.history.refresh()),
            KeyCode::Down | KeyCode::Char('j') => self.history.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.history.select_previous(),
            KeyCode::Enter => {
                if !self.history.items().is_empty() {
                    self.dispatch(Action::HistorySelected(self.history.selected_index()));
                }
            }
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent, frame: Rect) {
        if self.notice.is_some() {
            if let MouseEventKind::Down(_) = mouse.kind {
                self.notice = None;
            }
            return;
        }

        let areas = ui::layout(frame);
        let (col, row) = (mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if inside(areas.map_canvas, col, row) {
                    self.focus = Focus::Map;
                    if self.map.marker_hit(areas.map_canvas, col, row) {
                        self.map.start_drag();
                    } else if let Some((lat, lon)) =
                        self.map.viewport().cell_to_coords(areas.map_canvas, col, row)
                    {
                        self.dispatch(Action::LocationChanged {
                            lat,
                            lon,
                            origin: ChangeOrigin::Click,
                        });
                    }
                } else if inside(areas.trigger, col, row) {
                    self.dispatch(Action::SubmitRequested);
                } else if inside(areas.title_field, col, row) {
                    self.focus = Focus::Title;
                } else if inside(areas.date_field, col, row) {
                    self.focus = Focus::Date;
                } else if inside(areas.history_list, col, row) {
                    self.focus = Focus::History;
                    let list = areas.history_list;
                    let offset = ui::history_offset(self.history.selected_index(), list.height);
                    let index = offset + ((row - list.y) / HISTORY_ROW_HEIGHT) as usize;
                    if index < self.history.items().len() {
                        self.dispatch(Action::HistorySelected(index));
                    }
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.map.drag_to(areas.map_canvas, col, row);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some((lat, lon)) = self.map.finish_drag() {
                    self.dispatch(Action::LocationChanged {
                        lat,
                        lon,
                        origin: ChangeOrigin::DragEnd,
                    });
                }
            }
            MouseEventKind::ScrollUp if inside(areas.map_canvas, col, row) => self.map.zoom_in(),
            MouseEventKind::ScrollDown if inside(areas.map_canvas, col, row) => {
                self.map.zoom_out()
            }
            _ => {}
        }
    }
}

fn inside(area: Rect, col: u16, row: u16) -> bool {
    col >= area.x && col < area.x + area.width && row >= area.y && row < area.y + area.height
}
