use crate::goal;
use crate::model::{
    round_coordinate, DispatchOutcome, DispatchReport, GoalRequest, COORD_DECIMALS, COORD_MAX,
    COORD_MIN, COORD_STEP,
};
use crate::orchestrator::DispatchEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Map,
    X,
    Y,
}

impl Field {
    pub fn next(self) -> Self {
        match self {
            Field::Map => Field::X,
            Field::X => Field::Y,
            Field::Y => Field::Map,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Field::Map => Field::Y,
            Field::X => Field::Map,
            Field::Y => Field::X,
        }
    }
}

/// A numeric input that behaves like a spin box: free text while editing,
/// clamped and rounded to the input precision once committed.
#[derive(Debug, Clone)]
pub struct SpinField {
    value: f64,
    text: String,
}

impl SpinField {
    pub fn new(value: f64) -> Self {
        let value = clamp_coordinate(value);
        Self {
            value,
            text: format_spin(value),
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn push(&mut self, c: char) {
        if c.is_ascii_digit() || c == '.' || c == '-' {
            self.text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Parse the edited text. Unparseable text reverts to the last value.
    pub fn commit(&mut self) {
        if let Ok(v) = self.text.trim().parse::<f64>() {
            if v.is_finite() {
                self.value = clamp_coordinate(v);
            }
        }
        self.text = format_spin(self.value);
    }

    pub fn step(&mut self, steps: f64) {
        self.commit();
        self.value = clamp_coordinate(self.value + steps * COORD_STEP);
        self.text = format_spin(self.value);
    }
}

fn clamp_coordinate(v: f64) -> f64 {
    round_coordinate(v.clamp(COORD_MIN, COORD_MAX))
}

fn format_spin(v: f64) -> String {
    format!("{:.*}", COORD_DECIMALS as usize, v)
}

pub struct UiState {
    pub focus: Field,
    pub map_input: String,
    pub x: SpinField,
    pub y: SpinField,
    pub show_help: bool,
    pub dispatching: bool,
    pub info: String,
    pub topic: String,
    pub message_type: String,
    pub last_report: Option<DispatchReport>,
    pub sent_count: u64,
    pub failed_count: u64,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            focus: Field::Map,
            map_input: String::new(),
            x: SpinField::new(0.0),
            y: SpinField::new(0.0),
            show_help: false,
            dispatching: false,
            info: String::new(),
            topic: String::new(),
            message_type: String::new(),
            last_report: None,
            sent_count: 0,
            failed_count: 0,
        }
    }
}

impl UiState {
    pub fn set_focus(&mut self, field: Field) {
        self.commit_focused();
        self.focus = field;
    }

    pub fn focus_next(&mut self) {
        self.set_focus(self.focus.next());
    }

    pub fn focus_prev(&mut self) {
        self.set_focus(self.focus.prev());
    }

    fn commit_focused(&mut self) {
        match self.focus {
            Field::Map => {}
            Field::X => self.x.commit(),
            Field::Y => self.y.commit(),
        }
    }

    pub fn input_char(&mut self, c: char) {
        match self.focus {
            Field::Map => {
                if !c.is_control() {
                    self.map_input.push(c);
                }
            }
            Field::X => self.x.push(c),
            Field::Y => self.y.push(c),
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            Field::Map => {
                self.map_input.pop();
            }
            Field::X => self.x.backspace(),
            Field::Y => self.y.backspace(),
        }
    }

    pub fn clear_field(&mut self) {
        match self.focus {
            Field::Map => self.map_input.clear(),
            Field::X => self.x.clear(),
            Field::Y => self.y.clear(),
        }
    }

    /// Step the focused spin field; returns false on the map field.
    pub fn step(&mut self, steps: f64) -> bool {
        match self.focus {
            Field::Map => false,
            Field::X => {
                self.x.step(steps);
                true
            }
            Field::Y => {
                self.y.step(steps);
                true
            }
        }
    }

    /// Commit pending edits and snapshot the form as a request.
    pub fn take_request(&mut self) -> GoalRequest {
        self.commit_focused();
        GoalRequest::new(self.map_input.clone(), self.x.value(), self.y.value())
    }

    /// Payload the current form would send, if it is valid.
    pub fn preview_payload(&self) -> Option<String> {
        goal::build(&self.map_input, self.x.value(), self.y.value())
            .ok()
            .map(|m| goal::to_payload(&m))
    }

    pub fn apply_event(&mut self, ev: DispatchEvent) {
        match ev {
            DispatchEvent::Dispatching => {
                self.dispatching = true;
                self.info = "Sending…".into();
            }
            DispatchEvent::Completed(report) => {
                self.dispatching = false;
                match &report.outcome {
                    DispatchOutcome::Sent if report.dry_run => {
                        self.info = "Dry run: goal not published".into();
                    }
                    DispatchOutcome::Sent => {
                        self.sent_count += 1;
                        self.info = "✅ Goal published!".into();
                    }
                    DispatchOutcome::Failed(reason) => {
                        self.failed_count += 1;
                        self.info = reason.clone();
                    }
                }
                self.last_report = Some(*report);
            }
            DispatchEvent::Info(msg) => {
                self.dispatching = false;
                self.info = msg;
            }
        }
    }

    pub fn last_failed(&self) -> bool {
        self.last_report
            .as_ref()
            .is_some_and(|r| !r.outcome.is_sent())
    }
}
