use std::time::{Duration, Instant};

use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};
use tracing::trace;

/// Line editor for the search input. Unlike a submit-only prompt, every
/// text change is reported so the model can feed it into the debouncer.
#[derive(Default)]
pub struct Inputter {
    current_input: String,
    curser_pos: usize,
    finished: bool,
    canceled: bool,
    changed: bool,
}

#[derive(Default, Clone, Debug)]
pub struct InputResult {
    pub input: String,
    pub finished: bool,
    pub canceled: bool,
    pub changed: bool,
    pub curser_pos: usize,
}

impl Inputter {
    pub fn read(&mut self, key: event::KeyEvent) -> InputResult {
        self.changed = false;
        match (key.code, key.modifiers) {
            (KeyCode::Enter, KeyModifiers::NONE) => self.enter(),
            (KeyCode::Esc, KeyModifiers::NONE) => self.escape(),
            (KeyCode::Backspace, KeyModifiers::NONE) => self.backspace(),
            (KeyCode::Left, KeyModifiers::NONE) => self.left(),
            (KeyCode::Right, KeyModifiers::NONE) => self.right(),
            (kc, km) => self.key(kc, km),
        }
    }

    pub fn set(&mut self, s: &str) {
        self.current_input = s.to_string();
        self.curser_pos = self.current_input.chars().count();
    }

    pub fn get(&self) -> InputResult {
        InputResult {
            canceled: self.canceled,
            finished: self.finished,
            changed: self.changed,
            input: self.current_input.clone(),
            curser_pos: self.curser_pos,
        }
    }

    pub fn clear(&mut self) {
        self.canceled = false;
        self.finished = false;
        self.changed = false;
        self.current_input.clear();
        self.curser_pos = 0;
    }

    fn enter(&mut self) -> InputResult {
        self.finished = true;
        self.get()
    }

    fn escape(&mut self) -> InputResult {
        self.clear();
        self.canceled = true;
        self.finished = true;
        self.get()
    }

    fn backspace(&mut self) -> InputResult {
        if self.curser_pos > 0 {
            self.curser_pos -= 1;
            let byte = self.getbytepos();
            self.current_input.remove(byte);
            self.changed = true;
        }
        self.get()
    }

    fn left(&mut self) -> InputResult {
        self.curser_pos = self.curser_pos.saturating_sub(1);
        self.get()
    }

    fn right(&mut self) -> InputResult {
        if self.curser_pos < self.current_input.chars().count() {
            self.curser_pos += 1;
        }
        self.get()
    }

    fn key(&mut self, code: KeyCode, _modifier: KeyModifiers) -> InputResult {
        if let Some(chr) = code.as_char() {
            self.current_input.insert(self.getbytepos(), chr);
            self.curser_pos += 1;
            self.changed = true;
        }
        self.get()
    }

    fn getbytepos(&self) -> usize {
        self.current_input
            .char_indices()
            .nth(self.curser_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}

/// Cancellable single-slot timer: each new value overwrites the pending
/// slot and restarts the quiet window, so only the last value of a
/// burst is ever delivered.
pub struct Debouncer {
    window: Duration,
    pending: Option<(Instant, String)>,
}

impl Debouncer {
    pub fn new(window_ms: u64) -> Self {
        Debouncer {
            window: Duration::from_millis(window_ms),
            pending: None,
        }
    }

    pub fn push(&mut self, value: String) {
        trace!("Debounce slot <- \"{}\"", value);
        self.pending = Some((Instant::now(), value));
    }

    /// Delivers the pending value once the quiet window has passed.
    pub fn poll(&mut self) -> Option<String> {
        match &self.pending {
            Some((since, _)) if since.elapsed() >= self.window => {
                self.pending.take().map(|(_, value)| value)
            }
            _ => None,
        }
    }

    /// Delivers the pending value immediately (explicit commit).
    pub fn flush(&mut self) -> Option<String> {
        self.pending.take().map(|(_, value)| value)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyEvent;

    fn press(inputter: &mut Inputter, code: KeyCode) -> InputResult {
        inputter.read(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn typing_reports_changes() {
        let mut input = Inputter::default();
        let r = press(&mut input, KeyCode::Char('w'));
        assert!(r.changed);
        assert_eq!(r.input, "w");
        let r = press(&mut input, KeyCode::Char('i'));
        assert_eq!(r.input, "wi");
        assert_eq!(r.curser_pos, 2);
    }

    #[test]
    fn backspace_removes_at_curser() {
        let mut input = Inputter::default();
        input.set("wind");
        press(&mut input, KeyCode::Left);
        press(&mut input, KeyCode::Left);
        let r = press(&mut input, KeyCode::Backspace);
        assert_eq!(r.input, "wnd");
        assert!(r.changed);
    }

    #[test]
    fn escape_clears_and_cancels() {
        let mut input = Inputter::default();
        input.set("wind");
        let r = press(&mut input, KeyCode::Esc);
        assert!(r.canceled);
        assert!(r.finished);
        assert_eq!(r.input, "");
    }

    #[test]
    fn debouncer_keeps_only_the_last_value() {
        let mut debounce = Debouncer::new(0);
        debounce.push("w".into());
        debounce.push("wi".into());
        debounce.push("win".into());
        assert_eq!(debounce.poll(), Some("win".into()));
        assert_eq!(debounce.poll(), None);
    }

    #[test]
    fn debouncer_waits_for_the_quiet_window() {
        let mut debounce = Debouncer::new(10_000);
        debounce.push("wind".into());
        assert_eq!(debounce.poll(), None);
        assert_eq!(debounce.flush(), Some("wind".into()));
        assert_eq!(debounce.flush(), None);
    }

    #[test]
    fn cancel_empties_the_slot() {
        let mut debounce = Debouncer::new(0);
        debounce.push("wind".into());
        debounce.cancel();
        assert_eq!(debounce.poll(), None);
    }
}
