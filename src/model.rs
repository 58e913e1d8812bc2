use std::fs;
use std::time::Instant;

use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use tracing::{debug, error, info, trace};

use crate::charts::{self, ImpactSummary};
use crate::domain::{DashConfig, DashError, HELP_TEXT, Message};
use crate::export;
use crate::filter::{FilterState, VisibilitySet, compute_visibility};
use crate::inputter::{Debouncer, InputResult, Inputter};
use crate::provider::DataProvider;
use crate::rows::{COLUMN_COUNT, ColumnId, RowSet, build_rows, sector_values};
use crate::sort::{self, SortState};

const PAGE_STEP: usize = 10;

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    LOADING,
    QUITTING,
}

#[derive(Debug, Clone, Copy)]
enum Modus {
    TABLE,
    RECORD,
    POPUP,
    INPUT,
}

/// Field-per-line detail view of one policy.
#[derive(Debug, Clone)]
pub struct RecordData {
    pub fields: Vec<(String, String)>,
    pub position: usize,
    pub total: usize,
}

/// Immutable snapshot the UI renders each frame. The model rebuilds it
/// after every mutation; the UI never reaches back into the model.
pub struct UIData {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
    pub selected_row: usize,
    pub selected_column: usize,
    pub no_results: bool,
    pub sector_chart: Vec<(String, u64)>,
    pub summary: ImpactSummary,
    pub search_term: String,
    pub sector_label: String,
    pub record: Option<RecordData>,
    pub show_popup: bool,
    pub popup_message: String,
    pub cmdinput: InputResult,
    pub active_cmdinput: bool,
    pub status_message: String,
    pub last_status_message_update: Instant,
    pub last_update: Instant,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            title: String::new(),
            headers: Vec::new(),
            rows: Vec::new(),
            total_rows: 0,
            selected_row: 0,
            selected_column: 0,
            no_results: false,
            sector_chart: Vec::new(),
            summary: ImpactSummary::default(),
            search_term: String::new(),
            sector_label: String::new(),
            record: None,
            show_popup: false,
            popup_message: String::new(),
            cmdinput: InputResult::default(),
            active_cmdinput: false,
            status_message: String::new(),
            last_status_message_update: Instant::now(),
            last_update: Instant::now(),
        }
    }
}

pub struct Model {
    config: DashConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    provider: Box<dyn DataProvider>,
    rows: RowSet,
    order: Vec<usize>,
    view: Vec<usize>,
    sort: Option<SortState>,
    filter: FilterState,
    visibility: VisibilitySet,
    facets: Vec<String>,
    facet_idx: usize,
    sector_chart: Vec<(String, u64)>,
    summary: ImpactSummary,
    curser_row: usize,
    curser_column: usize,
    record_pos: usize,
    clipboard: Option<Clipboard>,
    input: Inputter,
    last_input: InputResult,
    active_cmdinput: bool,
    debounce: Debouncer,
    status_message: String,
    last_status_message_update: Instant,
    uidata: UIData,
}

impl Model {
    pub fn init(config: &DashConfig, provider: Box<dyn DataProvider>) -> Result<Self, DashError> {
        let mut model = Self {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            provider,
            rows: Vec::new(),
            order: Vec::new(),
            view: Vec::new(),
            sort: None,
            filter: FilterState::default(),
            visibility: VisibilitySet::default(),
            facets: Vec::new(),
            facet_idx: 0,
            sector_chart: Vec::new(),
            summary: ImpactSummary::default(),
            curser_row: 0,
            curser_column: 0,
            record_pos: 0,
            clipboard: None,
            input: Inputter::default(),
            last_input: InputResult::default(),
            active_cmdinput: false,
            debounce: Debouncer::new(config.debounce_ms),
            status_message: "Started pdash!".to_string(),
            last_status_message_update: Instant::now(),
            uidata: UIData::empty(),
        };
        model.reload()?;
        Ok(model)
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn raw_keyevents(&self) -> bool {
        self.active_cmdinput
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), DashError> {
        // The debounced search fires here, on the run loop's cadence.
        if let Some(term) = self.debounce.poll() {
            self.apply_search(&term);
        }

        if let Some(msg) = message {
            match self.modus {
                Modus::TABLE => match msg {
                    Message::Quit => self.quit(),
                    Message::MoveDown => self.move_selection_down(1),
                    Message::MoveUp => self.move_selection_up(1),
                    Message::MoveLeft => self.move_selection_left(),
                    Message::MoveRight => self.move_selection_right(),
                    Message::MovePageUp => self.move_selection_up(PAGE_STEP),
                    Message::MovePageDown => self.move_selection_down(PAGE_STEP),
                    Message::MoveBeginning => self.move_selection_beginning(),
                    Message::MoveEnd => self.move_selection_end(),
                    Message::Sort => self.activate_sort(),
                    Message::CycleSector => self.cycle_sector(),
                    Message::Search => self.enter_search(),
                    Message::Export => self.export(),
                    Message::Refresh => self.refresh(),
                    Message::CopyCell => self.copy_cell(),
                    Message::CopyRow => self.copy_row(),
                    Message::Enter => self.enter_record(),
                    Message::Help => self.show_help(),
                    _ => (),
                },
                Modus::RECORD => match msg {
                    Message::Quit => self.quit(),
                    Message::MoveLeft | Message::MoveUp => self.previous_record(),
                    Message::MoveRight | Message::MoveDown => self.next_record(),
                    Message::CopyRow => self.copy_row(),
                    Message::Help => self.show_help(),
                    Message::Enter | Message::Exit => self.leave_record(),
                    _ => (),
                },
                Modus::POPUP => match msg {
                    Message::Quit => self.quit(),
                    Message::Enter | Message::Exit | Message::Help => self.close_popup(),
                    _ => (),
                },
                Modus::INPUT => {
                    if let Message::RawKey(key) = msg {
                        self.raw_input(key);
                    }
                }
            }
        }

        Ok(())
    }

    // ------------------------- data lifecycle -------------------------- //

    /// Rebuild the RowSet from the provider, then re-apply the persisted
    /// sort and filter state to the fresh data.
    fn reload(&mut self) -> Result<(), DashError> {
        self.status = Status::LOADING;
        let start_time = Instant::now();
        let records = self.provider.fetch()?;
        self.rows = build_rows(&records);
        let load_duration = start_time.elapsed().as_millis();
        info!("Built {} rows in {}ms", self.rows.len(), load_duration);

        self.order = (0..self.rows.len()).collect();
        if let Some(state) = self.sort {
            sort::apply(&self.rows, &mut self.order, state.column, state.ascending);
        }
        self.facets = sector_values(&self.rows);
        self.facet_idx = self
            .facets
            .iter()
            .position(|s| s == self.filter.sector())
            .map(|p| p + 1)
            .unwrap_or(0);
        self.sector_chart = charts::sector_distribution(&self.rows);
        self.summary = charts::impact_summary(&self.rows);

        self.recompute_visibility();
        self.status = Status::READY;
        self.set_status_message(format!(
            "Loaded {} policies from {} in {}ms",
            self.rows.len(),
            self.provider.name(),
            load_duration
        ));
        Ok(())
    }

    /// Refresh on user request. Errors degrade to a status line entry,
    /// the dashboard keeps showing the previous snapshot.
    fn refresh(&mut self) {
        if let Err(e) = self.reload() {
            error!("Refresh failed: {:?}", e);
            self.status = Status::READY;
            self.set_status_message(format!("Refresh failed: {e:?}"));
        }
    }

    fn recompute_visibility(&mut self) {
        self.visibility = compute_visibility(&self.rows, &self.filter);
        self.rebuild_view();
    }

    // The display list: ordered row indices, filtered down to the
    // currently visible ones.
    fn rebuild_view(&mut self) {
        self.view = self
            .order
            .iter()
            .copied()
            .filter(|&idx| self.visibility.is_visible(idx))
            .collect();
        self.curser_row = self.curser_row.min(self.view.len().saturating_sub(1));
        self.record_pos = self.record_pos.min(self.view.len().saturating_sub(1));
        self.rebuild_uidata();
    }

    // --------------------------- sort/filter --------------------------- //

    fn activate_sort(&mut self) {
        let column = ColumnId::ALL[self.curser_column];
        if !column.sortable() {
            self.set_status_message(format!("{} is not sortable", column.display_name()));
            return;
        }
        let state = SortState::activate(self.sort, column);
        sort::apply(&self.rows, &mut self.order, state.column, state.ascending);
        self.sort = Some(state);
        debug!("Sort state: {:?}", state);
        self.rebuild_view();
        self.set_status_message(format!(
            "Sorted by {} ({})",
            column.display_name(),
            if state.ascending { "ascending" } else { "descending" }
        ));
    }

    fn cycle_sector(&mut self) {
        if self.facets.is_empty() {
            return;
        }
        self.facet_idx = (self.facet_idx + 1) % (self.facets.len() + 1);
        let sector = if self.facet_idx == 0 {
            String::new()
        } else {
            self.facets[self.facet_idx - 1].clone()
        };
        self.filter.set_sector(&sector);
        self.recompute_visibility();
        self.set_status_message(if sector.is_empty() {
            format!("Sector: all ({} policies)", self.view.len())
        } else {
            format!("Sector: {} ({} policies)", sector, self.view.len())
        });
    }

    fn apply_search(&mut self, term: &str) {
        self.filter.set_search(term);
        self.recompute_visibility();
        trace!("Search \"{}\": {} of {} rows", term, self.view.len(), self.rows.len());
        self.set_status_message(format!(
            "{} of {} policies match",
            self.view.len(),
            self.rows.len()
        ));
    }

    // --------------------------- search input -------------------------- //

    fn enter_search(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::INPUT;
        self.active_cmdinput = true;
        self.input.clear();
        self.input.set(self.filter.search());
        self.last_input = self.input.get();
        self.rebuild_uidata();
    }

    fn raw_input(&mut self, key: KeyEvent) {
        self.last_input = self.input.read(key);
        if self.last_input.changed {
            // Live search: every edit lands in the debounce slot and
            // replaces whatever was pending there.
            self.debounce.push(self.last_input.input.clone());
        }
        if self.last_input.finished {
            self.active_cmdinput = false;
            self.modus = self.previous_modus;
            self.previous_modus = Modus::INPUT;
            if self.last_input.canceled {
                self.debounce.cancel();
                self.filter.clear_search();
                self.recompute_visibility();
                self.set_status_message("Search cleared");
            } else {
                self.debounce.cancel();
                let term = self.last_input.input.clone();
                self.apply_search(&term);
            }
        }
        self.rebuild_uidata();
    }

    // ------------------------------ export ----------------------------- //

    fn export(&mut self) {
        let csv = export::encode_csv(&self.rows, &self.order, &self.visibility, &ColumnId::ALL);
        match fs::write(&self.config.export_path, &csv) {
            Ok(_) => {
                info!("Exported {} visible rows to {:?}", self.view.len(), self.config.export_path);
                self.set_status_message(format!(
                    "Exported {} policies to {}",
                    self.view.len(),
                    self.config.export_path.display()
                ));
            }
            Err(e) => {
                error!("Export failed: {:?}", e);
                self.set_status_message(format!("Export failed: {e}"));
            }
        }
    }

    // ---------------------------- clipboard ---------------------------- //

    // The clipboard is optional at runtime; copy degrades to a no-op
    // when it cannot be opened.
    fn clipboard_set(&mut self, content: String) {
        if self.clipboard.is_none() {
            self.clipboard = Clipboard::new().ok();
        }
        match self.clipboard.as_mut().map(|c| c.set_text(content)) {
            Some(Ok(_)) => {
                trace!("Copied to clipboard.");
                self.set_status_message("Copied to clipboard");
            }
            Some(Err(e)) => trace!("Error copying to clipboard: {:?}", e),
            None => trace!("Clipboard unavailable."),
        }
    }

    fn copy_cell(&mut self) {
        if let Some(&idx) = self.view.get(self.curser_row) {
            let cell = self.rows[idx].cell(ColumnId::ALL[self.curser_column]).to_string();
            trace!("Cell content: {}", cell);
            self.clipboard_set(cell);
        }
    }

    fn wrap_cell_content(c: &str) -> String {
        let needs_escaping = c.chars().any(|c| c == '"');
        let needs_wrapping = c.chars().any(|c| c == ' ' || c == '\t' || c == ',');
        let mut out = String::from(c);

        if needs_escaping {
            out = out.replace("\"", "\"\"");
        }
        if needs_wrapping {
            out = format!("\"{out}\"");
        }
        out
    }

    fn copy_row(&mut self) {
        let pos = match self.modus {
            Modus::RECORD => self.record_pos,
            _ => self.curser_row,
        };
        if let Some(&idx) = self.view.get(pos) {
            let row = &self.rows[idx];
            let content = ColumnId::ALL[..COLUMN_COUNT - 1]
                .iter()
                .map(|c| Self::wrap_cell_content(row.cell(*c)))
                .collect::<Vec<String>>()
                .join(",");
            self.clipboard_set(content);
        }
    }

    // ---------------------------- navigation --------------------------- //

    fn move_selection_up(&mut self, step: usize) {
        self.curser_row = self.curser_row.saturating_sub(step);
        self.rebuild_uidata();
    }

    fn move_selection_down(&mut self, step: usize) {
        if !self.view.is_empty() {
            self.curser_row = (self.curser_row + step).min(self.view.len() - 1);
        }
        self.rebuild_uidata();
    }

    fn move_selection_left(&mut self) {
        self.curser_column = self.curser_column.saturating_sub(1);
        self.rebuild_uidata();
    }

    fn move_selection_right(&mut self) {
        // The trailing controls column never takes the cursor.
        if self.curser_column < COLUMN_COUNT - 2 {
            self.curser_column += 1;
        }
        self.rebuild_uidata();
    }

    fn move_selection_beginning(&mut self) {
        self.curser_row = 0;
        self.rebuild_uidata();
    }

    fn move_selection_end(&mut self) {
        self.curser_row = self.view.len().saturating_sub(1);
        self.rebuild_uidata();
    }

    // --------------------------- record view --------------------------- //

    fn enter_record(&mut self) {
        if self.view.is_empty() {
            return;
        }
        self.record_pos = self.curser_row;
        self.previous_modus = self.modus;
        self.modus = Modus::RECORD;
        self.rebuild_uidata();
    }

    fn leave_record(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::TABLE;
        self.curser_row = self.record_pos.min(self.view.len().saturating_sub(1));
        self.rebuild_uidata();
    }

    fn previous_record(&mut self) {
        self.record_pos = self.record_pos.saturating_sub(1);
        self.rebuild_uidata();
    }

    fn next_record(&mut self) {
        if !self.view.is_empty() {
            self.record_pos = (self.record_pos + 1).min(self.view.len() - 1);
        }
        self.rebuild_uidata();
    }

    // ------------------------------ popup ------------------------------ //

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.rebuild_uidata();
    }

    fn close_popup(&mut self) {
        self.modus = self.previous_modus;
        self.previous_modus = Modus::POPUP;
        self.rebuild_uidata();
    }

    // ----------------------------- snapshot ----------------------------- //

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
        self.uidata.status_message = self.status_message.clone();
        self.uidata.last_status_message_update = self.last_status_message_update;
        self.uidata.last_update = Instant::now();
    }

    fn decorated_headers(&self) -> Vec<String> {
        ColumnId::ALL
            .iter()
            .map(|c| match self.sort {
                Some(state) if state.column == *c => {
                    let marker = if state.ascending { "▲" } else { "▼" };
                    format!("{} {}", c.display_name(), marker)
                }
                _ => c.display_name().to_string(),
            })
            .collect()
    }

    fn record_data(&self) -> Option<RecordData> {
        let &idx = self.view.get(self.record_pos)?;
        let row = &self.rows[idx];
        let fields = ColumnId::ALL[..COLUMN_COUNT - 1]
            .iter()
            .map(|c| (c.display_name().to_string(), row.cell(*c).to_string()))
            .collect();
        Some(RecordData {
            fields,
            position: self.record_pos + 1,
            total: self.view.len(),
        })
    }

    fn rebuild_uidata(&mut self) {
        let table_rows = self
            .view
            .iter()
            .map(|&idx| {
                ColumnId::ALL
                    .iter()
                    .map(|c| self.rows[idx].cell(*c).to_string())
                    .collect::<Vec<String>>()
            })
            .collect::<Vec<Vec<String>>>();

        let record = match self.modus {
            Modus::RECORD => self.record_data(),
            _ => None,
        };

        self.uidata = UIData {
            title: self.provider.name(),
            headers: self.decorated_headers(),
            rows: table_rows,
            total_rows: self.rows.len(),
            selected_row: self.curser_row,
            selected_column: self.curser_column,
            no_results: self.visibility.none_visible(),
            sector_chart: self.sector_chart.clone(),
            summary: self.summary.clone(),
            search_term: self.filter.search().to_string(),
            sector_label: if self.filter.sector().is_empty() {
                "all".to_string()
            } else {
                self.filter.sector().to_string()
            },
            record,
            show_popup: matches!(self.modus, Modus::POPUP),
            popup_message: HELP_TEXT.to_string(),
            cmdinput: self.last_input.clone(),
            active_cmdinput: self.active_cmdinput,
            status_message: self.status_message.clone(),
            last_status_message_update: self.last_status_message_update,
            last_update: Instant::now(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::SampleProvider;
    use ratatui::crossterm::event::{KeyCode, KeyModifiers};

    fn model() -> Model {
        let config = DashConfig::default().debounce_ms(0);
        Model::init(&config, Box::new(SampleProvider)).unwrap()
    }

    fn type_search(model: &mut Model, term: &str, finish: KeyCode) {
        model.update(Some(Message::Search)).unwrap();
        assert!(model.raw_keyevents());
        for c in term.chars() {
            let key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
            model.update(Some(Message::RawKey(key))).unwrap();
        }
        let key = KeyEvent::new(finish, KeyModifiers::NONE);
        model.update(Some(Message::RawKey(key))).unwrap();
    }

    #[test]
    fn loads_sample_data_on_init() {
        let model = model();
        let ui = model.get_uidata();
        assert_eq!(ui.total_rows, 6);
        assert_eq!(ui.rows.len(), 6);
        assert_eq!(ui.summary.policies, 6);
        assert!(!ui.no_results);
    }

    #[test]
    fn search_filters_and_escape_clears() {
        let mut model = model();
        type_search(&mut model, "healthcare", KeyCode::Enter);
        assert_eq!(model.get_uidata().rows.len(), 1);
        assert_eq!(model.get_uidata().rows[0][0], "Universal Basic Healthcare");

        // Esc clears the persisted search again
        type_search(&mut model, "x", KeyCode::Esc);
        assert_eq!(model.get_uidata().rows.len(), 6);
        assert_eq!(model.filter.search(), "");
    }

    #[test]
    fn no_results_indicator_toggles() {
        let mut model = model();
        type_search(&mut model, "no such policy", KeyCode::Enter);
        assert!(model.get_uidata().no_results);
        type_search(&mut model, "", KeyCode::Esc);
        assert!(!model.get_uidata().no_results);
    }

    #[test]
    fn sector_facet_survives_search_updates() {
        let mut model = model();
        // facets are sorted: Education, Energy, Finance, Healthcare, Manufacturing
        model.update(Some(Message::CycleSector)).unwrap();
        model.update(Some(Message::CycleSector)).unwrap();
        assert_eq!(model.filter.sector(), "Energy");
        assert_eq!(model.get_uidata().rows.len(), 2);

        type_search(&mut model, "wind", KeyCode::Enter);
        assert_eq!(model.filter.sector(), "Energy");
        assert_eq!(model.get_uidata().rows.len(), 1);
        assert_eq!(model.get_uidata().rows[0][0], "Offshore Wind Expansion Grant");
    }

    #[test]
    fn sort_message_toggles_direction() {
        let mut model = model();
        // move cursor to the GDP impact column
        for _ in 0..4 {
            model.update(Some(Message::MoveRight)).unwrap();
        }
        model.update(Some(Message::Sort)).unwrap();
        let asc: Vec<String> = model.get_uidata().rows.iter().map(|r| r[0].clone()).collect();
        assert_eq!(asc[0], "Carbon Emission Reduction Mandate");
        assert!(model.get_uidata().headers[4].ends_with("▲"));

        model.update(Some(Message::Sort)).unwrap();
        let desc: Vec<String> = model.get_uidata().rows.iter().map(|r| r[0].clone()).collect();
        let reversed: Vec<String> = asc.iter().rev().cloned().collect();
        assert_eq!(desc, reversed);
        assert!(model.get_uidata().headers[4].ends_with("▼"));
    }

    #[test]
    fn cursor_never_reaches_the_controls_column() {
        let mut model = model();
        for _ in 0..20 {
            model.update(Some(Message::MoveRight)).unwrap();
        }
        assert_eq!(model.get_uidata().selected_column, COLUMN_COUNT - 2);
    }

    #[test]
    fn refresh_reapplies_sort_and_filter() {
        let mut model = model();
        model.update(Some(Message::CycleSector)).unwrap();
        model.update(Some(Message::CycleSector)).unwrap();
        for _ in 0..4 {
            model.update(Some(Message::MoveRight)).unwrap();
        }
        model.update(Some(Message::Sort)).unwrap();
        let before: Vec<Vec<String>> = model.get_uidata().rows.clone();

        model.update(Some(Message::Refresh)).unwrap();
        assert_eq!(model.get_uidata().rows, before);
        assert_eq!(model.filter.sector(), "Energy");
    }

    #[test]
    fn record_view_walks_visible_rows() {
        let mut model = model();
        model.update(Some(Message::MoveDown)).unwrap();
        model.update(Some(Message::Enter)).unwrap();
        let record = model.get_uidata().record.clone().unwrap();
        assert_eq!(record.position, 2);
        assert_eq!(record.total, 6);
        assert_eq!(record.fields[0].1, "Universal Basic Healthcare");

        model.update(Some(Message::MoveRight)).unwrap();
        let record = model.get_uidata().record.clone().unwrap();
        assert_eq!(record.position, 3);

        model.update(Some(Message::Exit)).unwrap();
        assert!(model.get_uidata().record.is_none());
    }

    #[test]
    fn quit_message_sets_quitting() {
        let mut model = model();
        model.update(Some(Message::Quit)).unwrap();
        assert_eq!(model.status, Status::QUITTING);
    }
}
