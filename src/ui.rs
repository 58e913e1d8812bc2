use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Flex, Layout, Rect},
    style::{Style, Stylize},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Clear, Paragraph, Row, Table, TableState},
};

use crate::format::{format_decimal, format_percentage};
use crate::model::{RecordData, UIData};

pub const SUMMARY_HEIGHT: u16 = 3;
pub const CHART_HEIGHT: u16 = 9;
pub const STATUSLINE_HEIGHT: u16 = 1;
// Minimum table height below which the chart strip is dropped.
pub const TABLE_MIN_HEIGHT: u16 = 6;

const STATUS_MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);
const KEY_HINTS: &str = "? help  / search  f sector  s sort  e export  r refresh  q quit";

const COLUMN_WIDTHS: [Constraint; 8] = [
    Constraint::Min(26),
    Constraint::Length(14),
    Constraint::Length(14),
    Constraint::Length(12),
    Constraint::Length(16),
    Constraint::Length(16),
    Constraint::Length(19),
    Constraint::Length(9),
];

/// Presentational side of the view synchronization: reflects the
/// UIData snapshot into the terminal and owns nothing but widget state.
pub struct TableUI {
    table_state: TableState,
}

impl TableUI {
    pub fn new() -> Self {
        Self {
            table_state: TableState::default(),
        }
    }

    pub fn draw(&mut self, uidata: &UIData, frame: &mut Frame) {
        let area = frame.area();
        // Drop the chart strip when there is no room for it.
        let show_chart = !uidata.sector_chart.is_empty()
            && area.height >= SUMMARY_HEIGHT + CHART_HEIGHT + TABLE_MIN_HEIGHT + STATUSLINE_HEIGHT;

        let [summary_area, chart_area, table_area, status_area] = Layout::vertical([
            Constraint::Length(SUMMARY_HEIGHT),
            Constraint::Length(if show_chart { CHART_HEIGHT } else { 0 }),
            Constraint::Min(TABLE_MIN_HEIGHT),
            Constraint::Length(STATUSLINE_HEIGHT),
        ])
        .areas(area);

        self.draw_summary(uidata, frame, summary_area);
        if show_chart {
            self.draw_chart(uidata, frame, chart_area);
        }
        if let Some(record) = &uidata.record {
            self.draw_record(record, frame, table_area);
        } else {
            self.draw_table(uidata, frame, table_area);
        }
        self.draw_statusline(uidata, frame, status_area);
        if uidata.show_popup {
            self.draw_popup(uidata, frame);
        }
    }

    fn draw_summary(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let s = &uidata.summary;
        let text = Line::from(format!(
            "Policies: {}   Avg GDP impact: {}   Avg inflation: {}pp   Avg unemployment: {}pp",
            s.policies,
            format_percentage(s.avg_gdp),
            format_decimal(s.avg_inflation),
            format_decimal(s.avg_unemployment),
        ));
        let block = Block::bordered().title(Line::from(" pdash ".bold()).centered());
        frame.render_widget(Paragraph::new(text).centered().block(block), area);
    }

    fn draw_chart(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let bars: Vec<Bar> = uidata
            .sector_chart
            .iter()
            .map(|(label, count)| Bar::default().value(*count).label(Line::from(label.clone())))
            .collect();
        let chart = BarChart::default()
            .block(Block::bordered().title(" Policies by sector "))
            .direction(Direction::Horizontal)
            .bar_width(1)
            .bar_gap(0)
            .data(BarGroup::default().bars(&bars));
        frame.render_widget(chart, area);
    }

    fn draw_table(&mut self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let title = format!(
            " {} ({} of {} policies) ",
            uidata.title,
            uidata.rows.len(),
            uidata.total_rows
        );
        let block = Block::bordered().title(title);

        if uidata.no_results {
            let msg = Paragraph::new("No policies match your search criteria")
                .centered()
                .block(block);
            frame.render_widget(msg, area);
            return;
        }

        let header = Row::new(uidata.headers.clone()).style(Style::new().bold());
        let rows: Vec<Row> = uidata
            .rows
            .iter()
            .map(|cells| Row::new(cells.clone()))
            .collect();

        let table = Table::new(rows, COLUMN_WIDTHS)
            .header(header)
            .block(block)
            .row_highlight_style(Style::new().reversed())
            .column_highlight_style(Style::new().bold())
            .highlight_symbol("> ");

        self.table_state.select(Some(uidata.selected_row));
        self.table_state.select_column(Some(uidata.selected_column));
        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn draw_record(&self, record: &RecordData, frame: &mut Frame, area: Rect) {
        let rows: Vec<Row> = record
            .fields
            .iter()
            .map(|(name, value)| Row::new(vec![name.clone(), value.clone()]))
            .collect();
        let title = format!(" Policy {}/{} ", record.position, record.total);
        let table = Table::new(rows, [Constraint::Length(20), Constraint::Min(10)])
            .block(Block::bordered().title(title));
        frame.render_widget(table, area);
    }

    fn draw_statusline(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        if uidata.active_cmdinput {
            let line = format!("/{}", uidata.cmdinput.input);
            frame.render_widget(Paragraph::new(line), area);
            frame.set_cursor_position((
                area.x + 1 + uidata.cmdinput.curser_pos as u16,
                area.y,
            ));
            return;
        }

        let filters = format!(
            "search: \"{}\"  sector: {} ",
            uidata.search_term, uidata.sector_label
        );
        let [left_area, right_area] = Layout::horizontal([
            Constraint::Min(10),
            Constraint::Length(filters.len() as u16),
        ])
        .areas(area);

        let fresh = uidata.last_status_message_update.elapsed() < STATUS_MESSAGE_TIMEOUT;
        let left = if fresh && !uidata.status_message.is_empty() {
            uidata.status_message.clone()
        } else {
            KEY_HINTS.to_string()
        };
        frame.render_widget(Paragraph::new(left), left_area);
        frame.render_widget(Paragraph::new(filters).right_aligned().dim(), right_area);
    }

    fn draw_popup(&self, uidata: &UIData, frame: &mut Frame) {
        let area = popup_area(frame.area(), 60, 70);
        let block = Block::bordered().title(" help ");
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(uidata.popup_message.clone()).block(block),
            area,
        );
    }
}

impl Default for TableUI {
    fn default() -> Self {
        Self::new()
    }
}

fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}
