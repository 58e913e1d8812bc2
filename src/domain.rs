use std::io::Error;
use std::path::PathBuf;

use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;

#[derive(Debug)]
pub enum DashError {
    IoError(Error),
    PolarsError(PolarsError),
    LoadingFailed(String),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
}

impl From<Error> for DashError {
    fn from(err: Error) -> Self {
        DashError::IoError(err)
    }
}

impl From<PolarsError> for DashError {
    fn from(err: PolarsError) -> Self {
        DashError::PolarsError(err)
    }
}

#[derive(Debug, Clone, Setters)]
pub struct DashConfig {
    /// Timeout for one event poll in the run loop.
    pub event_poll_ms: u64,
    /// Quiet window before a search edit is applied.
    pub debounce_ms: u64,
    pub export_path: PathBuf,
}

impl Default for DashConfig {
    fn default() -> Self {
        DashConfig {
            event_poll_ms: 100,
            debounce_ms: 300,
            export_path: PathBuf::from("policy_data.csv"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    Sort,
    CycleSector,
    Search,
    Export,
    Refresh,
    CopyCell,
    CopyRow,
    Enter,
    Exit,
    Help,
    RawKey(KeyEvent),
}

pub const HELP_TEXT: &str = "\
 pdash keys

 j/k or Down/Up   move row selection
 h/l or Left/Right  move column selection
 PgUp/PgDn        page up / down
 Home/End         first / last row
 s                sort by the selected column (again to flip)
 f                cycle the sector facet
 /                edit the search term (Enter commits, Esc clears)
 e                export the visible rows to CSV
 r                refresh from the data source
 y / Y            copy cell / row to the clipboard
 Enter            open the selected policy
 Esc              back / close
 ?                this help
 q                quit";
