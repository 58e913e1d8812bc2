use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

use polars::prelude::*;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::domain::DashError;
use crate::rows::RawRecord;

/// Columns a policy dataset has to carry. Everything is extracted as
/// display text; the Row Model derives the typed values from it.
const REQUIRED_COLUMNS: [&str; 7] = [
    "name",
    "sector",
    "region",
    "change",
    "gdp_impact",
    "inflation_impact",
    "unemployment_impact",
];

/// The redesigned data source: providers hand over structured records
/// instead of the dashboard scraping its own rendered table.
pub trait DataProvider {
    fn name(&self) -> String;
    fn fetch(&self) -> Result<Vec<RawRecord>, DashError>;
}

#[derive(Debug)]
enum FileType {
    CSV,
    PARQUET,
    ARROW,
}

#[derive(Debug)]
pub struct FileProvider {
    path: PathBuf,
    file_type: FileType,
}

impl FileProvider {
    pub fn new(path: PathBuf) -> Result<Self, DashError> {
        let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => DashError::FileNotFound,
            ErrorKind::PermissionDenied => DashError::PermissionDenied,
            _ => DashError::IoError(e),
        })?;
        if !metadata.is_file() {
            return Err(DashError::LoadingFailed("Not a file!".into()));
        }
        let file_type = Self::detect_file_type(&path)?;
        debug!("File provider for {:?} ({:?}, {} bytes)", path, file_type, metadata.len());
        Ok(FileProvider { path, file_type })
    }

    fn detect_file_type(path: &Path) -> Result<FileType, DashError> {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_uppercase())
            .as_deref()
        {
            Some("CSV") => Ok(FileType::CSV),
            Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
            Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::ARROW),
            _ => Err(DashError::UnknownFileType),
        }
    }

    fn load_csv(path: &PathBuf) -> Result<LazyFrame, PolarsError> {
        LazyCsvReader::new(PlPath::Local(path.as_path().into()))
            .with_has_header(true)
            .finish()
    }

    fn load_parquet(path: &PathBuf) -> Result<LazyFrame, PolarsError> {
        LazyFrame::scan_parquet(
            PlPath::Local(path.as_path().into()),
            ScanArgsParquet::default(),
        )
    }

    fn load_arrow(path: &PathBuf) -> Result<LazyFrame, PolarsError> {
        LazyFrame::scan_ipc(
            PlPath::Local(path.as_path().into()),
            polars::io::ipc::IpcScanOptions,
            UnifiedScanArgs::default(),
        )
    }

    // Cast one column to strings and pull it into memory. Nulls become
    // empty text, which the parsers treat as zero.
    fn column_text(df: &DataFrame, name: &str) -> Result<Vec<String>, PolarsError> {
        let col = df.column(name)?.cast(&DataType::String)?;
        let series = col.str()?;
        let mut data = Vec::with_capacity(series.len());
        for value in series.into_iter() {
            data.push(value.map(|s| s.to_string()).unwrap_or_default());
        }
        Ok(data)
    }
}

impl DataProvider for FileProvider {
    fn name(&self) -> String {
        self.path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("???")
            .to_string()
    }

    fn fetch(&self) -> Result<Vec<RawRecord>, DashError> {
        let frame = match self.file_type {
            FileType::CSV => Self::load_csv(&self.path)?,
            FileType::PARQUET => Self::load_parquet(&self.path)?,
            FileType::ARROW => Self::load_arrow(&self.path)?,
        };

        // Each required column is extracted in its own rayon task; the
        // pre-processing to display text is the expensive part.
        let start_time = Instant::now();
        let df = frame.collect()?;
        let c_: Result<Vec<Vec<String>>, PolarsError> = REQUIRED_COLUMNS
            .par_iter()
            .map(|name| Self::column_text(&df, name))
            .collect();
        let columns = c_?;

        let nrows = columns[0].len();
        let mut records = Vec::with_capacity(nrows);
        for ridx in 0..nrows {
            records.push(RawRecord {
                name: columns[0][ridx].clone(),
                sector: columns[1][ridx].clone(),
                region: columns[2][ridx].clone(),
                change: columns[3][ridx].clone(),
                gdp_impact: columns[4][ridx].clone(),
                inflation_impact: columns[5][ridx].clone(),
                unemployment_impact: columns[6][ridx].clone(),
            });
        }

        info!(
            "Fetched {} records from {:?} in {}ms",
            records.len(),
            self.path,
            start_time.elapsed().as_millis()
        );
        Ok(records)
    }
}

/// Built-in demonstration policies, used when no dataset is given.
#[derive(Debug, Default)]
pub struct SampleProvider;

impl DataProvider for SampleProvider {
    fn name(&self) -> String {
        "sample policies".to_string()
    }

    fn fetch(&self) -> Result<Vec<RawRecord>, DashError> {
        let seeded: [[&str; 7]; 6] = [
            [
                "Green Energy Transition Tax Credit",
                "Energy",
                "North America",
                "15.0%",
                "1.23%",
                "0.30pp",
                "-0.20pp",
            ],
            [
                "Universal Basic Healthcare",
                "Healthcare",
                "Europe",
                "25.0%",
                "0.80%",
                "0.60pp",
                "-0.50pp",
            ],
            [
                "Digital Skills Training Initiative",
                "Education",
                "Asia",
                "20.0%",
                "1.10%",
                "0.20pp",
                "-0.90pp",
            ],
            [
                "Carbon Emission Reduction Mandate",
                "Manufacturing",
                "Europe",
                "-30.0%",
                "-0.50%",
                "0.80pp",
                "0.40pp",
            ],
            [
                "Small Business Support Package",
                "Finance",
                "North America",
                "10.0%",
                "0.60%",
                "0.10pp",
                "-0.30pp",
            ],
            [
                "Offshore Wind Expansion Grant",
                "Energy",
                "Europe",
                "18.0%",
                "0.90%",
                "0.40pp",
                "-0.60pp",
            ],
        ];

        Ok(seeded
            .iter()
            .map(|fields| RawRecord {
                name: fields[0].into(),
                sector: fields[1].into(),
                region: fields[2].into(),
                change: fields[3].into(),
                gdp_impact: fields[4].into(),
                inflation_impact: fields[5].into(),
                unemployment_impact: fields[6].into(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_provider_delivers_policies() {
        let records = SampleProvider.fetch().unwrap();
        assert_eq!(records.len(), 6);
        assert_eq!(records[0].name, "Green Energy Transition Tax Credit");
        assert_eq!(records[0].sector, "Energy");
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = FileProvider::detect_file_type(Path::new("policies.xlsx"));
        assert!(matches!(err, Err(DashError::UnknownFileType)));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = FileProvider::new(PathBuf::from("/no/such/file.csv"));
        assert!(matches!(err, Err(DashError::FileNotFound)));
    }
}
