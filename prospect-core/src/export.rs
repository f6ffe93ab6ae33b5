use csv::WriterBuilder;
use prospect_scraper::{EXPORT_COLUMNS, ProfileRecord};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// Appends one row per record under the fixed export header. The header is
/// written only when the file is created, so interrupted runs can keep
/// appending to the same file.
pub struct CsvExporter {
    path: PathBuf,
}

impl CsvExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &ProfileRecord) -> csv::Result<()> {
        let is_new = !self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        if is_new {
            writer.write_record(EXPORT_COLUMNS.iter().map(|column| column.label))?;
        }
        writer.write_record(&record.to_csv_row())?;
        writer.flush()?;
        Ok(())
    }
}
