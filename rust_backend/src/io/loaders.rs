use anyhow::{Context, Result};
use polars::prelude::*;
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Represents the source type of table data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSourceType {
    Json,
    Csv,
}

/// Result of loading table data
#[derive(Debug)]
pub struct TableLoadResult {
    pub dataframe: DataFrame,
    pub source_type: TableSourceType,
    pub num_rows: usize,
}

impl TableLoadResult {
    pub fn new(dataframe: DataFrame, source_type: TableSourceType) -> Self {
        let num_rows = dataframe.height();
        Self {
            dataframe,
            source_type,
            num_rows,
        }
    }
}

/// Unified interface for loading tables from JSON or CSV
pub struct TableLoader;

impl TableLoader {
    /// Load a table from a file (auto-detects JSON or CSV)
    pub fn load_from_file(path: &Path) -> Result<TableLoadResult> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .context("File has no extension")?;

        match extension.to_lowercase().as_str() {
            "json" => Self::load_from_json(path),
            "csv" => Self::load_from_csv(path),
            _ => anyhow::bail!("Unsupported file format: {}", extension),
        }
    }

    /// Load a table from a CSV file with a header row
    pub fn load_from_csv(csv_path: &Path) -> Result<TableLoadResult> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(csv_path.into()))
            .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?
            .finish()
            .context("Failed to parse CSV into DataFrame")?;

        Ok(TableLoadResult::new(df, TableSourceType::Csv))
    }

    /// Load a table from a JSON file holding an array of row objects
    pub fn load_from_json(json_path: &Path) -> Result<TableLoadResult> {
        let content = fs::read_to_string(json_path)
            .with_context(|| format!("Failed to read JSON file {}", json_path.display()))?;
        Self::load_from_json_str(&content)
    }

    /// Load a table from a JSON string holding an array of row objects
    pub fn load_from_json_str(json_str: &str) -> Result<TableLoadResult> {
        let df = JsonReader::new(Cursor::new(json_str.as_bytes()))
            .with_json_format(JsonFormat::Json)
            .finish()
            .context("Failed to parse JSON into DataFrame")?;

        Ok(TableLoadResult::new(df, TableSourceType::Json))
    }
}

/// Serialize a table as a JSON array of row objects
pub fn dataframe_to_json(df: &DataFrame) -> Result<String> {
    let mut df = df.clone();
    let mut buffer = Vec::new();
    JsonWriter::new(&mut buffer)
        .with_json_format(JsonFormat::Json)
        .finish(&mut df)
        .context("Failed to serialize DataFrame to JSON")?;
    String::from_utf8(buffer).context("Serialized JSON is not valid UTF-8")
}
