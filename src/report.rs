use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use quick_xml::se::Serializer;
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xml,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xml => "xml",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

pub fn report_path(dir: &Path, stem: &str, format: OutputFormat) -> PathBuf {
    dir.join(format!("{stem}.{}", format.extension()))
}

/// Renders records as `<root><element>..</element>..</root>`, one child
/// element per field.
pub fn to_xml<T: Serialize>(records: &[T], element: &str) -> Result<String> {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<root>\n");
    for record in records {
        let mut ser = Serializer::with_root(&mut xml, Some(element))?;
        ser.indent(' ', 2);
        record.serialize(ser)?;
        xml.push('\n');
    }
    xml.push_str("</root>\n");
    Ok(xml)
}

pub fn write_xml<T: Serialize>(path: &Path, records: &[T], element: &str) -> Result<()> {
    let xml = to_xml(records, element)?;
    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(xml.as_bytes())?;
    file.flush()?;
    Ok(())
}

/// Header row comes from the first record's field names.
pub fn write_csv<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut file, records)?;
    file.flush()?;
    Ok(())
}

/// Writes `<dir>/<stem>.<ext>` and returns the path.
pub fn write_report<T: Serialize>(
    dir: &Path,
    stem: &str,
    records: &[T],
    format: OutputFormat,
    element: &str,
) -> Result<PathBuf> {
    let path = report_path(dir, stem, format);
    log::info!("saving {}", path.display());
    match format {
        OutputFormat::Xml => write_xml(&path, records, element)?,
        OutputFormat::Csv => write_csv(&path, records)?,
        OutputFormat::Json => write_json(&path, records)?,
    }
    Ok(path)
}
