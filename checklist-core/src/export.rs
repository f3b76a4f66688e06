//! CSV export of a saved checklist

use crate::error::Result;
use crate::types::ChecklistItem;
use std::io::Write;

pub const CSV_FILENAME: &str = "regucheck_checklist.csv";
pub const CSV_MIME_TYPE: &str = "text/csv";
pub const CSV_HEADER: [&str; 5] = ["Standard", "Control ID", "Description", "Status", "Notes"];

/// Write the header row plus one row per item, in the given order.
pub fn write_csv<W: Write>(items: &[ChecklistItem], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(CSV_HEADER)?;
    for item in items {
        csv_writer.write_record([
            item.standard.as_str(),
            item.control_id.as_str(),
            item.description.as_str(),
            item.status.as_str(),
            item.notes.as_str(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn to_csv_bytes(items: &[ChecklistItem]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_csv(items, &mut buffer)?;
    Ok(buffer)
}

/// `Content-Disposition` value for the download.
pub fn content_disposition() -> String {
    format!("attachment; filename=\"{}\"", CSV_FILENAME)
}
