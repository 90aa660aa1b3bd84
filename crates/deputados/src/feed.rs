use std::io::Write;

use crate::types::LegislatorRecord;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write feed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    /// A single pretty-printed JSON array.
    Json,
    /// One compact JSON object per line.
    JsonLines,
}

pub fn write_feed<W: Write>(
    mut writer: W,
    records: &[LegislatorRecord],
    format: FeedFormat,
) -> Result<(), FeedError> {
    match format {
        FeedFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, records)?;
            writeln!(writer)?;
        }
        FeedFormat::JsonLines => {
            for record in records {
                serde_json::to_writer(&mut writer, record)?;
                writeln!(writer)?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}
