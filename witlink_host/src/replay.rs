//! Offline replay of captured notification data.
//!
//! Input is text with one chunk per line, each byte as two hex digits
//! separated by whitespace (`55 61 00 40 ...`), which is the format raw frames
//! are traced in. Blank lines and lines starting with `#` are skipped.
use log::{debug, info};
use std::io::BufRead;

use crate::error::ReplayError;
use crate::pipeline::{Pipeline, PipelineStats};

pub fn parse_hex_line(line: &str, line_no: usize) -> Result<Vec<u8>, ReplayError> {
    line.split_whitespace()
        .map(|token| {
            u8::from_str_radix(token, 16).map_err(|_| ReplayError::BadHex {
                line: line_no,
                token: token.to_string(),
            })
        })
        .collect()
}

/// Feed every line of `reader` to the pipeline as one chunk.
pub fn replay<R: BufRead>(
    reader: R,
    pipeline: &mut Pipeline,
) -> Result<PipelineStats, ReplayError> {
    let mut chunks = 0;
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let chunk = parse_hex_line(trimmed, i + 1)?;
        let emitted = pipeline.feed(&chunk);
        debug!("line {}: {} bytes, {} samples", i + 1, chunk.len(), emitted);
        chunks += 1;
    }
    info!(
        "replayed {} chunks, {} bytes left incomplete",
        chunks,
        pipeline.pending()
    );
    Ok(pipeline.stats())
}
