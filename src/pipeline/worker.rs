//! Per-file scan: one worker reads one accounting file end to end and
//! returns every valid job record it contains.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use tracing::debug;

use crate::acct::parse::parse_line;
use crate::acct::record::JobRecord;
use crate::acct::FINISH_MARKER;
use crate::calendar::YearBounds;

/// Scan one log file, returning the records that parse and fall inside
/// the year bounds. Rejected lines are skipped without a trace; only an
/// unreadable file is an error, which the driver downgrades to an empty
/// result.
pub fn scan_file(path: &Path, bounds: &YearBounds) -> io::Result<Vec<JobRecord>> {
    let file = File::open(path)?;
    let records = scan_reader(BufReader::new(file), bounds)?;
    debug!(
        file = %path.display(),
        records = records.len(),
        "scanned log file",
    );
    Ok(records)
}

/// Scan any line source. Log files occasionally carry bytes that are not
/// UTF-8, so lines are read raw and decoded lossily rather than failing
/// the file.
fn scan_reader<R: Read>(mut reader: BufReader<R>, bounds: &YearBounds) -> io::Result<Vec<JobRecord>> {
    let mut records = Vec::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        // Cheap substring gate before tokenizing; most lines are not
        // finish events.
        if !line.contains(FINISH_MARKER) {
            continue;
        }
        if let Ok(record) = parse_line(&line, bounds) {
            records.push(record);
        }
    }

    Ok(records)
}
