//! Tail field recovery for finish-event lines.
//!
//! The tail of a finish event carries two quoted strings (job name,
//! command) followed by numeric rusage fields, but the command is free
//! text and the region is not fixed-width, so positional splitting is
//! unreliable there. Instead the whole line is scanned for
//! `"<quoted>" "<quoted>" <number>` triples and an ordered filter chain
//! decides which one is the real (command, cpu-seconds) pair. The filter
//! order is load-bearing: reordering changes which match wins.

use std::sync::OnceLock;

use regex::Regex;

use super::{DEFAULT_MARKER, FINISH_MARKER};

/// Two quoted spans (doubled quotes allowed inside) followed by a number.
const TAIL_PATTERN: &str = r#""((?:[^"]|"")*)"\s+"((?:[^"]|"")*)"\s+(-?\d+(?:\.\d+)?)"#;

fn tail_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TAIL_PATTERN).expect("tail pattern is valid"))
}

/// Recover the `(command, cpu_seconds)` pair from a finish-event line.
///
/// All triples on the line are collected in scan order and filtered; the
/// last survivor wins because the command field occurs after the
/// host-list fields in the raw layout. `None` means the line carries no
/// usable tail and the record must be rejected.
pub fn extract_tail(line: &str) -> Option<(String, f64)> {
    let mut accepted = None;

    for caps in tail_regex().captures_iter(line) {
        let first = caps.get(1).map_or("", |m| m.as_str());
        let second = caps.get(2).map_or("", |m| m.as_str());
        let number = caps.get(3).map_or("", |m| m.as_str());

        // A second field that parses as a positive number is a timestamp
        // column, not a command.
        if second.parse::<f64>().map_or(false, |v| v > 0.0) {
            continue;
        }
        // The event tag itself can pair up with the version field.
        if first == FINISH_MARKER {
            continue;
        }
        // Unset placeholder.
        if second == DEFAULT_MARKER {
            continue;
        }
        // Identical spans are a duplicate host pair.
        if first == second {
            continue;
        }
        if first.is_empty() && second.is_empty() {
            continue;
        }

        let cpu_seconds = match number.parse::<f64>() {
            Ok(v) => v,
            Err(_) => continue,
        };

        accepted = Some((second.replace("\"\"", "\""), cpu_seconds));
    }

    accepted
}
