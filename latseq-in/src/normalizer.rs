//! Parses raw trace lines into normalized, timestamp-sorted [`MeasurementRecord`]s.
use latseq_core::ids::{FlatIdMap, IdValue, LocalIdMap};
use latseq_core::record::{Direction, MeasurementRecord};
use latseq_core::LatseqError;

/// Sentinel value for an unassigned radio temporary identifier; any line whose `ids` field
/// contains this literal token is discarded before parsing.
const RNTI_SENTINEL: &str = "rnti65535";

/// The outcome of normalizing a trace file.
#[derive(Debug, Clone, Default)]
pub struct NormalizedLog {
    /// Records sorted by timestamp, stable on the original line order for ties.
    pub records: Vec<MeasurementRecord>,
    /// Lines that failed to parse (unknown direction letter, too few fields) or were filtered
    /// by the sentinel rule before parsing.
    pub warnings: u64,
}

/// Parse every line of `text`, sort the resulting records by timestamp, and report the count of
/// lines that could not be turned into a record.
///
/// Fails with [`LatseqError::ParseError`] only if the input yields zero valid records.
///
/// ```
/// use latseq_in::normalizer::normalize;
///
/// let log = normalize("1.000 D ip--rlc.tx.am len100:rnti1.drb2:\n").unwrap();
/// assert_eq!(log.records.len(), 1);
/// assert_eq!(log.records[0].src_point, "ip");
/// ```
pub fn normalize(text: &str) -> Result<NormalizedLog, LatseqError> {
    let mut records = Vec::new();
    let mut warnings = 0u64;

    for (line_no, line) in text.lines().enumerate() {
        match parse_line(line) {
            LineOutcome::Record(record) => records.push(record),
            LineOutcome::Ignored => {}
            LineOutcome::Malformed(reason) => {
                log::warn!("line {}: {} ({:?})", line_no + 1, reason, line);
                warnings += 1;
            }
        }
    }

    if records.is_empty() {
        return Err(LatseqError::ParseError {
            msg: "input yielded zero valid records".to_string(),
        });
    }

    records.sort_by(|a, b| a.timestamp.partial_cmp(&b.timestamp).unwrap());
    Ok(NormalizedLog { records, warnings })
}

enum LineOutcome {
    Record(MeasurementRecord),
    /// Comment, blank line, or filtered by the `rnti65535` sentinel — not a warning.
    Ignored,
    Malformed(&'static str),
}

fn parse_line(line: &str) -> LineOutcome {
    if line.is_empty() || line.starts_with('#') {
        return LineOutcome::Ignored;
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 4 {
        return LineOutcome::Malformed("fewer than four fields");
    }

    let timestamp: f64 = match fields[0].parse() {
        Ok(ts) => ts,
        Err(_) => return LineOutcome::Malformed("unparseable timestamp"),
    };

    let direction = match Direction::from_letter(fields[1].chars().next().unwrap_or(' ')) {
        Some(d) => d,
        None => return LineOutcome::Malformed("unknown direction letter"),
    };

    let (src_point, dst_point) = match fields[2].split_once("--") {
        Some((src, dst)) => (src.to_string(), dst.to_string()),
        None => return LineOutcome::Malformed("src--dst field missing the '--' separator"),
    };

    let ids_field = fields[3];
    if ids_field.contains(RNTI_SENTINEL) {
        return LineOutcome::Ignored;
    }

    let sections: Vec<&str> = ids_field.split(':').collect();
    if sections.len() < 3 {
        return LineOutcome::Malformed("ids field has fewer than three colon-separated sections");
    }

    let properties = parse_flat_section(sections[0]);
    let mut global_ids = FlatIdMap::new();
    for (name, value) in parse_id_entries(sections[1]) {
        global_ids.insert(name, value);
    }
    let local_ids = parse_local_section(sections[2]);

    LineOutcome::Record(MeasurementRecord::new(
        timestamp,
        direction,
        src_point,
        dst_point,
        properties,
        global_ids,
        local_ids,
    ))
}

fn parse_flat_section(section: &str) -> FlatIdMap {
    let mut map = FlatIdMap::new();
    for (name, value) in parse_id_entries(section) {
        map.insert(name, value);
    }
    map
}

fn parse_local_section(section: &str) -> LocalIdMap {
    let mut map = LocalIdMap::new();
    for (name, value) in parse_id_entries(section) {
        map.entry(name)
            .and_modify(|existing| existing.push(value))
            .or_insert(IdValue::Single(value));
    }
    map
}

/// Parse a dot-separated list of `name(digits)` entries (an alphabetic run immediately followed
/// by a numeric run). Entries that don't match this shape are silently dropped.
fn parse_id_entries(section: &str) -> Vec<(String, u64)> {
    if section.is_empty() {
        return Vec::new();
    }
    section
        .split('.')
        .filter_map(parse_name_digits)
        .collect()
}

fn parse_name_digits(entry: &str) -> Option<(String, u64)> {
    let digit_start = entry.find(|c: char| !c.is_ascii_alphabetic())?;
    if digit_start == 0 {
        return None;
    }
    let (name, rest) = entry.split_at(digit_start);
    let digit_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    if digit_end == 0 {
        return None;
    }
    let value: u64 = rest[..digit_end].parse().ok()?;
    Some((name.to_string(), value))
}
