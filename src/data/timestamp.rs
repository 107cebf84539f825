use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Stage 1: structured parse
// ---------------------------------------------------------------------------

/// Structured formats attempted in order. Covers ISO shapes plus the common
/// slash- and dash-delimited exports seen in CGM/pump data dumps.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Parse one cell with the structured format table. Also accepts RFC 3339
/// strings and bare epoch values (seconds or milliseconds, by magnitude).
pub fn parse_structured(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    // Bare epoch timestamp: 13 digits → milliseconds, 10 → seconds.
    if s.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(n) = s.parse::<i64>() {
            let dt = match s.len() {
                13 => DateTime::from_timestamp_millis(n),
                10 => DateTime::from_timestamp(n, 0),
                _ => None,
            };
            return dt.map(|d| d.naive_utc());
        }
    }

    None
}

// ---------------------------------------------------------------------------
// Stage 2: permissive fallback
// ---------------------------------------------------------------------------

/// Permissive, order-preserving parse for cells the structured pass cannot
/// read, e.g. `"reading taken 2023-04-01 at 08:05"` or `"Mar 5 2023 14:30"`.
/// Scans word tokens for one date-like and one time-like fragment and
/// combines them; a date without a time means midnight.
pub fn parse_fuzzy(s: &str) -> Option<NaiveDateTime> {
    let tokens: Vec<&str> = s
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect();

    let mut date: Option<NaiveDate> = None;
    let mut time: Option<NaiveTime> = None;

    for (i, tok) in tokens.iter().enumerate() {
        if date.is_none() {
            if let Some(d) = numeric_date(tok) {
                date = Some(d);
                continue;
            }
            if let Some(d) = month_name_date(&tokens, i) {
                date = Some(d);
                continue;
            }
        }
        if time.is_none() {
            if let Some(t) = clock_time(tok, tokens.get(i + 1).copied()) {
                time = Some(t);
            }
        }
    }

    let date = date?;
    Some(date.and_time(
        time.unwrap_or_else(|| NaiveTime::from_hms_opt(0, 0, 0).unwrap()),
    ))
}

/// A token like `2023-04-01`, `04/01/2023` or `1.4.2023`. Field order is
/// decided by magnitude: a leading value above 31 is a year, a leading value
/// above 12 is a day, otherwise month-first is assumed.
fn numeric_date(tok: &str) -> Option<NaiveDate> {
    let sep = ['-', '/', '.'].into_iter().find(|&c| tok.contains(c))?;
    let parts: Vec<&str> = tok.split(sep).collect();
    if parts.len() != 3 {
        return None;
    }
    let nums: Vec<u32> = parts
        .iter()
        .map(|p| p.parse::<u32>().ok())
        .collect::<Option<_>>()?;

    let (y, m, d) = if nums[0] > 31 {
        (nums[0], nums[1], nums[2])
    } else if nums[0] > 12 {
        (nums[2], nums[1], nums[0])
    } else {
        (nums[2], nums[0], nums[1])
    };
    NaiveDate::from_ymd_opt(expand_year(y) as i32, m, d)
}

/// A month name with a nearby day and year, e.g. `Mar 5 2023` / `5 Mar 2023`.
fn month_name_date(tokens: &[&str], i: usize) -> Option<NaiveDate> {
    let month = month_number(tokens[i])?;

    let prev = i.checked_sub(1).and_then(|j| tokens[j].parse::<u32>().ok());
    let next = tokens.get(i + 1).and_then(|t| t.parse::<u32>().ok());
    let after = tokens.get(i + 2).and_then(|t| t.parse::<u32>().ok());

    let (day, year) = match (prev, next, after) {
        // "5 Mar 2023"
        (Some(d), Some(y), _) if d <= 31 && y > 31 => (d, y),
        // "Mar 5 2023"
        (_, Some(d), Some(y)) if d <= 31 && y > 31 => (d, y),
        _ => return None,
    };
    NaiveDate::from_ymd_opt(expand_year(year) as i32, month, day)
}

fn month_number(tok: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    let lower = tok.to_lowercase();
    MONTHS
        .iter()
        .position(|m| lower.starts_with(m))
        .map(|i| i as u32 + 1)
}

/// A token like `08:05`, `14:30:59` or `2:30` followed by `pm`.
fn clock_time(tok: &str, next: Option<&str>) -> Option<NaiveTime> {
    if !tok.contains(':') {
        return None;
    }
    let (core, suffix) = split_meridiem(tok);
    let parts: Vec<&str> = core.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return None;
    }
    let mut h: u32 = parts[0].parse().ok()?;
    let m: u32 = parts[1].parse().ok()?;
    let s: u32 = if parts.len() == 3 {
        parts[2].parse().ok()?
    } else {
        0
    };

    let meridiem = suffix.or_else(|| next.and_then(meridiem_of));
    match meridiem {
        Some(Meridiem::Pm) if h < 12 => h += 12,
        Some(Meridiem::Am) if h == 12 => h = 0,
        _ => {}
    }
    NaiveTime::from_hms_opt(h, m, s)
}

#[derive(Clone, Copy)]
enum Meridiem {
    Am,
    Pm,
}

fn split_meridiem(tok: &str) -> (&str, Option<Meridiem>) {
    let lower = tok.to_lowercase();
    if lower.ends_with("am") {
        (&tok[..tok.len() - 2], Some(Meridiem::Am))
    } else if lower.ends_with("pm") {
        (&tok[..tok.len() - 2], Some(Meridiem::Pm))
    } else {
        (tok, None)
    }
}

fn meridiem_of(tok: &str) -> Option<Meridiem> {
    match tok.to_lowercase().as_str() {
        "am" => Some(Meridiem::Am),
        "pm" => Some(Meridiem::Pm),
        _ => None,
    }
}

/// Two-digit years are pivoted at 70, like most legacy exports.
fn expand_year(y: u32) -> u32 {
    match y {
        0..=69 => 2000 + y,
        70..=99 => 1900 + y,
        _ => y,
    }
}

// ---------------------------------------------------------------------------
// Column-level strategy
// ---------------------------------------------------------------------------

/// Parse a whole time column with the two-stage strategy.
///
/// Stage 1 applies the structured parser to every cell. The permissive
/// fallback runs only if stage 1 yields zero valid values for the entire
/// column, never cell by cell; values the active stage cannot read stay
/// `None` and their rows are dropped by the loader. A column that defeats
/// both stages is `NoParseableTimestamps`.
pub fn parse_column(values: &[String]) -> Result<Vec<Option<NaiveDateTime>>, LoadError> {
    let structured: Vec<Option<NaiveDateTime>> =
        values.iter().map(|v| parse_structured(v)).collect();
    if structured.iter().any(Option::is_some) {
        return Ok(structured);
    }

    let fuzzy: Vec<Option<NaiveDateTime>> = values.iter().map(|v| parse_fuzzy(v)).collect();
    if fuzzy.iter().any(Option::is_some) {
        return Ok(fuzzy);
    }
    Err(LoadError::NoParseableTimestamps)
}
