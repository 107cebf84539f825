use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Keyword tables – one per semantic role
// ---------------------------------------------------------------------------

const TIME_KEYWORDS: &[&str] = &["ts", "time", "date", "timestamp"];
const GLUCOSE_KEYWORDS: &[&str] = &["glucosecgm", "glucose", "cgm", "sensor glucose"];
const INSULIN_KEYWORDS: &[&str] = &["insulin", "bolus", "basal"];
const CARB_KEYWORDS: &[&str] = &["carb", "meal", "cho"];
const HEART_RATE_KEYWORDS: &[&str] = &["heart", "hr"];
const STEPS_KEYWORDS: &[&str] = &["step", "steps"];

// ---------------------------------------------------------------------------
// Resolved schema – column index per role
// ---------------------------------------------------------------------------

/// Column indices for each semantic role of one file. Source files carry
/// arbitrary, inconsistent headers; roles are recovered by substring match
/// against the keyword tables above, never by inspecting values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaMap {
    pub time: usize,
    pub glucose: Option<usize>,
    pub insulin: Option<usize>,
    pub carbohydrate: Option<usize>,
    pub heart_rate: Option<usize>,
    pub steps: Option<usize>,
}

/// Resolve every role independently over the file's headers.
///
/// For each role, columns are scanned in their original order and the first
/// whose lowercased, trimmed name contains any of the role's keywords wins.
/// The time role is mandatory; every other role is optional (an absent
/// channel is later filled with zeros, or empties the series for glucose).
pub fn resolve(headers: &[String]) -> Result<SchemaMap, LoadError> {
    let time = first_match(headers, TIME_KEYWORDS).ok_or_else(|| LoadError::MissingTimeColumn {
        headers: headers.to_vec(),
    })?;

    Ok(SchemaMap {
        time,
        glucose: first_match(headers, GLUCOSE_KEYWORDS),
        insulin: first_match(headers, INSULIN_KEYWORDS),
        carbohydrate: first_match(headers, CARB_KEYWORDS),
        heart_rate: first_match(headers, HEART_RATE_KEYWORDS),
        steps: first_match(headers, STEPS_KEYWORDS),
    })
}

/// First column whose normalized name contains any keyword, in column order.
fn first_match(headers: &[String], keywords: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let name = h.trim().to_lowercase();
        keywords.iter().any(|k| name.contains(k))
    })
}
