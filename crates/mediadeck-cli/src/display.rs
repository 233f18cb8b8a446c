//! Terminal rendering for schema-free records.
//!
//! Tables and detail cards are built from whatever fields a response
//! actually carries. Each view names its preferred columns; anything the
//! API sends beyond those still shows up in the card's trailing section,
//! so new server-side fields appear without a client change.

use chrono::NaiveDateTime;
use serde_json::Value;

use mediadeck_client::ClientError;
use mediadeck_core::{Record, RecordPage};

const MAX_CELL_WIDTH: usize = 40;
const CARD_LABEL_WIDTH: usize = 20;

// ── Preferred table columns per record kind ──

pub const TRAINING_COLUMNS: &[&str] = &[
    "imdb_id",
    "media_title",
    "release_year",
    "rt_score",
    "imdb_votes",
    "label",
    "human_labeled",
    "reviewed",
    "anomalous",
];

pub const PREDICTION_COLUMNS: &[&str] = &[
    "imdb_id",
    "media_title",
    "prediction",
    "probability",
    "actual",
    "cm_value",
];

pub const MEDIA_COLUMNS: &[&str] = &[
    "hash",
    "media_title",
    "resolution",
    "video_codec",
    "pipeline_status",
    "error_status",
    "rejection_status",
];

pub const MIGRATION_COLUMNS: &[&str] = &[
    "installed_rank",
    "version",
    "description",
    "type",
    "installed_on",
    "execution_time",
    "success",
];

// ── Detail-card section groupings ──

pub const TRAINING_CARD: &[(&str, &[&str])] = &[
    (
        "Basic",
        &[
            "imdb_id",
            "tmdb_id",
            "media_title",
            "release_year",
            "runtime",
            "original_language",
            "origin_country",
        ],
    ),
    ("Status", &["label", "human_labeled", "reviewed", "anomalous"]),
    (
        "Ratings",
        &[
            "rt_score",
            "imdb_rating",
            "imdb_votes",
            "tmdb_rating",
            "tmdb_votes",
            "metascore",
        ],
    ),
    ("Financial", &["budget", "revenue"]),
    (
        "Content",
        &["genre", "production_status", "tagline", "overview"],
    ),
    ("Timestamps", &["created_at", "updated_at"]),
];

pub const PREDICTION_CARD: &[(&str, &[&str])] = &[
    (
        "Prediction",
        &["prediction", "probability", "actual", "cm_value"],
    ),
    ("Basic", &["imdb_id", "media_title", "release_year"]),
    ("Status", &["label", "human_labeled", "reviewed", "anomalous"]),
    ("Timestamps", &["created_at", "updated_at"]),
];

pub const MEDIA_CARD: &[(&str, &[&str])] = &[
    (
        "Identity",
        &[
            "hash",
            "media_title",
            "original_title",
            "resolution",
            "video_codec",
        ],
    ),
    (
        "Pipeline",
        &[
            "pipeline_status",
            "error_status",
            "error_condition",
            "rejection_status",
            "rejection_reason",
        ],
    ),
    ("Timestamps", &["created_at", "updated_at"]),
];

// ── Tables ──

/// Render a listing as an aligned text table.
///
/// Columns are the preferred set filtered to fields actually present;
/// when none of the preferred columns are present the columns are
/// derived from the records themselves.
pub fn render_table(page: &RecordPage, preferred: &[&str]) {
    for line in table_lines(page, preferred) {
        println!("{line}");
    }
}

/// The table as lines of text. Header, separator, one line per record.
pub fn table_lines(page: &RecordPage, preferred: &[&str]) -> Vec<String> {
    let derived = page.columns();
    let mut columns: Vec<&str> = preferred
        .iter()
        .copied()
        .filter(|c| derived.iter().any(|d| d == c))
        .collect();
    if columns.is_empty() {
        columns = derived.iter().map(String::as_str).collect();
    }

    let cells: Vec<Vec<String>> = page
        .records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|col| fmt_field(col, record.get(col)))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(col.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(cells.len() + 2);
    lines.push(format_row(
        &columns.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
        &widths,
    ));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in &cells {
        lines.push(format_row(row, &widths));
    }
    lines
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let mut out = String::new();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(cell);
        // Pad by char count so multibyte titles stay aligned.
        let pad = widths[i].saturating_sub(cell.chars().count());
        if i + 1 < cells.len() {
            out.push_str(&" ".repeat(pad));
        }
    }
    out
}

// ── Cards ──

/// Print one record as a vertical card grouped by section.
///
/// Sections with no present fields are skipped; fields outside every
/// section land in a trailing "Other" section so nothing the API sent
/// is hidden.
pub fn render_card(record: &Record, sections: &[(&str, &[&str])]) {
    for (header, fields) in sections {
        let present: Vec<&&str> = fields
            .iter()
            .filter(|f| record.get(f).is_some_and(|v| !v.is_null()))
            .collect();
        if present.is_empty() {
            continue;
        }
        println!("{header}");
        for field in present {
            println!(
                "  {:<width$} {}",
                field,
                fmt_field(field, record.get(field)),
                width = CARD_LABEL_WIDTH
            );
        }
        println!();
    }

    let covered: Vec<&str> = sections.iter().flat_map(|(_, fs)| fs.iter().copied()).collect();
    let other: Vec<&str> = record
        .field_names()
        .filter(|name| !covered.contains(name))
        .collect();
    if !other.is_empty() {
        println!("Other");
        for field in other {
            println!(
                "  {:<width$} {}",
                field,
                fmt_field(field, record.get(field)),
                width = CARD_LABEL_WIDTH
            );
        }
        println!();
    }
}

// ── Value formatting ──

/// Field-aware formatting: durations, timestamps, and vote counts get
/// humanised; everything else goes through [`fmt_value`].
pub fn fmt_field(name: &str, value: Option<&Value>) -> String {
    let Some(value) = value else {
        return "NULL".to_string();
    };
    match name {
        "execution_time" => match value.as_i64() {
            Some(ms) => fmt_execution_time(ms),
            None => fmt_value(value),
        },
        _ if name.ends_with("_votes") => match value.as_i64() {
            Some(n) => fmt_count(n),
            None => fmt_value(value),
        },
        _ if name.ends_with("_at") || name.ends_with("_on") => match value.as_str() {
            Some(s) => fmt_timestamp(s),
            None => fmt_value(value),
        },
        _ => fmt_value(value),
    }
}

pub fn fmt_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(true) => "yes".to_string(),
        Value::Bool(false) => "no".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => truncate(s, MAX_CELL_WIDTH),
        Value::Array(items) => {
            let joined = items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", ");
            truncate(&joined, MAX_CELL_WIDTH)
        }
        Value::Object(map) => format!("{{{} fields}}", map.len()),
    }
}

/// `850` → `850ms`, `1240` → `1.2s`.
pub fn fmt_execution_time(ms: i64) -> String {
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        format!("{:.1}s", ms as f64 / 1000.0)
    }
}

/// `1_500_000` → `1.5M`, `45_000` → `45K`, `900` → `900`.
pub fn fmt_count(n: i64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{}K", n / 1_000)
    } else {
        n.to_string()
    }
}

/// Normalise an ISO 8601 timestamp for display; unparseable input is
/// shown as-is.
pub fn fmt_timestamp(raw: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    raw.to_string()
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

// ── Banners ──

/// Error banner for a failed read, with retry guidance where retrying
/// can help.
pub fn error_banner(err: &ClientError) -> String {
    match err {
        ClientError::Connect(_) => {
            format!("error: {err}\n  check that the API is reachable, then `refresh` to retry")
        }
        ClientError::Timeout(_) => {
            format!("error: {err}\n  the API may be slow or overloaded; `refresh` to retry")
        }
        ClientError::Api { status, body } => {
            format!("error: API returned {status}: {}", truncate(body, 200))
        }
        ClientError::Json(_) | ClientError::InvalidTitleId(_) => format!("error: {err}"),
    }
}

/// Warning banner for a failed mutation. The view keeps showing the
/// data it had.
pub fn warn_banner(err: &ClientError) -> String {
    format!(
        "warning: update failed: {}\n  previously displayed data is unchanged",
        match err {
            ClientError::Api { status, body } =>
                format!("API returned {status}: {}", truncate(body, 200)),
            other => other.to_string(),
        }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(body: Value) -> RecordPage {
        RecordPage::from_response(body)
    }

    #[test]
    fn table_has_one_line_per_record_plus_header() {
        let page = page(json!({
            "data": [
                {"imdb_id": "tt0000001", "media_title": "Alien"},
                {"imdb_id": "tt0000002", "media_title": "Heat"},
                {"imdb_id": "tt0000003", "media_title": "Ronin"},
            ]
        }));
        let lines = table_lines(&page, TRAINING_COLUMNS);
        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("imdb_id"));
        assert!(lines[2].contains("Alien"));
    }

    #[test]
    fn columns_fall_back_to_record_fields() {
        let page = page(json!({"data": [{"foo": 1, "bar": "x"}]}));
        let lines = table_lines(&page, TRAINING_COLUMNS);
        assert!(lines[0].contains("foo"));
        assert!(lines[0].contains("bar"));
    }

    #[test]
    fn preferred_columns_are_filtered_to_present() {
        let page = page(json!({"data": [{"imdb_id": "tt0000001", "unrelated": 1}]}));
        let lines = table_lines(&page, TRAINING_COLUMNS);
        assert!(lines[0].contains("imdb_id"));
        assert!(!lines[0].contains("media_title"));
        assert!(!lines[0].contains("unrelated"));
    }

    #[test]
    fn execution_time_humanised() {
        assert_eq!(fmt_execution_time(850), "850ms");
        assert_eq!(fmt_execution_time(1240), "1.2s");
        assert_eq!(fmt_execution_time(0), "0ms");
    }

    #[test]
    fn counts_humanised() {
        assert_eq!(fmt_count(1_500_000), "1.5M");
        assert_eq!(fmt_count(45_000), "45K");
        assert_eq!(fmt_count(900), "900");
    }

    #[test]
    fn timestamps_normalised() {
        assert_eq!(fmt_timestamp("2024-03-01T10:00:00Z"), "2024-03-01 10:00:00");
        assert_eq!(
            fmt_timestamp("2024-03-01T10:00:00.123456"),
            "2024-03-01 10:00:00"
        );
        assert_eq!(fmt_timestamp("not a date"), "not a date");
    }

    #[test]
    fn values_formatted() {
        assert_eq!(fmt_value(&json!(null)), "NULL");
        assert_eq!(fmt_value(&json!(true)), "yes");
        assert_eq!(fmt_value(&json!(false)), "no");
        assert_eq!(fmt_value(&json!(["Drama", "Crime"])), "Drama, Crime");
        assert_eq!(fmt_value(&json!({"a": 1, "b": 2})), "{2 fields}");
    }

    #[test]
    fn field_aware_formatting() {
        assert_eq!(fmt_field("imdb_votes", Some(&json!(45_000))), "45K");
        assert_eq!(
            fmt_field("updated_at", Some(&json!("2024-03-01T10:00:00Z"))),
            "2024-03-01 10:00:00"
        );
        assert_eq!(fmt_field("missing", None), "NULL");
        // Wrong-typed values fall back to plain formatting.
        assert_eq!(fmt_field("imdb_votes", Some(&json!("n/a"))), "n/a");
    }

    #[test]
    fn truncation_is_char_safe() {
        let s = "é".repeat(50);
        let out = truncate(&s, 10);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 10);
    }
}
