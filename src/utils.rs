//! Shared helpers used across the service.

use chrono::Utc;

/// Split one comma-separated line into fields, honoring double quotes.
///
/// Quoted fields may contain commas. A doubled quote inside a quoted field
/// is an escaped quote character. Fields are trimmed of surrounding
/// whitespace.
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Milliseconds since the Unix epoch.
pub fn unix_millis() -> i64 {
    Utc::now().timestamp_millis()
}
