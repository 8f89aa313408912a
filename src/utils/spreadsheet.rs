use anyhow::{anyhow, Result};

/// Column headers the activation-code sheet export uses.
const CODE_COLUMN: &str = "subscription_numbers";
const STATUS_COLUMN: &str = "status";

/// Parse a CSV export of the activation-code sheet into `(code, status)` rows.
///
/// The first line is treated as a header and the `subscription_numbers` and
/// `Status` columns are located case-insensitively. If neither header is
/// recognized, the first two columns are used and the first line is kept as
/// data. Blank lines and rows with an empty code are skipped.
pub fn parse_code_sheet(contents: &str) -> Result<Vec<(String, String)>> {
    let mut lines = contents.lines();

    let header = lines
        .next()
        .ok_or_else(|| anyhow!("Code sheet is empty"))?;
    let header_fields: Vec<String> = split_row(header)
        .iter()
        .map(|f| f.to_lowercase())
        .collect();

    let code_idx = header_fields.iter().position(|f| f == CODE_COLUMN);
    let status_idx = header_fields.iter().position(|f| f == STATUS_COLUMN);

    let (code_idx, status_idx, header_is_data) = match (code_idx, status_idx) {
        (Some(c), Some(s)) => (c, s, false),
        _ => (0, 1, true),
    };

    let mut rows = Vec::new();
    let data_lines = header_is_data
        .then(|| header.to_string())
        .into_iter()
        .chain(lines.map(str::to_string));

    for line in data_lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_row(&line);
        let code = fields.get(code_idx).map(String::as_str).unwrap_or("").trim();
        if code.is_empty() {
            continue;
        }
        let status = fields
            .get(status_idx)
            .map(String::as_str)
            .unwrap_or("")
            .trim();
        rows.push((code.to_string(), status.to_string()));
    }

    Ok(rows)
}

fn split_row(line: &str) -> Vec<String> {
    line.split(',').map(|f| f.trim().to_string()).collect()
}
