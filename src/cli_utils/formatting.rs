use colored::Colorize;

/// Render a table with columns and rows
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let col_widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let mut width = header.len();
            for row in rows {
                if i < row.len() {
                    width = width.max(row[i].len());
                }
            }
            width
        })
        .collect();

    let header_line = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = col_widths[i]))
        .collect::<Vec<_>>()
        .join(" | ");

    let mut out = format!("{}\n{}\n", header_line.bold(), "-".repeat(header_line.len()));
    for row in rows {
        let row_line = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:>width$}", cell, width = col_widths.get(i).copied().unwrap_or(12)))
            .collect::<Vec<_>>()
            .join(" | ");
        out.push_str(&row_line);
        out.push('\n');
    }
    out
}

/// Print a table with columns and rows
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

/// Format data as JSON
pub fn format_json<T: serde::Serialize>(data: &T) -> String {
    match serde_json::to_string_pretty(data) {
        Ok(json) => json,
        Err(_) => "Unable to format as JSON".to_string(),
    }
}

/// Format a single record as key-value pairs
pub fn format_record(data: Vec<(&str, String)>) {
    let max_key_len = data.iter().map(|(k, _)| k.len()).max().unwrap_or(20);

    for (key, value) in data {
        let padded_key = format!("{:width$}", key, width = max_key_len);
        println!("  {}: {}", padded_key.bright_cyan(), value);
    }
}

/// Two decimal places, the way amounts are shown everywhere in the CLI
pub fn format_amount(value: f64) -> String {
    format!("{:.2}", value)
}

/// Format a header
pub fn print_header(text: &str) {
    println!();
    println!("{}", text.bold().bright_cyan());
    println!("{}", "=".repeat(text.len()));
    println!();
}

/// Format a section
pub fn print_section(text: &str) {
    println!();
    println!("{}", text.bold().bright_white());
    println!("{}", "-".repeat(text.len()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(12.0), "12.00");
        assert_eq!(format_amount(-3.456), "-3.46");
    }

    #[test]
    fn test_render_table_pads_columns() {
        colored::control::set_override(false);
        let table = render_table(
            &["Date", "Forecast"],
            &[vec!["2024-01-01".to_string(), "1.00".to_string()]],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Date       | Forecast");
        assert_eq!(lines[2], "2024-01-01 |     1.00");
    }
}
