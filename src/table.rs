use std::borrow::Cow;
use std::fmt::Write as _;

/// Renders `rows` under `headers` as a plain-text grid. Columns whose cells
/// are all numbers (optionally `%`-suffixed) are right-aligned.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let widths = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            rows.iter()
                .filter_map(|row| row.get(idx))
                .map(|cell| cell_width(cell))
                .fold(cell_width(header).max(3), usize::max)
        })
        .collect::<Vec<_>>();
    let numeric = (0..headers.len())
        .map(|idx| {
            rows.iter()
                .filter_map(|row| row.get(idx))
                .all(|cell| is_numeric_cell(cell))
                && !rows.is_empty()
        })
        .collect::<Vec<_>>();

    let mut output = String::new();
    let _ = writeln!(output, "{}", render_line(headers, &widths, &numeric));
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", render_line(&rule, &widths, &numeric));
    for row in rows {
        let _ = writeln!(output, "{}", render_line(row, &widths, &numeric));
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

fn render_line(cells: &[String], widths: &[usize], numeric: &[bool]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .zip(numeric)
        .map(|((cell, width), right)| {
            let text = flatten(cell);
            let pad = " ".repeat(width.saturating_sub(cell_width(&text)));
            if *right {
                format!("{pad}{text}")
            } else {
                format!("{text}{pad}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

fn cell_width(value: &str) -> usize {
    value.chars().count()
}

fn is_numeric_cell(value: &str) -> bool {
    let digits = value.strip_suffix('%').unwrap_or(value);
    !digits.is_empty() && digits.parse::<f64>().is_ok()
}

// Line breaks and tabs would tear the grid apart.
fn flatten(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_columns_are_right_aligned() {
        let headers = vec!["Position".to_string(), "Max CTR KW".to_string()];
        let rows = vec![
            vec!["1".to_string(), "seo tips".to_string()],
            vec!["12".to_string(), "gsc api".to_string()],
        ];
        let rendered = render_table(&headers, &rows);
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![
                "Position  Max CTR KW",
                "--------  ----------",
                "       1  seo tips",
                "      12  gsc api",
            ]
        );
    }

    #[test]
    fn control_characters_are_flattened() {
        let headers = vec!["Query".to_string()];
        let rows = vec![vec!["line1\nline2".to_string()]];
        let rendered = render_table(&headers, &rows);
        assert_eq!(rendered.lines().nth(2), Some("line1 line2"));
    }
}
