use std::fmt::Write as _;

use super::RequestCount;

const HEADERS: [&str; 4] = ["Method", "Endpoint", "Code", "Count"];

/// Renders counts as a rounded box-drawing table.
///
/// ```text
/// ╭────────┬────────────────────┬──────┬───────╮
/// │ Method │ Endpoint           │ Code │ Count │
/// ├────────┼────────────────────┼──────┼───────┤
/// │ PUT    │ /users/#/locations │ 204  │ 4     │
/// ╰────────┴────────────────────┴──────┴───────╯
/// ```
///
/// Cells are left-aligned; the output has no trailing newline.
pub fn format_counts(counts: &[RequestCount]) -> String {
    let rows: Vec<[String; 4]> = counts
        .iter()
        .map(|c| {
            [
                c.key.method.clone(),
                c.key.endpoint.clone(),
                c.key.status.to_string(),
                c.count.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    rule(&mut out, &widths, ['╭', '┬', '╮']);
    out.push('\n');
    line(&mut out, &widths, HEADERS.iter().copied());
    out.push('\n');
    rule(&mut out, &widths, ['├', '┼', '┤']);
    for row in &rows {
        out.push('\n');
        line(&mut out, &widths, row.iter().map(String::as_str));
    }
    out.push('\n');
    rule(&mut out, &widths, ['╰', '┴', '╯']);
    out
}

/// Horizontal border; `[left, junction, right]`.
fn rule(out: &mut String, widths: &[usize], [left, mid, right]: [char; 3]) {
    out.push(left);
    for (i, w) in widths.iter().enumerate() {
        if i > 0 {
            out.push(mid);
        }
        out.extend(std::iter::repeat_n('─', w + 2));
    }
    out.push(right);
}

fn line<'a>(out: &mut String, widths: &[usize], cells: impl Iterator<Item = &'a str>) {
    out.push('│');
    for (cell, &w) in cells.zip(widths) {
        // Width is in chars; `{:<w$}` pads by chars too.
        let _ = write!(out, " {cell:<w$} │");
    }
}
