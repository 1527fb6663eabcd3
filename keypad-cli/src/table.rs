//! Render the key lookup table, as text or as an HTML/SVG picture of the
//! matrix, and locate single keys in it.

use keypad_matrix::keymap::{self, COLS, KEYMAP, ROWS};
use keypad_matrix::KeyCode;

/// Key cell size in SVG pixels.
const U: f64 = 64.0;
/// Gap between cells.
const GAP: f64 = 6.0;
/// Step: cell + gap.
const S: f64 = U + GAP;
/// Cell corner radius.
const R: f64 = 6.0;
/// Margin around the SVG content, room for the axis labels.
const MARGIN: f64 = 40.0;

/// Text table: one line per logical column, one cell per row.
pub fn render_text() -> String {
    let mut out = String::from("column  line ");
    for row in 0..ROWS {
        out.push_str(&format!(" row {:<3}", row));
    }
    out.push('\n');

    for (col, keys) in KEYMAP.iter().enumerate() {
        let line = match col {
            0 => "-".to_string(),
            _ => (col - 1).to_string(),
        };
        out.push_str(&format!("{:<7} {:<5}", col, line));
        for key in keys {
            out.push_str(&format!(" {:<7}", key.display_name()));
        }
        out.push('\n');
    }
    out
}

/// Label and matrix position of a raw key code.
pub fn describe_code(code: u8) -> String {
    let key = KeyCode::from_code(code);
    let Some((col, row)) = keymap::position(key) else {
        return format!("code {} is not on the keypad", code);
    };
    let line = match col {
        0 => "no column line driven".to_string(),
        _ => format!("column line {} low", col - 1),
    };
    format!(
        "{} (code {}): column {}, row {} ({})",
        key.display_name(),
        code,
        col,
        row,
        line
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// The matrix as an HTML page with inline SVG: columns across, rows down.
pub fn render_html() -> String {
    let width = COLS as f64 * S + 2.0 * MARGIN;
    let height = ROWS as f64 * S + 2.0 * MARGIN;

    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Keypad matrix</title>
<style>
  body {{
    background: #1a1a2e;
    color: #eee;
    font-family: system-ui, -apple-system, sans-serif;
    display: flex;
    justify-content: center;
    padding: 2em;
  }}
  .key {{
    fill: #16213e;
    stroke: #0f3460;
    stroke-width: 1.5;
  }}
  .key.side {{
    fill: #2d1b4e;
    stroke: #e94560;
  }}
  .key.unused {{
    fill: #0d1117;
    stroke: #21262d;
    stroke-dasharray: 3 3;
  }}
  .label {{
    fill: #eee;
    font-family: "JetBrains Mono", "Fira Code", monospace;
    font-size: 14px;
    text-anchor: middle;
    dominant-baseline: middle;
  }}
  .axis {{
    fill: #e94560;
    font-size: 12px;
    text-anchor: middle;
  }}
</style>
</head>
<body>
<svg width="{width}" height="{height}" xmlns="http://www.w3.org/2000/svg">
"#
    );

    for col in 0..COLS {
        let x = MARGIN + col as f64 * S;
        html.push_str(&format!(
            r#"<text x="{}" y="{}" class="axis">col {col}</text>"#,
            x + U / 2.0,
            MARGIN - 12.0,
        ));
    }
    for row in 0..ROWS {
        let y = MARGIN + row as f64 * S;
        html.push_str(&format!(
            r#"<text x="{}" y="{}" class="axis">row {row}</text>"#,
            MARGIN / 2.0,
            y + U / 2.0,
        ));
    }

    for (col, keys) in KEYMAP.iter().enumerate() {
        for (row, &key) in keys.iter().enumerate() {
            let x = MARGIN + col as f64 * S;
            let y = MARGIN + row as f64 * S;
            let class = match key {
                KeyCode::Invalid => "key unused",
                KeyCode::Side1 | KeyCode::Side2 => "key side",
                _ => "key",
            };
            html.push_str(&format!(
                r#"<rect x="{x}" y="{y}" width="{U}" height="{U}" rx="{R}" class="{class}"/>"#
            ));
            if !key.is_invalid() {
                html.push_str(&format!(
                    r#"<text x="{}" y="{}" class="label">{}</text>"#,
                    x + U / 2.0,
                    y + U / 2.0,
                    html_escape(key.display_name()),
                ));
            }
        }
        html.push('\n');
    }

    html.push_str("</svg>\n</body>\n</html>\n");
    html
}
