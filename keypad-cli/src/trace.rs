use anyhow::{bail, Context, Result};
use keypad_matrix::{COLS, ROWS};

/// Row-sample scripts for each logical column, as read from a trace file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
    pub columns: [Vec<u8>; COLS],
}

impl Trace {
    pub fn scripts(&self) -> [&[u8]; COLS] {
        let mut scripts: [&[u8]; COLS] = [&[]; COLS];
        for (script, samples) in scripts.iter_mut().zip(&self.columns) {
            *script = samples.as_slice();
        }
        scripts
    }
}

/// Parse a trace file.
///
/// One column per line:
///
/// ```text
/// # row 0 of column 2 bounces, then settles
/// col 2: 1111 1110 1111 1110 1110 1110
/// ```
///
/// Samples are binary, row 3 first, with an optional `0b` prefix. Columns
/// without a line read as all rows released.
pub fn parse_trace(input: &str) -> Result<Trace> {
    let mut trace = Trace::default();
    let mut seen = [false; COLS];

    for (line_num, line) in input.lines().enumerate() {
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        }
        .trim();
        if line.is_empty() {
            continue;
        }

        let Some((head, samples)) = line.split_once(':') else {
            bail!("line {}: missing ':' after column", line_num + 1);
        };

        let col = parse_column(head).with_context(|| format!("line {}", line_num + 1))?;
        if seen[col] {
            bail!("line {}: column {} given twice", line_num + 1, col);
        }
        seen[col] = true;

        trace.columns[col] = samples
            .split_whitespace()
            .map(parse_sample)
            .collect::<Result<Vec<u8>>>()
            .with_context(|| format!("line {}: column {}", line_num + 1, col))?;
    }

    Ok(trace)
}

fn parse_column(head: &str) -> Result<usize> {
    let mut words = head.split_whitespace();
    if words.next() != Some("col") {
        bail!("expected 'col <index>'");
    }
    let Some(index) = words.next() else {
        bail!("missing column index");
    };
    if words.next().is_some() {
        bail!("unexpected text before ':'");
    }

    let col: usize = index
        .parse()
        .with_context(|| format!("invalid column index '{}'", index))?;
    if col >= COLS {
        bail!("column {} out of range (0..{})", col, COLS);
    }
    Ok(col)
}

fn parse_sample(word: &str) -> Result<u8> {
    let digits = word.strip_prefix("0b").unwrap_or(word);
    if digits.len() != ROWS || !digits.bytes().all(|b| b == b'0' || b == b'1') {
        bail!("sample '{}' must have {} binary digits", word, ROWS);
    }
    u8::from_str_radix(digits, 2).with_context(|| format!("invalid binary sample '{}'", word))
}

#[cfg(test)]
mod tests {
    use super::*;
    use keypad_matrix::sim::{FreeRunningCountdown, ScriptedPort};
    use keypad_matrix::{ColumnOutcome, Delay, KeyCode, Scanner};

    #[test]
    fn test_parse_simple_trace() {
        let text = "col 2: 1111 1110 1111 1110 1110 1110\n";
        let trace = parse_trace(text).unwrap();
        assert_eq!(trace.columns[2], vec![0b1111, 0b1110, 0b1111, 0b1110, 0b1110, 0b1110]);
        assert!(trace.columns[0].is_empty());
        assert!(trace.columns[4].is_empty());
    }

    #[test]
    fn test_comments_blank_lines_and_prefix() {
        let text = "# side key\n\
                    \n\
                    col 0: 0b1101 0b1101   # held\n\
                    col 4:\n";
        let trace = parse_trace(text).unwrap();
        assert_eq!(trace.columns[0], vec![0b1101, 0b1101]);
        assert!(trace.columns[4].is_empty());
    }

    #[test]
    fn test_scripts_borrow_columns() {
        let trace = parse_trace("col 1: 0111\ncol 3: 1011 1011").unwrap();
        let scripts = trace.scripts();
        assert_eq!(scripts[1], &[0b0111][..]);
        assert_eq!(scripts[3], &[0b1011, 0b1011][..]);
        assert!(scripts[0].is_empty());
    }

    #[test]
    fn test_errors_name_the_line() {
        let err = parse_trace("col 1: 1111\ncol 9: 1111\n").unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));

        let err = parse_trace("\n\ncol 1 1111\n").unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_rejects_bad_samples() {
        assert!(parse_trace("col 1: 111").is_err());
        assert!(parse_trace("col 1: 11111").is_err());
        assert!(parse_trace("col 1: 1121").is_err());
        assert!(parse_trace("col 1: 0x0F").is_err());
        assert!(parse_trace("col 1: +111").is_err());
        assert!(parse_trace("col 1: 0b+111").is_err());
    }

    #[test]
    fn test_rejects_bad_column_heads() {
        assert!(parse_trace("row 1: 1111").is_err());
        assert!(parse_trace("col: 1111").is_err());
        assert!(parse_trace("col x: 1111").is_err());
        assert!(parse_trace("col 1 2: 1111").is_err());
        assert!(parse_trace("col 5: 1111").is_err());
    }

    #[test]
    fn test_rejects_duplicate_column() {
        assert!(parse_trace("col 1: 1111\ncol 1: 1110").is_err());
    }

    fn replay(text: &str) -> (KeyCode, [ColumnOutcome; COLS]) {
        let trace = parse_trace(text).unwrap();
        let delay = Delay::new(FreeRunningCountdown::new(479_999, 4), 48_000_000);
        let mut scanner = Scanner::new(ScriptedPort::with_scripts(trace.scripts()), delay);
        let mut outcomes = [ColumnOutcome::Skipped; COLS];
        let key = scanner.poll_traced(&mut outcomes);
        (key, outcomes)
    }

    #[test]
    fn test_bundled_bounce_trace() {
        let (key, outcomes) = replay(include_str!("../traces/bounce.trace"));
        assert_eq!(key, KeyCode::Up);
        assert_eq!(outcomes[3], ColumnOutcome::Skipped);
    }

    #[test]
    fn test_bundled_noisy_trace() {
        let (key, outcomes) = replay(include_str!("../traces/noisy.trace"));
        assert_eq!(key, KeyCode::Key3);
        assert_eq!(outcomes[1], ColumnOutcome::Noisy);
    }
}
