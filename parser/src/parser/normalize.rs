//! Label and line normalization for IFR dump text.

use regex::Regex;
use std::sync::LazyLock;

// SAFETY: These regexes are compile-time constants and are validated by tests.
static ANSI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]").expect("static regex must compile"));
static TRAILING_METADATA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\{.*\}\s*$").expect("static regex must compile"));

/// Cleans a raw text field captured from a dump line.
///
/// Removes terminal escape sequences, a trailing `{..}` opcode byte block,
/// `Statement {` markers and stray closing braces, then trims. Passes are
/// repeated until nothing changes, so the result is a fixpoint.
pub fn normalize_label(raw: &str) -> String {
    let mut current = raw.to_string();
    loop {
        let next = normalize_once(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn normalize_once(raw: &str) -> String {
    let stripped = ANSI_RE.replace_all(raw, "");
    let without_metadata = TRAILING_METADATA_RE.replace(&stripped, "");
    without_metadata
        .replace("Statement {", "")
        .replace('}', "")
        .trim()
        .to_string()
}

/// Splits raw dump text into right-trimmed lines.
///
/// Accepts `\n`, `\r\n` and bare `\r` line endings and drops a leading BOM.
pub fn split_dump_lines(raw: &str) -> Vec<String> {
    let without_bom = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    without_bom
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(|line| line.trim_end().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_ansi_sequences() {
        assert_eq!(normalize_label("\x1b[;44;mBoot Mode\x1b[0m"), "Boot Mode");
        assert_eq!(normalize_label("\x1b[1;37mMain"), "Main");
    }

    #[test]
    fn test_strips_trailing_metadata_block() {
        assert_eq!(
            normalize_label("Boot Mode {05 91 12 00 13 00}"),
            "Boot Mode"
        );
        assert_eq!(normalize_label("Main   {01 86 11 27}   "), "Main");
    }

    #[test]
    fn test_strips_statement_marker_and_stray_braces() {
        assert_eq!(normalize_label("Statement { System Time"), "System Time");
        assert_eq!(normalize_label("System Date }"), "System Date");
    }

    #[test]
    fn test_is_idempotent() {
        let inputs = [
            "  Boot Mode {05 91}  ",
            "\x1b[;44;mStatement {Fast Boot} {0A 0B}",
            "a}{b",
            "q {x Statement {",
            "Statement Statement {{}}",
            "plain",
            "",
            "{}",
            "\x1b[1m\x1b[0m",
        ];
        for input in inputs {
            let once = normalize_label(input);
            assert_eq!(normalize_label(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_unparseable_input_degrades_to_trimmed_copy() {
        assert_eq!(normalize_label("  <<weird>>  "), "<<weird>>");
        assert_eq!(normalize_label("a { b"), "a { b");
    }

    #[test]
    fn test_split_dump_lines_handles_line_endings() {
        let lines = split_dump_lines("\u{feff}0x1 Form: A (0x1)  \r\n0x2 Text: B\r0x3 End of Options\n");
        assert_eq!(
            lines,
            vec!["0x1 Form: A (0x1)", "0x2 Text: B", "0x3 End of Options"]
        );
    }
}
