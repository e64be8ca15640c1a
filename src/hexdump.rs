//! # Hex Dump Input
//!
//! Captures are usually stored as text, one frame or tile per line, as
//! printed by the serial emulator:
//!
//! ```text
//! // GAMEBOY PRINTER Packet Capture
//! /* INIT */
//! 88 33 01 00 00 00 01 00 81 00
//! # DATA
//! 88,33,04,00,80,02, ...
//! ```
//!
//! ## Rules
//!
//! - `/* ... */` block comments are removed first (they may span lines)
//! - lines starting with `//` or `#` are skipped entirely
//! - tokens are separated by spaces, commas or tabs
//! - each token is one or two hex digits, optionally prefixed with `0x`

use crate::error::GbpError;

/// Remove block comments and comment lines.
///
/// Newlines inside block comments are kept so line numbers still match
/// the original text.
pub fn strip_comments(text: &str) -> String {
    let mut without_blocks = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("/*") {
        without_blocks.push_str(&rest[..start]);
        let body = &rest[start + 2..];
        let (comment, after) = match body.find("*/") {
            Some(end) => (&body[..end], &body[end + 2..]),
            None => (body, ""),
        };
        without_blocks.extend(comment.chars().filter(|&c| c == '\n'));
        rest = after;
    }
    without_blocks.push_str(rest);

    without_blocks
        .lines()
        .map(|line| if is_comment_line(line) { "" } else { line })
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_comment_line(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with("//") || line.starts_with('#')
}

/// Parse one line of hex tokens, appending the bytes to `out`.
///
/// `line_no` is only used in error reports. Comment lines yield nothing
/// and `/* ... */` comments inside the line are removed first; a block
/// comment left open hides the rest of the line.
pub fn parse_line(line: &str, line_no: usize, out: &mut Vec<u8>) -> Result<(), GbpError> {
    tokenize(&strip_comments(line), line_no, out)
}

/// Tokenize text that has already been stripped of comments.
fn tokenize(line: &str, line_no: usize, out: &mut Vec<u8>) -> Result<(), GbpError> {
    for token in line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        out.push(parse_token(token).ok_or_else(|| GbpError::HexDump {
            line: line_no,
            token: token.to_string(),
        })?);
    }

    Ok(())
}

fn parse_token(token: &str) -> Option<u8> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    if digits.is_empty() || digits.len() > 2 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(digits, 16).ok()
}

/// Convert a whole hex dump into bytes.
///
/// ```
/// use gbprinter::hexdump;
///
/// let text = "// header\n88 33 01 /* init */ 00\n# note\n00,00,01,00 81 00\n";
/// let bytes = hexdump::parse(text)?;
/// assert_eq!(bytes, vec![0x88, 0x33, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x81, 0x00]);
/// # Ok::<(), gbprinter::GbpError>(())
/// ```
pub fn parse(text: &str) -> Result<Vec<u8>, GbpError> {
    let stripped = strip_comments(text);
    let mut bytes = Vec::with_capacity(stripped.len() / 3);
    for (i, line) in stripped.lines().enumerate() {
        tokenize(line, i + 1, &mut bytes)?;
    }
    Ok(bytes)
}

/// Format bytes as a hex dump, `per_line` bytes per line.
pub fn format(bytes: &[u8], per_line: usize) -> String {
    bytes
        .chunks(per_line.max(1))
        .map(|chunk| {
            chunk
                .iter()
                .map(|b| format!("{:02X}", b))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spaces_and_commas() {
        assert_eq!(parse("88 33,04, 00\t10").unwrap(), vec![0x88, 0x33, 0x04, 0x00, 0x10]);
    }

    #[test]
    fn test_comment_lines_skipped() {
        let text = "// 88 33\n# 01 02\n  // indented\nAB\n";
        assert_eq!(parse(text).unwrap(), vec![0xAB]);
    }

    #[test]
    fn test_block_comment_spanning_lines() {
        let text = "01 /* start\n zz not hex\n end */ 02\n03";
        assert_eq!(parse(text).unwrap(), vec![0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_unterminated_block_comment() {
        assert_eq!(parse("01 02 /* rest of file\n03").unwrap(), vec![0x01, 0x02]);
    }

    #[test]
    fn test_line_with_inline_block_comment() {
        let mut out = Vec::new();
        parse_line("/* INIT */ 88 33 01 00 00 00 01 00 81 00", 1, &mut out).unwrap();
        assert_eq!(out, vec![0x88, 0x33, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x81, 0x00]);

        out.clear();
        parse_line("04 /* a */ 05 /* b */", 2, &mut out).unwrap();
        assert_eq!(out, vec![0x04, 0x05]);
    }

    #[test]
    fn test_line_comments_and_open_block() {
        let mut out = Vec::new();
        parse_line("  // 88 33", 1, &mut out).unwrap();
        parse_line("# DATA", 2, &mut out).unwrap();
        parse_line("06 07 /* unterminated zz", 3, &mut out).unwrap();
        assert_eq!(out, vec![0x06, 0x07]);

        let err = parse_line("/* x */ zz", 9, &mut out).unwrap_err();
        assert!(matches!(err, GbpError::HexDump { line: 9, .. }));
    }

    #[test]
    fn test_prefix_and_case() {
        assert_eq!(parse("0x1f 0XAb f").unwrap(), vec![0x1F, 0xAB, 0x0F]);
    }

    #[test]
    fn test_bad_token_reports_line() {
        let err = parse("00 01\n/* a\nb */\n02 zz 03").unwrap_err();
        match err {
            GbpError::HexDump { line, token } => {
                assert_eq!(line, 4);
                assert_eq!(token, "zz");
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(parse("123").is_err());
        assert!(parse("0x").is_err());
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("\n\n// only comments\n").unwrap().is_empty());
    }

    #[test]
    fn test_format_round_trips() {
        let bytes: Vec<u8> = (0..20).collect();
        let text = format(&bytes, 16);

        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("00 01 02"));
        assert_eq!(parse(&text).unwrap(), bytes);
    }
}
