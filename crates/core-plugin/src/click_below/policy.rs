//! How many lines a click below the content appends.
//!
//! A non-blank last line needs a blank separator plus a line for the cursor
//! (2). A blank last line already provides the separator and only needs the
//! cursor line (1). Two trailing blank lines, or a document that is a single
//! blank line, need nothing. A blank last line leaves a visible gap already,
//! so any positive distance qualifies; otherwise the click must clear one
//! full line height.

use core_model::TextEditor;
use core_text::is_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrailingLineState {
    pub last_blank: bool,
    pub second_to_last_blank: bool,
    pub single_line: bool,
}

impl TrailingLineState {
    pub fn read(editor: &dyn TextEditor) -> Self {
        let last = editor.last_line();
        let last_blank = editor.line(last).is_none_or(|l| is_blank(&l));
        let second_to_last_blank = last
            .checked_sub(1)
            .and_then(|idx| editor.line(idx))
            .is_some_and(|l| is_blank(&l));
        Self {
            last_blank,
            second_to_last_blank,
            single_line: last == 0,
        }
    }
}

/// Parse a computed line-height string the way style values are read: the
/// longest leading floating-point literal counts, any unit suffix is ignored.
/// Anything that does not yield a finite positive number uses `fallback`.
pub fn parse_line_height(raw: Option<&str>, fallback: f64) -> f64 {
    let Some(raw) = raw else {
        return fallback;
    };
    let s = raw.trim();
    match s[..float_prefix_len(s.as_bytes())].parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v,
        _ => fallback,
    }
}

/// Length of the longest prefix of `s` shaped `[+-]digits[.digits][e[+-]digits]`,
/// or 0 when no mantissa digit is present. An exponent marker only counts
/// when digits follow it.
fn float_prefix_len(s: &[u8]) -> usize {
    let digits_from = |mut i: usize| {
        while s.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };
    let mut i = usize::from(matches!(s.first(), Some(b'+' | b'-')));
    let int_end = digits_from(i);
    let mut mantissa_digits = int_end - i;
    i = int_end;
    if s.get(i) == Some(&b'.') {
        let frac_end = digits_from(i + 1);
        mantissa_digits += frac_end - (i + 1);
        i = frac_end;
    }
    if mantissa_digits == 0 {
        return 0;
    }
    if matches!(s.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(s.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_end = digits_from(j);
        if exp_end > j {
            i = exp_end;
        }
    }
    i
}

/// Lines to append for a click `distance` pixels below the content bottom.
pub fn lines_to_append(distance: f64, state: TrailingLineState, line_height: f64) -> u8 {
    if state.single_line && state.last_blank {
        return 0;
    }
    if state.last_blank && state.second_to_last_blank {
        return 0;
    }
    let threshold = if state.last_blank { 0.0 } else { line_height };
    if distance > threshold {
        if state.last_blank { 1 } else { 2 }
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::TextView;
    use core_text::Buffer;

    fn state_of(lines: &[&str]) -> TrailingLineState {
        let view = TextView::new(Buffer::from_lines("t", lines).unwrap());
        TrailingLineState::read(&view)
    }

    #[test]
    fn reads_trailing_state() {
        assert_eq!(
            state_of(&["hello"]),
            TrailingLineState {
                last_blank: false,
                second_to_last_blank: false,
                single_line: true
            }
        );
        assert_eq!(
            state_of(&["hello", "  "]),
            TrailingLineState {
                last_blank: true,
                second_to_last_blank: false,
                single_line: false
            }
        );
        assert_eq!(
            state_of(&["hello", "", "\t"]),
            TrailingLineState {
                last_blank: true,
                second_to_last_blank: true,
                single_line: false
            }
        );
        assert!(state_of(&[""]).single_line);
    }

    #[test]
    fn parse_line_height_variants() {
        assert_eq!(parse_line_height(Some("24px"), 10.0), 24.0);
        assert_eq!(parse_line_height(Some("22.5px"), 10.0), 22.5);
        assert_eq!(parse_line_height(Some(" 18 "), 10.0), 18.0);
        assert_eq!(parse_line_height(Some("normal"), 10.0), 10.0);
        assert_eq!(parse_line_height(Some(""), 10.0), 10.0);
        assert_eq!(parse_line_height(Some("-4px"), 10.0), 10.0);
        assert_eq!(parse_line_height(Some("0px"), 10.0), 10.0);
        assert_eq!(parse_line_height(None, 10.0), 10.0);
    }

    #[test]
    fn parse_line_height_takes_longest_number_prefix() {
        assert_eq!(parse_line_height(Some("1e2px"), 10.0), 100.0);
        assert_eq!(parse_line_height(Some("2.5E+1px"), 10.0), 25.0);
        assert_eq!(parse_line_height(Some("24.5.1px"), 10.0), 24.5);
        assert_eq!(parse_line_height(Some("1epx"), 10.0), 1.0);
        assert_eq!(parse_line_height(Some("3e-"), 10.0), 3.0);
        assert_eq!(parse_line_height(Some(".5px"), 10.0), 0.5);
        assert_eq!(parse_line_height(Some("12.px"), 10.0), 12.0);
        assert_eq!(parse_line_height(Some("+16px"), 10.0), 16.0);
        assert_eq!(parse_line_height(Some(".px"), 10.0), 10.0);
        assert_eq!(parse_line_height(Some("e5"), 10.0), 10.0);
    }

    #[test]
    fn threshold_is_strict() {
        let non_blank = state_of(&["hello"]);
        assert_eq!(lines_to_append(24.0, non_blank, 24.0), 0);
        assert_eq!(lines_to_append(25.0, non_blank, 24.0), 2);
        let blank = state_of(&["hello", ""]);
        assert_eq!(lines_to_append(0.0, blank, 24.0), 0);
        assert_eq!(lines_to_append(1.0, blank, 24.0), 1);
    }

    #[test]
    fn nan_distance_never_appends() {
        assert_eq!(lines_to_append(f64::NAN, state_of(&["x"]), 24.0), 0);
    }
}
