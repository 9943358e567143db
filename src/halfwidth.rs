//! Full-width to half-width punctuation conversion.
//!
//! [`convert_line`] is a single left-to-right pass over one line. It looks at
//! most one character behind (into its own output) and one character ahead
//! (into the input), so lines are independent and can be converted in any
//! order or in parallel.

use std::collections::HashMap;
use std::sync::LazyLock;

use rayon::prelude::*;

/// How a converted mark interacts with the whitespace around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PunctKind {
    /// Substituted as-is, never spaced.
    Verbatim,
    /// `( [ {`: gets a leading space when it follows prose.
    OpensBracket,
    /// `) ] }`: gets a trailing space unless at line end or suppressed.
    ClosesBracket,
    /// `. : , ; ! ?`: same trailing rule as closing brackets.
    NeedsTrailingSpace,
}

/// One entry of the conversion table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
    pub full: char,
    pub half: &'static str,
    pub kind: PunctKind,
}

const fn map(full: char, half: &'static str, kind: PunctKind) -> Mapping {
    Mapping { full, half, kind }
}

use PunctKind::*;

/// Every full-width mark the converter knows about.
pub const TABLE: &[Mapping] = &[
    map('。', ".", NeedsTrailingSpace),
    map('，', ",", NeedsTrailingSpace),
    map('：', ":", NeedsTrailingSpace),
    map('；', ";", NeedsTrailingSpace),
    map('、', ",", NeedsTrailingSpace),
    map('？', "?", NeedsTrailingSpace),
    map('！', "!", NeedsTrailingSpace),
    map('“', "\"", Verbatim),
    map('”', "\"", Verbatim),
    map('‘', "'", Verbatim),
    map('’', "'", Verbatim),
    map('（', "(", OpensBracket),
    map('）', ")", ClosesBracket),
    map('【', "[", OpensBracket),
    map('】', "]", ClosesBracket),
    map('｛', "{", OpensBracket),
    map('｝', "}", ClosesBracket),
    map('「', "{", OpensBracket),
    map('」', "}", ClosesBracket),
    map('『', "{", OpensBracket),
    map('』', "}", ClosesBracket),
    map('《', "<", Verbatim),
    map('》', ">", Verbatim),
    map('·', "`", Verbatim),
    map('…', "...", Verbatim),
    map('￥', "$", Verbatim),
    map('¥', "$", Verbatim),
    map('—', "_", Verbatim),
    map('｜', "|", Verbatim),
];

static INDEX: LazyLock<HashMap<char, &'static Mapping>> =
    LazyLock::new(|| TABLE.iter().map(|m| (m.full, m)).collect());

/// Next characters that cancel an otherwise-added trailing space.
///
/// Matches against the *unconverted* input, so it lists the raw full-width
/// stops alongside their ASCII forms. A new stop mapping has to be added both
/// here and to [`TABLE`].
const SUPPRESS_TRAILING_SPACE: &[char] = &[
    ' ', '\n', '\r', '\t', '.', ',', '，', '。', '：', '；', '？', '！', '、',
];

/// Previous output characters after which an opening bracket stays unspaced.
const NO_SPACE_BEFORE_OPEN: &[char] = &[' ', '\n', '\r', '\t', '(', '[', '{'];

/// Look up the mapping for a full-width character.
pub fn lookup(c: char) -> Option<&'static Mapping> {
    INDEX.get(&c).copied()
}

/// Convert the punctuation of one line.
///
/// The line may carry its terminator; trailing whitespace (newline included)
/// is ignored when deciding whether a mark ends the line.
pub fn convert_line(line: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    let last_visible = line.trim_end().chars().count().checked_sub(1);

    let mut out = String::with_capacity(line.len());
    for (i, &c) in chars.iter().enumerate() {
        let Some(mapping) = lookup(c) else {
            out.push(c);
            continue;
        };

        let is_line_end = Some(i) == last_visible;
        let next = chars.get(i + 1).copied();
        let prev = out.chars().next_back();

        if mapping.kind == OpensBracket
            && prev.is_some_and(|p| !NO_SPACE_BEFORE_OPEN.contains(&p))
        {
            out.push(' ');
        }

        out.push_str(mapping.half);

        let wants_space = matches!(mapping.kind, ClosesBracket | NeedsTrailingSpace);
        if wants_space
            && !is_line_end
            && !next.is_some_and(|n| SUPPRESS_TRAILING_SPACE.contains(&n))
        {
            out.push(' ');
        }
    }
    out
}

/// Convert a whole text, line by line, keeping line terminators.
///
/// Lines are converted on the rayon pool and reassembled in order.
pub fn convert_text(text: &str) -> String {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    lines.par_iter().map(|line| convert_line(line)).collect()
}

/// Whether the text contains anything the converter would touch.
pub fn needs_conversion(text: &str) -> bool {
    text.chars().any(|c| lookup(c).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_no_duplicate_inputs() {
        assert_eq!(INDEX.len(), TABLE.len());
    }

    #[test]
    fn test_kind_matches_half_width_form() {
        for m in TABLE {
            match m.kind {
                OpensBracket => assert!(["(", "[", "{"].contains(&m.half), "{m:?}"),
                ClosesBracket => assert!([")", "]", "}"].contains(&m.half), "{m:?}"),
                NeedsTrailingSpace => {
                    assert!([".", ":", ",", ";", "!", "?"].contains(&m.half), "{m:?}")
                }
                Verbatim => {}
            }
        }
    }

    #[test]
    fn test_colliding_inputs() {
        assert_eq!(lookup('，').unwrap().half, lookup('、').unwrap().half);
        assert_eq!(lookup('￥').unwrap().half, lookup('¥').unwrap().half);
    }

    #[test]
    fn test_plain_text_unchanged() {
        for s in ["", "Hello world", "plain, ascii. text!", "中文没有标点", "  \t\n"] {
            assert_eq!(convert_line(s), s);
        }
    }

    #[test]
    fn test_deterministic() {
        let line = "他说：“你好（朋友）…”，然后走了。\n";
        assert_eq!(convert_line(line), convert_line(line));
    }

    #[test]
    fn test_convert_text_keeps_line_order_and_terminators() {
        let text = "第一行：内容\n第二行！结束\r\n最后，";
        assert_eq!(convert_text(text), "第一行: 内容\n第二行! 结束\r\n最后,");
    }

    #[test]
    fn test_convert_text_empty() {
        assert_eq!(convert_text(""), "");
    }

    #[test]
    fn test_needs_conversion() {
        assert!(needs_conversion("你好，世界"));
        assert!(!needs_conversion("Hello, world!"));
    }
}
