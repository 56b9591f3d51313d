//! Syntactic fix-ups for almost-JSON model output.
//!
//! Passes are tried in order, each starting again from the original fragment,
//! so a later, more aggressive pass never sees the output of an earlier one.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref TRAILING_COMMA_RE: Regex = Regex::new(r",(\s*[}\]])").unwrap();
    static ref ADJACENT_OBJECTS_RE: Regex = Regex::new(r"\}(\s*)\{").unwrap();
    static ref SINGLE_QUOTED_RE: Regex =
        Regex::new(r#"([{\[,:]\s*)'([^'\\]*)'(\s*[:,}\]])"#).unwrap();
}

type Step = fn(&str) -> String;

pub(crate) struct RepairPass {
    pub name: &'static str,
    steps: &'static [Step],
}

impl RepairPass {
    pub fn apply(&self, fragment: &str) -> String {
        self.steps
            .iter()
            .fold(fragment.to_string(), |acc, step| step(&acc))
    }
}

pub(crate) const PASSES: &[RepairPass] = &[
    RepairPass {
        name: "trailing-commas",
        steps: &[normalize_typographic_quotes, strip_trailing_commas],
    },
    RepairPass {
        name: "quotes-and-delimiters",
        steps: &[
            normalize_typographic_quotes,
            single_to_double_quotes,
            redelimit_adjacent_objects,
            strip_trailing_commas,
        ],
    },
];

pub(crate) fn strip_trailing_commas(s: &str) -> String {
    TRAILING_COMMA_RE.replace_all(s, "$1").into_owned()
}

pub(crate) fn normalize_typographic_quotes(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => '"',
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => '\'',
            other => other,
        })
        .collect()
}

/// `{'a': 'b'}` → `{"a": "b"}`. Only quotes in token position are touched,
/// so apostrophes inside double-quoted text survive.
pub(crate) fn single_to_double_quotes(s: &str) -> String {
    let mut current = s.to_string();
    // a match consumes the delimiter the next token needs, so repeat
    for _ in 0..4 {
        let next = SINGLE_QUOTED_RE
            .replace_all(&current, |caps: &Captures| {
                format!("{}\"{}\"{}", &caps[1], caps[2].replace('"', "\\\""), &caps[3])
            })
            .into_owned();
        if next == current {
            break;
        }
        current = next;
    }
    current
}

pub(crate) fn redelimit_adjacent_objects(s: &str) -> String {
    ADJACENT_OBJECTS_RE.replace_all(s, "},$1{").into_owned()
}
