//! Quoted-email text normalization.
//!
//! Every input line flows through the same stages:
//!   1) strip leading `>` quote markers (any depth, spaces between allowed)
//!   2) break on runs of half-width / full-width spaces
//!   3) break after `。` when another sentence follows
//!   4) blank line before lines that start with a configured keyword
//!
//! The result is joined with `\n` and carries no trailing newline.

use std::sync::LazyLock;

use regex::Regex;

/// Leading quote markers, with whitespace before, between, and after them.
static QUOTE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\s*>)+\s*").expect("quote prefix pattern is valid"));

/// Half-width and ideographic space.
const SEPARATORS: [char; 2] = [' ', '\u{3000}'];

/// Japanese full stop.
const SENTENCE_END: char = '。';

/// Characters that keep a `。` glued to what follows it.
const CLOSERS: &[char] = &[
    '」', '』', '）', '】', '〕', '〉', '》', '］', '｝', ')', ']', '}', '>', '"', '\'',
];

/// Stateless transformer bound to an ordered keyword list.
#[derive(Debug, Clone, Copy)]
pub struct TextTransformer<'k> {
    keywords: &'k [String],
}

impl<'k> TextTransformer<'k> {
    pub fn new(keywords: &'k [String]) -> Self {
        Self { keywords }
    }

    /// Run all stages over `text` and reassemble the output.
    pub fn transform(&self, text: &str) -> String {
        let mut out: Vec<&str> = Vec::new();

        for line in text.lines() {
            let content = strip_quote_markers(line);

            for piece in split_on_spaces(content) {
                for sentence in split_sentences(piece) {
                    // A keyword line opens a new block unless it already does
                    if self.starts_with_keyword(sentence)
                        && out.last().is_some_and(|prev| !prev.is_empty())
                    {
                        out.push("");
                    }
                    out.push(sentence);
                }
            }
        }

        out.join("\n")
    }

    /// Literal, case-sensitive prefix match against the keyword list.
    pub fn starts_with_keyword(&self, line: &str) -> bool {
        self.keyword_at_start(line).is_some()
    }

    /// First keyword (in configured order) that `line` starts with.
    pub fn keyword_at_start(&self, line: &str) -> Option<&'k str> {
        self.keywords
            .iter()
            .map(String::as_str)
            .filter(|kw| !kw.is_empty())
            .find(|kw| line.starts_with(kw))
    }
}

/// Convenience wrapper: `TextTransformer::new(keywords).transform(text)`.
pub fn transform(text: &str, keywords: &[String]) -> String {
    TextTransformer::new(keywords).transform(text)
}

/// Remove every leading `>` (and the whitespace around them).
/// Lines without a leading marker are returned untouched.
pub fn strip_quote_markers(line: &str) -> &str {
    match QUOTE_PREFIX.find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    }
}

/// True if at least one line of `text` opens with a quote marker.
pub fn has_quote_markers(text: &str) -> bool {
    text.lines().any(|line| QUOTE_PREFIX.is_match(line))
}

/// Split on runs of half-width or full-width spaces, dropping blank pieces.
pub fn split_on_spaces(line: &str) -> impl Iterator<Item = &str> {
    line.split(SEPARATORS)
        .filter(|piece| !piece.trim().is_empty())
}

/// Break after each `。` that is followed by more content, unless the next
/// character closes a bracket or quote.
pub fn split_sentences(piece: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for (idx, mark) in piece.match_indices(SENTENCE_END) {
        let end = idx + mark.len();

        match piece[end..].chars().next() {
            Some(next) if !CLOSERS.contains(&next) => {
                sentences.push(&piece[start..end]);
                start = end;
            }
            _ => {}
        }
    }

    if start < piece.len() {
        sentences.push(&piece[start..]);
    }

    sentences
}
