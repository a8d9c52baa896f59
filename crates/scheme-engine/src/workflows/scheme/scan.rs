//! Hand-written scanners for scheme identifiers and label text.
//!
//! Every scanner works on a `&[char]` view so that positions stay stable for
//! non-ASCII input. Literal comparisons are ASCII case-insensitive; word
//! boundaries follow the usual definition of a word character (alphanumeric
//! or underscore).

/// One element of a declarative phrase pattern.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Piece {
    /// Literal text, compared case-insensitively.
    Lit(&'static str),
    /// Any run of whitespace, possibly empty.
    Gap,
    /// Any run of the listed characters, possibly empty.
    Run(&'static [char]),
    /// At most one of the listed characters.
    Maybe(&'static [char]),
    /// Exactly one of the listed characters.
    One(&'static [char]),
}

pub(crate) const DASHES: &[char] = &['-', '\u{2013}'];
pub(crate) const WIDE_DASHES: &[char] = &['-', '\u{2013}', '\u{2014}'];
const FEE_SEPARATORS: &[char] = &['-', ':'];

pub(crate) fn chars(text: &str) -> Vec<char> {
    text.chars().collect()
}

pub(crate) fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn boundary_before(text: &[char], at: usize) -> bool {
    at == 0 || !is_word(text[at - 1])
}

fn boundary_after(text: &[char], at: usize) -> bool {
    at >= text.len() || !is_word(text[at])
}

fn skip_gap(text: &[char], mut at: usize) -> usize {
    while at < text.len() && text[at].is_whitespace() {
        at += 1;
    }
    at
}

fn skip_digits(text: &[char], mut at: usize) -> usize {
    while at < text.len() && text[at].is_ascii_digit() {
        at += 1;
    }
    at
}

/// Case-insensitive literal match at `at`, returning the end position.
pub(crate) fn literal_at(text: &[char], at: usize, literal: &str) -> Option<usize> {
    let mut cursor = at;
    for expected in literal.chars() {
        let actual = *text.get(cursor)?;
        if !actual.eq_ignore_ascii_case(&expected) {
            return None;
        }
        cursor += 1;
    }
    Some(cursor)
}

/// Case-sensitive variant of [`literal_at`].
fn exact_at(text: &[char], at: usize, literal: &str) -> Option<usize> {
    let mut cursor = at;
    for expected in literal.chars() {
        if *text.get(cursor)? != expected {
            return None;
        }
        cursor += 1;
    }
    Some(cursor)
}

/// Greedy phrase match. The patterns used here never need backtracking: every
/// gap or run is followed by a piece that cannot start inside it.
pub(crate) fn phrase_at(text: &[char], at: usize, pieces: &[Piece]) -> Option<usize> {
    let mut cursor = at;
    for piece in pieces {
        cursor = match piece {
            Piece::Lit(literal) => literal_at(text, cursor, literal)?,
            Piece::Gap => skip_gap(text, cursor),
            Piece::Run(set) => {
                let mut end = cursor;
                while end < text.len() && set.contains(&text[end]) {
                    end += 1;
                }
                end
            }
            Piece::Maybe(set) => match text.get(cursor) {
                Some(c) if set.contains(c) => cursor + 1,
                _ => cursor,
            },
            Piece::One(set) => match text.get(cursor) {
                Some(c) if set.contains(c) => cursor + 1,
                _ => return None,
            },
        };
    }
    Some(cursor)
}

/// True when the phrase occurs anywhere in `text`.
pub(crate) fn contains_phrase(text: &[char], pieces: &[Piece]) -> bool {
    (0..text.len()).any(|at| phrase_at(text, at, pieces).is_some())
}

/// True when the phrase occurs with a word boundary on both sides.
pub(crate) fn contains_word_phrase(text: &[char], pieces: &[Piece]) -> bool {
    (0..text.len()).any(|at| {
        boundary_before(text, at)
            && phrase_at(text, at, pieces).is_some_and(|end| end > at && boundary_after(text, end))
    })
}

/// Plain substring test on already lower-cased text.
pub(crate) fn contains_text(text: &[char], needle: &str) -> bool {
    (0..text.len()).any(|at| literal_at(text, at, needle).is_some())
}

/// Contents of each `(...)` group, shortest match, scanning left to right.
pub(crate) fn bracket_segments(text: &[char]) -> Vec<&[char]> {
    let mut segments = Vec::new();
    let mut at = 0;
    while at < text.len() {
        if text[at] != '(' {
            at += 1;
            continue;
        }
        let close = text[at + 1..]
            .iter()
            .take_while(|c| **c != '\n')
            .position(|c| *c == ')');
        match close {
            Some(offset) => {
                segments.push(&text[at + 1..at + 1 + offset]);
                at += offset + 2;
            }
            None => at += 1,
        }
    }
    segments
}

/// Maximal runs of ASCII lowercase letters and digits.
pub(crate) fn alnum_tokens(text: &[char]) -> Vec<String> {
    text.split(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
        .filter(|token| !token.is_empty())
        .map(|token| token.iter().collect())
        .collect()
}

/// A numeric literal `[0-9]+(\.[0-9]+)?` located in a char slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Number {
    pub(crate) text: String,
    pub(crate) end: usize,
}

fn number_at(text: &[char], at: usize) -> Option<Number> {
    let int_end = skip_digits(text, at);
    if int_end == at {
        return None;
    }
    let mut end = int_end;
    if text.get(int_end) == Some(&'.') {
        let frac_end = skip_digits(text, int_end + 1);
        if frac_end > int_end + 1 {
            end = frac_end;
        }
    }
    Some(Number {
        text: text[at..end].iter().collect(),
        end,
    })
}

/// `number%` (or `number\s*%` when `spaced`) starting exactly at `at`.
fn percent_at(text: &[char], at: usize, spaced: bool) -> Option<Number> {
    let number = number_at(text, at)?;
    let cursor = if spaced {
        skip_gap(text, number.end)
    } else {
        number.end
    };
    if text.get(cursor) == Some(&'%') {
        Some(Number {
            text: number.text,
            end: cursor + 1,
        })
    } else {
        None
    }
}

/// Every non-overlapping percentage literal, left to right.
pub(crate) fn percents(text: &[char], spaced: bool) -> Vec<String> {
    let mut found = Vec::new();
    let mut at = 0;
    while at < text.len() {
        match percent_at(text, at, spaced) {
            Some(number) => {
                at = number.end;
                found.push(number.text);
            }
            None => at += 1,
        }
    }
    found
}

pub(crate) fn first_percent(text: &[char], spaced: bool) -> Option<String> {
    (0..text.len()).find_map(|at| percent_at(text, at, spaced).map(|number| number.text))
}

/// Splits on every case-insensitive occurrence of `separator`.
pub(crate) fn split_ci<'a>(text: &'a [char], separator: &str) -> Vec<&'a [char]> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut at = 0;
    while at < text.len() {
        match literal_at(text, at, separator) {
            Some(end) => {
                parts.push(&text[start..at]);
                start = end;
                at = end;
            }
            None => at += 1,
        }
    }
    parts.push(&text[start..]);
    parts
}

/// A matched span `[start, end)` in a char slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Span {
    pub(crate) start: usize,
    pub(crate) end: usize,
}

/// Fee token `PF\s*[-:]?\s*number\s*%` starting at `at`; returns the number and the end.
pub(crate) fn fee_token_at(text: &[char], at: usize) -> Option<Number> {
    let mut cursor = literal_at(text, at, "pf")?;
    cursor = phrase_at(text, cursor, &[Piece::Gap, Piece::Maybe(FEE_SEPARATORS), Piece::Gap])?;
    percent_at(text, cursor, true)
}

/// First fee token anywhere (no boundary required before `PF`).
pub(crate) fn find_fee_token(text: &[char]) -> Option<(Span, String)> {
    (0..text.len()).find_map(|at| {
        fee_token_at(text, at).map(|number| {
            (
                Span {
                    start: at,
                    end: number.end,
                },
                number.text,
            )
        })
    })
}

/// Whole-word fee token `\bPF\s*[-:]?\s*number\s*%\s*` at `at`, trailing whitespace included.
pub(crate) fn fee_word_at(text: &[char], at: usize) -> Option<usize> {
    if !boundary_before(text, at) {
        return None;
    }
    fee_token_at(text, at).map(|number| skip_gap(text, number.end))
}

/// First fee range `PF <min>% <dash> <max>%`.
pub(crate) fn find_fee_range(text: &[char]) -> Option<(String, String)> {
    (0..text.len()).find_map(|at| {
        let low = fee_token_at(text, at)?;
        let cursor = phrase_at(text, low.end, &[Piece::Gap, Piece::One(WIDE_DASHES), Piece::Gap])?;
        let high = percent_at(text, cursor, true)?;
        Some((low.text, high.text))
    })
}

/// Whole-word, case-insensitive occurrence of `word`.
pub(crate) fn find_word(text: &[char], word: &str) -> Option<Span> {
    (0..text.len()).find_map(|at| {
        if !boundary_before(text, at) {
            return None;
        }
        let end = literal_at(text, at, word)?;
        boundary_after(text, end).then_some(Span { start: at, end })
    })
}

/// Term token `\b(\d{1,2})\s*M\b`, case-insensitive.
pub(crate) fn find_term_token(text: &[char]) -> Option<(Span, u32)> {
    (0..text.len()).find_map(|at| {
        if !text[at].is_ascii_digit() || !boundary_before(text, at) {
            return None;
        }
        [2usize, 1].into_iter().find_map(|width| {
            let digits_end = at + width;
            if digits_end > text.len() || !text[at..digits_end].iter().all(char::is_ascii_digit) {
                return None;
            }
            let marker = skip_gap(text, digits_end);
            let end = literal_at(text, marker, "m")?;
            if !boundary_after(text, end) {
                return None;
            }
            let months = text[at..digits_end]
                .iter()
                .collect::<String>()
                .parse::<u32>()
                .ok()?;
            Some((Span { start: at, end }, months))
        })
    })
}

/// First whole-word, case-sensitive occurrence of any of `alternatives`,
/// earliest position first and earlier alternatives first at a tie.
pub(crate) fn find_exact_word(text: &[char], alternatives: &[&str]) -> Option<Span> {
    (0..text.len()).find_map(|at| {
        if !boundary_before(text, at) {
            return None;
        }
        alternatives.iter().find_map(|alternative| {
            let end = exact_at(text, at, alternative)?;
            boundary_after(text, end).then_some(Span { start: at, end })
        })
    })
}

/// First case-sensitive occurrence of any of `alternatives`.
pub(crate) fn find_exact(text: &[char], alternatives: &[&str]) -> Option<Span> {
    (0..text.len()).find_map(|at| {
        alternatives
            .iter()
            .find_map(|alternative| exact_at(text, at, alternative).map(|end| Span { start: at, end }))
    })
}

/// Foreclosure marker `\bFC(\s*[-:]?\s*\d+D)?\b`, case-insensitive, starting at `at`.
pub(crate) fn foreclosure_marker_at(text: &[char], at: usize) -> Option<usize> {
    if !boundary_before(text, at) {
        return None;
    }
    let base = literal_at(text, at, "fc")?;
    let with_suffix = phrase_at(text, base, &[Piece::Gap, Piece::Maybe(FEE_SEPARATORS), Piece::Gap])
        .and_then(|cursor| {
            let digits_end = skip_digits(text, cursor);
            if digits_end == cursor {
                return None;
            }
            literal_at(text, digits_end, "d")
        })
        .filter(|end| boundary_after(text, *end));
    with_suffix.or_else(|| boundary_after(text, base).then_some(base))
}

/// Replaces `span` of `text` with `replacement`.
pub(crate) fn splice(text: &[char], span: &Span, replacement: &str) -> Vec<char> {
    let mut out = Vec::with_capacity(text.len() + replacement.len());
    out.extend_from_slice(&text[..span.start]);
    out.extend(replacement.chars());
    out.extend_from_slice(&text[span.end..]);
    out
}

/// Rewrites every non-overlapping match found by `matcher` (which returns the
/// match end for a start position).
pub(crate) fn replace_all<F>(text: &[char], replacement: &str, matcher: F) -> Vec<char>
where
    F: Fn(&[char], usize) -> Option<usize>,
{
    let mut out = Vec::with_capacity(text.len());
    let mut at = 0;
    while at < text.len() {
        match matcher(text, at).filter(|end| *end > at) {
            Some(end) => {
                out.extend(replacement.chars());
                at = end;
            }
            None => {
                out.push(text[at]);
                at += 1;
            }
        }
    }
    out
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
