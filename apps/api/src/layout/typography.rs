//! Typographic Preprocessor: Keeps short connectors and numeric phrases off line ends.
//!
//! Two rules, both applied by replacing a whitespace gap with a no-break space (U+00A0):
//! - a connector word from `CONNECTORS` (matched case-insensitively) is glued to the
//!   word that follows it, so it is never stranded at the end of a line;
//! - a number is glued to its unit, currency sign or thousands group
//!   (`95 %`, `$ 100`, `5 часов`, `10 000`).
//!
//! Newlines are paragraph separators and are never replaced.
//!
//! # Style boundaries
//! The preprocessor runs on raw text, before inline markup is tokenized. When a
//! protected gap ends up on the edge of a bold/underline run (`и **важно**`) the
//! wrap engine treats it as an ordinary break opportunity: protection only holds
//! inside a single style run.

/// No-break space used as the non-breaking joiner.
pub const NBSP: char = '\u{00A0}';

/// Short conjunctions, particles and prepositions that must not end a line.
const CONNECTORS: &[&str] = &[
    "и", "а", "но", "да", "или", "либо", "то", "не", "ни", "за", "для", "без", "при", "про",
    "под", "над", "через", "между", "из", "от", "до", "на", "в", "с", "у", "о", "об", "во",
    "со", "ко", "к", "по", "что", "как", "где", "когда", "если", "чтобы", "который", "которая",
];

/// Units and symbols that bind to a preceding number.
const UNITS: &[&str] = &[
    "%", "‰", "₽", "$", "€", "x", "х", "×", "р", "руб", "рубль", "рубля", "рублей", "тыс",
    "млн", "млрд", "ч", "час", "часа", "часов", "мин", "минута", "минуты", "минут", "сек",
    "секунда", "секунды", "секунд", "день", "дня", "дней", "неделя", "недели", "неделю",
    "недель", "месяц", "месяца", "месяцев", "год", "года", "году", "лет", "раз", "раза",
    "шт", "км", "м", "см", "мм", "кг", "г", "л", "px", "pt",
];

/// Currency signs that bind to a following number.
const CURRENCY_PREFIXES: &[&str] = &["$", "€", "₽", "£"];

const MARKUP: &[char] = &['*', '_'];
const OPENING: &[char] = &['*', '_', '«', '"', '\'', '„', '“', '('];
const CLOSING: &[char] = &['*', '_', '»', '"', '\'', '”', ')', '.', ',', ';', ':', '!', '?'];

/// Applies connector and numeric-phrase protection to `text`.
pub fn preprocess(text: &str) -> String {
    let pieces = split_pieces(text);
    let mut out = String::with_capacity(text.len());

    for (i, piece) in pieces.iter().enumerate() {
        match piece {
            Piece::Word(word) => out.push_str(word),
            Piece::Gap(gap) => {
                let glue = !gap.contains('\n')
                    && match (prev_word(&pieces, i), next_word(&pieces, i)) {
                        (Some(left), Some(right)) => should_join(left, right),
                        _ => false,
                    };
                if glue {
                    out.push(NBSP);
                } else {
                    out.push_str(gap);
                }
            }
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
enum Piece<'a> {
    Word(&'a str),
    Gap(&'a str),
}

/// Splits text into alternating words and ASCII-whitespace gaps, preserving every byte.
fn split_pieces(text: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut in_gap: Option<bool> = None;

    for (idx, ch) in text.char_indices() {
        let is_gap = ch.is_ascii_whitespace();
        match in_gap {
            Some(prev) if prev != is_gap => {
                pieces.push(make_piece(&text[start..idx], prev));
                start = idx;
            }
            _ => {}
        }
        in_gap = Some(is_gap);
    }
    if let Some(prev) = in_gap {
        pieces.push(make_piece(&text[start..], prev));
    }
    pieces
}

fn make_piece(s: &str, is_gap: bool) -> Piece<'_> {
    if is_gap {
        Piece::Gap(s)
    } else {
        Piece::Word(s)
    }
}

fn prev_word<'a>(pieces: &[Piece<'a>], i: usize) -> Option<&'a str> {
    match i.checked_sub(1).and_then(|j| pieces.get(j)) {
        Some(Piece::Word(w)) => Some(w),
        _ => None,
    }
}

fn next_word<'a>(pieces: &[Piece<'a>], i: usize) -> Option<&'a str> {
    match pieces.get(i + 1) {
        Some(Piece::Word(w)) => Some(w),
        _ => None,
    }
}

fn should_join(left: &str, right: &str) -> bool {
    if is_connector(left) {
        return true;
    }

    let left_core = left.trim_matches(MARKUP);
    let right_core = right.trim_start_matches(OPENING).trim_end_matches(CLOSING);

    if is_number(left_core) {
        let unit = right_core.to_lowercase();
        return UNITS.contains(&unit.as_str()) || is_thousands_group(right_core);
    }

    CURRENCY_PREFIXES.contains(&left_core) && right_core.starts_with(|c: char| c.is_ascii_digit())
}

/// Trailing punctuation disqualifies a connector: `и,` is not followed by its object.
fn is_connector(word: &str) -> bool {
    let core = word.trim_start_matches(OPENING).trim_end_matches(MARKUP);
    if core.is_empty() {
        return false;
    }
    let lower = core.to_lowercase();
    CONNECTORS.contains(&lower.as_str())
}

/// Digits with optional sign, currency prefix and inner separators (`3.5`, `24/7`, `+40`).
fn is_number(word: &str) -> bool {
    let body = CURRENCY_PREFIXES
        .iter()
        .find_map(|p| word.strip_prefix(p))
        .unwrap_or(word);
    let body = body.strip_prefix(['+', '-', '−']).unwrap_or(body);

    body.starts_with(|c: char| c.is_ascii_digit())
        && body.ends_with(|c: char| c.is_ascii_digit())
        && body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '/' | ':' | '-'))
}

fn is_thousands_group(word: &str) -> bool {
    word.len() == 3 && word.bytes().all(|b| b.is_ascii_digit())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
