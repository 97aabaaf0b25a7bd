//! The override-tag scanner.
//!
//! [`parse_tags`] takes the content of an override block (the text between
//! `{` and `}`, braces excluded) and produces tags in source order. The
//! scanner is a single forward pass; the only recursion is the nested tag
//! argument of `\t`.
//!
//! Two lexical quirks shape the scanners below:
//!
//! * `!`...`!` spans are Aegisub "inline code" and may contain `\`, `(`,
//!   `)` and `,` without any of them acting as delimiters. The toggle is
//!   honoured both while scanning a tag name and while splitting
//!   parenthesised arguments.
//! * Once a `\` is seen inside a parenthesised argument list, the rest of
//!   the list up to the matching `)` is one argument, commas included.
//!   That argument is where `\t` keeps its nested tags, and parentheses
//!   inside it (as in `\t(\clip(0,0,10,10))`) are tracked so the nested
//!   call is captured whole.

use super::{ClipShape, ComplexFade, FontSize, Move, Tag, Transform, names};

/// Parse override-block content into tags.
///
/// Text before the first `\` is discarded. Unrecognised names, and
/// recognised names with an argument count the tag does not accept, come
/// back as [`Tag::Unknown`]. A malformed `\t` additionally stops the scan,
/// dropping the rest of the block.
#[must_use]
pub fn parse_tags(source: &str) -> Vec<Tag> {
    let mut tags = Vec::new();
    let mut rest = source;

    while let Some(backslash_pos) = rest.find('\\') {
        rest = &rest[backslash_pos + 1..];
        let scanned = scan_tag(rest);
        if let Some(tag) = scanned.tag {
            tags.push(tag);
        }
        if scanned.halt {
            break;
        }
        rest = &rest[scanned.consumed..];
    }

    tags
}

struct ScannedTag {
    tag: Option<Tag>,

    /// How many bytes of the post-backslash slice belong to this tag, so
    /// the outer loop never re-finds a `\` inside an argument list it has
    /// already consumed.
    consumed: usize,
    halt: bool,
}

fn scan_tag(slice: &str) -> ScannedTag {
    // libass skips spaces between the backslash and the name
    let name_start = slice
        .find(|next_char| next_char != ' ' && next_char != '\t')
        .unwrap_or(slice.len());
    let after_spaces = &slice[name_start..];

    let (name_end, has_paren_args) = scan_name(after_spaces);
    let first_part = &after_spaces[..name_end];

    let mut twa = TagWithArguments {
        first_part,
        arguments: vec![],
        has_backslash_arg: false,
    };

    let mut consumed = name_start + name_end;
    if has_paren_args {
        consumed += 1 + scan_paren_args(&after_spaces[(name_end + 1)..], &mut twa);
    }

    if first_part.is_empty() {
        return ScannedTag {
            tag: None,
            consumed,
            halt: false,
        };
    }

    let (tag, halt) = dispatch(&twa);
    ScannedTag {
        tag: Some(tag),
        consumed,
        halt,
    }
}

/// Scan a tag name up to the next delimiter. Returns the name's byte
/// length and whether the delimiter was `(`.
fn scan_name(slice: &str) -> (usize, bool) {
    let mut inline_code = false;
    for (byte_index, next_char) in slice.char_indices() {
        match next_char {
            '!' => inline_code = !inline_code,
            '(' if !inline_code => return (byte_index, true),
            '\\' if !inline_code => return (byte_index, false),
            _ => {}
        }
    }
    (slice.len(), false)
}

/// Split a parenthesised argument list into `twa.arguments`. Returns the
/// number of bytes consumed, including the closing `)` if one was found;
/// with no closing `)` the final argument runs to the end of the input.
fn scan_paren_args<'a>(paren_args: &'a str, twa: &mut TagWithArguments<'a>) -> usize {
    use ParenArgsParseState::*;

    let mut state = Before;
    let mut inline_code = false;
    let mut paren_depth = 0_usize;
    let mut arg_start_bytes = 0;

    for (byte_index, next_char) in paren_args.char_indices() {
        if inline_code {
            if next_char == '!' {
                inline_code = false;
            }
            continue;
        }

        state = match state {
            Before => match next_char {
                ' ' | '\t' => Before,
                ',' => {
                    twa.push_argument(&paren_args[arg_start_bytes..byte_index]);
                    arg_start_bytes = byte_index + 1;
                    Before
                }
                '\\' => {
                    twa.has_backslash_arg = true;
                    arg_start_bytes = byte_index;
                    BackslashArgument
                }
                ')' => {
                    twa.push_argument(&paren_args[arg_start_bytes..byte_index]);
                    return byte_index + 1;
                }
                '!' => {
                    inline_code = true;
                    arg_start_bytes = byte_index;
                    GenericArgument
                }
                _ => {
                    arg_start_bytes = byte_index;
                    GenericArgument
                }
            },
            GenericArgument => match next_char {
                ',' => {
                    twa.push_argument(&paren_args[arg_start_bytes..byte_index]);
                    arg_start_bytes = byte_index + 1;
                    Before
                }
                '\\' => {
                    twa.has_backslash_arg = true;
                    BackslashArgument
                }
                ')' => {
                    twa.push_argument(&paren_args[arg_start_bytes..byte_index]);
                    return byte_index + 1;
                }
                '!' => {
                    inline_code = true;
                    GenericArgument
                }
                _ => GenericArgument,
            },
            BackslashArgument => match next_char {
                '(' => {
                    paren_depth += 1;
                    BackslashArgument
                }
                ')' => {
                    if paren_depth == 0 {
                        twa.push_argument(&paren_args[arg_start_bytes..byte_index]);
                        return byte_index + 1;
                    }
                    paren_depth -= 1;
                    BackslashArgument
                }
                '!' => {
                    inline_code = true;
                    BackslashArgument
                }
                _ => BackslashArgument,
            },
        };
    }

    twa.push_argument(&paren_args[arg_start_bytes..]);
    paren_args.len()
}

enum ParenArgsParseState {
    Before,
    GenericArgument,
    BackslashArgument,
}

struct TagWithArguments<'a> {
    /// The name, and for simple tags potentially the glued value.
    first_part: &'a str,

    /// Raw argument strings. Not interpreted in any way; they may well be
    /// invalid for the tag they end up attached to.
    arguments: Vec<&'a str>,
    has_backslash_arg: bool,
}

impl<'a> TagWithArguments<'a> {
    fn push_argument(&mut self, arg_str: &'a str) {
        let trimmed = arg_str.trim_end_matches([' ', '\t']);
        if !trimmed.is_empty() {
            self.arguments.push(trimmed);
        }
    }

    fn nargs(&self) -> usize {
        self.arguments.len()
    }

    fn owned_arg(&self, index: usize) -> String {
        self.arguments[index].to_owned()
    }

    /// Prefix-match a simple tag. On a match, the value is the first
    /// parenthesised argument if any, otherwise whatever followed the name
    /// (`\fs12` → `"12"`), otherwise `None` for a bare tag.
    fn simple_match(&self, tag_name: &str) -> Option<Option<String>> {
        if !self.first_part.starts_with(tag_name) {
            return None;
        }

        let glued = self.first_part[tag_name.len()..].trim_end_matches([' ', '\t']);
        let value = self
            .arguments
            .first()
            .copied()
            .or_else(|| (!glued.is_empty()).then_some(glued))
            .map(str::to_owned);
        Some(value)
    }

    fn to_unknown(&self) -> Tag {
        Tag::Unknown {
            name: self.first_part.to_owned(),
            args: self.arguments.iter().map(|arg| (*arg).to_owned()).collect(),
        }
    }
}

enum Matcher {
    Simple(&'static str, fn(Option<String>) -> Tag),
    Complex(&'static str, fn(&TagWithArguments<'_>) -> Option<Tag>),
}

/// Dispatch table, tried in order. Longer names must come before any name
/// that is a prefix of them (`\fscx` before `\fsc` before `\fs`, `\iclip`
/// before `\i`, and so on); reordering entries breaks dispatch.
static MATCHERS: &[Matcher] = &[
    Matcher::Complex(names::ICLIP, iclip_tag),
    Matcher::Complex(names::CLIP, clip_tag),
    Matcher::Complex(names::MOVE, move_tag),
    Matcher::Complex(names::POS, pos_tag),
    Matcher::Complex(names::ORG, org_tag),
    Matcher::Complex(names::FADE, fade_tag),
    Matcher::Complex(names::FAD, fad_tag),
    Matcher::Simple(names::ALPHA, Tag::Alpha),
    Matcher::Simple(names::AN, Tag::An),
    Matcher::Simple(names::A1, Tag::A1),
    Matcher::Simple(names::A2, Tag::A2),
    Matcher::Simple(names::A3, Tag::A3),
    Matcher::Simple(names::A4, Tag::A4),
    Matcher::Simple(names::A, Tag::A),
    Matcher::Simple(names::BE, Tag::Be),
    Matcher::Simple(names::BLUR, Tag::Blur),
    Matcher::Simple(names::BORD, Tag::Bord),
    Matcher::Simple(names::B, Tag::B),
    Matcher::Simple(names::C1, Tag::C1),
    Matcher::Simple(names::C2, Tag::C2),
    Matcher::Simple(names::C3, Tag::C3),
    Matcher::Simple(names::C4, Tag::C4),
    Matcher::Simple(names::C, Tag::C),
    Matcher::Simple(names::FAX, Tag::FaX),
    Matcher::Simple(names::FAY, Tag::FaY),
    Matcher::Simple(names::FE, Tag::Fe),
    Matcher::Simple(names::FN, Tag::Fn),
    Matcher::Simple(names::FRX, Tag::FrX),
    Matcher::Simple(names::FRY, Tag::FrY),
    Matcher::Simple(names::FRZ, Tag::FrZ),
    Matcher::Simple(names::FR, Tag::Fr),
    Matcher::Simple(names::FSCX, Tag::FscX),
    Matcher::Simple(names::FSCY, Tag::FscY),
    Matcher::Simple(names::FSC, Tag::Fsc),
    Matcher::Simple(names::FSP, Tag::Fsp),
    Matcher::Simple(names::FS, font_size_tag),
    Matcher::Simple(names::I, Tag::I),
    Matcher::Simple(names::KF, Tag::Kf),
    Matcher::Simple(names::KO, Tag::Ko),
    Matcher::Simple(names::KT, Tag::Kt),
    Matcher::Simple(names::K_UPPER, Tag::KUpper),
    Matcher::Simple(names::K, Tag::K),
    Matcher::Simple(names::PBO, Tag::Pbo),
    Matcher::Simple(names::P, Tag::P),
    Matcher::Simple(names::Q, Tag::Q),
    Matcher::Simple(names::R, Tag::R),
    Matcher::Simple(names::SHAD, Tag::Shad),
    Matcher::Simple(names::S, Tag::S),
    Matcher::Simple(names::U, Tag::U),
    Matcher::Simple(names::XBORD, Tag::XBord),
    Matcher::Simple(names::XSHAD, Tag::XShad),
    Matcher::Simple(names::YBORD, Tag::YBord),
    Matcher::Simple(names::YSHAD, Tag::YShad),
];

fn dispatch(twa: &TagWithArguments<'_>) -> (Tag, bool) {
    // `\t` is the one tag that recurses, and the one place the scan can
    // abort, so it bypasses the table.
    if twa.first_part.starts_with(names::T) {
        return transform_tag(twa);
    }

    for matcher in MATCHERS {
        match *matcher {
            Matcher::Simple(tag_name, build) => {
                if let Some(value) = twa.simple_match(tag_name) {
                    return (build(value), false);
                }
            }
            Matcher::Complex(tag_name, build) => {
                if twa.first_part.starts_with(tag_name) {
                    return (build(twa).unwrap_or_else(|| twa.to_unknown()), false);
                }
            }
        }
    }

    (twa.to_unknown(), false)
}

fn font_size_tag(value: Option<String>) -> Tag {
    Tag::Fs(value.map(FontSize::from_raw))
}

fn pos_tag(twa: &TagWithArguments<'_>) -> Option<Tag> {
    (twa.nargs() == 2).then(|| Tag::Pos {
        x: twa.owned_arg(0),
        y: twa.owned_arg(1),
    })
}

fn org_tag(twa: &TagWithArguments<'_>) -> Option<Tag> {
    (twa.nargs() == 2).then(|| Tag::Org {
        x: twa.owned_arg(0),
        y: twa.owned_arg(1),
    })
}

fn fad_tag(twa: &TagWithArguments<'_>) -> Option<Tag> {
    (twa.nargs() == 2).then(|| Tag::Fad {
        fade_in: twa.owned_arg(0),
        fade_out: twa.owned_arg(1),
    })
}

fn fade_tag(twa: &TagWithArguments<'_>) -> Option<Tag> {
    (twa.nargs() == 7).then(|| {
        Tag::Fade(ComplexFade {
            alpha1: twa.owned_arg(0),
            alpha2: twa.owned_arg(1),
            alpha3: twa.owned_arg(2),
            t1: twa.owned_arg(3),
            t2: twa.owned_arg(4),
            t3: twa.owned_arg(5),
            t4: twa.owned_arg(6),
        })
    })
}

fn move_tag(twa: &TagWithArguments<'_>) -> Option<Tag> {
    match twa.nargs() {
        4 | 6 => Some(Tag::Move(Move {
            x1: twa.owned_arg(0),
            y1: twa.owned_arg(1),
            x2: twa.owned_arg(2),
            y2: twa.owned_arg(3),
            timing: (twa.nargs() == 6).then(|| (twa.owned_arg(4), twa.owned_arg(5))),
        })),
        _ => None,
    }
}

fn clip_shape(twa: &TagWithArguments<'_>) -> Option<ClipShape> {
    match twa.nargs() {
        4 => Some(ClipShape::Rectangle {
            x1: twa.owned_arg(0),
            y1: twa.owned_arg(1),
            x2: twa.owned_arg(2),
            y2: twa.owned_arg(3),
        }),
        1 => Some(ClipShape::Vector {
            scale: None,
            commands: twa.owned_arg(0),
        }),
        2 => Some(ClipShape::Vector {
            scale: Some(twa.owned_arg(0)),
            commands: twa.owned_arg(1),
        }),
        _ => None,
    }
}

fn clip_tag(twa: &TagWithArguments<'_>) -> Option<Tag> {
    clip_shape(twa).map(Tag::Clip)
}

fn iclip_tag(twa: &TagWithArguments<'_>) -> Option<Tag> {
    clip_shape(twa).map(Tag::IClip)
}

fn transform_tag(twa: &TagWithArguments<'_>) -> (Tag, bool) {
    // The nested tag argument must actually have been captured by the
    // backslash rule; without it, or with more than three positional
    // arguments in front of it, the whole rest of the block is dropped.
    let positional = twa.nargs().saturating_sub(1);
    if !twa.has_backslash_arg || positional > 3 {
        return (twa.to_unknown(), true);
    }

    let tags = parse_tags(twa.arguments[twa.nargs() - 1]);
    let (start, end, accel) = match positional {
        0 => (None, None, None),
        1 => (None, None, Some(twa.owned_arg(0))),
        2 => (Some(twa.owned_arg(0)), Some(twa.owned_arg(1)), None),
        _ => (
            Some(twa.owned_arg(0)),
            Some(twa.owned_arg(1)),
            Some(twa.owned_arg(2)),
        ),
    };

    (
        Tag::T(Box::new(Transform {
            start,
            end,
            accel,
            tags,
        })),
        false,
    )
}

/// Equivalent to libass' `mystrtoi32`: parse as many numeric characters as
/// possible from the beginning of `raw`, returning 0 if parsing fails
/// entirely and clamping overflows to the `i32` range.
#[must_use]
pub fn parse_prefix_i32(raw: &str, radix: u32) -> i32 {
    let (slice, sign) = match raw.chars().next() {
        Some('+') => (&raw[1..], 1),
        Some('-') => (&raw[1..], -1),
        Some(_) => (raw, 1),
        None => return 0,
    };
    let num_end = slice
        .find(|next_char: char| !next_char.is_digit(radix))
        .unwrap_or(slice.len());
    let maybe_parsed = i64::from_str_radix(&slice[0..num_end], radix)
        .ok()
        .map(|num| num * sign);
    let clamped = maybe_parsed
        .unwrap_or(0_i64)
        .clamp(i32::MIN.into(), i32::MAX.into());
    #[allow(clippy::cast_possible_truncation)] // clamped to range just above
    let value = clamped as i32;
    value
}

/// Interpret a colour or alpha argument: skips the `&`/`H` dressing at the
/// front (`&H0000FF&`), then prefix-parses the remainder as hexadecimal.
#[must_use]
pub fn parse_prefix_hex(raw: &str) -> i32 {
    raw.find(|next_char| next_char != '&' && next_char != 'H')
        .map_or(0, |first_value_char| {
            parse_prefix_i32(&raw[first_value_char..], 16)
        })
}

/// Lenient float interpretation of a raw argument: as many numeric
/// characters as parse from the front, 0 if none do.
#[must_use]
pub fn parse_prefix_f64(raw: &str) -> f64 {
    fast_float2::parse_partial::<f64, _>(raw)
        .ok()
        .map_or(0.0, |(value, _digits)| value)
}
