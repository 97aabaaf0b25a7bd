//! Structured representation of ASS override tags.
//!
//! Tags keep their arguments as the raw strings that appeared in the source
//! text. ASS in the wild contains variables (`$start`), inline code
//! (`!t/2!`) and half-typed values, and an editor must round-trip all of it
//! byte for byte; interpreting an argument numerically is the caller's
//! business, via the lenient helpers in [`parse`].

use std::fmt;

pub mod emit;
pub mod parse;

pub use parse::parse_tags;

/// Canonical tag names, in the spelling used on the wire.
pub mod names {
    pub const A: &str = "a";
    pub const A1: &str = "1a";
    pub const A2: &str = "2a";
    pub const A3: &str = "3a";
    pub const A4: &str = "4a";
    pub const ALPHA: &str = "alpha";
    pub const AN: &str = "an";
    pub const B: &str = "b";
    pub const BE: &str = "be";
    pub const BLUR: &str = "blur";
    pub const BORD: &str = "bord";
    pub const C: &str = "c";
    pub const C1: &str = "1c";
    pub const C2: &str = "2c";
    pub const C3: &str = "3c";
    pub const C4: &str = "4c";
    pub const CLIP: &str = "clip";
    pub const FAD: &str = "fad";
    pub const FADE: &str = "fade";
    pub const FAX: &str = "fax";
    pub const FAY: &str = "fay";
    pub const FE: &str = "fe";
    pub const FN: &str = "fn";
    pub const FR: &str = "fr";
    pub const FRX: &str = "frx";
    pub const FRY: &str = "fry";
    pub const FRZ: &str = "frz";
    pub const FS: &str = "fs";
    pub const FSC: &str = "fsc";
    pub const FSCX: &str = "fscx";
    pub const FSCY: &str = "fscy";
    pub const FSP: &str = "fsp";
    pub const I: &str = "i";
    pub const ICLIP: &str = "iclip";
    pub const K: &str = "k";
    pub const KF: &str = "kf";
    pub const KO: &str = "ko";
    pub const KT: &str = "kt";
    pub const K_UPPER: &str = "K";
    pub const MOVE: &str = "move";
    pub const ORG: &str = "org";
    pub const P: &str = "p";
    pub const PBO: &str = "pbo";
    pub const POS: &str = "pos";
    pub const Q: &str = "q";
    pub const R: &str = "r";
    pub const S: &str = "s";
    pub const SHAD: &str = "shad";
    pub const T: &str = "t";
    pub const U: &str = "u";
    pub const XBORD: &str = "xbord";
    pub const XSHAD: &str = "xshad";
    pub const YBORD: &str = "ybord";
    pub const YSHAD: &str = "yshad";
}

/// For the two tags that have a second spelling, the other spelling.
///
/// `\c` and `\1c` set the same colour, and `\fr` and `\frz` the same
/// rotation; lookups and replacements must treat each pair as one tag.
#[must_use]
pub fn alt_name(name: &str) -> Option<&'static str> {
    match name {
        names::C => Some(names::C1),
        names::C1 => Some(names::C),
        names::FR => Some(names::FRZ),
        names::FRZ => Some(names::FR),
        _ => None,
    }
}

/// A single override tag.
///
/// Simple tags carry their glued value (`\fs12` → `Fs` with `"12"`), or
/// `None` when the tag appeared bare (`\r`). Parenthesised tags carry one
/// field per argument. Anything unrecognised, including a recognised name
/// with the wrong argument count, becomes [`Tag::Unknown`] and serialises
/// back to what was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    /// `\a` — legacy (SSA) line alignment.
    A(Option<String>),
    /// `\1a` — primary fill transparency.
    A1(Option<String>),
    /// `\2a` — secondary fill transparency.
    A2(Option<String>),
    /// `\3a` — border transparency.
    A3(Option<String>),
    /// `\4a` — shadow transparency.
    A4(Option<String>),
    /// `\alpha` — transparency of all four components at once.
    Alpha(Option<String>),
    /// `\an` — numpad line alignment.
    An(Option<String>),
    /// `\b` — bold; `0`, `1`, or a font weight.
    B(Option<String>),
    /// `\be` — blur edges (pass count).
    Be(Option<String>),
    /// `\blur` — gaussian edge blur.
    Blur(Option<String>),
    /// `\bord` — border width.
    Bord(Option<String>),
    /// `\c` — primary fill colour.
    C(Option<String>),
    /// `\1c` — primary fill colour (alias of `\c`).
    C1(Option<String>),
    /// `\2c` — secondary fill colour.
    C2(Option<String>),
    /// `\3c` — border colour.
    C3(Option<String>),
    /// `\4c` — shadow colour.
    C4(Option<String>),
    /// `\clip(...)` — clip rendering to a rectangle or vector shape.
    Clip(ClipShape),
    /// `\fad(in, out)` — simple fade.
    Fad { fade_in: String, fade_out: String },
    /// `\fade(...)` — seven-argument fade.
    Fade(ComplexFade),
    /// `\fax` — horizontal shear.
    FaX(Option<String>),
    /// `\fay` — vertical shear.
    FaY(Option<String>),
    /// `\fe` — font encoding.
    Fe(Option<String>),
    /// `\fn` — font name.
    Fn(Option<String>),
    /// `\fr` — z-axis rotation (alias of `\frz`).
    Fr(Option<String>),
    /// `\frx` — x-axis rotation.
    FrX(Option<String>),
    /// `\fry` — y-axis rotation.
    FrY(Option<String>),
    /// `\frz` — z-axis rotation.
    FrZ(Option<String>),
    /// `\fs` — font size, absolute or relative to the current size.
    Fs(Option<FontSize>),
    /// `\fsc` — uniform font scale.
    Fsc(Option<String>),
    /// `\fscx` — horizontal font scale.
    FscX(Option<String>),
    /// `\fscy` — vertical font scale.
    FscY(Option<String>),
    /// `\fsp` — letter spacing.
    Fsp(Option<String>),
    /// `\i` — italic.
    I(Option<String>),
    /// `\iclip(...)` — inverse clip.
    IClip(ClipShape),
    /// `\k` — karaoke: fill on syllable start.
    K(Option<String>),
    /// `\kf` — karaoke: sweep over the syllable.
    Kf(Option<String>),
    /// `\ko` — karaoke: border appears on syllable start.
    Ko(Option<String>),
    /// `\kt` — karaoke: set absolute syllable start time.
    Kt(Option<String>),
    /// `\K` — karaoke sweep, old spelling of `\kf`.
    KUpper(Option<String>),
    /// `\move(...)` — movement between two points, optionally timed.
    Move(Move),
    /// `\org(x, y)` — rotation origin.
    Org { x: String, y: String },
    /// `\p` — drawing mode; nonzero values give the coordinate scale.
    P(Option<String>),
    /// `\pbo` — drawing baseline offset.
    Pbo(Option<String>),
    /// `\pos(x, y)` — line position.
    Pos { x: String, y: String },
    /// `\q` — wrap style.
    Q(Option<String>),
    /// `\r` — reset to a style (or the line style when bare).
    R(Option<String>),
    /// `\s` — strikeout.
    S(Option<String>),
    /// `\shad` — shadow depth.
    Shad(Option<String>),
    /// `\t(...)` — animate the nested tags over an interval.
    T(Box<Transform>),
    /// `\u` — underline.
    U(Option<String>),
    /// `\xbord` — x border width.
    XBord(Option<String>),
    /// `\xshad` — x shadow distance.
    XShad(Option<String>),
    /// `\ybord` — y border width.
    YBord(Option<String>),
    /// `\yshad` — y shadow distance.
    YShad(Option<String>),
    /// Anything else, kept verbatim.
    Unknown { name: String, args: Vec<String> },
}

impl Tag {
    /// The name this tag serialises under.
    ///
    /// For [`Tag::Unknown`] this is the name as it appeared in the source.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::A(_) => names::A,
            Self::A1(_) => names::A1,
            Self::A2(_) => names::A2,
            Self::A3(_) => names::A3,
            Self::A4(_) => names::A4,
            Self::Alpha(_) => names::ALPHA,
            Self::An(_) => names::AN,
            Self::B(_) => names::B,
            Self::Be(_) => names::BE,
            Self::Blur(_) => names::BLUR,
            Self::Bord(_) => names::BORD,
            Self::C(_) => names::C,
            Self::C1(_) => names::C1,
            Self::C2(_) => names::C2,
            Self::C3(_) => names::C3,
            Self::C4(_) => names::C4,
            Self::Clip(_) => names::CLIP,
            Self::Fad { .. } => names::FAD,
            Self::Fade(_) => names::FADE,
            Self::FaX(_) => names::FAX,
            Self::FaY(_) => names::FAY,
            Self::Fe(_) => names::FE,
            Self::Fn(_) => names::FN,
            Self::Fr(_) => names::FR,
            Self::FrX(_) => names::FRX,
            Self::FrY(_) => names::FRY,
            Self::FrZ(_) => names::FRZ,
            Self::Fs(_) => names::FS,
            Self::Fsc(_) => names::FSC,
            Self::FscX(_) => names::FSCX,
            Self::FscY(_) => names::FSCY,
            Self::Fsp(_) => names::FSP,
            Self::I(_) => names::I,
            Self::IClip(_) => names::ICLIP,
            Self::K(_) => names::K,
            Self::Kf(_) => names::KF,
            Self::Ko(_) => names::KO,
            Self::Kt(_) => names::KT,
            Self::KUpper(_) => names::K_UPPER,
            Self::Move(_) => names::MOVE,
            Self::Org { .. } => names::ORG,
            Self::P(_) => names::P,
            Self::Pbo(_) => names::PBO,
            Self::Pos { .. } => names::POS,
            Self::Q(_) => names::Q,
            Self::R(_) => names::R,
            Self::S(_) => names::S,
            Self::Shad(_) => names::SHAD,
            Self::T(_) => names::T,
            Self::U(_) => names::U,
            Self::XBord(_) => names::XBORD,
            Self::XShad(_) => names::XSHAD,
            Self::YBord(_) => names::YBORD,
            Self::YShad(_) => names::YSHAD,
            Self::Unknown { name, .. } => name,
        }
    }

    /// Whether `name` names this tag, counting the alias pairs
    /// (`\c` ↔ `\1c`, `\fr` ↔ `\frz`) as matches.
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.name() == name || alt_name(name).is_some_and(|alt| self.name() == alt)
    }

    /// The serialised length of this tag in bytes, including the backslash.
    #[must_use]
    pub fn emitted_len(&self) -> usize {
        self.to_string().len()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.emit(formatter)
    }
}

/// The value of a `\fs` tag.
///
/// libass treats `\fs+10` and `\fs-10` as adjustments to the current size
/// rather than absolute sizes, so the leading sign is significant and is
/// kept as part of the raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSize {
    Absolute(String),
    Relative(String),
}

impl FontSize {
    /// Classify a raw `\fs` value by its leading sign.
    #[must_use]
    pub fn from_raw(raw: String) -> Self {
        if raw.starts_with('+') || raw.starts_with('-') {
            Self::Relative(raw)
        } else {
            Self::Absolute(raw)
        }
    }

    /// The value as it appeared in the source, sign included.
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::Absolute(raw) | Self::Relative(raw) => raw,
        }
    }
}

/// Arguments of a `\move` tag: two points and an optional time interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub x1: String,
    pub y1: String,
    pub x2: String,
    pub y2: String,
    /// `(t1, t2)` for the six-argument form, `None` for the four-argument
    /// form.
    pub timing: Option<(String, String)>,
}

/// Arguments of a `\fade` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexFade {
    pub alpha1: String,
    pub alpha2: String,
    pub alpha3: String,
    pub t1: String,
    pub t2: String,
    pub t3: String,
    pub t4: String,
}

/// The region argument of `\clip` and `\iclip`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipShape {
    /// Four-argument form: an axis-aligned rectangle.
    Rectangle {
        x1: String,
        y1: String,
        x2: String,
        y2: String,
    },
    /// One- or two-argument form: a drawing, optionally preceded by the
    /// coordinate scale.
    Vector {
        scale: Option<String>,
        commands: String,
    },
}

/// Arguments of a `\t` tag.
///
/// `start` and `end` only ever appear together; their presence and the
/// presence of `accel` distinguish the four accepted argument counts
/// (nested tags only; acceleration; interval; interval and acceleration).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transform {
    pub start: Option<String>,
    pub end: Option<String>,
    pub accel: Option<String>,
    /// The animated tags, parsed with the same parser as the surrounding
    /// block.
    pub tags: Vec<Tag>,
}
