//! Segmentation of event text into blocks.
//!
//! An event's text is an alternating run of plain text and `{…}` groups:
//!
//! ```text
//! Hello {\i1}there{\i0} friend.
//! ```
//!
//! segments into `Plain("Hello ")`, an override block, `Plain("there")`,
//! another override block, and `Plain(" friend.")`. A brace group without a
//! single backslash inside is a comment, and a nonzero `\p` tag switches the
//! *following* unbraced text into drawing commands until a `\p0` switches it
//! back.
//!
//! Joining the blocks' [`Block::text`] back together reproduces the source
//! text, except that override blocks re-serialise from their parsed tags and
//! therefore come back in canonical spelling.

use std::borrow::Cow;
use std::fmt;

use crate::tags::parse::parse_prefix_i32;
use crate::tags::{Tag, parse_tags};

pub mod index;

pub use index::{block_index_at, find_tag, normalize_index, normalize_to_block, set_tag};

/// One segment of an event's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Literal text, no structure.
    Plain(String),
    /// A brace group with no override tags inside. The stored string is the
    /// content between the braces.
    Comment(String),
    /// A brace group of override tags.
    Override(OverrideBlock),
    /// Drawing commands; only appears while a nonzero `\p` is in effect.
    Drawing(DrawingBlock),
}

impl Block {
    /// The text this block contributes to the event, braces included for
    /// the braced kinds.
    ///
    /// For override blocks this is recomputed from the tag list on every
    /// call; mutating the tags changes what the next read returns.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Self::Plain(text) => Cow::Borrowed(text.as_str()),
            Self::Comment(body) => Cow::Owned(format!("{{{body}}}")),
            Self::Override(block) => Cow::Owned(block.to_string()),
            Self::Drawing(drawing) => Cow::Borrowed(drawing.commands.as_str()),
        }
    }

    /// Whether this block is written between braces (override or comment).
    #[must_use]
    pub fn is_braced(&self) -> bool {
        matches!(self, Self::Override(_) | Self::Comment(_))
    }
}

/// An override block: an ordered, editable list of tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideBlock {
    pub tags: Vec<Tag>,
}

impl OverrideBlock {
    /// Parse brace-group content (braces excluded) into a block. The parse
    /// happens here, eagerly; the tag list is ready immediately.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        Self {
            tags: parse_tags(content),
        }
    }

    /// The drawing scale set by the last `\p` in this block, if it has one.
    /// `\p` without a value means scale 0, i.e. drawing mode off.
    fn drawing_scale(&self) -> Option<i32> {
        self.tags.iter().rev().find_map(|tag| match tag {
            Tag::P(value) => Some(value.as_deref().map_or(0, |raw| parse_prefix_i32(raw, 10))),
            _ => None,
        })
    }
}

impl fmt::Display for OverrideBlock {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("{")?;
        for tag in &self.tags {
            tag.emit(formatter)?;
        }
        formatter.write_str("}")
    }
}

/// A run of drawing commands and the coordinate scale they were declared
/// under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawingBlock {
    pub commands: String,
    pub scale: i32,
}

/// Segment event text into blocks.
///
/// Unmatched braces never fail: a `{` with no `}` after it is ordinary
/// text (or drawing commands, if a drawing is open).
#[must_use]
pub fn parse(text: &str) -> Vec<Block> {
    if text.is_empty() {
        return vec![Block::Plain(String::new())];
    }

    let mut blocks = Vec::new();
    let mut drawing_scale = 0_i32;
    let mut rest = text;

    while !rest.is_empty() {
        if rest.starts_with('{')
            && let Some(close) = rest.find('}')
        {
            let body = &rest[1..close];
            if body.contains('\\') {
                let block = OverrideBlock::parse(body);
                drawing_scale = block.drawing_scale().unwrap_or(drawing_scale);
                blocks.push(Block::Override(block));
            } else {
                blocks.push(Block::Comment(body.to_owned()));
            }
            rest = &rest[(close + 1)..];
            continue;
        }

        if drawing_scale == 0 {
            let end = match rest.find('{') {
                // Only stop at a `{` that actually opens a group
                Some(open) if rest[open..].contains('}') => open,
                _ => rest.len(),
            };
            blocks.push(Block::Plain(rest[..end].to_owned()));
            rest = &rest[end..];
        } else {
            // An unclosed `{` can land us here with the brace still at the
            // front; skip over it so the scan advances
            let search_from = usize::from(rest.starts_with('{'));
            let end = rest[search_from..]
                .find('{')
                .map_or(rest.len(), |offset| search_from + offset);
            blocks.push(Block::Drawing(DrawingBlock {
                commands: rest[..end].to_owned(),
                scale: drawing_scale,
            }));
            rest = &rest[end..];
        }
    }

    blocks
}

/// Reassemble block text into one string.
#[must_use]
pub fn join(blocks: &[Block]) -> String {
    blocks.iter().map(Block::text).collect()
}

/// The text with all braced groups and drawings stripped: the
/// concatenation of the plain blocks only.
#[must_use]
pub fn plain_text(blocks: &[Block]) -> String {
    blocks
        .iter()
        .filter_map(|block| match block {
            Block::Plain(text) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_matches2::assert_matches;

    use super::*;
    use crate::tags::Tag;

    #[test]
    fn empty_text_is_one_empty_plain_block() {
        let blocks = parse("");
        assert_matches!(&blocks[..], [Block::Plain(text)]);
        assert!(text.is_empty());
    }

    #[test]
    fn alternating_plain_and_override() {
        let blocks = parse("Hello {\\i1}there{\\i0} friend.");
        assert_matches!(
            &blocks[..],
            [
                Block::Plain(first),
                Block::Override(_),
                Block::Plain(second),
                Block::Override(_),
                Block::Plain(third)
            ]
        );
        assert_eq!(first, "Hello ");
        assert_eq!(second, "there");
        assert_eq!(third, " friend.");
    }

    #[test]
    fn braces_without_backslash_are_comments() {
        let blocks = parse("before{a note}after");
        assert_matches!(
            &blocks[..],
            [Block::Plain(_), Block::Comment(body), Block::Plain(_)]
        );
        assert_eq!(body, "a note");
        assert_eq!(blocks[1].text(), "{a note}");
    }

    #[test]
    fn override_blocks_parse_eagerly() {
        let blocks = parse("{\\b1\\i1}text");
        assert_matches!(&blocks[..], [Block::Override(block), Block::Plain(_)]);
        assert_matches!(&block.tags[..], [Tag::B(Some(_)), Tag::I(Some(_))]);
    }

    #[test]
    fn drawing_mode_opens_and_closes() {
        let blocks = parse("{\\p1}m 0 0 l 10 10{\\p0}after");
        assert_matches!(
            &blocks[..],
            [
                Block::Override(_),
                Block::Drawing(drawing),
                Block::Override(_),
                Block::Plain(after)
            ]
        );
        assert_eq!(drawing.commands, "m 0 0 l 10 10");
        assert_eq!(drawing.scale, 1);
        assert_eq!(after, "after");
    }

    #[test]
    fn drawing_scale_follows_last_p_tag() {
        let blocks = parse("{\\p1\\p4}m 0 0");
        assert_matches!(&blocks[..], [Block::Override(_), Block::Drawing(drawing)]);
        assert_eq!(drawing.scale, 4);
    }

    #[test]
    fn bare_p_tag_disables_drawing() {
        let blocks = parse("{\\p1}m 0 0{\\b1\\p}text");
        assert_matches!(
            &blocks[..],
            [
                Block::Override(_),
                Block::Drawing(_),
                Block::Override(_),
                Block::Plain(text)
            ]
        );
        assert_eq!(text, "text");
    }

    #[test]
    fn unmatched_open_brace_is_plain_text() {
        let blocks = parse("abc{\\b1");
        assert_matches!(&blocks[..], [Block::Plain(text)]);
        assert_eq!(text, "abc{\\b1");

        let blocks = parse("{\\b1");
        assert_matches!(&blocks[..], [Block::Plain(text)]);
        assert_eq!(text, "{\\b1");
    }

    #[test]
    fn unmatched_open_brace_in_drawing() {
        let blocks = parse("{\\p1}m 0 0{unclosed");
        assert_matches!(
            &blocks[..],
            [Block::Override(_), Block::Drawing(first), Block::Drawing(second)]
        );
        assert_eq!(first.commands, "m 0 0");
        assert_eq!(second.commands, "{unclosed");
    }

    #[test]
    fn join_reproduces_source() {
        for source in [
            "Hello {\\i1}there{\\i0} friend.",
            "before{a note}after",
            "{\\p1}m 0 0 l 10 10{\\p0}after",
            "no tags at all",
            "{\\pos(960,540)\\fad(120,240)}centered",
        ] {
            assert_eq!(join(&parse(source)), source, "{source}");
        }
    }

    #[test]
    fn join_canonicalises_overrides() {
        // `\i(1)` is accepted but re-serialises in glued form
        assert_eq!(join(&parse("{\\i(1)}x")), "{\\i1}x");
    }

    #[test]
    fn plain_text_strips_everything_braced() {
        let blocks = parse("Hello {\\b1}World{\\b0}!");
        assert_eq!(plain_text(&blocks), "Hello World!");

        let blocks = parse("{\\p1}m 0 0{\\p0}visible");
        assert_eq!(plain_text(&blocks), "visible");
    }

    #[test]
    fn override_text_recomputes_after_mutation() {
        let mut blocks = parse("{\\b1}x");
        assert_eq!(blocks[0].text(), "{\\b1}");
        if let Block::Override(block) = &mut blocks[0] {
            block.tags.push(Tag::I(Some("1".to_owned())));
        }
        assert_eq!(blocks[0].text(), "{\\b1\\i1}");
    }
}
