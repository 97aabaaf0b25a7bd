//! Caret arithmetic and tag editing over a block list.
//!
//! All positions here are byte offsets. "Origin" offsets are measured in
//! the full event text the blocks were segmented from; "plain" offsets are
//! measured in the concatenation of the unbraced blocks only, which is the
//! text an editor shows when tags are hidden. Callers pass offsets that lie
//! on character boundaries of the text they were produced from.

use super::{Block, OverrideBlock};
use crate::tags::Tag;

/// Map an origin offset to an offset in the plain text.
///
/// Given `Hello {\b1}World{\b0}!` and origin offset 13 (the `r`), the
/// plain offset is 8.
#[must_use]
pub fn normalize_index(blocks: &[Block], origin_index: usize) -> usize {
    let mut remaining = origin_index;
    let mut plain_length = 0;

    for block in blocks {
        if remaining == 0 {
            break;
        }
        let block_length = block.text().len();

        if block.is_braced() {
            remaining = remaining.saturating_sub(block_length);
            continue;
        }

        let consumed = block_length.min(remaining);
        plain_length += consumed;
        remaining -= consumed;
    }

    plain_length
}

/// Map an origin offset to an offset local to the block at `block_index`.
///
/// Given `Hello {\b1}World{\b0}!`, origin offset 13 and the index of the
/// `World` block, the local offset is 2.
#[must_use]
pub fn normalize_to_block(blocks: &[Block], block_index: usize, origin_index: usize) -> usize {
    let mut remaining = origin_index;

    for (index, block) in blocks.iter().enumerate() {
        if remaining == 0 {
            break;
        }
        let block_length = block.text().len();

        if block.is_braced() {
            remaining = remaining.saturating_sub(block_length);
            continue;
        }

        let consumed = block_length.min(remaining);
        if index == block_index {
            return consumed;
        }
        remaining -= consumed;
    }

    remaining
}

/// The index of the block containing the given origin offset.
///
/// An offset exactly at the end of a block belongs to that block if it is
/// unbraced, and to the following block otherwise. A caret touching a
/// brace group from either side therefore resolves to the neighbouring
/// text rather than into the braces, and a caret between two adjacent
/// brace groups resolves to the second of them.
#[must_use]
pub fn block_index_at(blocks: &[Block], origin_index: usize) -> usize {
    let mut remaining = origin_index;
    let mut result = 0;

    for (index, block) in blocks.iter().enumerate() {
        result = index;
        let block_length = block.text().len();

        if remaining < block_length {
            return index;
        }
        if remaining == block_length && !block.is_braced() {
            return index;
        }
        remaining -= block_length;
    }

    result
}

/// Find the closest tag named `tag_name` at or before `block_index`.
///
/// Scans backward through override blocks, and backward through each
/// block's tags, so the match returned is the one that governs the text at
/// that position. The alias pairs (`c`/`1c`, `fr`/`frz`) match either
/// spelling.
#[must_use]
pub fn find_tag<'blocks>(
    blocks: &'blocks [Block],
    block_index: usize,
    tag_name: &str,
) -> Option<&'blocks Tag> {
    if blocks.is_empty() {
        return None;
    }
    let start = block_index.min(blocks.len() - 1);

    for block in blocks[..=start].iter().rev() {
        if let Block::Override(ovr) = block {
            for tag in ovr.tags.iter().rev() {
                if tag.is_named(tag_name) {
                    return Some(tag);
                }
            }
        }
    }

    None
}

/// Set `tag` at `origin_pos`, editing the block list in place.
///
/// The block at the position is located, then the walk goes backward:
/// the nearest override block receives the tag, unless a plain block is
/// reached first, in which case that block is split in two around a new
/// override block holding only the tag. Within an override block, the
/// rearmost existing tag of the same name (or alias) is replaced and any
/// earlier duplicates are pruned; a name with no existing occurrence is
/// appended.
///
/// Returns the net change in text length, for keeping a caret stable
/// across the edit. When no block can take the tag (the walk only meets
/// comments and drawings) nothing is changed and the shift is 0.
pub fn set_tag(blocks: &mut Vec<Block>, tag: Tag, origin_pos: usize) -> isize {
    if blocks.is_empty() {
        return 0;
    }
    let start = block_index_at(blocks, origin_pos);

    let mut found: Option<(usize, bool)> = None;
    for index in (0..=start.min(blocks.len() - 1)).rev() {
        match &blocks[index] {
            Block::Override(_) => {
                found = Some((index, true));
                break;
            }
            Block::Plain(_) => {
                found = Some((index, false));
                break;
            }
            Block::Comment(_) | Block::Drawing(_) => {}
        }
    }
    let Some((found_index, is_override)) = found else {
        return 0;
    };

    let mut shift = signed_len(tag.emitted_len());

    if is_override {
        if let Block::Override(ovr) = &mut blocks[found_index] {
            let mut replaced = false;
            for tag_index in (0..ovr.tags.len()).rev() {
                if !ovr.tags[tag_index].is_named(tag.name()) {
                    continue;
                }
                shift -= signed_len(ovr.tags[tag_index].emitted_len());
                if replaced {
                    ovr.tags.remove(tag_index);
                } else {
                    ovr.tags[tag_index] = tag.clone();
                    replaced = true;
                }
            }
            if !replaced {
                ovr.tags.push(tag);
            }
        }
        return shift;
    }

    // Split the plain block around a fresh override block
    let local = normalize_to_block(blocks, found_index, origin_pos);
    let (left, right) = match &blocks[found_index] {
        Block::Plain(text) => {
            let split = local.min(text.len());
            (text[..split].to_owned(), text[split..].to_owned())
        }
        _ => return 0,
    };
    shift += 2; // the synthesised {}

    blocks.splice(
        found_index..=found_index,
        [
            Block::Plain(left),
            Block::Override(OverrideBlock { tags: vec![tag] }),
            Block::Plain(right),
        ],
    );

    shift
}

#[allow(clippy::cast_possible_wrap)] // block and tag lengths are tiny
fn signed_len(length: usize) -> isize {
    length as isize
}

#[cfg(test)]
mod tests {
    use assert_matches2::assert_matches;

    use super::super::{Block, join, parse};
    use super::*;
    use crate::tags::Tag;

    fn bold(value: &str) -> Tag {
        Tag::B(Some(value.to_owned()))
    }

    #[test]
    fn normalize_index_skips_braced_blocks() {
        let blocks = parse("Hello {\\b1}World{\\b0}!");
        // origin 13 is the `r` of World
        assert_eq!(normalize_index(&blocks, 13), 8);
        assert_eq!(normalize_index(&blocks, 0), 0);
        // inside the first override block, everything up to it counts
        assert_eq!(normalize_index(&blocks, 8), 6);
        // past the end, all plain text counts
        assert_eq!(normalize_index(&blocks, 100), 12);
    }

    #[test]
    fn normalize_index_counts_drawings() {
        let blocks = parse("{\\p1}m 0 0{\\p0}x");
        // the drawing block is unbraced text as far as offsets go
        assert_eq!(normalize_index(&blocks, 100), 6);
    }

    #[test]
    fn normalize_to_block_returns_local_offset() {
        let blocks = parse("Hello {\\b1}World{\\b0}!");
        assert_matches!(&blocks[2], Block::Plain(world));
        assert_eq!(world, "World");
        assert_eq!(normalize_to_block(&blocks, 2, 13), 2);
        assert_eq!(normalize_to_block(&blocks, 0, 3), 3);
    }

    #[test]
    fn block_index_boundaries() {
        let blocks = parse("a{\\b1}{\\i1}b");
        assert_eq!(blocks.len(), 4);

        // boundary between the two override blocks resolves to the second
        assert_eq!(block_index_at(&blocks, 6), 2);
        // boundary between plain text and the first override stays on the
        // plain block
        assert_eq!(block_index_at(&blocks, 1), 0);
        // inside a block
        assert_eq!(block_index_at(&blocks, 0), 0);
        assert_eq!(block_index_at(&blocks, 3), 1);
        // after the second override, before `b`
        assert_eq!(block_index_at(&blocks, 11), 3);
        // past the end, clamped to the last block
        assert_eq!(block_index_at(&blocks, 100), 3);
    }

    #[test]
    fn find_tag_resolves_aliases() {
        let blocks = parse("{\\1c&HFF0000&}text");
        assert_matches!(
            find_tag(&blocks, blocks.len() - 1, "c"),
            Some(Tag::C1(Some(_)))
        );

        let blocks = parse("{\\c&HFF0000&}text");
        assert_matches!(
            find_tag(&blocks, blocks.len() - 1, "1c"),
            Some(Tag::C(Some(_)))
        );

        let blocks = parse("{\\fr30}text");
        assert_matches!(find_tag(&blocks, 1, "frz"), Some(Tag::Fr(Some(_))));
    }

    #[test]
    fn find_tag_takes_rearmost_match() {
        let blocks = parse("{\\b1}a{\\b0}b");
        assert_matches!(find_tag(&blocks, 3, "b"), Some(Tag::B(Some(value))));
        assert_eq!(value, "0");

        // scanning from before the second block sees only the first
        assert_matches!(find_tag(&blocks, 1, "b"), Some(Tag::B(Some(value))));
        assert_eq!(value, "1");
    }

    #[test]
    fn find_tag_missing() {
        let blocks = parse("{\\b1}text");
        assert_eq!(find_tag(&blocks, 1, "i"), None);
        assert_eq!(find_tag(&parse("plain only"), 0, "b"), None);
    }

    #[test]
    fn set_tag_replaces_in_override_block() {
        let mut blocks = parse("Hello {\\b1}World");
        // caret inside the override block
        let shift = set_tag(&mut blocks, bold("500"), 8);
        assert_eq!(join(&blocks), "Hello {\\b500}World");
        // `\b500` is two bytes longer than `\b1`
        assert_eq!(shift, 2);
    }

    #[test]
    fn set_tag_is_idempotent() {
        let mut blocks = parse("Hello {\\b1}World");
        let first = set_tag(&mut blocks, bold("1"), 8);
        let second = set_tag(&mut blocks, bold("1"), 8);
        assert_eq!(first, 0);
        assert_eq!(second, 0);
        assert_eq!(join(&blocks), "Hello {\\b1}World");
        assert_matches!(&blocks[1], Block::Override(ovr));
        assert_eq!(ovr.tags.len(), 1);
    }

    #[test]
    fn set_tag_prunes_duplicates() {
        let mut blocks = parse("{\\b1\\i1\\b0}x");
        let shift = set_tag(&mut blocks, bold("1"), 2);
        // the rearmost \b0 is replaced, the earlier \b1 removed
        assert_eq!(join(&blocks), "{\\i1\\b1}x");
        assert_eq!(shift, -3);
    }

    #[test]
    fn set_tag_resolves_aliases() {
        let mut blocks = parse("{\\1c&HFF0000&}x");
        let shift = set_tag(&mut blocks, Tag::C(Some("&H00FF00&".to_owned())), 2);
        assert_eq!(join(&blocks), "{\\c&H00FF00&}x");
        // `\c…` is one byte shorter than `\1c…`
        assert_eq!(shift, -1);
    }

    #[test]
    fn set_tag_appends_when_absent() {
        let mut blocks = parse("{\\i1}x");
        let shift = set_tag(&mut blocks, bold("1"), 2);
        assert_eq!(join(&blocks), "{\\i1\\b1}x");
        assert_eq!(shift, 3);
    }

    #[test]
    fn set_tag_splits_plain_block() {
        let mut blocks = parse("Hello world");
        let shift = set_tag(&mut blocks, Tag::I(Some("1".to_owned())), 6);
        assert_matches!(
            &blocks[..],
            [Block::Plain(left), Block::Override(_), Block::Plain(right)]
        );
        assert_eq!(left, "Hello ");
        assert_eq!(right, "world");
        assert_eq!(join(&blocks), "Hello {\\i1}world");
        // `\i1` plus the synthesised braces
        assert_eq!(shift, 5);
    }

    #[test]
    fn set_tag_after_closing_brace_splits_the_plain_text() {
        // a caret just past `}` sits in the plain block, so the tag opens a
        // new group rather than joining the previous one
        let mut blocks = parse("a{\\b1}bc");
        let shift = set_tag(&mut blocks, Tag::I(Some("1".to_owned())), 6);
        assert_eq!(join(&blocks), "a{\\b1}{\\i1}bc");
        assert_eq!(shift, 5);
    }

    #[test]
    fn set_tag_with_no_eligible_block() {
        let mut blocks = vec![Block::Comment("note".to_owned())];
        let shift = set_tag(&mut blocks, bold("1"), 2);
        assert_eq!(shift, 0);
        assert_eq!(join(&blocks), "{note}");
    }
}
