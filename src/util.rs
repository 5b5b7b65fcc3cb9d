use smallvec::SmallVec;

use crate::types::WordId;
use crate::word_list::WordList;
use crate::MAX_GLYPH_COUNT;

/// Number of occurrences of each glyph at one cell position across a set of words.
pub type GlyphCounts = SmallVec<[u32; MAX_GLYPH_COUNT]>;

/// Count, for each glyph, how many of the given words place it at `cell_idx`. Words too short to
/// have that cell don't count towards anything.
pub fn build_glyph_counts_for_cell<I>(word_list: &WordList, options: I, cell_idx: usize) -> GlyphCounts
where
    I: IntoIterator<Item = WordId>,
{
    let mut result: GlyphCounts = (0..word_list.glyph_count()).map(|_| 0).collect();

    for word_id in options {
        if let Some(&glyph) = word_list.word(word_id).glyphs.get(cell_idx) {
            result[glyph] += 1;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_glyphs_at_cell() {
        let word_list = WordList::new(["ab", "ac", "bc", "abc"]);
        let a = word_list.glyph_id('A').unwrap();
        let b = word_list.glyph_id('B').unwrap();
        let c = word_list.glyph_id('C').unwrap();

        let counts = build_glyph_counts_for_cell(&word_list, 0..word_list.len(), 1);
        assert_eq!(counts[a], 0);
        assert_eq!(counts[b], 2);
        assert_eq!(counts[c], 2);

        let counts = build_glyph_counts_for_cell(&word_list, 0..word_list.len(), 2);
        assert_eq!(counts.iter().sum::<u32>(), 1, "only one word reaches the third cell");
    }
}
