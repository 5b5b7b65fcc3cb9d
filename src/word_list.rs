use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::fs;
use std::path::Path;

use smallvec::SmallVec;
use tracing::debug;

use crate::error::WordListError;
use crate::types::{GlyphId, WordId};
use crate::{MAX_GLYPH_COUNT, MAX_SLOT_LENGTH};

/// A struct representing a word that can be chosen for a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// The normalized (uppercase) form of the word.
    pub string: String,
    pub glyphs: SmallVec<[GlyphId; MAX_SLOT_LENGTH]>,
}

impl Word {
    /// Length in cells.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// The vocabulary: every distinct candidate word, each stored once and addressed by `WordId`.
/// Ids follow first-appearance order in the input, which is the order domains iterate in.
pub struct WordList {
    pub glyphs: SmallVec<[char; MAX_GLYPH_COUNT]>,
    pub words: Vec<Word>,
    glyph_ids_by_char: HashMap<char, GlyphId>,
    word_ids_by_string: HashMap<String, WordId>,
}

impl Debug for WordList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordList")
            .field("glyphs", &self.glyphs)
            .field("words", &(["(", &self.words.len().to_string(), " entries)"].join("")))
            .finish()
    }
}

impl WordList {
    /// Build a word list from raw entries of arbitrary case. Entries are trimmed, blank ones are
    /// skipped, and duplicates collapse onto their first occurrence.
    pub fn new<I, S>(raw_words: I) -> WordList
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut word_list = WordList {
            glyphs: SmallVec::new(),
            words: vec![],
            glyph_ids_by_char: HashMap::new(),
            word_ids_by_string: HashMap::new(),
        };

        for raw_word in raw_words {
            let normalized = raw_word.as_ref().trim().to_uppercase();
            if normalized.is_empty() || word_list.word_ids_by_string.contains_key(&normalized) {
                continue;
            }

            let glyphs = normalized
                .chars()
                .map(|c| word_list.intern_glyph(c))
                .collect();

            word_list
                .word_ids_by_string
                .insert(normalized.clone(), word_list.words.len());
            word_list.words.push(Word {
                string: normalized,
                glyphs,
            });
        }

        word_list
    }

    /// Parse a word list with one entry per line.
    pub fn from_lines(text: &str) -> WordList {
        WordList::new(text.lines())
    }

    /// Load a word list file with one entry per line. A file without a single word is an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<WordList, WordListError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| WordListError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let word_list = WordList::from_lines(&text);
        if word_list.is_empty() {
            return Err(WordListError::Empty {
                path: path.to_path_buf(),
            });
        }

        debug!(
            event = "word_list_loaded",
            path = %path.display(),
            words = word_list.len(),
            glyphs = word_list.glyph_count(),
        );

        Ok(word_list)
    }

    fn intern_glyph(&mut self, c: char) -> GlyphId {
        if let Some(&glyph_id) = self.glyph_ids_by_char.get(&c) {
            return glyph_id;
        }
        let glyph_id = self.glyphs.len();
        self.glyphs.push(c);
        self.glyph_ids_by_char.insert(c, glyph_id);
        glyph_id
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    pub fn glyph(&self, glyph_id: GlyphId) -> char {
        self.glyphs[glyph_id]
    }

    /// Look up the glyph id for an (already normalized) character.
    pub fn glyph_id(&self, c: char) -> Option<GlyphId> {
        self.glyph_ids_by_char.get(&c).copied()
    }

    /// Look up a word, ignoring case.
    pub fn find(&self, word: &str) -> Option<WordId> {
        self.word_ids_by_string
            .get(&word.trim().to_uppercase())
            .copied()
    }
}
