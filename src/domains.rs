use std::ops::Range;

use bit_set::BitSet;

use crate::grid_config::GridConfig;
use crate::types::{SlotId, WordId};
use crate::word_list::WordList;

/// The candidate words still eligible for each slot.
///
/// Every slot starts out pointing at the whole word list; a slot only gets its own set the first
/// time something is removed from it. Domains can only shrink: there is no way to add a word back.
#[derive(Debug, Clone)]
pub struct Domains {
    word_count: usize,
    /// `None` means "every word in the list".
    sets: Vec<Option<BitSet>>,
    lens: Vec<usize>,
}

/// Iterator over a slot's domain, in ascending `WordId` order.
pub enum DomainIter<'a> {
    Full(Range<WordId>),
    Subset(bit_set::Iter<'a, u32>),
}

impl Iterator for DomainIter<'_> {
    type Item = WordId;

    fn next(&mut self) -> Option<WordId> {
        match self {
            DomainIter::Full(range) => range.next(),
            DomainIter::Subset(iter) => iter.next(),
        }
    }
}

impl Domains {
    pub fn new(config: &GridConfig, word_list: &WordList) -> Domains {
        let slot_count = config.slot_count();
        Domains {
            word_count: word_list.len(),
            sets: (0..slot_count).map(|_| None).collect(),
            lens: vec![word_list.len(); slot_count],
        }
    }

    pub fn slot_count(&self) -> usize {
        self.sets.len()
    }

    fn check_slot(&self, slot_id: SlotId) {
        assert!(
            slot_id < self.sets.len(),
            "slot {slot_id} doesn't exist (grid has {} slots)",
            self.sets.len()
        );
    }

    /// How many words remain for this slot?
    pub fn len(&self, slot_id: SlotId) -> usize {
        self.check_slot(slot_id);
        self.lens[slot_id]
    }

    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.len(slot_id) == 0
    }

    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        self.check_slot(slot_id);
        match &self.sets[slot_id] {
            None => word_id < self.word_count,
            Some(set) => set.contains(word_id),
        }
    }

    pub fn iter(&self, slot_id: SlotId) -> DomainIter<'_> {
        self.check_slot(slot_id);
        match &self.sets[slot_id] {
            None => DomainIter::Full(0..self.word_count),
            Some(set) => DomainIter::Subset(set.iter()),
        }
    }

    pub fn words(&self, slot_id: SlotId) -> Vec<WordId> {
        self.iter(slot_id).collect()
    }

    /// Keep only the words for which `keep` returns true, returning how many were removed.
    pub fn retain<F>(&mut self, slot_id: SlotId, mut keep: F) -> usize
    where
        F: FnMut(WordId) -> bool,
    {
        let removed: Vec<WordId> = self.iter(slot_id).filter(|&word_id| !keep(word_id)).collect();
        if removed.is_empty() {
            return 0;
        }

        let word_count = self.word_count;
        let set = self.sets[slot_id].get_or_insert_with(|| {
            let mut set = BitSet::with_capacity(word_count);
            for word_id in 0..word_count {
                set.insert(word_id);
            }
            set
        });
        for &word_id in &removed {
            set.remove(word_id);
        }
        self.lens[slot_id] -= removed.len();

        removed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (GridConfig, WordList) {
        let config = GridConfig::from_template("___\n_##\n").unwrap();
        let word_list = WordList::new(["ab", "abc", "de", "fgh"]);
        (config, word_list)
    }

    #[test]
    fn test_starts_with_whole_word_list() {
        let (config, word_list) = setup();
        let domains = Domains::new(&config, &word_list);

        assert_eq!(domains.slot_count(), 2);
        assert_eq!(domains.len(0), 4);
        assert_eq!(domains.words(1), vec![0, 1, 2, 3]);
        assert!(domains.contains(1, 3));
        assert!(!domains.contains(1, 4));
    }

    #[test]
    fn test_retain_only_shrinks_one_slot() {
        let (config, word_list) = setup();
        let mut domains = Domains::new(&config, &word_list);

        assert_eq!(domains.retain(0, |word_id| word_id % 2 == 1), 2);
        assert_eq!(domains.words(0), vec![1, 3]);
        assert_eq!(domains.len(0), 2);
        assert_eq!(domains.len(1), 4, "other slots still share the full list");

        assert_eq!(domains.retain(0, |_| true), 0);
        assert_eq!(domains.retain(0, |_| false), 2);
        assert!(domains.is_empty(0));
        assert_eq!(domains.words(0), Vec::<WordId>::new());
    }

    #[test]
    fn test_clones_are_independent() {
        let (config, word_list) = setup();
        let mut domains = Domains::new(&config, &word_list);
        let snapshot = domains.clone();

        domains.retain(1, |word_id| word_id == 2);
        assert_eq!(domains.words(1), vec![2]);
        assert_eq!(snapshot.words(1), vec![0, 1, 2, 3]);
    }

    #[test]
    #[should_panic(expected = "doesn't exist")]
    fn test_unknown_slot_panics() {
        let (config, word_list) = setup();
        let domains = Domains::new(&config, &word_list);
        domains.len(7);
    }
}
