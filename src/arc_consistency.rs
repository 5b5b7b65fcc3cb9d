use std::collections::{HashSet, VecDeque};

use tracing::debug;

use crate::domains::Domains;
use crate::grid_config::GridConfig;
use crate::types::{SlotArc, SlotId};
use crate::util::build_glyph_counts_for_cell;
use crate::word_list::WordList;

/// Remove every word whose length doesn't match its slot. Returns the number of words removed
/// across all slots. An emptied domain isn't reported here; arc consistency or the search will
/// run into it.
pub fn enforce_node_consistency(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
) -> usize {
    let eliminations: usize = config
        .slot_configs
        .iter()
        .map(|slot_config| {
            domains.retain(slot_config.id, |word_id| {
                word_list.word(word_id).len() == slot_config.slot.length
            })
        })
        .sum();

    debug!(event = "node_consistency", eliminations);

    eliminations
}

/// Data structure used in `enforce_arc_consistency` to track which arcs we still need to visit.
/// An arc that's already waiting in the queue isn't added a second time.
#[derive(Debug)]
struct ConsistencyQueue {
    queue: VecDeque<SlotArc>,
    queued: HashSet<SlotArc>,
}

impl ConsistencyQueue {
    fn with_initial_queue<Items>(items: Items) -> ConsistencyQueue
    where
        Items: IntoIterator<Item = SlotArc>,
    {
        let mut queue = ConsistencyQueue {
            queue: VecDeque::new(),
            queued: HashSet::new(),
        };
        for arc in items {
            queue.enqueue(arc);
        }
        queue
    }

    fn pop_front(&mut self) -> Option<SlotArc> {
        let arc = self.queue.pop_front()?;
        self.queued.remove(&arc);
        Some(arc)
    }

    fn enqueue(&mut self, arc: SlotArc) {
        if self.queued.insert(arc) {
            self.queue.push_back(arc);
        }
    }
}

/// Summary of a successful `enforce_arc_consistency` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArcConsistencySuccess {
    /// How many arcs caused at least one removal.
    pub revisions: usize,
    /// How many words were removed in total.
    pub eliminations: usize,
}

/// Returned when propagation empties a slot's domain, meaning there's no fill reachable from the
/// domains we started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub slot_id: SlotId,
}

pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// Make `x` consistent with `y`: remove from `x`'s domain every word whose letter at the crossing
/// doesn't appear at the same cell of any word left for `y`. Returns the number removed.
fn revise(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
    x: SlotId,
    y: SlotId,
) -> usize {
    let Some((x_cell, y_cell)) = config.overlap(x, y) else {
        return 0;
    };

    let crossing_glyph_counts = build_glyph_counts_for_cell(word_list, domains.iter(y), y_cell);

    domains.retain(x, |word_id| {
        word_list
            .word(word_id)
            .glyphs
            .get(x_cell)
            .map_or(false, |&glyph| crossing_glyph_counts[glyph] > 0)
    })
}

/// AC-3. Process `arcs` (by default every ordered pair of distinct slots) in FIFO order, revising
/// each one; whenever `x` loses words, every arc `(z, x)` for the other neighbors `z` of `x` has to
/// be checked again. Fails as soon as any domain is emptied.
///
/// Success doesn't mean a fill exists, only that no word can be ruled out locally.
pub fn enforce_arc_consistency(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
    arcs: Option<&[SlotArc]>,
) -> ArcConsistencyResult {
    let slot_count = config.slot_count();

    let mut queue = match arcs {
        Some(arcs) => ConsistencyQueue::with_initial_queue(arcs.iter().copied()),
        None => ConsistencyQueue::with_initial_queue((0..slot_count).flat_map(|x| {
            (0..slot_count).filter(move |&y| y != x).map(move |y| (x, y))
        })),
    };

    let mut result = ArcConsistencySuccess::default();

    while let Some((x, y)) = queue.pop_front() {
        let removed = revise(config, word_list, domains, x, y);
        if removed == 0 {
            continue;
        }

        result.revisions += 1;
        result.eliminations += removed;

        if domains.is_empty(x) {
            debug!(event = "arc_consistency_wipeout", slot = x, crossing = y);
            return Err(ArcConsistencyFailure { slot_id: x });
        }

        for &z in config.neighbors(x) {
            if z != y {
                queue.enqueue((z, x));
            }
        }
    }

    debug!(
        event = "arc_consistency",
        revisions = result.revisions,
        eliminations = result.eliminations,
    );

    Ok(result)
}
