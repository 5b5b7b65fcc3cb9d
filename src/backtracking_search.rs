use std::cmp::Reverse;
use std::collections::HashSet;
use std::ops::ControlFlow;

use instant::{Duration, Instant};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, info, trace};

use crate::arc_consistency::{enforce_arc_consistency, enforce_node_consistency};
use crate::domains::Domains;
use crate::grid_config::GridConfig;
use crate::types::{SlotArc, SlotId, WordId};
use crate::util::{build_glyph_counts_for_cell, GlyphCounts};
use crate::word_list::WordList;
use crate::MAX_SLOT_LENGTH;

/// How to order a slot's candidate words before trying them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueOrdering {
    /// Words that rule out the fewest options for unfilled crossing slots go first; ties keep
    /// domain order.
    #[default]
    LeastConstraining,

    /// Plain domain (word list) order.
    DomainOrder,
}

/// When to run arc consistency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArcConsistencyMode {
    /// Once, before the search starts.
    #[default]
    Initial,

    /// Also after every tentative choice, on a copy of the domains owned by that branch.
    Maintain,
}

/// What the search does when it reaches a complete assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SolutionPolicy {
    /// Stop at the first complete assignment.
    #[default]
    FirstFound,

    /// Keep going, collecting up to `limit` solutions (or every one, if `None`).
    Collect { limit: Option<usize> },
}

impl SolutionPolicy {
    fn is_satisfied(&self, solution_count: usize) -> bool {
        match self {
            SolutionPolicy::FirstFound => solution_count >= 1,
            SolutionPolicy::Collect { limit } => limit.map_or(false, |limit| solution_count >= limit),
        }
    }
}

/// Knobs for a fill attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillConfig {
    pub value_ordering: ValueOrdering,
    pub arc_consistency: ArcConsistencyMode,
    pub solution_policy: SolutionPolicy,

    /// Give up after visiting this many search states.
    pub max_states: Option<u64>,
}

/// A struct recording a slot assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Choice {
    pub slot_id: SlotId,
    pub word_id: WordId,
}

/// A complete, consistent assignment: one word per slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Solution {
    choices: Vec<Choice>,
}

impl Solution {
    /// One choice per slot, in slot id order.
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn word_for(&self, slot_id: SlotId) -> WordId {
        self.choices[slot_id].word_id
    }

    /// The chosen words, in slot id order.
    pub fn words<'a>(&self, word_list: &'a WordList) -> Vec<&'a str> {
        self.choices
            .iter()
            .map(|choice| word_list.word(choice.word_id).string.as_str())
            .collect()
    }

    /// Check the solution from scratch against the grid.
    pub fn is_valid(&self, config: &GridConfig, word_list: &WordList) -> bool {
        self.choices.len() == config.slot_count()
            && is_consistent(
                config,
                word_list,
                &self.choices.iter().map(|c| Some(c.word_id)).collect::<Vec<_>>(),
            )
    }
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// Search frames that picked a slot to fill.
    pub states: u64,
    /// Search frames that ran out of candidates.
    pub backtracks: u64,
    /// Words removed by node and arc consistency before the search started.
    pub initial_eliminations: usize,
    pub duration: Duration,
}

/// A struct representing the results of a fill operation.
#[derive(Debug)]
pub struct FillSuccess {
    pub statistics: Statistics,

    /// Never empty. Holds exactly one solution under `SolutionPolicy::FirstFound`.
    pub solutions: Vec<Solution>,
}

impl FillSuccess {
    /// The first solution found.
    pub fn solution(&self) -> &Solution {
        &self.solutions[0]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillFailure {
    /// The search space is exhausted: there's no fill.
    Unsatisfiable,

    /// `max_states` ran out before any fill was found. This says nothing about whether a fill
    /// exists.
    ExhaustedBudget,
}

/// The partial assignment being built by the search: one reused entry per slot, filled and
/// cleared as the search descends and backtracks.
#[derive(Debug)]
struct Assignment {
    word_ids: Vec<Option<WordId>>,
    assigned_count: usize,
}

impl Assignment {
    fn new(slot_count: usize) -> Assignment {
        Assignment {
            word_ids: vec![None; slot_count],
            assigned_count: 0,
        }
    }

    fn is_complete(&self) -> bool {
        self.assigned_count == self.word_ids.len()
    }

    fn is_assigned(&self, slot_id: SlotId) -> bool {
        self.word_ids[slot_id].is_some()
    }

    fn insert(&mut self, slot_id: SlotId, word_id: WordId) {
        debug_assert!(self.word_ids[slot_id].is_none(), "slot {slot_id} is already assigned");
        self.word_ids[slot_id] = Some(word_id);
        self.assigned_count += 1;
    }

    fn remove(&mut self, slot_id: SlotId) {
        if self.word_ids[slot_id].take().is_some() {
            self.assigned_count -= 1;
        }
    }

    fn to_solution(&self) -> Solution {
        Solution {
            choices: self
                .word_ids
                .iter()
                .enumerate()
                .filter_map(|(slot_id, word_id)| {
                    word_id.map(|word_id| Choice { slot_id, word_id })
                })
                .collect(),
        }
    }
}

/// Is this (partial) assignment, indexed by slot id, consistent? Every assigned word must have
/// its slot's length, every pair of assigned crossing slots must agree on the shared letter, and
/// no word may be used twice anywhere in the grid. The whole assignment is checked, not just the
/// most recent choice.
pub fn is_consistent(config: &GridConfig, word_list: &WordList, assignment: &[Option<WordId>]) -> bool {
    assert_eq!(
        assignment.len(),
        config.slot_count(),
        "assignment doesn't match the grid's slots"
    );

    let mut used_word_ids: HashSet<WordId> = HashSet::with_capacity(assignment.len());

    for (slot_id, word_id) in assignment
        .iter()
        .enumerate()
        .filter_map(|(slot_id, word_id)| word_id.map(|word_id| (slot_id, word_id)))
    {
        let word = word_list.word(word_id);
        if word.len() != config.slot(slot_id).length || !used_word_ids.insert(word_id) {
            return false;
        }

        for &neighbor_id in config.neighbors(slot_id) {
            let (Some(neighbor_word_id), Some((cell, neighbor_cell))) =
                (assignment[neighbor_id], config.overlap(slot_id, neighbor_id))
            else {
                continue;
            };

            if word.glyphs.get(cell) != word_list.word(neighbor_word_id).glyphs.get(neighbor_cell) {
                return false;
            }
        }
    }

    true
}

/// Why the search stopped before exhausting the search space.
enum Halt {
    PolicySatisfied,
    BudgetExhausted,
}

struct Search<'a> {
    config: &'a GridConfig,
    word_list: &'a WordList,
    fill_config: &'a FillConfig,
    assignment: Assignment,
    statistics: Statistics,
    solutions: Vec<Solution>,
}

impl<'a> Search<'a> {
    /// Minimum-remaining-values, tie-broken by degree, then by lowest slot id.
    fn select_unassigned_slot(&self, domains: &Domains) -> Option<SlotId> {
        (0..self.config.slot_count())
            .filter(|&slot_id| !self.assignment.is_assigned(slot_id))
            .min_by_key(|&slot_id| (domains.len(slot_id), Reverse(self.config.degree(slot_id))))
    }

    /// Order the slot's candidates according to `ValueOrdering`. For least-constraining-value,
    /// a word's cost is the number of words it would rule out across unassigned crossing slots.
    fn order_domain_values(&self, slot_id: SlotId, domains: &Domains) -> Vec<WordId> {
        let mut candidates = domains.words(slot_id);

        if self.fill_config.value_ordering == ValueOrdering::DomainOrder {
            return candidates;
        }

        // For each unassigned neighbor: our cell at the crossing, how many of its words put each
        // glyph at its cell, and its domain size.
        let crossing_counts: Vec<(usize, GlyphCounts, usize)> = self
            .config
            .neighbors(slot_id)
            .iter()
            .filter(|&&neighbor_id| !self.assignment.is_assigned(neighbor_id))
            .filter_map(|&neighbor_id| {
                let (cell, neighbor_cell) = self.config.overlap(slot_id, neighbor_id)?;
                Some((
                    cell,
                    build_glyph_counts_for_cell(self.word_list, domains.iter(neighbor_id), neighbor_cell),
                    domains.len(neighbor_id),
                ))
            })
            .collect();

        candidates.sort_by_cached_key(|&word_id| {
            let word = self.word_list.word(word_id);
            crossing_counts
                .iter()
                .map(|(cell, counts, neighbor_len)| {
                    let compatible = word
                        .glyphs
                        .get(*cell)
                        .map_or(0, |&glyph| counts[glyph] as usize);
                    neighbor_len - compatible
                })
                .sum::<usize>()
        });

        candidates
    }

    /// Propagate a tentative choice through a copy of the domains. Returns `None` if that empties
    /// any unassigned slot.
    fn propagate_choice(&self, domains: &Domains, choice: Choice) -> Option<Domains> {
        let mut branch_domains = domains.clone();
        branch_domains.retain(choice.slot_id, |word_id| word_id == choice.word_id);

        let arcs: SmallVec<[SlotArc; MAX_SLOT_LENGTH]> = self
            .config
            .neighbors(choice.slot_id)
            .iter()
            .filter(|&&neighbor_id| !self.assignment.is_assigned(neighbor_id))
            .map(|&neighbor_id| (neighbor_id, choice.slot_id))
            .collect();

        match enforce_arc_consistency(self.config, self.word_list, &mut branch_domains, Some(&arcs)) {
            Ok(_) => Some(branch_domains),
            Err(failure) => {
                trace!(
                    event = "choice_wipeout",
                    slot = choice.slot_id,
                    word = %self.word_list.word(choice.word_id).string,
                    emptied_slot = failure.slot_id,
                );
                None
            }
        }
    }

    fn backtrack(&mut self, domains: &Domains) -> ControlFlow<Halt> {
        if self.assignment.is_complete() {
            self.solutions.push(self.assignment.to_solution());
            return if self.fill_config.solution_policy.is_satisfied(self.solutions.len()) {
                ControlFlow::Break(Halt::PolicySatisfied)
            } else {
                ControlFlow::Continue(())
            };
        }

        if let Some(max_states) = self.fill_config.max_states {
            if self.statistics.states >= max_states {
                return ControlFlow::Break(Halt::BudgetExhausted);
            }
        }
        self.statistics.states += 1;

        let Some(slot_id) = self.select_unassigned_slot(domains) else {
            return ControlFlow::Continue(());
        };

        trace!(
            event = "select_slot",
            slot = slot_id,
            options = domains.len(slot_id),
            assigned = self.assignment.assigned_count,
        );

        for word_id in self.order_domain_values(slot_id, domains) {
            self.assignment.insert(slot_id, word_id);

            if is_consistent(self.config, self.word_list, &self.assignment.word_ids) {
                match self.fill_config.arc_consistency {
                    ArcConsistencyMode::Initial => self.backtrack(domains)?,
                    ArcConsistencyMode::Maintain => {
                        if let Some(branch_domains) =
                            self.propagate_choice(domains, Choice { slot_id, word_id })
                        {
                            self.backtrack(&branch_domains)?;
                        }
                    }
                }
            }

            self.assignment.remove(slot_id);
        }

        self.statistics.backtracks += 1;
        ControlFlow::Continue(())
    }
}

/// Search for fills of the given grid, starting from domains that have already been pruned
/// (typically by node and arc consistency). The domains aren't modified.
pub fn search(
    config: &GridConfig,
    word_list: &WordList,
    domains: &Domains,
    fill_config: &FillConfig,
) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();

    let mut search = Search {
        config,
        word_list,
        fill_config,
        assignment: Assignment::new(config.slot_count()),
        statistics: Statistics::default(),
        solutions: vec![],
    };

    let halt = search.backtrack(domains);
    let Search {
        mut statistics,
        solutions,
        ..
    } = search;
    statistics.duration = start.elapsed();

    if !solutions.is_empty() {
        return Ok(FillSuccess {
            statistics,
            solutions,
        });
    }

    Err(match halt {
        ControlFlow::Break(Halt::BudgetExhausted) => FillFailure::ExhaustedBudget,
        _ => FillFailure::Unsatisfiable,
    })
}

/// Search for a valid fill for the given grid, using the default `FillConfig`.
pub fn find_fill(config: &GridConfig, word_list: &WordList) -> Result<FillSuccess, FillFailure> {
    find_fill_with_config(config, word_list, &FillConfig::default())
}

/// Enforce node consistency and then arc consistency on fresh domains, and search what's left.
pub fn find_fill_with_config(
    config: &GridConfig,
    word_list: &WordList,
    fill_config: &FillConfig,
) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();

    info!(
        event = "solve_start",
        slots = config.slot_count(),
        words = word_list.len(),
        value_ordering = ?fill_config.value_ordering,
        arc_consistency = ?fill_config.arc_consistency,
    );

    let mut domains = Domains::new(config, word_list);
    let mut initial_eliminations = enforce_node_consistency(config, word_list, &mut domains);

    if let Some(slot_id) = (0..config.slot_count()).find(|&slot_id| domains.is_empty(slot_id)) {
        debug!(
            event = "no_words_of_length",
            slot = slot_id,
            length = config.slot(slot_id).length,
        );
        info!(event = "solve_end", result = "unsatisfiable", states = 0u64);
        return Err(FillFailure::Unsatisfiable);
    }

    match enforce_arc_consistency(config, word_list, &mut domains, None) {
        Ok(success) => initial_eliminations += success.eliminations,
        Err(_) => {
            info!(event = "solve_end", result = "unsatisfiable", states = 0u64);
            return Err(FillFailure::Unsatisfiable);
        }
    }

    let result = search(config, word_list, &domains, fill_config).map(|mut success| {
        success.statistics.initial_eliminations = initial_eliminations;
        success.statistics.duration = start.elapsed();
        success
    });

    match &result {
        Ok(success) => info!(
            event = "solve_end",
            result = "filled",
            solutions = success.solutions.len(),
            states = success.statistics.states,
            backtracks = success.statistics.backtracks,
            initial_eliminations,
            duration_ms = success.statistics.duration.as_millis() as u64,
        ),
        Err(failure) => info!(
            event = "solve_end",
            result = ?failure,
            duration_ms = start.elapsed().as_millis() as u64,
        ),
    }

    result
}
