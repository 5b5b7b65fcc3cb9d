use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::fs;
use std::path::Path;

use smallvec::SmallVec;

use crate::error::MalformedStructureError;
use crate::types::{Direction, GridCoord, SlotId};
use crate::MAX_SLOT_LENGTH;

/// A rectangular matrix of open (`true`) and blocked (`false`) cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridStructure {
    cells: Vec<Vec<bool>>,
    width: usize,
}

impl GridStructure {
    /// Validate a cell matrix. Every row must have the same, nonzero width, and at least one
    /// cell must be open.
    pub fn new(cells: Vec<Vec<bool>>) -> Result<GridStructure, MalformedStructureError> {
        if cells.iter().all(|row| row.is_empty()) {
            return Err(MalformedStructureError::Empty);
        }
        let width = cells[0].len();

        if let Some((row, found)) = cells
            .iter()
            .map(|line| line.len())
            .enumerate()
            .find(|&(_, len)| len != width)
        {
            return Err(MalformedStructureError::NotRectangular {
                row,
                expected: width,
                found,
            });
        }

        if !cells.iter().flatten().any(|&open| open) {
            return Err(MalformedStructureError::NoOpenCells);
        }

        Ok(GridStructure { cells, width })
    }

    /// Parse a template with one row per line, where `_` or `.` is an open cell and any other
    /// character (including a space) is blocked. Empty lines before the first row and after the
    /// last are ignored; an empty line between rows is a row with no cells.
    pub fn from_template(template: &str) -> Result<GridStructure, MalformedStructureError> {
        let lines: Vec<&str> = template
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .collect();
        let first = lines.iter().position(|line| !line.is_empty());
        let last = lines.iter().rposition(|line| !line.is_empty());

        let cells = match (first, last) {
            (Some(first), Some(last)) => lines[first..=last]
                .iter()
                .map(|line| line.chars().map(|c| c == '_' || c == '.').collect())
                .collect(),
            _ => vec![],
        };

        GridStructure::new(cells)
    }

    /// Load a structure file in the format accepted by `from_template`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<GridStructure, MalformedStructureError> {
        let path = path.as_ref();
        let template = fs::read_to_string(path).map_err(|source| MalformedStructureError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        GridStructure::from_template(&template)
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_open(&self, (row, col): GridCoord) -> bool {
        self.cells[row][col]
    }

    /// Every maximal run of at least two open cells, scanning rows (or columns, for `Down`).
    fn runs(&self, direction: Direction) -> Vec<Vec<GridCoord>> {
        let (outer, inner) = match direction {
            Direction::Across => (self.height(), self.width()),
            Direction::Down => (self.width(), self.height()),
        };
        let coord = |line: usize, idx: usize| match direction {
            Direction::Across => (line, idx),
            Direction::Down => (idx, line),
        };

        let mut result: Vec<Vec<GridCoord>> = vec![];

        for line in 0..outer {
            let mut current_run: Vec<GridCoord> = vec![];

            for idx in 0..inner {
                if self.is_open(coord(line, idx)) {
                    current_run.push(coord(line, idx));
                } else {
                    if current_run.len() > 1 {
                        result.push(current_run);
                    }
                    current_run = vec![];
                }
            }

            if current_run.len() > 1 {
                result.push(current_run);
            }
        }

        result
    }
}

/// A CSP variable: one run of open cells. Two slots are the same slot iff all four fields match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,
}

impl Slot {
    /// Generate the coords for each cell of this slot.
    pub fn cell_coords(&self) -> impl Iterator<Item = GridCoord> + '_ {
        (0..self.length).map(move |cell_idx| match self.direction {
            Direction::Across => (self.start_cell.0, self.start_cell.1 + cell_idx),
            Direction::Down => (self.start_cell.0 + cell_idx, self.start_cell.1),
        })
    }
}

/// A struct representing a crossing between one slot and another, referencing the other slot's id
/// and the location of the intersection within the other slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub other_slot_cell: usize,
}

/// A struct representing the static aspects of a slot in the grid.
#[derive(Debug, Clone)]
pub struct SlotConfig {
    pub id: SlotId,
    pub slot: Slot,
    /// For each cell of the slot, the slot crossing it there, if any.
    pub crossings: SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]>,
    /// Ids of every slot crossing this one, ascending.
    pub neighbors: SmallVec<[SlotId; MAX_SLOT_LENGTH]>,
}

/// The puzzle model: the grid structure and its slots. Each slot's crossings double as the
/// overlap table. Nothing here changes once it's built.
pub struct GridConfig {
    pub structure: GridStructure,
    pub slot_configs: Vec<SlotConfig>,
}

impl Debug for GridConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridConfig")
            .field("height", &self.structure.height())
            .field("width", &self.structure.width())
            .field("slot_configs", &self.slot_configs)
            .finish()
    }
}

impl GridConfig {
    /// Find every across and down slot in the structure and work out where they cross. Across
    /// slots come first, then down slots, each in reading order.
    pub fn new(structure: GridStructure) -> GridConfig {
        let slots: Vec<Slot> = [Direction::Across, Direction::Down]
            .into_iter()
            .flat_map(|direction| {
                structure
                    .runs(direction)
                    .into_iter()
                    .map(move |coords| Slot {
                        start_cell: coords[0],
                        direction,
                        length: coords.len(),
                    })
            })
            .collect();

        // Build a map from cell location to (slot id, cell index within slot) entries, which we
        // can then use to calculate crossings.
        let mut entries_by_loc: HashMap<GridCoord, SmallVec<[(SlotId, usize); 2]>> =
            HashMap::new();
        for (slot_id, slot) in slots.iter().enumerate() {
            for (cell_idx, loc) in slot.cell_coords().enumerate() {
                entries_by_loc.entry(loc).or_default().push((slot_id, cell_idx));
            }
        }

        let slot_configs = slots
            .iter()
            .enumerate()
            .map(|(slot_id, slot)| {
                // Maximal runs in the same direction never share a cell, so each cell has at most
                // one crossing.
                let crossings: SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]> = slot
                    .cell_coords()
                    .map(|loc| {
                        entries_by_loc[&loc]
                            .iter()
                            .find(|&&(other_slot_id, _)| other_slot_id != slot_id)
                            .map(|&(other_slot_id, other_slot_cell)| Crossing {
                                other_slot_id,
                                other_slot_cell,
                            })
                    })
                    .collect();

                let mut neighbors: SmallVec<[SlotId; MAX_SLOT_LENGTH]> = crossings
                    .iter()
                    .flatten()
                    .map(|crossing| crossing.other_slot_id)
                    .collect();
                neighbors.sort_unstable();

                SlotConfig {
                    id: slot_id,
                    slot: *slot,
                    crossings,
                    neighbors,
                }
            })
            .collect();

        GridConfig {
            structure,
            slot_configs,
        }
    }

    /// Parse a template (see `GridStructure::from_template`) straight into a puzzle.
    pub fn from_template(template: &str) -> Result<GridConfig, MalformedStructureError> {
        Ok(GridConfig::new(GridStructure::from_template(template)?))
    }

    pub fn slot_count(&self) -> usize {
        self.slot_configs.len()
    }

    pub fn slot_config(&self, slot_id: SlotId) -> &SlotConfig {
        &self.slot_configs[slot_id]
    }

    pub fn slot(&self, slot_id: SlotId) -> &Slot {
        &self.slot_configs[slot_id].slot
    }

    /// Look up a slot's id by its identity.
    pub fn slot_id(&self, slot: &Slot) -> Option<SlotId> {
        self.slot_configs
            .iter()
            .position(|slot_config| slot_config.slot == *slot)
    }

    /// The cell indices `(i, j)` where slot `a`'s cell `i` is slot `b`'s cell `j`, if they cross.
    pub fn overlap(&self, a: SlotId, b: SlotId) -> Option<(usize, usize)> {
        self.slot_configs[a]
            .crossings
            .iter()
            .enumerate()
            .find_map(|(cell_idx, crossing)| match crossing {
                Some(crossing) if crossing.other_slot_id == b => {
                    Some((cell_idx, crossing.other_slot_cell))
                }
                _ => None,
            })
    }

    pub fn neighbors(&self, slot_id: SlotId) -> &[SlotId] {
        &self.slot_configs[slot_id].neighbors
    }

    pub fn degree(&self, slot_id: SlotId) -> usize {
        self.neighbors(slot_id).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction::{Across, Down};

    #[test]
    fn test_rejects_ragged_structure() {
        let err = GridStructure::from_template("___\n__\n___").unwrap_err();
        assert!(matches!(
            err,
            MalformedStructureError::NotRectangular { row: 1, expected: 3, found: 2 }
        ));
    }

    #[test]
    fn test_rejects_blank_line_between_rows() {
        let err = GridStructure::from_template("___\n\n___\n").unwrap_err();
        assert!(matches!(
            err,
            MalformedStructureError::NotRectangular { row: 1, expected: 3, found: 0 }
        ));

        let structure = GridStructure::from_template("\n\n___\n_#_\n\n").unwrap();
        assert_eq!(structure.height(), 2);
        assert_eq!(structure.width(), 3);
    }

    #[test]
    fn test_empty_first_row_is_not_an_empty_grid() {
        let err = GridStructure::new(vec![vec![], vec![true, true]]).unwrap_err();
        assert!(matches!(
            err,
            MalformedStructureError::NotRectangular { row: 1, expected: 0, found: 2 }
        ));
        assert!(matches!(
            GridStructure::new(vec![vec![], vec![]]).unwrap_err(),
            MalformedStructureError::Empty
        ));
        assert!(matches!(
            GridStructure::new(vec![]).unwrap_err(),
            MalformedStructureError::Empty
        ));
    }

    #[test]
    fn test_rejects_empty_and_closed_structures() {
        assert!(matches!(
            GridStructure::from_template("\n\n").unwrap_err(),
            MalformedStructureError::Empty
        ));
        assert!(matches!(
            GridStructure::from_template("##\n##").unwrap_err(),
            MalformedStructureError::NoOpenCells
        ));
    }

    /// #___#
    /// _##__
    /// _____
    #[test]
    fn test_finds_slots_and_overlaps() {
        let config = GridConfig::from_template("#___#\n_##__\n_____\n").unwrap();

        let slots: Vec<Slot> = config.slot_configs.iter().map(|s| s.slot).collect();
        assert_eq!(
            slots,
            vec![
                Slot { start_cell: (0, 1), direction: Across, length: 3 },
                Slot { start_cell: (1, 3), direction: Across, length: 2 },
                Slot { start_cell: (2, 0), direction: Across, length: 5 },
                Slot { start_cell: (1, 0), direction: Down, length: 2 },
                Slot { start_cell: (0, 3), direction: Down, length: 3 },
                Slot { start_cell: (1, 4), direction: Down, length: 2 },
            ]
        );

        // The top across slot crosses the middle down slot at its last letter / first letter.
        assert_eq!(config.overlap(0, 4), Some((2, 0)));
        assert_eq!(config.overlap(4, 0), Some((0, 2)));
        assert_eq!(config.overlap(0, 2), None);
        assert_eq!(config.overlap(2, 3), Some((0, 1)));

        assert_eq!(config.neighbors(4), &[0, 1, 2]);
        assert_eq!(config.degree(2), 3);
        assert_eq!(config.degree(0), 1);
        assert_eq!(config.slot_id(&slots[5]), Some(5));
    }

    #[test]
    fn test_overlaps_are_symmetric() {
        let config = GridConfig::from_template("____#\n_#__#\n_____\n#__#_\n").unwrap();
        for a in 0..config.slot_count() {
            for b in 0..config.slot_count() {
                match config.overlap(a, b) {
                    Some((i, j)) => {
                        assert_eq!(config.overlap(b, a), Some((j, i)));
                        assert!(config.neighbors(a).contains(&b));
                        let cell_a: Vec<_> = config.slot(a).cell_coords().collect();
                        let cell_b: Vec<_> = config.slot(b).cell_coords().collect();
                        assert_eq!(cell_a[i], cell_b[j]);
                    }
                    None => assert!(!config.neighbors(a).contains(&b)),
                }
            }

            let crossing_count = config.slot_config(a).crossings.iter().flatten().count();
            assert_eq!(crossing_count, config.degree(a));
        }
    }

    #[test]
    fn test_single_cells_are_not_slots() {
        let config = GridConfig::from_template("_#_\n#_#\n").unwrap();
        assert_eq!(config.slot_count(), 0);
    }
}
