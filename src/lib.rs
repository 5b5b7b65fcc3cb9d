//! Fill a crossword grid by constraint satisfaction.
//!
//! Each slot (a maximal run of open cells in one direction) is a variable whose domain is the
//! word list. We prune the domains once by word length and once by arc consistency, then run a
//! backtracking search ordered by the MRV/degree and least-constraining-value heuristics.
//!
//! ```
//! use crossfill::{find_fill, render_grid, GridConfig, GridStructure, WordList};
//!
//! let structure = GridStructure::from_template("___\n_##\n_##\n").unwrap();
//! let config = GridConfig::new(structure);
//! let word_list = WordList::new(["cat", "cow", "dog"]);
//!
//! let result = find_fill(&config, &word_list).expect("grid should be fillable");
//! assert_eq!(render_grid(&config, &word_list, result.solution().choices()), "CAT\nO██\nW██");
//! ```

pub mod arc_consistency;
pub mod backtracking_search;
pub mod config;
pub mod domains;
pub mod error;
pub mod grid_config;
pub mod render;
pub mod types;
pub mod util;
pub mod word_list;

pub use arc_consistency::{
    enforce_arc_consistency, enforce_node_consistency, ArcConsistencyFailure,
    ArcConsistencyResult, ArcConsistencySuccess,
};
pub use backtracking_search::{
    find_fill, find_fill_with_config, is_consistent, search, ArcConsistencyMode, Choice,
    FillConfig, FillFailure, FillSuccess, Solution, SolutionPolicy, Statistics, ValueOrdering,
};
pub use config::{ConfigError, SolverConfig};
pub use domains::Domains;
pub use error::{Error, MalformedStructureError, Result, WordListError};
pub use grid_config::{Crossing, GridConfig, GridStructure, Slot, SlotConfig};
pub use render::{letter_grid, render_grid};
pub use types::{Direction, GlyphId, GridCoord, SlotArc, SlotId, WordId};
pub use word_list::{Word, WordList};

/// The expected maximum number of distinct characters/rebuses/whatever appearing in a word list.
pub const MAX_GLYPH_COUNT: usize = 256;

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;
