use std::io::Write;

use crossfill::{
    find_fill, find_fill_with_config, render_grid, Direction, FillConfig, FillFailure, GridConfig,
    GridStructure, MalformedStructureError, Slot, SolutionPolicy, WordList,
};
use tempfile::NamedTempFile;

/// _____
/// _#_#_
/// _____
const LADDER: &str = "_____\n_#_#_\n_____\n";

const LADDER_WORDS: &str = "
crane
taste
plane
toast
cat
ads
eye
cot
dog
ape
eve
";

fn temp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn test_fill_from_files() {
    let structure_file = temp_file(LADDER);
    let words_file = temp_file(LADDER_WORDS);

    let config = GridConfig::new(GridStructure::from_file(structure_file.path()).unwrap());
    let word_list = WordList::from_file(words_file.path()).unwrap();
    assert_eq!(config.slot_count(), 5);
    assert_eq!(word_list.len(), 11);

    let result = find_fill(&config, &word_list).expect("Failed to find a fill");
    assert!(result.solution().is_valid(&config, &word_list));

    let rendered = render_grid(&config, &word_list, result.solution().choices());
    let rows: Vec<&str> = rendered.lines().collect();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|row| row.chars().count() == 5));
    assert_eq!(rows[1].chars().filter(|&c| c == '█').count(), 2);
    assert!(!rendered.contains(' '), "every open cell is filled");
}

#[test]
fn test_solution_maps_slots_to_words() {
    let config = GridConfig::from_template(LADDER).unwrap();
    let word_list = WordList::from_lines(LADDER_WORDS);

    let result = find_fill(&config, &word_list).unwrap();
    let solution = result.solution();

    let top = config
        .slot_id(&Slot { start_cell: (0, 0), direction: Direction::Across, length: 5 })
        .unwrap();
    let left = config
        .slot_id(&Slot { start_cell: (0, 0), direction: Direction::Down, length: 3 })
        .unwrap();

    let top_word = &word_list.word(solution.word_for(top)).string;
    let left_word = &word_list.word(solution.word_for(left)).string;
    assert_eq!(top_word.len(), 5);
    assert_eq!(left_word.len(), 3);
    assert_eq!(top_word.chars().next(), left_word.chars().next());
}

#[test]
fn test_every_ladder_fill_is_distinct_and_valid() {
    let config = GridConfig::from_template(LADDER).unwrap();
    let word_list = WordList::from_lines(LADDER_WORDS);
    let fill_config = FillConfig {
        solution_policy: SolutionPolicy::Collect { limit: None },
        ..FillConfig::default()
    };

    let result = find_fill_with_config(&config, &word_list, &fill_config).unwrap();
    assert!(!result.solutions.is_empty());
    for (idx, solution) in result.solutions.iter().enumerate() {
        assert!(solution.is_valid(&config, &word_list));
        assert!(!result.solutions[..idx].contains(solution));
    }
}

#[test]
fn test_reuse_would_be_needed() {
    // Both across slots need a five-letter word, and there's only one.
    let config = GridConfig::from_template(LADDER).unwrap();
    let word_list = WordList::new(["crane", "cat", "ads", "eye", "cot", "axe", "eve"]);

    assert_eq!(find_fill(&config, &word_list).unwrap_err(), FillFailure::Unsatisfiable);
}

#[test]
fn test_ragged_structure_file() {
    let structure_file = temp_file("___\n__\n");
    let err = GridStructure::from_file(structure_file.path()).unwrap_err();
    assert!(matches!(err, MalformedStructureError::NotRectangular { .. }));
}
