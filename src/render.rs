use crate::backtracking_search::Choice;
use crate::grid_config::GridConfig;
use crate::word_list::WordList;

/// Character drawn for blocked cells.
pub const BLOCK: char = '█';

/// Lay the given choices out on the grid: `Some(letter)` where a chosen word covers an open cell,
/// `None` everywhere else.
pub fn letter_grid(config: &GridConfig, word_list: &WordList, choices: &[Choice]) -> Vec<Vec<Option<char>>> {
    let mut letters: Vec<Vec<Option<char>>> =
        vec![vec![None; config.structure.width()]; config.structure.height()];

    for &Choice { slot_id, word_id } in choices {
        let slot = config.slot(slot_id);
        let word = word_list.word(word_id);

        for ((row, col), &glyph) in slot.cell_coords().zip(&word.glyphs) {
            letters[row][col] = Some(word_list.glyph(glyph));
        }
    }

    letters
}

/// Turn the given grid config and fill choices into a rendered string, one line per row. Open
/// cells without a letter are drawn as spaces.
pub fn render_grid(config: &GridConfig, word_list: &WordList, choices: &[Choice]) -> String {
    letter_grid(config, word_list, choices)
        .iter()
        .enumerate()
        .map(|(row, line)| {
            line.iter()
                .enumerate()
                .map(|(col, letter)| {
                    if config.structure.is_open((row, col)) {
                        letter.unwrap_or(' ')
                    } else {
                        BLOCK
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_partial_fill() {
        let config = GridConfig::from_template("___#\n_#__\n").unwrap();
        let word_list = WordList::new(["abc", "ax"]);

        let rendered = render_grid(&config, &word_list, &[Choice { slot_id: 0, word_id: 0 }]);
        assert_eq!(rendered, "ABC█\n █  ");

        let letters = letter_grid(&config, &word_list, &[Choice { slot_id: 2, word_id: 1 }]);
        assert_eq!(letters[0][0], Some('A'));
        assert_eq!(letters[1][0], Some('X'));
        assert_eq!(letters[0][1], None);
    }
}
