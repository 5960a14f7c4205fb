//! Word-level Tesseract TSV output and layout reconstruction.

/// Words shorter than this are ignored when estimating character width.
const MIN_WIDTH_SAMPLE_CHARS: usize = 4;

/// One recognised word.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub block: u32,
    pub paragraph: u32,
    pub line: u32,
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
    pub confidence: f32,
    pub text: String,
}

/// Parse `tesseract ... tsv` output into words, keeping document order.
///
/// Rows without a confidence (page/block/line rows report -1) or with blank
/// text are dropped, as are malformed rows and the header.
pub fn parse_tsv(tsv: &str) -> Vec<Word> {
    tsv.lines().filter_map(parse_row).collect()
}

fn parse_row(row: &str) -> Option<Word> {
    let cols: Vec<&str> = row.split('\t').collect();
    if cols.len() < 12 {
        return None;
    }

    let confidence: f32 = cols[10].trim().parse().ok()?;
    let text = cols[11].trim();
    if confidence < 0.0 || text.is_empty() {
        return None;
    }

    let num = |i: usize| cols[i].trim().parse::<u32>().ok();
    Some(Word {
        block: num(2)?,
        paragraph: num(3)?,
        line: num(4)?,
        left: num(6)?,
        top: num(7)?,
        width: num(8)?,
        height: num(9)?,
        confidence,
        text: text.to_string(),
    })
}

/// Average pixel width of one character, from words long enough to be
/// representative. `None` when the block has no such word.
fn char_width(words: &[&Word]) -> Option<f32> {
    let samples: Vec<f32> = words
        .iter()
        .filter_map(|word| {
            let len = word.text.chars().count();
            (len >= MIN_WIDTH_SAMPLE_CHARS).then(|| word.width as f32 / len as f32)
        })
        .collect();

    if samples.is_empty() {
        return None;
    }
    let mean = samples.iter().sum::<f32>() / samples.len() as f32;
    (mean > 0.0).then_some(mean)
}

fn render_block(words: &[&Word]) -> String {
    let char_w = char_width(words);

    let mut text = String::new();
    let (mut prev_par, mut prev_line, mut prev_left) = (0u32, 0u32, 0usize);

    for word in words {
        if word.paragraph != prev_par {
            text.push('\n');
            prev_par = word.paragraph;
            prev_line = word.line;
            prev_left = 0;
        } else if word.line != prev_line {
            text.push('\n');
            prev_line = word.line;
            prev_left = 0;
        }

        let mut added = 0;
        if let Some(char_w) = char_w {
            let column = word.left as f32 / char_w;
            if column > (prev_left + 1) as f32 {
                added = column as usize - prev_left;
                text.push_str(&" ".repeat(added));
            }
        }

        text.push_str(&word.text);
        text.push(' ');
        prev_left += word.text.chars().count() + added + 1;
    }

    text.push('\n');
    text
}

/// Rebuild text from positioned words, approximating horizontal spacing
/// with runs of spaces. Blocks are emitted top to bottom.
pub fn reconstruct_layout(words: &[Word]) -> String {
    let mut blocks: Vec<(u32, u32, Vec<&Word>)> = Vec::new();
    for word in words {
        match blocks.iter_mut().find(|(block, _, _)| *block == word.block) {
            Some((_, _, members)) => members.push(word),
            None => blocks.push((word.block, word.top, vec![word])),
        }
    }
    blocks.sort_by_key(|(block, top, _)| (*top, *block));

    let raw: String = blocks
        .iter()
        .map(|(_, _, members)| render_block(members))
        .collect();

    raw.trim_start_matches('\n')
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn row(block: u32, par: u32, line: u32, left: u32, top: u32, width: u32, text: &str) -> String {
        format!("5\t1\t{block}\t{par}\t{line}\t1\t{left}\t{top}\t{width}\t20\t91.5\t{text}")
    }

    fn tsv(rows: &[String]) -> String {
        let mut out = vec![
            HEADER.to_string(),
            "1\t1\t0\t0\t0\t0\t0\t0\t640\t480\t-1\t".to_string(),
            "2\t1\t1\t0\t0\t0\t0\t0\t600\t100\t-1\t".to_string(),
        ];
        out.extend_from_slice(rows);
        out.join("\n")
    }

    #[test]
    fn test_parse_drops_structural_and_blank_rows() {
        let input = tsv(&[
            row(1, 1, 1, 0, 10, 50, "Hello"),
            "5\t1\t1\t1\t1\t2\t60\t10\t5\t20\t95\t ".to_string(),
            "garbage".to_string(),
        ]);
        let words = parse_tsv(&input);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].text, "Hello");
        assert_eq!(words[0].confidence, 91.5);
    }

    #[test]
    fn test_spacing_follows_character_width() {
        let words = parse_tsv(&tsv(&[
            row(1, 1, 1, 0, 10, 50, "Hello"),
            row(1, 1, 1, 100, 10, 50, "World"),
            row(1, 1, 2, 20, 40, 30, "Foo"),
        ]));
        assert_eq!(reconstruct_layout(&words), "Hello     World\n  Foo");
    }

    #[test]
    fn test_new_paragraph_starts_new_line() {
        let words = parse_tsv(&tsv(&[
            row(1, 1, 1, 0, 10, 40, "abcd"),
            row(1, 2, 1, 0, 40, 40, "efgh"),
        ]));
        assert_eq!(reconstruct_layout(&words), "abcd\nefgh");
    }

    #[test]
    fn test_block_without_long_words_gets_no_gap_spacing() {
        let words = parse_tsv(&tsv(&[
            row(1, 1, 1, 0, 10, 20, "a"),
            row(1, 1, 1, 300, 10, 20, "b"),
        ]));
        assert_eq!(reconstruct_layout(&words), "a b");
    }

    #[test]
    fn test_all_blocks_emitted_top_to_bottom() {
        let words = parse_tsv(&tsv(&[
            row(1, 1, 1, 0, 200, 40, "lower"),
            row(2, 1, 1, 0, 10, 40, "upper"),
        ]));
        let text = reconstruct_layout(&words);
        assert_eq!(text, "upper\n\nlower");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(reconstruct_layout(&parse_tsv("")), "");
        assert_eq!(reconstruct_layout(&parse_tsv(HEADER)), "");
    }
}
