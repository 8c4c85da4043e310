/// Line/column lookup using pre-calculated line offsets.
pub(crate) struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub(crate) fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self { line_starts }
    }

    /// Returns `(line, column)`, line 1-based and column 0-based in chars.
    pub(crate) fn line_column(&self, offset: u32, source: &str) -> (u32, u32) {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(0) => 0,
            Err(idx) => idx - 1,
        };

        let line_start = self.line_starts[line_idx] as usize;
        let line = (line_idx + 1) as u32;

        let column = source
            .get(line_start..offset as usize)
            .map_or(0, |prefix| prefix.chars().count() as u32);

        (line, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line() {
        let source = "require('a');";
        let index = LineIndex::new(source);
        assert_eq!(index.line_column(0, source), (1, 0));
        assert_eq!(index.line_column(8, source), (1, 8));
    }

    #[test]
    fn test_later_lines_and_multibyte_columns() {
        let source = "var a;\n// é\nrequire('b');";
        let index = LineIndex::new(source);
        let offset = source.find("require").unwrap() as u32;
        assert_eq!(index.line_column(offset, source), (3, 0));

        let after_accent = (source.find('é').unwrap() + 'é'.len_utf8()) as u32;
        assert_eq!(index.line_column(after_accent, source), (2, 4));
    }

    #[test]
    fn test_offset_past_end_clamps_column() {
        let source = "x";
        let index = LineIndex::new(source);
        assert_eq!(index.line_column(40, source), (1, 0));
    }
}
