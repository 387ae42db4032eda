/// A loosely-typed table exactly as read from a CSV export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Column names from the header row, trimmed.
    pub headers: Vec<String>,
    /// Each data row as a Vec of Strings (one per field). Short rows are
    /// allowed; missing trailing cells read as empty.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let headers = headers.into_iter().map(|h| h.trim().to_string()).collect();
        Self { headers, rows }
    }

    /// Convenience constructor for literal tables.
    pub fn from_rows(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Position of `name` in the header row, exact match.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at (`row`, `col`), or `""` when the row is short.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Iterate one column's cells in row order.
    pub fn column_cells(&self, col: usize) -> impl Iterator<Item = &str> + '_ {
        (0..self.rows.len()).map(move |r| self.cell(r, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_rows_read_as_empty() {
        let t = RawTable::from_rows(&[" date ", "member_casual"], &[&["2022-01-01"]]);
        assert_eq!(t.headers, vec!["date", "member_casual"]);
        assert_eq!(t.column_index("member_casual"), Some(1));
        assert_eq!(t.cell(0, 0), "2022-01-01");
        assert_eq!(t.cell(0, 1), "");
        assert_eq!(t.cell(5, 0), "");
    }
}
