/// Column alignment inside a code-block table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// A simple text-based table for Discord messages using code blocks
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    col_widths: Vec<usize>,
    align: Vec<Align>,
}

impl Table {
    /// Create a new table; every column starts left-aligned
    pub fn new(headers: Vec<&str>) -> Self {
        Table {
            col_widths: headers.iter().map(|h| h.chars().count()).collect(),
            align: vec![Align::Left; headers.len()],
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Right-align every column except the first (label) column
    pub fn numeric(mut self) -> Self {
        for (i, a) in self.align.iter_mut().enumerate() {
            *a = if i == 0 { Align::Left } else { Align::Right };
        }
        self
    }

    /// Add a row; cells beyond the header count are ignored
    pub fn add_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cells: Vec<String> = row.into_iter().map(Into::into).take(self.headers.len()).collect();
        cells.resize(self.headers.len(), String::new());

        for (width, cell) in self.col_widths.iter_mut().zip(&cells) {
            *width = (*width).max(cell.chars().count());
        }

        self.rows.push(cells);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the table wrapped in a code block
    pub fn render(&self) -> String {
        let mut output = String::from("```\n");
        output.push_str(&self.render_row(&self.headers));
        output.push('\n');
        output.push_str(&self.render_separator());
        output.push('\n');
        for row in &self.rows {
            output.push_str(&self.render_row(row));
            output.push('\n');
        }
        output.push_str("```");
        output
    }

    fn render_row(&self, row: &[String]) -> String {
        row.iter()
            .zip(self.col_widths.iter().zip(&self.align))
            .map(|(cell, (&width, align))| match align {
                Align::Left => format!("{:<width$}", cell, width = width),
                Align::Right => format!("{:>width$}", cell, width = width),
            })
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    }

    fn render_separator(&self) -> String {
        self.col_widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("-+-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_table() {
        let mut table = Table::new(vec!["Side", "Entry", "TP"]).numeric();
        table.add_row(["Buy", "2012.00", "2040.00"]);
        table.add_row(vec!["Sell".to_string(), "2012.00".to_string(), "2000.00".to_string()]);

        let rendered = table.render();
        assert!(rendered.starts_with("```\n") && rendered.ends_with("```"));
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[1], "Side |   Entry |      TP");
        assert_eq!(lines[2], "-----+---------+--------");
        assert_eq!(lines[3], "Buy  | 2012.00 | 2040.00");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let mut table = Table::new(vec!["A", "B"]);
        table.add_row(["only"]);
        assert!(table.render().contains("only |"));
    }
}
