/// Parsed vendor CSV: first line is the header, every lookup is best-effort.
/// Deliberately small; the files involved are invoices of a few hundred rows.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn parse(text: &str) -> Self {
        let mut lines = text.lines().filter(|line| !line.trim().is_empty());

        let headers = match lines.next() {
            Some(line) => split_line(line),
            None => return Self::default(),
        };
        let rows = lines.map(split_line).collect();

        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn column(&self, name: &str) -> Option<usize> {
        let needle = name.trim().to_lowercase();
        self.headers
            .iter()
            .position(|h| h.to_lowercase() == needle)
    }

    /// First row whose organization cell matches; when a plan column is
    /// given the plan cell must match too. Comparisons ignore case.
    pub fn find_row(
        &self,
        org_column: usize,
        organization: &str,
        plan_column: Option<usize>,
        plan: Option<&str>,
    ) -> Option<usize> {
        self.rows.iter().position(|row| {
            if !cell_matches(row, org_column, organization) {
                return false;
            }
            match (plan_column, plan) {
                (Some(col), Some(plan)) => cell_matches(row, col, plan),
                _ => true,
            }
        })
    }

    pub fn value(&self, row: usize, column: usize) -> Option<String> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .cloned()
    }
}

fn cell_matches(row: &[String], column: usize, expected: &str) -> bool {
    row.get(column)
        .map(|cell| cell.trim().eq_ignore_ascii_case(expected.trim()))
        .unwrap_or(false)
}

/// Comma split with quoted-cell support; doubled quotes inside a quoted cell
/// collapse to one.
fn split_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                cells.push(current.trim().to_string());
                current = String::new();
            }
            _ => current.push(c),
        }
    }
    cells.push(current.trim().to_string());

    cells
}
