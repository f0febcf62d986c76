//! Drill list rendering
//!
//! Flattens the word catalog into display rows and tracks which pair the
//! cursor sits on. The same catalog always flattens to the same rows, and
//! rendering is plain string building, so tests assert on it directly.

use crate::words::WordCatalog;

/// One display row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Category(String),
    Subcategory(String),
    Contrast(String),
    Pair { word1: String, word2: String },
    Notice(String),
}

/// The flattened drill list plus cursor
pub struct DrillView {
    rows: Vec<Row>,

    /// Indexes of the Pair rows; the cursor moves over these only
    pair_rows: Vec<usize>,
    cursor: usize,
}

impl DrillView {
    /// Flatten a catalog into rows.
    ///
    /// A catalog with nothing to drill yields a single notice row and no
    /// playable rows at all.
    pub fn build(catalog: &WordCatalog) -> Self {
        let mut rows = Vec::new();

        for category in &catalog.categories {
            rows.push(Row::Category(category.category.clone()));
            for (name, contrasts) in category.groups() {
                if !name.is_empty() {
                    rows.push(Row::Subcategory(name.to_string()));
                }
                for contrast in contrasts {
                    rows.push(Row::Contrast(contrast.description.clone()));
                    for pair in &contrast.pairs {
                        rows.push(Row::Pair {
                            word1: pair[0].clone(),
                            word2: pair[1].clone(),
                        });
                    }
                }
            }
        }

        let pair_rows: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| matches!(row, Row::Pair { .. }))
            .map(|(i, _)| i)
            .collect();

        if pair_rows.is_empty() {
            return Self::notice("No word data loaded. Load a valid JSON catalog.");
        }

        Self {
            rows,
            pair_rows,
            cursor: 0,
        }
    }

    /// A view carrying only an error/empty notice
    pub fn notice(message: &str) -> Self {
        Self {
            rows: vec![Row::Notice(message.to_string())],
            pair_rows: Vec::new(),
            cursor: 0,
        }
    }

    /// The pair under the cursor, if any pair exists
    pub fn selected_pair(&self) -> Option<(&str, &str)> {
        let index = *self.pair_rows.get(self.cursor)?;
        match &self.rows[index] {
            Row::Pair { word1, word2 } => Some((word1.as_str(), word2.as_str())),
            _ => None,
        }
    }

    pub fn next(&mut self) {
        if self.cursor + 1 < self.pair_rows.len() {
            self.cursor += 1;
        }
    }

    pub fn prev(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn pair_count(&self) -> usize {
        self.pair_rows.len()
    }

    /// Render the body rows, cursor marked with `>`
    pub fn render(&self) -> Vec<String> {
        let selected_row = self.pair_rows.get(self.cursor).copied();
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| match row {
                Row::Category(name) => name.clone(),
                Row::Subcategory(name) => format!("  {}", name),
                Row::Contrast(description) => format!("    Contrast: {}", description),
                Row::Pair { word1, word2 } => {
                    let marker = if Some(i) == selected_row { '>' } else { ' ' };
                    format!("    {} {} | {}", marker, word1, word2)
                }
                Row::Notice(message) => message.clone(),
            })
            .collect()
    }
}
