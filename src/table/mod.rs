//! Create and render the [Table] outputs.

use color_eyre::eyre::{eyre, Report, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fmt::Display;

/// A row-based table of generic data.
///
/// # Examples
///
/// ```
/// use carbfix::Table;
///
/// let mut table = Table::new();
/// table.headers = vec!["KO", "gene"];
/// table.add_row(vec!["K00855", "gene_1"])?;
///
/// assert_eq!(table.to_tsv(), "KO\tgene\nK00855\tgene_1\n");
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Table<T> {
    /// Names of the table columns.
    pub headers: Vec<T>,
    /// Rows of table values.
    pub rows: Vec<Vec<T>>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Table<T> {
    /// Create a new table with empty headers and rows.
    pub fn new() -> Self {
        Table { headers: Vec::new(), rows: Vec::new() }
    }

    /// Add a new row to the table.
    ///
    /// The row must have one value per header.
    ///
    /// ```
    /// use carbfix::Table;
    ///
    /// let mut table = Table::new();
    /// table.headers = vec!["1", "2", "3"];
    /// assert!(table.add_row(vec!["A", "B", "C"]).is_ok());
    /// assert!(table.add_row(vec!["D", "E"]).is_err());
    /// ```
    pub fn add_row(&mut self, row: Vec<T>) -> Result<(), Report> {
        let (new, ex) = (row.len(), self.headers.len());
        if new != ex {
            return Err(eyre!("New row size ({new}) does not match the table headers ({ex})."));
        }
        self.rows.push(row);
        Ok(())
    }
}

impl<T> Table<T>
where
    T: AsRef<str>,
{
    /// Get the column index (0-based) corresponding to the header.
    pub fn get_header_index(&self, header: &str) -> Result<usize, Report> {
        self.headers
            .iter()
            .position(|h| h.as_ref() == header)
            .ok_or_else(|| eyre!("Column '{header}' was not found in table."))
    }

    /// Return a vector of table values in a column.
    ///
    /// ```
    /// use carbfix::Table;
    ///
    /// let mut table = Table::new();
    /// table.headers = vec!["1", "2", "3"];
    /// table.add_row(vec!["A", "B", "C"])?;
    /// table.add_row(vec!["D", "E", "F"])?;
    ///
    /// assert_eq!(table.get_column("3")?, vec!["C", "F"]);
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    pub fn get_column(&self, header: &str) -> Result<Vec<&str>, Report> {
        let header_i = self.get_header_index(header)?;
        Ok(self.rows.iter().map(|row| row[header_i].as_ref()).collect())
    }
}

impl<T> Table<T>
where
    T: Display,
{
    /// Render as tab-separated text, headers first, one line per row.
    pub fn to_tsv(&self) -> String {
        std::iter::once(&self.headers)
            .chain(self.rows.iter())
            .map(|row| format!("{}\n", row.iter().join("\t")))
            .join("")
    }

    /// Convert table to markdown format.
    ///
    /// ```
    /// use carbfix::Table;
    ///
    /// let mut table = Table::new();
    /// table.headers = vec!["1", "2", "3"];
    /// table.add_row(vec!["A", "B", "C"])?;
    ///
    /// println!("{}", table.to_markdown());
    /// # Ok::<(), color_eyre::eyre::Report>(())
    /// ```
    /// | 1 | 2 | 3 |
    /// |---|---|---|
    /// | A | B | C |
    ///
    pub fn to_markdown(&self) -> String {
        // get the maximum width of each column, +2 to add space on either side
        let col_widths = self
            .headers
            .iter()
            .enumerate()
            .map(|(col_i, header)| {
                let header_width = header.to_string().len();
                self.rows
                    .iter()
                    .map(|row| row[col_i].to_string().len().max(header_width) + 2)
                    .max()
                    .unwrap_or(header_width + 2)
            })
            .collect_vec();

        let mut markdown = String::from("|");
        // frame in between headers and rows
        let mut header_frame = String::from("|");

        // Create the header line
        for (header, col_width) in self.headers.iter().zip(col_widths.iter()) {
            markdown.push_str(&format!("{:^width$}|", header.to_string(), width = col_width));
            header_frame.push_str(&format!("{}|", "-".repeat(*col_width)));
        }
        markdown.push('\n');
        markdown.push_str(&header_frame);
        markdown.push('\n');

        // Create the row lines
        for row in &self.rows {
            markdown.push('|');
            for (value, col_width) in row.iter().zip(col_widths.iter()) {
                markdown.push_str(&format!("{:^width$}|", value.to_string(), width = col_width));
            }
            markdown.push('\n');
        }

        markdown
    }
}
