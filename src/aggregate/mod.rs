// src/aggregate/mod.rs

pub mod codes;

use crate::error::ScrapeError;
use std::collections::BTreeSet;
use std::path::Path;

/// Per-country compatibility ratings, collected while the batch runs and
/// written out once at the end. Rows keep insertion order (the site's
/// navigation order); rating columns are the sorted set of distinct labels.
#[derive(Debug, Default)]
pub struct CompatibilityTable {
    rows: Vec<(String, String)>,
}

impl CompatibilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one country's rating. Exactly one rating per country; callers
    /// only insert once per short name.
    pub fn insert(&mut self, short_name: impl Into<String>, rating: impl Into<String>) {
        self.rows.push((short_name.into(), rating.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Distinct rating labels across all rows, sorted, one one-hot column
    /// each.
    fn score_labels(&self) -> Vec<&str> {
        self.rows
            .iter()
            .map(|(_, rating)| rating.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Write the aggregate table: a leading index column, `short_name`, one
    /// `score_<label>` column per distinct rating, and `isoab3` with the
    /// resolved country code or the explicit unresolved marker.
    pub fn write_csv(&self, path: &Path) -> Result<(), ScrapeError> {
        let labels = self.score_labels();
        let mut writer = csv::Writer::from_path(path)?;

        let mut header = vec![String::new(), "short_name".to_string()];
        header.extend(labels.iter().map(|l| format!("score_{}", l)));
        header.push("isoab3".to_string());
        writer.write_record(&header)?;

        for (index, (short_name, rating)) in self.rows.iter().enumerate() {
            let mut record = vec![index.to_string(), short_name.clone()];
            for label in &labels {
                record.push(if rating == label { "1" } else { "0" }.to_string());
            }
            record.push(codes::resolve(short_name));
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_to_string(table: &CompatibilityTable) -> String {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("country_compatibilities.csv");
        table.write_csv(&path).unwrap();
        fs::read_to_string(&path).unwrap()
    }

    #[test]
    fn writes_one_hot_columns() {
        let mut table = CompatibilityTable::new();
        table.insert("albania", "Compliant");
        table.insert("chad", "Partial");

        let out = write_to_string(&table);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], ",short_name,score_Compliant,score_Partial,isoab3");
        assert_eq!(lines[1], "0,albania,1,0,ALB");
        assert_eq!(lines[2], "1,chad,0,1,TCD");
    }

    #[test]
    fn each_row_has_exactly_one_score_set() {
        let mut table = CompatibilityTable::new();
        table.insert("albania", "Compliant");
        table.insert("belgium", "Compliant");
        table.insert("chad", "Partial");
        table.insert("fiji", "Not compliant");

        let out = write_to_string(&table);
        for line in out.lines().skip(1) {
            let fields: Vec<&str> = line.split(',').collect();
            let scores = &fields[2..fields.len() - 1];
            let ones = scores.iter().filter(|s| **s == "1").count();
            assert_eq!(ones, 1, "row {:?} must set exactly one score", line);
        }
    }

    #[test]
    fn unresolved_names_are_marked_not_blank() {
        let mut table = CompatibilityTable::new();
        table.insert("atlantis", "Compliant");

        let out = write_to_string(&table);
        assert!(out.lines().nth(1).unwrap().ends_with(codes::UNRESOLVED));
    }

    #[test]
    fn kosovo_override_lands_in_the_table() {
        let mut table = CompatibilityTable::new();
        table.insert("kosovo", "Partial");

        let out = write_to_string(&table);
        assert!(out.lines().nth(1).unwrap().ends_with("XKX"));
    }
}
