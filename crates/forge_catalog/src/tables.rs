//! # Base Chance Tables
//!
//! One table per mechanic, indexed by (zero grade, target level). Tables are
//! checked for completeness when built, so a lookup for any level inside the
//! mechanic's range cannot miss.

use crate::definitions::Mechanic;
use crate::error::{CatalogError, CatalogResult};
use crate::grade::ZERO_GRADES;

/// Base success probability per zero grade and target level.
#[derive(Clone, Debug, PartialEq)]
pub struct BaseChanceTable {
    mechanic: Mechanic,
    /// `rows[zero_grade][target_level - 1]`.
    rows: [Vec<f64>; ZERO_GRADES],
}

impl BaseChanceTable {
    /// Builds a table from one row per zero grade.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidConfig`] unless there are exactly three
    /// rows, each covering every target level of the mechanic, with every
    /// probability in `(0, 1]`.
    pub fn new(mechanic: Mechanic, rows: Vec<Vec<f64>>) -> CatalogResult<Self> {
        let row_count = rows.len();
        let rows: [Vec<f64>; ZERO_GRADES] = rows.try_into().map_err(|_| {
            CatalogError::InvalidConfig(format!(
                "{mechanic} chance table needs {ZERO_GRADES} rows, got {row_count}"
            ))
        })?;

        let levels = mechanic.table_levels();
        for (zero_grade, row) in rows.iter().enumerate() {
            if row.len() != levels {
                return Err(CatalogError::InvalidConfig(format!(
                    "{mechanic} chance row {zero_grade} needs {levels} levels, got {}",
                    row.len()
                )));
            }
            if let Some(bad) = row.iter().find(|p| !(**p > 0.0 && **p <= 1.0)) {
                return Err(CatalogError::InvalidConfig(format!(
                    "{mechanic} chance row {zero_grade} has probability {bad} outside (0, 1]"
                )));
            }
        }

        Ok(Self { mechanic, rows })
    }

    /// Mechanic this table belongs to.
    #[inline]
    #[must_use]
    pub const fn mechanic(&self) -> Mechanic {
        self.mechanic
    }

    /// Highest target level covered.
    #[inline]
    #[must_use]
    pub fn max_level(&self) -> u32 {
        // Row lengths are fixed by the mechanic, at most 12.
        self.mechanic.table_levels() as u32
    }

    /// Base probability of reaching `level` for an item of `zero_grade`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingChance`] when the grade or level lies
    /// outside the table.
    pub fn chance(&self, zero_grade: u8, level: u32) -> CatalogResult<f64> {
        let missing = || CatalogError::MissingChance {
            mechanic: self.mechanic,
            zero_grade,
            level,
        };
        let row = self.rows.get(usize::from(zero_grade)).ok_or_else(missing)?;
        let index = usize::try_from(level)
            .ok()
            .and_then(|level| level.checked_sub(1))
            .ok_or_else(missing)?;
        row.get(index).copied().ok_or_else(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compound_rows() -> Vec<Vec<f64>> {
        vec![
            vec![0.99, 0.75, 0.4, 0.25, 0.2, 0.1, 0.08, 0.05, 0.05, 0.05],
            vec![0.9, 0.7, 0.4, 0.2, 0.15, 0.08, 0.05, 0.05, 0.05, 0.03],
            vec![0.8, 0.6, 0.32, 0.16, 0.1, 0.05, 0.03, 0.03, 0.03, 0.02],
        ]
    }

    #[test]
    fn test_lookup_is_one_based() {
        let table = BaseChanceTable::new(Mechanic::Compound, compound_rows()).unwrap();
        assert!((table.chance(0, 1).unwrap() - 0.99).abs() < f64::EPSILON);
        assert!((table.chance(2, 10).unwrap() - 0.02).abs() < f64::EPSILON);
        assert_eq!(table.max_level(), 10);
    }

    #[test]
    fn test_lookup_outside_table_is_missing() {
        let table = BaseChanceTable::new(Mechanic::Compound, compound_rows()).unwrap();
        assert!(matches!(
            table.chance(0, 0),
            Err(CatalogError::MissingChance { level: 0, .. })
        ));
        assert!(matches!(
            table.chance(0, 11),
            Err(CatalogError::MissingChance { level: 11, .. })
        ));
        assert!(matches!(
            table.chance(3, 1),
            Err(CatalogError::MissingChance { zero_grade: 3, .. })
        ));
    }

    #[test]
    fn test_rejects_short_row() {
        let mut rows = compound_rows();
        rows[1].pop();
        let err = BaseChanceTable::new(Mechanic::Compound, rows).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_missing_row() {
        let mut rows = compound_rows();
        rows.pop();
        assert!(BaseChanceTable::new(Mechanic::Compound, rows).is_err());
    }

    #[test]
    fn test_rejects_impossible_probability() {
        let mut rows = compound_rows();
        rows[0][3] = 0.0;
        assert!(BaseChanceTable::new(Mechanic::Compound, rows.clone()).is_err());
        rows[0][3] = 1.5;
        assert!(BaseChanceTable::new(Mechanic::Compound, rows).is_err());
    }
}
