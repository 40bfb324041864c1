use super::term::pair_key;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("potential table '{path}' for {identity} does not exist", path = path.display())]
    MissingTable { identity: String, path: PathBuf },

    #[error("file I/O error for '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed table row in '{path}' (line {line}): expected {expected} numeric columns", path = path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        expected: usize,
    },

    #[error("all {kind} potential tables must have the same length")]
    MismatchedLengths { kind: &'static str },
}

/// A tabulated pair potential sampled on `[r_min, r_cut]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PairTable {
    pub types: (String, String),
    pub r_min: f64,
    pub r_cut: f64,
    pub energy: Vec<f64>,
    pub force: Vec<f64>,
}

/// A tabulated bond potential sampled on `[r_min, r_max]`.
#[derive(Debug, Clone, PartialEq)]
pub struct BondTable {
    pub kind: String,
    pub r_min: f64,
    pub r_max: f64,
    pub energy: Vec<f64>,
    pub force: Vec<f64>,
}

/// A tabulated angle potential sampled uniformly on `[0, pi]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleTable {
    pub kind: String,
    pub energy: Vec<f64>,
    pub torque: Vec<f64>,
}

/// The full set of coarse-grained table potentials for a system.
///
/// Loaded from a potentials directory holding one whitespace-column text file
/// per interaction: `<a>-<b>.txt` for the sorted type pair, `<kind>_bond.txt`,
/// and `<kind>_angle.txt`. The engine consumes these verbatim; bond and angle
/// tables are required to share a common width per kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TabulatedForcefield {
    pub pairs: Vec<PairTable>,
    pub bonds: Vec<BondTable>,
    pub angles: Vec<AngleTable>,
}

impl TabulatedForcefield {
    /// Loads every pair, bond, and angle table the system needs from `dir`.
    ///
    /// Pair tables are looked up once per unordered combination of
    /// `particle_types` (with replacement).
    ///
    /// # Errors
    ///
    /// [`TableError::MissingTable`] naming the absent file, [`TableError::Parse`]
    /// for malformed rows, and [`TableError::MismatchedLengths`] when bond or
    /// angle tables disagree on sample count.
    pub fn load(
        dir: &Path,
        particle_types: &[String],
        bond_types: &[String],
        angle_types: &[String],
    ) -> Result<Self, TableError> {
        let mut pairs = Vec::new();
        for (i, a) in particle_types.iter().enumerate() {
            for b in &particle_types[i..] {
                let key = pair_key(a, b);
                let path = dir.join(format!("{}-{}.txt", key.0, key.1));
                let rows = read_table(&path, 3, &format!("pair {}-{}", key.0, key.1))?;
                pairs.push(PairTable {
                    types: key,
                    r_min: rows.first().map(|r| r[0]).unwrap_or(0.0),
                    r_cut: rows.last().map(|r| r[0]).unwrap_or(0.0),
                    energy: rows.iter().map(|r| r[1]).collect(),
                    force: rows.iter().map(|r| r[2]).collect(),
                });
            }
        }

        let mut bonds = Vec::new();
        for kind in bond_types {
            let path = dir.join(format!("{}_bond.txt", kind));
            let rows = read_table(&path, 3, &format!("bond {}", kind))?;
            bonds.push(BondTable {
                kind: kind.clone(),
                r_min: rows.first().map(|r| r[0]).unwrap_or(0.0),
                r_max: rows.last().map(|r| r[0]).unwrap_or(0.0),
                energy: rows.iter().map(|r| r[1]).collect(),
                force: rows.iter().map(|r| r[2]).collect(),
            });
        }
        if !bonds.iter().all(|b| b.energy.len() == bonds[0].energy.len()) {
            return Err(TableError::MismatchedLengths { kind: "bond" });
        }

        let mut angles = Vec::new();
        for kind in angle_types {
            let path = dir.join(format!("{}_angle.txt", kind));
            let rows = read_table(&path, 3, &format!("angle {}", kind))?;
            angles.push(AngleTable {
                kind: kind.clone(),
                energy: rows.iter().map(|r| r[1]).collect(),
                torque: rows.iter().map(|r| r[2]).collect(),
            });
        }
        if !angles
            .iter()
            .all(|a| a.energy.len() == angles[0].energy.len())
        {
            return Err(TableError::MismatchedLengths { kind: "angle" });
        }

        info!(
            pairs = pairs.len(),
            bonds = bonds.len(),
            angles = angles.len(),
            dir = %dir.display(),
            "loaded tabulated potentials"
        );
        Ok(Self {
            pairs,
            bonds,
            angles,
        })
    }
}

/// Reads a whitespace-column numeric table, skipping blank and `#` lines.
fn read_table(path: &Path, columns: usize, identity: &str) -> Result<Vec<Vec<f64>>, TableError> {
    if !path.exists() {
        return Err(TableError::MissingTable {
            identity: identity.to_string(),
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|e| TableError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut rows = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row: Vec<f64> = line
            .split_whitespace()
            .map(|tok| tok.parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| TableError::Parse {
                path: path.to_path_buf(),
                line: lineno + 1,
                expected: columns,
            })?;
        if row.len() != columns {
            return Err(TableError::Parse {
                path: path.to_path_buf(),
                line: lineno + 1,
                expected: columns,
            });
        }
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_table(dir: &Path, name: &str, rows: &[[f64; 3]]) {
        let body: String = rows
            .iter()
            .map(|r| format!("{} {} {}\n", r[0], r[1], r[2]))
            .collect();
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn load_reads_pair_bond_and_angle_tables() {
        let dir = tempdir().unwrap();
        write_table(
            dir.path(),
            "A-A.txt",
            &[[0.5, 10.0, -3.0], [1.0, 2.0, -1.0], [2.5, 0.0, 0.0]],
        );
        write_table(
            dir.path(),
            "A-B.txt",
            &[[0.5, 8.0, -2.0], [2.0, 0.1, 0.0]],
        );
        write_table(
            dir.path(),
            "B-B.txt",
            &[[0.5, 5.0, -1.0], [2.0, 0.0, 0.0]],
        );
        write_table(
            dir.path(),
            "AA_bond.txt",
            &[[0.9, 4.0, -8.0], [1.1, 0.0, 0.0]],
        );
        write_table(
            dir.path(),
            "AAA_angle.txt",
            &[[0.0, 6.0, -2.0], [3.14, 0.0, 0.0]],
        );

        let types = vec!["A".to_string(), "B".to_string()];
        let ff = TabulatedForcefield::load(
            dir.path(),
            &types,
            &["AA".to_string()],
            &["AAA".to_string()],
        )
        .unwrap();

        assert_eq!(ff.pairs.len(), 3);
        let aa = &ff.pairs[0];
        assert_eq!(aa.types, ("A".to_string(), "A".to_string()));
        assert_eq!(aa.r_min, 0.5);
        assert_eq!(aa.r_cut, 2.5);
        assert_eq!(aa.energy, vec![10.0, 2.0, 0.0]);
        assert_eq!(aa.force, vec![-3.0, -1.0, 0.0]);

        assert_eq!(ff.bonds[0].r_min, 0.9);
        assert_eq!(ff.bonds[0].r_max, 1.1);
        assert_eq!(ff.angles[0].torque, vec![-2.0, 0.0]);
    }

    #[test]
    fn missing_pair_table_names_the_path() {
        let dir = tempdir().unwrap();
        let types = vec!["A".to_string()];
        let err = TabulatedForcefield::load(dir.path(), &types, &[], &[]).unwrap_err();
        match err {
            TableError::MissingTable { identity, path } => {
                assert_eq!(identity, "pair A-A");
                assert!(path.ends_with("A-A.txt"));
            }
            other => panic!("expected MissingTable, got {:?}", other),
        }
    }

    #[test]
    fn mismatched_bond_table_lengths_are_rejected() {
        let dir = tempdir().unwrap();
        write_table(
            dir.path(),
            "AA_bond.txt",
            &[[0.9, 4.0, -8.0], [1.1, 0.0, 0.0]],
        );
        write_table(dir.path(), "AB_bond.txt", &[[0.9, 4.0, -8.0]]);
        let err = TabulatedForcefield::load(
            dir.path(),
            &[],
            &["AA".to_string(), "AB".to_string()],
            &[],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TableError::MismatchedLengths { kind: "bond" }
        ));
    }

    #[test]
    fn malformed_rows_report_line_numbers() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("A-A.txt"), "0.5 1.0 2.0\noops 1.0\n").unwrap();
        let err =
            TabulatedForcefield::load(dir.path(), &["A".to_string()], &[], &[]).unwrap_err();
        match err {
            TableError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("expected Parse, got {:?}", other),
        }
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("A-A.txt"),
            "# r U F\n\n0.5 1.0 -1.0\n2.5 0.0 0.0\n",
        )
        .unwrap();
        let ff = TabulatedForcefield::load(dir.path(), &["A".to_string()], &[], &[]).unwrap();
        assert_eq!(ff.pairs[0].energy.len(), 2);
    }
}
