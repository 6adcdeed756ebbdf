use crate::config::AlignmentConfig;
use crate::error::{ParseCmError, Result};
use crate::io::parse_file;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

pub type Matrix3 = [[f64; 3]; 3];

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Detector {
    #[serde(rename = "ACIS-I")]
    AcisI,
    #[serde(rename = "ACIS-S")]
    AcisS,
    #[serde(rename = "HRC-I")]
    HrcI,
    #[serde(rename = "HRC-S")]
    HrcS,
}

impl Detector {
    /// Order in which the matrices appear in the assignment.
    pub fn all() -> &'static [Detector] {
        &[
            Detector::AcisI,
            Detector::AcisS,
            Detector::HrcI,
            Detector::HrcS,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Detector::AcisI => "ACIS-I",
            Detector::AcisS => "ACIS-S",
            Detector::HrcI => "HRC-I",
            Detector::HrcS => "HRC-S",
        }
    }
}

impl fmt::Display for Detector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Detector {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Detector::all()
            .iter()
            .copied()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("unknown detector '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// AlignmentTable
// ---------------------------------------------------------------------------

/// Science instrument alignment matrices, one per detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentTable {
    pub matrices: BTreeMap<Detector, Matrix3>,
}

impl AlignmentTable {
    pub fn get(&self, detector: Detector) -> Option<&Matrix3> {
        self.matrices.get(&detector)
    }
}

const ROWS: usize = 12;

static ROW_RE: OnceLock<Regex> = OnceLock::new();

fn row_re() -> &'static Regex {
    ROW_RE.get_or_init(|| {
        let num = r"([-+]?(?:\d+\.?\d*|\.\d+)(?:[EeDd][-+]?\d+)?)";
        Regex::new(&format!(r"{num}\s*,\s*{num}\s*,\s*{num}")).expect("row pattern is valid")
    })
}

fn parse_row(line: &str, lineno: usize) -> Result<[f64; 3]> {
    let bad = || ParseCmError::MalformedAlignmentRow { line: lineno };
    let caps = row_re().captures(line).ok_or_else(bad)?;
    let mut row = [0.0; 3];
    for (i, slot) in row.iter_mut().enumerate() {
        // Fortran writes double precision exponents with D.
        let token = caps[i + 1].replace(['D', 'd'], "E");
        *slot = token.parse().map_err(|_| bad())?;
    }
    Ok(row)
}

/// Read the alignment matrices from the text of a characteristics file.
///
/// The assignment line must be unique and is followed, with no blank lines,
/// by the rest of its twelve rows; the first row sits on the assignment line.
pub fn parse_alignment_table(text: &str, config: &AlignmentConfig) -> Result<AlignmentTable> {
    let start_re = Regex::new(&format!(r"^\s*{}\s*=", regex::escape(&config.variable)))
        .expect("escaped variable name is a valid pattern");
    let lines: Vec<&str> = text.lines().collect();
    let starts: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| start_re.is_match(l))
        .map(|(i, _)| i)
        .collect();

    let [start] = starts[..] else {
        return Err(ParseCmError::AlignmentAssignmentNotUnique {
            variable: config.variable.clone(),
            count: starts.len(),
        });
    };

    let run = lines.get(start..start + ROWS).ok_or_else(|| {
        ParseCmError::TruncatedAlignmentTable {
            variable: config.variable.clone(),
            available: lines.len() - start,
        }
    })?;
    let rows = run
        .iter()
        .enumerate()
        .map(|(i, line)| parse_row(line, start + i + 1))
        .collect::<Result<Vec<_>>>()?;

    let matrices = Detector::all()
        .iter()
        .zip(rows.chunks_exact(3))
        .map(|(&det, chunk)| (det, [chunk[0], chunk[1], chunk[2]]))
        .collect();
    Ok(AlignmentTable { matrices })
}

pub fn read_alignment_table(path: &Path) -> Result<AlignmentTable> {
    read_alignment_table_with(path, &AlignmentConfig::default())
}

pub fn read_alignment_table_with(path: &Path, config: &AlignmentConfig) -> Result<AlignmentTable> {
    let table = parse_file(path, |text| parse_alignment_table(text, config))?;
    tracing::debug!(path = %path.display(), variable = %config.variable, "read alignment table");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_text() -> String {
        let mut text = String::from("C  Characteristics\n      ODB_FOO = 1.0, 2.0, 3.0,\n");
        for i in 0..ROWS {
            let prefix = if i == 0 { "      ODB_SI_ALIGN   = " } else { "                       " };
            let base = (i * 3) as f64;
            text.push_str(&format!(
                "{prefix}{:.6E}, {:.6E}, {:.6E},\n",
                base,
                base + 1.0,
                -(base + 2.0)
            ));
        }
        text.push_str("      ODB_NEXT = 0\n");
        text
    }

    #[test]
    fn reads_four_matrices_in_row_order() {
        let table = parse_alignment_table(&table_text(), &AlignmentConfig::default()).unwrap();
        assert_eq!(table.matrices.len(), 4);
        let acis_i = table.get(Detector::AcisI).unwrap();
        assert_eq!(acis_i[0], [0.0, 1.0, -2.0]);
        assert_eq!(acis_i[2], [6.0, 7.0, -8.0]);
        let hrc_s = table.get(Detector::HrcS).unwrap();
        assert_eq!(hrc_s[2], [33.0, 34.0, -35.0]);
    }

    #[test]
    fn zero_matches() {
        let text = "ODB_OTHER = 1, 2, 3\n";
        let err = parse_alignment_table(text, &AlignmentConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ParseCmError::AlignmentAssignmentNotUnique { count: 0, .. }
        ));
    }

    #[test]
    fn two_matches() {
        let text = format!("{}{}", table_text(), table_text());
        let err = parse_alignment_table(&text, &AlignmentConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ParseCmError::AlignmentAssignmentNotUnique { count: 2, .. }
        ));
        assert!(err.to_string().contains("found 2"));
    }

    #[test]
    fn similar_names_do_not_match() {
        let text = format!("      ODB_SI_ALIGN_OLD = 1.0, 0.0, 0.0,\n{}", table_text());
        assert!(parse_alignment_table(&text, &AlignmentConfig::default()).is_ok());
    }

    #[test]
    fn truncated_run() {
        let text = "ODB_SI_ALIGN = 1.0, 0.0, 0.0,\n 0.0, 1.0, 0.0,\n";
        assert!(matches!(
            parse_alignment_table(text, &AlignmentConfig::default()),
            Err(ParseCmError::TruncatedAlignmentTable { available: 2, .. })
        ));
    }

    #[test]
    fn blank_line_inside_run_is_malformed() {
        let text = table_text().replacen("E0,\n ", "E0,\n\n ", 1);
        let err = parse_alignment_table(&text, &AlignmentConfig::default()).unwrap_err();
        assert!(matches!(err, ParseCmError::MalformedAlignmentRow { line: 4 }));
    }

    #[test]
    fn fortran_exponents() {
        assert_eq!(
            parse_row("  9.99D-01, -3.6907D-04, 7.0469e-05,", 1).unwrap(),
            [0.999, -3.6907e-4, 7.0469e-5]
        );
    }

    #[test]
    fn configurable_variable() {
        let text = table_text().replace("ODB_SI_ALIGN", "ODB_SI_ALIGN_NEW");
        let config = AlignmentConfig {
            variable: "ODB_SI_ALIGN_NEW".to_string(),
        };
        assert!(parse_alignment_table(&text, &config).is_ok());
    }

    #[test]
    fn detector_names() {
        assert_eq!(Detector::HrcI.to_string(), "HRC-I");
        assert_eq!("ACIS-S".parse::<Detector>().unwrap(), Detector::AcisS);
        assert!("ACIS".parse::<Detector>().is_err());
        let json = serde_json::to_string(&Detector::AcisI).unwrap();
        assert_eq!(json, r#""ACIS-I""#);
    }
}
