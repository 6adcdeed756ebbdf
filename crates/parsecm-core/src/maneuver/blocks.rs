use crate::error::{ParseCmError, Result};

const SECTION_HEADER: &str = "MANEUVER DATA SUMMARY\n";
const PARAGRAPH_BREAK: &str = "\n\n";

/// The three paragraphs of one maneuver section that carry data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManeuverBlocks<'a> {
    pub initial: &'a str,
    pub final_: &'a str,
    pub output: &'a str,
}

/// Split a maneuver summary into per-maneuver sections, dropping preambles
/// that mention neither an initial nor a final attitude.
pub fn split_maneuvers(text: &str) -> Vec<&str> {
    text.split(SECTION_HEADER)
        .filter(|s| s.contains("INITIAL") || s.contains("FINAL"))
        .collect()
}

/// Pick out the attitude and output paragraphs of one section.
pub fn extract_blocks(section: &str) -> Result<ManeuverBlocks<'_>> {
    let paras: Vec<&str> = section.split(PARAGRAPH_BREAK).collect();

    let attitudes: Vec<&str> = paras
        .iter()
        .copied()
        .filter(|p| p.contains("ATTITUDE"))
        .collect();
    let [initial, final_] = attitudes[..] else {
        return Err(if attitudes.len() > 2 {
            ParseCmError::TooManyAttitudeBlocks {
                found: attitudes.len(),
            }
        } else {
            ParseCmError::MissingAttitudeBlock {
                found: attitudes.len(),
            }
        });
    };

    let output = paras
        .iter()
        .copied()
        .find(|p| p.contains("OUTPUT DATA"))
        .ok_or(ParseCmError::MissingOutputBlock)?;

    Ok(ManeuverBlocks {
        initial,
        final_,
        output,
    })
}
