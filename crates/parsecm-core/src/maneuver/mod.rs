//! Maneuver summary files.
//!
//! Each maneuver section looks like this, with an OUTPUT DATA paragraph
//! further down:
//!
//! ```text
//!   INITIAL ID:  GG27700
//!                     INITIAL ATTITUDE
//!      START TIME (GMT):  2008:046:05:15:43.038
//!             RA (deg):    160.00000000
//!            DEC (deg):     37.00000000
//!           ROLL (deg):    152.30346378
//!        Dev. from
//!      Opt. Roll (deg):      0.59125433
//!      Sun Angle (deg):    153.65546454
//!    Quaternion:     -0.234681605818   -0.893582206471   -0.277032106484    0.263985977177
//!
//!   FINAL ID:    T_X7800
//!                       FINAL ATTITUDE
//!      STOP TIME (GMT):   2008:046:06:05:20.797
//!   ...
//! ```

pub mod blocks;
pub mod fields;

use crate::config::ManeuverConfig;
use crate::error::{ParseCmError, Result};
use crate::io::parse_file;
use crate::time::{ChandraTime, TimeConverter};
use crate::value::Value;
use blocks::{extract_blocks, split_maneuvers};
use fields::{attitude_fields, extract, output_fields};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttitudeRecord {
    /// `IN_IA` for intermediate attitudes that have no `ID:` line.
    pub obsid: Value,
    pub time: String,
    pub ra: Value,
    pub dec: Value,
    pub roll: Value,
    pub sun_angle: Value,
    pub quat_string: String,
    pub quat: [f64; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManeuverRecord {
    pub initial: AttitudeRecord,
    #[serde(rename = "final")]
    pub final_: AttitudeRecord,
    pub duration: Value,
    pub angle: Value,
    pub tstart: f64,
    pub tstop: f64,
}

impl AttitudeRecord {
    fn from_block(block: &str, text: &str, config: &ManeuverConfig) -> Result<Self> {
        let mut f = extract(block, text, attitude_fields(), &config.intermediate_obsid)?;
        let (quat_string, components) = f.vector("quat_string")?;
        let quat: [f64; 4] =
            components
                .try_into()
                .map_err(|v: Vec<f64>| ParseCmError::InvalidQuaternion {
                    block: block.to_string(),
                    value: format!("{} components", v.len()),
                })?;
        Ok(AttitudeRecord {
            obsid: f.scalar("obsid")?,
            time: f.text("time")?,
            ra: f.scalar("ra")?,
            dec: f.scalar("dec")?,
            roll: f.scalar("roll")?,
            sun_angle: f.scalar("sun_angle")?,
            quat_string,
            quat,
        })
    }
}

impl ManeuverRecord {
    fn from_section(
        section: &str,
        time: &impl TimeConverter,
        config: &ManeuverConfig,
    ) -> Result<Self> {
        let blocks = extract_blocks(section)?;
        let mut initial = AttitudeRecord::from_block("initial", blocks.initial, config)?;
        let final_ = AttitudeRecord::from_block("final", blocks.final_, config)?;

        let mut out = extract("output", blocks.output, output_fields(), "")?;
        let duration = out.scalar("duration")?;
        let angle = out.scalar("angle")?;

        // Shift the start so it lines up with AOMANUVR in the backstop.
        let tstart = time.date_to_secs(&initial.time)? + config.tstart_offset_secs;
        let tstop = time.date_to_secs(&final_.time)?;
        initial.time = time.secs_to_date(tstart)?;

        Ok(ManeuverRecord {
            initial,
            final_,
            duration,
            angle,
            tstart,
            tstop,
        })
    }
}

// ---------------------------------------------------------------------------
// Readers
// ---------------------------------------------------------------------------

pub fn parse_maneuvers(
    text: &str,
    time: &impl TimeConverter,
    config: &ManeuverConfig,
) -> Result<Vec<ManeuverRecord>> {
    // Section and paragraph markers are matched on bare `\n`.
    let text = text.replace("\r\n", "\n");
    split_maneuvers(&text)
        .into_iter()
        .enumerate()
        .map(|(index, section)| {
            ManeuverRecord::from_section(section, time, config).map_err(|e| {
                ParseCmError::InManeuver {
                    index,
                    source: Box::new(e),
                }
            })
        })
        .collect()
}

pub fn read_maneuvers(path: &Path) -> Result<Vec<ManeuverRecord>> {
    read_maneuvers_with(path, &ChandraTime, &ManeuverConfig::default())
}

pub fn read_maneuvers_with(
    path: &Path,
    time: &impl TimeConverter,
    config: &ManeuverConfig,
) -> Result<Vec<ManeuverRecord>> {
    let manvrs = parse_file(path, |text| parse_maneuvers(text, time, config))?;
    tracing::debug!(path = %path.display(), maneuvers = manvrs.len(), "read maneuver summary");
    Ok(manvrs)
}
