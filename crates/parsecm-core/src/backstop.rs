use crate::error::{ParseCmError, Result};
use crate::io::parse_file;
use crate::params::{parse_params, ParamMapping};
use crate::time::{ChandraTime, TimeConverter};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// CommandRecord
// ---------------------------------------------------------------------------

/// One scheduled command from a backstop file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub date: String,
    /// CXC seconds for `date`.
    pub time: f64,
    pub cmd: String,
    pub vcdu: i64,
    pub params: ParamMapping,
    /// Parameter string exactly as it appeared in the file.
    pub paramstr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tlmsid: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msid: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scs: Option<Value>,
    /// Backstop file the command was read from; unset for in-memory text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl CommandRecord {
    fn from_line(line: &str, lineno: usize, time: &impl TimeConverter) -> Result<Self> {
        let malformed = |reason: String| ParseCmError::MalformedLine {
            line: lineno,
            reason,
        };

        let fields: Vec<&str> = line.split('|').map(str::trim).collect();
        let [date, vcdu, cmd, paramstr] = fields[..] else {
            return Err(malformed(format!(
                "expected 4 '|' separated fields, found {}",
                fields.len()
            )));
        };

        // The second token of the VCDU field is not used.
        let vcdu_token = vcdu
            .split_whitespace()
            .next()
            .ok_or_else(|| malformed("empty VCDU field".to_string()))?;
        let vcdu: i64 = vcdu_token
            .parse()
            .map_err(|_| malformed(format!("VCDU '{vcdu_token}' is not an integer")))?;

        let secs = time.date_to_secs(date).map_err(|e| malformed(e.to_string()))?;
        let params = parse_params(paramstr);

        Ok(CommandRecord {
            date: date.to_string(),
            time: secs,
            cmd: cmd.to_string(),
            vcdu,
            tlmsid: params.get("TLMSID").cloned(),
            msid: params.get("MSID").cloned(),
            step: params.get("STEP").cloned(),
            scs: params.get("SCS").cloned(),
            params,
            paramstr: paramstr.to_string(),
            file: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Readers
// ---------------------------------------------------------------------------

/// Parse backstop text into commands, in file order. Blank lines are skipped;
/// any other line that does not hold four `|` fields aborts the parse.
pub fn parse_backstop(text: &str, time: &impl TimeConverter) -> Result<Vec<CommandRecord>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| CommandRecord::from_line(line, i + 1, time))
        .collect()
}

pub fn read_backstop(path: &Path) -> Result<Vec<CommandRecord>> {
    read_backstop_with(path, &ChandraTime)
}

pub fn read_backstop_with(path: &Path, time: &impl TimeConverter) -> Result<Vec<CommandRecord>> {
    let mut cmds = parse_file(path, |text| parse_backstop(text, time))?;
    for cmd in &mut cmds {
        cmd.file = Some(path.to_path_buf());
    }
    tracing::debug!(path = %path.display(), commands = cmds.len(), "read backstop");
    Ok(cmds)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = "2009:033:12:00:00.000 | 12345 0 | COMMAND | TLMSID= AONMMODE , STEP=4";

    #[test]
    fn parses_documented_line() {
        let cmds = parse_backstop(LINE, &ChandraTime).unwrap();
        assert_eq!(cmds.len(), 1);
        let c = &cmds[0];
        assert_eq!(c.date, "2009:033:12:00:00.000");
        assert_eq!(c.vcdu, 12345);
        assert_eq!(c.cmd, "COMMAND");
        assert_eq!(c.paramstr, "TLMSID= AONMMODE , STEP=4");
        assert_eq!(c.params["TLMSID"], Value::from("AONMMODE"));
        assert_eq!(c.params["STEP"], Value::Int(4));
        assert_eq!(c.tlmsid, Some(Value::from("AONMMODE")));
        assert_eq!(c.step, Some(Value::Int(4)));
        assert_eq!(c.msid, None);
        assert_eq!(c.scs, None);
        assert_eq!(c.file, None);
        assert_eq!(c.time, ChandraTime.date_to_secs(&c.date).unwrap());
    }

    #[test]
    fn one_record_per_non_blank_line() {
        let text = format!(
            "{LINE}\n\n   \n2009:033:12:00:01.025 | 12350 1 | ACISPKT | TLMSID= WSPOW00000, CMDS= 5, WORDS= 3, PACKET(40)= D800000300030603001, SCS= 107, STEP= 1\n"
        );
        let cmds = parse_backstop(&text, &ChandraTime).unwrap();
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[1].vcdu, 12350);
        assert_eq!(cmds[1].scs, Some(Value::Int(107)));
        assert_eq!(
            cmds[1].params["PACKET(40)"],
            Value::from("D800000300030603001")
        );
        assert!(cmds[0].time < cmds[1].time);
    }

    #[test]
    fn tolerates_bad_params_but_not_bad_lines() {
        let ok = "2009:033:12:00:00.000 | 1 0 | MP_OBSID | ID= 10870, ??????, , X==1";
        let cmds = parse_backstop(ok, &ChandraTime).unwrap();
        assert_eq!(cmds[0].params.len(), 1);
        assert_eq!(cmds[0].params["ID"], Value::Int(10870));

        let text = format!("{LINE}\n2009:033:12:00:00.000 | 1 0 | MP_OBSID\n");
        let err = parse_backstop(&text, &ChandraTime).unwrap_err();
        assert!(
            matches!(err, ParseCmError::MalformedLine { line: 2, .. }),
            "{err:?}"
        );
    }

    #[test]
    fn extra_pipe_is_malformed() {
        let text = "2009:033:12:00:00.000 | 1 0 | CMD | A=1 | extra";
        assert!(matches!(
            parse_backstop(text, &ChandraTime),
            Err(ParseCmError::MalformedLine { line: 1, .. })
        ));
    }

    #[test]
    fn non_integer_vcdu_is_malformed() {
        for text in [
            "2009:033:12:00:00.000 | abc 0 | CMD | A=1",
            "2009:033:12:00:00.000 |  | CMD | A=1",
        ] {
            assert!(matches!(
                parse_backstop(text, &ChandraTime),
                Err(ParseCmError::MalformedLine { line: 1, .. })
            ));
        }
    }

    #[test]
    fn bad_date_is_malformed() {
        let text = "not-a-date | 1 0 | CMD | A=1";
        let err = parse_backstop(text, &ChandraTime).unwrap_err();
        assert!(err.to_string().contains("not-a-date"), "{err}");
    }

    struct Counting;

    impl TimeConverter for Counting {
        fn date_to_secs(&self, date: &str) -> Result<f64> {
            Ok(date.len() as f64)
        }

        fn secs_to_date(&self, secs: f64) -> Result<String> {
            Ok(secs.to_string())
        }
    }

    #[test]
    fn uses_injected_converter() {
        let cmds = parse_backstop(LINE, &Counting).unwrap();
        assert_eq!(cmds[0].time, 21.0);
    }
}
