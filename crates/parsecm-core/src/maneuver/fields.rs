use crate::error::{ParseCmError, Result};
use crate::value::{coerce, Value};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Field table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    /// Absent fields take the caller's fallback value.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// First capture, coerced.
    Scalar,
    /// First capture, kept verbatim.
    Text,
    /// First capture verbatim plus every later capture parsed as a float.
    FloatVector,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub pattern: &'static str,
    pub presence: Presence,
    pub kind: FieldKind,
}

/// Labelled fields of an INITIAL or FINAL ATTITUDE paragraph.
///
/// The obsid capture deliberately leaves out the last two characters of the
/// `ID:` token; `GG27700` reads as `GG277`.
pub const ATTITUDE_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "obsid",
        pattern: r"ID:\s+(\S+)\S\S",
        presence: Presence::Fallback,
        kind: FieldKind::Scalar,
    },
    FieldSpec {
        name: "time",
        pattern: r"TIME\s*\(GMT\):\s+(\S+)",
        presence: Presence::Required,
        kind: FieldKind::Text,
    },
    FieldSpec {
        name: "ra",
        pattern: r"RA\s*\(deg\):\s+(\S+)",
        presence: Presence::Required,
        kind: FieldKind::Scalar,
    },
    FieldSpec {
        name: "dec",
        pattern: r"DEC\s*\(deg\):\s+(\S+)",
        presence: Presence::Required,
        kind: FieldKind::Scalar,
    },
    FieldSpec {
        name: "roll",
        pattern: r"ROLL\s*\(deg\):\s+(\S+)",
        presence: Presence::Required,
        kind: FieldKind::Scalar,
    },
    FieldSpec {
        name: "sun_angle",
        pattern: r"Sun Angle\s*\S+\s+(\S+)",
        presence: Presence::Required,
        kind: FieldKind::Scalar,
    },
    FieldSpec {
        name: "quat_string",
        pattern: r"Quaternion:\s*((\S+)\s+(\S+)\s+(\S+)\s+(\S+))",
        presence: Presence::Required,
        kind: FieldKind::FloatVector,
    },
];

/// Labelled fields of the OUTPUT DATA paragraph.
pub const OUTPUT_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "duration",
        pattern: r"Duration\s*\(sec\):\s+(\S+)",
        presence: Presence::Required,
        kind: FieldKind::Scalar,
    },
    FieldSpec {
        name: "angle",
        pattern: r"Maneuver Angle\s*\(deg\):\s+(\S+)",
        presence: Presence::Required,
        kind: FieldKind::Scalar,
    },
];

pub struct CompiledField {
    pub spec: &'static FieldSpec,
    re: Regex,
}

fn compile(specs: &'static [FieldSpec]) -> Vec<CompiledField> {
    specs
        .iter()
        .map(|spec| CompiledField {
            spec,
            re: Regex::new(spec.pattern).expect("field patterns are valid regexes"),
        })
        .collect()
}

static ATTITUDE_RE: OnceLock<Vec<CompiledField>> = OnceLock::new();
static OUTPUT_RE: OnceLock<Vec<CompiledField>> = OnceLock::new();

pub fn attitude_fields() -> &'static [CompiledField] {
    ATTITUDE_RE.get_or_init(|| compile(ATTITUDE_FIELDS))
}

pub fn output_fields() -> &'static [CompiledField] {
    OUTPUT_RE.get_or_init(|| compile(OUTPUT_FIELDS))
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Scalar(Value),
    Text(String),
    Vector { raw: String, values: Vec<f64> },
}

/// Values pulled out of one paragraph, keyed by field name.
#[derive(Debug)]
pub struct Fields {
    block: String,
    values: BTreeMap<&'static str, Extracted>,
}

impl Fields {
    fn take(&mut self, name: &str) -> Result<Extracted> {
        self.values
            .remove(name)
            .ok_or_else(|| ParseCmError::MissingRequiredField {
                block: self.block.clone(),
                field: name.to_string(),
            })
    }

    fn mismatch(&self, name: &str) -> ParseCmError {
        ParseCmError::MissingRequiredField {
            block: self.block.clone(),
            field: name.to_string(),
        }
    }

    pub fn scalar(&mut self, name: &str) -> Result<Value> {
        match self.take(name)? {
            Extracted::Scalar(v) => Ok(v),
            _ => Err(self.mismatch(name)),
        }
    }

    pub fn text(&mut self, name: &str) -> Result<String> {
        match self.take(name)? {
            Extracted::Text(s) => Ok(s),
            _ => Err(self.mismatch(name)),
        }
    }

    pub fn vector(&mut self, name: &str) -> Result<(String, Vec<f64>)> {
        match self.take(name)? {
            Extracted::Vector { raw, values } => Ok((raw, values)),
            _ => Err(self.mismatch(name)),
        }
    }
}

/// Apply every field pattern to `text`. `block` names the paragraph in
/// errors; `fallback` fills fields marked [`Presence::Fallback`].
pub fn extract(
    block: &str,
    text: &str,
    fields: &'static [CompiledField],
    fallback: &str,
) -> Result<Fields> {
    let mut values = BTreeMap::new();
    for field in fields {
        let spec = field.spec;
        let Some(caps) = field.re.captures(text) else {
            match spec.presence {
                Presence::Fallback => {
                    tracing::trace!(block, field = spec.name, fallback, "field absent, using fallback");
                    values.insert(spec.name, Extracted::Scalar(Value::from(fallback)));
                    continue;
                }
                Presence::Required => {
                    return Err(ParseCmError::MissingRequiredField {
                        block: block.to_string(),
                        field: spec.name.to_string(),
                    });
                }
            }
        };

        let first = caps.get(1).map_or("", |m| m.as_str());
        let value = match spec.kind {
            FieldKind::Scalar => Extracted::Scalar(coerce(first)),
            FieldKind::Text => Extracted::Text(first.to_string()),
            FieldKind::FloatVector => {
                let values = caps
                    .iter()
                    .skip(2)
                    .flatten()
                    .map(|m| {
                        m.as_str()
                            .parse::<f64>()
                            .map_err(|_| ParseCmError::InvalidQuaternion {
                                block: block.to_string(),
                                value: m.as_str().to_string(),
                            })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Extracted::Vector {
                    raw: first.to_string(),
                    values,
                }
            }
        };
        values.insert(spec.name, value);
    }
    Ok(Fields {
        block: block.to_string(),
        values,
    })
}
