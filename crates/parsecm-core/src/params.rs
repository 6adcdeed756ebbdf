use crate::value::{coerce, Value};
use std::collections::BTreeMap;

pub type ParamMapping = BTreeMap<String, Value>;

/// Parse `key1=val1,key2=val2,...` into a typed mapping.
///
/// Tokens that do not split into exactly one key and one value are skipped.
/// Backstop parameter strings carry blank and `??????` fields, so this never
/// fails.
pub fn parse_params(paramstr: &str) -> ParamMapping {
    let mut params = ParamMapping::new();
    for opt in paramstr.split(',') {
        let mut parts = opt.split('=');
        let (Some(key), Some(val), None) = (parts.next(), parts.next(), parts.next()) else {
            tracing::trace!(token = opt, "skipping malformed parameter");
            continue;
        };
        params.insert(key.trim().to_string(), coerce(val.trim()));
    }
    params
}
