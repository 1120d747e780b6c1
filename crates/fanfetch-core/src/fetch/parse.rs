//! Extract a list of identifiers from a JSON response body.

use serde_json::Value;

use crate::retry::FetchError;
use crate::source::Dataset;

/// Parse `body` as JSON and read identifiers at `pointer` (RFC 6901, `""` = root).
///
/// Accepted shapes at the pointer:
/// - array of strings: taken as-is
/// - array of objects: `id_field` of each object (must be a string)
/// - object: its keys (markets keyed by symbol)
///
/// Anything else is a protocol error.
pub fn parse_identifiers(body: &[u8], pointer: &str, id_field: &str) -> Result<Dataset, FetchError> {
    let doc: Value = serde_json::from_slice(body)
        .map_err(|e| FetchError::Protocol(format!("response is not valid JSON: {}", e)))?;
    let node = doc
        .pointer(pointer)
        .ok_or_else(|| FetchError::Protocol(format!("no value at JSON pointer {:?}", pointer)))?;

    match node {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::String(s) => Ok(s.clone()),
                Value::Object(obj) => obj
                    .get(id_field)
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| {
                        FetchError::Protocol(format!(
                            "entry {} has no string field {:?}",
                            i, id_field
                        ))
                    }),
                _ => Err(FetchError::Protocol(format!(
                    "entry {} is neither a string nor an object",
                    i
                ))),
            })
            .collect(),
        Value::Object(map) => Ok(map.keys().cloned().collect()),
        _ => Err(FetchError::Protocol(format!(
            "value at {:?} is not an array or object",
            pointer
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_of_strings_at_root() {
        let d = parse_identifiers(br#"["BTC","BCH","ETH"]"#, "", "id").unwrap();
        assert_eq!(d.identifiers(), ["BTC", "BCH", "ETH"]);
    }

    #[test]
    fn array_of_objects_under_pointer() {
        let body = br#"{"data":{"markets":[{"symbol":"BTC/USD"},{"symbol":"BCC/BTC"}]}}"#;
        let d = parse_identifiers(body, "/data/markets", "symbol").unwrap();
        assert_eq!(d.identifiers(), ["BTC/USD", "BCC/BTC"]);
    }

    #[test]
    fn object_keys() {
        let body = br#"{"currencies":{"BCH":{"precision":8},"BTC":{"precision":8}}}"#;
        let d = parse_identifiers(body, "/currencies", "id").unwrap();
        assert_eq!(d.len(), 2);
        assert!(d.contains("BCH"));
    }

    #[test]
    fn malformed_inputs_are_protocol_errors() {
        for (body, pointer) in [
            (&b"<html>maintenance</html>"[..], ""),
            (&br#"{"a":[]}"#[..], "/b"),
            (&br#"{"a":42}"#[..], "/a"),
            (&br#"[1,2]"#[..], ""),
            (&br#"[{"name":"x"}]"#[..], ""),
        ] {
            let err = parse_identifiers(body, pointer, "id").unwrap_err();
            assert!(matches!(err, FetchError::Protocol(_)), "{:?}", err);
        }
    }
}
