//! Common utility functions for use in other packages

/// Serde helpers for `Option<Vec<u8>>` fields that should read as hex strings
///
/// ```
/// # use serde::{Deserialize, Serialize};
/// #[derive(Serialize, Deserialize)]
/// struct Example {
///     #[serde(default, with = "primitives::util::hex_opt")]
///     proof: Option<Vec<u8>>,
/// }
/// ```
pub mod hex_opt {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize `Some(bytes)` as a hex string and `None` as `null`
    pub fn serialize<S: Serializer>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => serializer.serialize_some(&hex::encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional hex string, accepting an optional `0x` prefix
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        let Some(s) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };

        let s = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(s).map(Some).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Holder {
        #[serde(default, with = "super::hex_opt")]
        bytes: Option<Vec<u8>>,
    }

    #[test]
    fn hex_opt_reads_and_writes_hex() {
        let holder = Holder {
            bytes: Some(vec![0xde, 0xad]),
        };
        let json = serde_json::to_string(&holder).unwrap();
        assert_eq!(json, r#"{"bytes":"dead"}"#);
        assert_eq!(serde_json::from_str::<Holder>(&json).unwrap(), holder);

        let prefixed: Holder = serde_json::from_str(r#"{"bytes":"0xdead"}"#).unwrap();
        assert_eq!(prefixed, holder);
    }

    #[test]
    fn hex_opt_missing_is_none() {
        let holder: Holder = serde_json::from_str("{}").unwrap();
        assert_eq!(holder, Holder { bytes: None });

        let holder: Holder = serde_json::from_str(r#"{"bytes":null}"#).unwrap();
        assert_eq!(holder, Holder { bytes: None });
    }
}
