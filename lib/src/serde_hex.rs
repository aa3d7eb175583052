// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Hex encodings for optional and repeated byte fields,
//! plain `Vec<u8>` fields use `#[serde(with = "hex")]` directly

/// `Option<Vec<u8>>` as an optional hex string
pub mod opt {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(b) => s.serialize_some(&hex::encode(b)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
        let v = Option::<String>::deserialize(d)?;
        v.map(|s| hex::decode(s).map_err(de::Error::custom))
            .transpose()
    }
}

/// `Vec<Vec<u8>>` as a list of hex strings
pub mod list {
    use serde::{de, ser::SerializeSeq, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &[Vec<u8>], s: S) -> Result<S::Ok, S::Error> {
        let mut seq = s.serialize_seq(Some(v.len()))?;
        for b in v {
            seq.serialize_element(&hex::encode(b))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Vec<u8>>, D::Error> {
        let v = Vec::<String>::deserialize(d)?;
        v.iter()
            .map(|s| hex::decode(s).map_err(de::Error::custom))
            .collect()
    }
}
