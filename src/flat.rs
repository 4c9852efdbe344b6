//! Flat alternating-pair arrays.
//!
//! Index structures store pairs as `[a0, b0, a1, b1, ...]` to keep the JSON
//! payload small. [`FlatPairs`] holds them as `(A, B)` tuples in memory and
//! reads/writes the flat form.

use serde::de::{self, Deserialize, Deserializer, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// A sequence of pairs serialized as one flat alternating array.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlatPairs<A, B>(pub Vec<(A, B)>);

impl<A, B> FlatPairs<A, B> {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (A, B)> {
        self.0.iter()
    }
}

impl<A, B> From<Vec<(A, B)>> for FlatPairs<A, B> {
    fn from(pairs: Vec<(A, B)>) -> Self {
        Self(pairs)
    }
}

impl<A, B> FromIterator<(A, B)> for FlatPairs<A, B> {
    fn from_iter<I: IntoIterator<Item = (A, B)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a, A, B> IntoIterator for &'a FlatPairs<A, B> {
    type Item = &'a (A, B);
    type IntoIter = std::slice::Iter<'a, (A, B)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<A: Serialize, B: Serialize> Serialize for FlatPairs<A, B> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len() * 2))?;
        for (a, b) in &self.0 {
            seq.serialize_element(a)?;
            seq.serialize_element(b)?;
        }
        seq.end()
    }
}

struct FlatPairsVisitor<A, B>(PhantomData<(A, B)>);

impl<'de, A: Deserialize<'de>, B: Deserialize<'de>> Visitor<'de> for FlatPairsVisitor<A, B> {
    type Value = FlatPairs<A, B>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a flat array of alternating pair elements")
    }

    fn visit_seq<S: SeqAccess<'de>>(self, mut seq: S) -> Result<Self::Value, S::Error> {
        let mut pairs = Vec::with_capacity(seq.size_hint().unwrap_or(0) / 2);
        while let Some(a) = seq.next_element::<A>()? {
            let b = seq
                .next_element::<B>()?
                .ok_or_else(|| de::Error::invalid_length(pairs.len() * 2 + 1, &self))?;
            pairs.push((a, b));
        }
        Ok(FlatPairs(pairs))
    }
}

impl<'de, A: Deserialize<'de>, B: Deserialize<'de>> Deserialize<'de> for FlatPairs<A, B> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(FlatPairsVisitor(PhantomData))
    }
}
