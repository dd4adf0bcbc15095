use crate::{AxisHeader, Coordinate, MultiDict, MultiDictError};
use core::{
    fmt,
    hash::{BuildHasher, Hash},
    marker::PhantomData,
};
use serde::{
    de::{self, MapAccess, SeqAccess, Visitor},
    ser::{SerializeStruct, Serializer},
    Deserializer, {Deserialize, Serialize},
};

const FIELDS: &[&str] = &["arity", "headers", "entries"];

#[derive(Deserialize)]
#[serde(field_identifier, rename_all = "lowercase")]
enum Field {
    Arity,
    Headers,
    Entries,
}

pub(crate) struct MultiDictVisitor<V, L, S> {
    marker: PhantomData<fn() -> MultiDict<V, L, S>>,
}

impl<V, L, S> MultiDictVisitor<V, L, S> {
    fn new() -> Self {
        MultiDictVisitor {
            marker: PhantomData,
        }
    }
}

// Rebuilds the map through the same checks as the bulk constructors.
fn assemble<V, L, S, E>(
    arity: Option<usize>,
    headers: Vec<Vec<L>>,
    entries: Vec<(Coordinate, V)>,
) -> Result<MultiDict<V, L, S>, E>
where
    L: Eq + Hash + fmt::Debug,
    S: BuildHasher + Clone + Default,
    E: de::Error,
{
    let hash_builder = S::default();
    let arity = match arity {
        Some(arity) => arity,
        None if headers.is_empty() && entries.is_empty() => {
            return Ok(MultiDict::with_hasher(hash_builder))
        }
        None => {
            return Err(E::custom(MultiDictError::<L>::ArityNotEstablished));
        }
    };
    if headers.len() != arity {
        return Err(E::custom(MultiDictError::<L>::ArityMismatch {
            expected: arity,
            found: headers.len(),
        }));
    }
    let headers = headers
        .into_iter()
        .enumerate()
        .map(|(axis, labels)| {
            AxisHeader::from_labels_with_hasher(axis, labels, hash_builder.clone())
        })
        .collect::<Result<Vec<_>, MultiDictError<L>>>()
        .map_err(E::custom)?;
    MultiDict::from_parts(hash_builder, headers, entries).map_err(E::custom)
}

impl<'de, V, L, S> Visitor<'de> for MultiDictVisitor<V, L, S>
where
    V: Deserialize<'de>,
    L: Deserialize<'de> + Eq + Hash + fmt::Debug,
    S: BuildHasher + Clone + Default,
{
    type Value = MultiDict<V, L, S>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a MultiDict")
    }

    fn visit_seq<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: SeqAccess<'de>,
    {
        let arity = access
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let headers = access
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(1, &self))?;
        let entries = access
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(2, &self))?;
        assemble(arity, headers, entries)
    }

    fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut arity = None;
        let mut headers = None;
        let mut entries = None;
        while let Some(field) = access.next_key()? {
            match field {
                Field::Arity => {
                    if arity.is_some() {
                        return Err(de::Error::duplicate_field("arity"));
                    }
                    arity = Some(access.next_value()?);
                }
                Field::Headers => {
                    if headers.is_some() {
                        return Err(de::Error::duplicate_field("headers"));
                    }
                    headers = Some(access.next_value()?);
                }
                Field::Entries => {
                    if entries.is_some() {
                        return Err(de::Error::duplicate_field("entries"));
                    }
                    entries = Some(access.next_value()?);
                }
            }
        }
        let arity = arity.ok_or_else(|| de::Error::missing_field("arity"))?;
        let headers = headers.ok_or_else(|| de::Error::missing_field("headers"))?;
        let entries = entries.ok_or_else(|| de::Error::missing_field("entries"))?;
        assemble(arity, headers, entries)
    }
}

impl<'de, V, L, S> Deserialize<'de> for MultiDict<V, L, S>
where
    V: Deserialize<'de>,
    L: Deserialize<'de> + Eq + Hash + fmt::Debug,
    S: BuildHasher + Clone + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_struct("MultiDict", FIELDS, MultiDictVisitor::<V, L, S>::new())
    }
}

impl<V, L, H> Serialize for MultiDict<V, L, H>
where
    V: Serialize,
    L: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let headers: Vec<&[L]> = self.headers().iter().map(AxisHeader::labels).collect();
        let mut entries: Vec<(&Coordinate, &V)> = self.coordinates().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let mut state = serializer.serialize_struct("MultiDict", 3)?;
        state.serialize_field("arity", &self.arity())?;
        state.serialize_field("headers", &headers)?;
        state.serialize_field("entries", &entries)?;
        state.end()
    }
}
