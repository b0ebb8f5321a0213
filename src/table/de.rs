use serde::de::{Deserialize, DeserializeSeed, MapAccess, SeqAccess, Visitor};

use core::marker::PhantomData;

use super::OrderedTable;

/// Deserializes an [`OrderedTable`] from either a map or a sequence of
/// `(key, value)` pairs, appending entries in input order.
///
/// Repeated keys are kept as separate entries, as with
/// [`OrderedTable::insert`].
pub struct Entries<K, V>(PhantomData<(K, V)>);

impl<K, V> Entries<K, V> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<K, V> Default for Entries<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'de, K: Deserialize<'de>, V: Deserialize<'de>> DeserializeSeed<'de> for Entries<K, V> {
    type Value = OrderedTable<K, V>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

struct EntriesVisitor<K, V>(PhantomData<(K, V)>);

impl<'de, K: Deserialize<'de>, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<K, V> {
    type Value = OrderedTable<K, V>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a map or a sequence of key/value pairs")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut ret = OrderedTable::with_capacity(map.size_hint().unwrap_or(0));

        while let Some((key, val)) = map.next_entry()? {
            ret.insert(key, val);
        }
        Ok(ret)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut ret = OrderedTable::with_capacity(seq.size_hint().unwrap_or(0));

        while let Some((key, val)) = seq.next_element::<(K, V)>()? {
            ret.insert(key, val);
        }
        Ok(ret)
    }
}
