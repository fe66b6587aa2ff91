//! JSON encoding for values of unbounded nesting depth.
//!
//! Comment threads nest one level per reply, and a reply chain can be as long
//! as clients make it. Both directions run on a stack that grows on the heap
//! as needed, and parsing ignores serde_json's default recursion limit.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub fn to_vec<T: ?Sized + Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(128);
    let mut ser = serde_json::Serializer::new(&mut out);
    value.serialize(serde_stacker::Serializer::new(&mut ser))?;
    Ok(out)
}

pub fn from_slice<T: DeserializeOwned>(body: &[u8]) -> serde_json::Result<T> {
    let mut de = serde_json::Deserializer::from_slice(body);
    de.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}
