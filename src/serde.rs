use core::fmt;
use core::marker::PhantomData;

use ::serde::de::{Deserialize, Deserializer, SeqAccess, Visitor};
use ::serde::ser::{Serialize, SerializeSeq, Serializer};

use crate::Vector;

impl<T> Serialize for Vector<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.size()))?;
        for element in self {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

struct VectorVisitor<T> {
    marker: PhantomData<fn() -> Vector<T>>,
}

impl<'de, T> Visitor<'de> for VectorVisitor<T>
where
    T: Deserialize<'de>,
{
    type Value = Vector<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        // Untrusted length hints must not drive huge allocations
        const MAX_PREALLOCATE: usize = 4096;

        let mut vector = Vector::with_capacity(seq.size_hint().unwrap_or(0).min(MAX_PREALLOCATE));
        while let Some(element) = seq.next_element()? {
            vector.push_back(element);
        }

        Ok(vector)
    }
}

impl<'de, T> Deserialize<'de> for Vector<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(VectorVisitor {
            marker: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{vector, Vector};

    #[test]
    fn test_serialize_live_elements_only() {
        let mut sut = vector![1, 2, 3, 4];
        sut.pop_back().unwrap();
        assert_eq!(serde_json::to_string(&sut).unwrap(), "[1,2,3]");
        assert_eq!(serde_json::to_string(&Vector::<u8>::new()).unwrap(), "[]");
    }

    #[test]
    fn test_deserialize() {
        let sut: Vector<String> = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(sut, ["a".to_string(), "b".to_string()]);
        assert_eq!(sut.capacity(), 5, "small inputs still get the minimum capacity");

        let sut: Vector<u32> = serde_json::from_str("[0,1,2,3,4,5,6]").unwrap();
        assert_eq!(sut.size(), 7);
        assert_eq!(sut.capacity(), 10, "json gives no length hint, so appends double");

        assert!(serde_json::from_str::<Vector<u32>>(r#"{"a":1}"#).is_err());
    }
}
