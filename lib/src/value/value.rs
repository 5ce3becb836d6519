use std::sync::Arc;
use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};

pub type Dict<K = Arc<str>, V = Value> = BTreeMap<K, V>;

/// Any value a data document can hold.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Num(Num),
    String(Arc<str>),
    Array(Arc<Vec<Value>>),
    Dict(Arc<Dict>),
}

impl Value {
    /// An empty dictionary.
    pub fn empty_dict() -> Value {
        Value::Dict(Arc::default())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(&**s),
            _ => None
        }
    }

    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) => Some(v.as_slice()),
            _ => None
        }
    }

    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(v) => Some(&**v),
            _ => None
        }
    }

    pub fn into_dict(self) -> Result<Arc<Dict>, Value> {
        match self {
            Value::Dict(v) => Ok(v),
            _ => Err(self)
        }
    }

    /// Looks up `key` if `self` is a dictionary.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_dict()?.get(key)
    }

    /// Returns a dictionary with every key of `base` and `overlay`. Keys
    /// present in both take the value from `overlay`. Only the top level is
    /// merged; nested dictionaries are replaced wholesale.
    pub fn overlay(base: &Arc<Dict>, overlay: Option<&Arc<Dict>>) -> Value {
        match overlay {
            None => Value::Dict(base.clone()),
            Some(overlay) if overlay.is_empty() => Value::Dict(base.clone()),
            Some(overlay) => {
                let mut merged = (**base).clone();
                merged.extend(overlay.iter().map(|(k, v)| (k.clone(), v.clone())));
                Value::Dict(Arc::new(merged))
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Num(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Dict(_) => "dict",
        }
    }
}

macro_rules! impl_from_primitive {
    ($($T:ty),+ => $E:ident::$kind:ident) => {
        $(
            impl From<$T> for $E {
                fn from(value: $T) -> Self {
                    $E::$kind(value.into())
                }
            }
        )+
    };
}

impl_from_primitive!(bool => Value::Bool);
impl_from_primitive!(&str => Value::String);
impl_from_primitive!(String => Value::String);
impl_from_primitive!(Arc<str> => Value::String);
impl_from_primitive!(Arc<Vec<Value>> => Value::Array);
impl_from_primitive!(Arc<Dict> => Value::Dict);
impl_from_primitive!(u8, u16, u32, u64, usize => Value::Num);
impl_from_primitive!(i8, i16, i32, i64, isize => Value::Num);
impl_from_primitive!(f32, f64 => Value::Num);

impl From<()> for Value  {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl<T> From<Option<T>> for Value where Value: From<T> {
    fn from(value: Option<T>) -> Self {
        value.map(Value::from).unwrap_or(Value::Null)
    }
}

impl<T> From<Vec<T>> for Value where Value: From<T> {
    fn from(value: Vec<T>) -> Self {
        value.into_iter()
            .map(Value::from)
            .collect()
    }
}

impl<K, V> From<Dict<K, V>> for Value where Arc<str>: From<K>, Value: From<V> {
    fn from(value: Dict<K, V>) -> Self {
        let dict = value.into_iter()
            .map(|(k, v)| (<Arc::<str>>::from(k), Value::from(v)))
            .collect::<Dict>();

        Value::Dict(Arc::new(dict))
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        let vec = iter.into_iter().collect::<Vec<Value>>();
        Value::Array(Arc::from(vec))
    }
}

/// A JSON-compatible number. Integers keep their sign; everything else is
/// stored as a float.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Num {
    /// A non-negative integer.
    U64(u64),
    /// A negative integer.
    I64(i64),
    /// A floating point number.
    F64(f64),
}

macro_rules! impl_from_for_num_value {
    ($($T:ty: $V:ident as $W:ty),* $(,)?) => ($(
        impl From<$T> for Num {
            fn from(value: $T) -> Num {
                Num::$V(value as $W)
            }
        }
    )*)
}

impl_from_for_num_value! {
    u8: U64 as u64, u16: U64 as u64, u32: U64 as u64, u64: U64 as u64, usize: U64 as u64,
    f32: F64 as f64, f64: F64 as f64,
}

macro_rules! impl_from_signed_for_num_value {
    ($($T:ty),* $(,)?) => ($(
        impl From<$T> for Num {
            fn from(value: $T) -> Num {
                match u64::try_from(value) {
                    Ok(v) => Num::U64(v),
                    Err(_) => Num::I64(value as i64),
                }
            }
        }
    )*)
}

impl_from_signed_for_num_value!(i8, i16, i32, i64, isize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_numbers_keep_their_shape() {
        let value: Value = serde_json::from_str(r#"[1, -2, 3.5, null, "x"]"#).unwrap();
        let items = value.as_slice().unwrap();
        assert_eq!(items[0], Value::Num(Num::U64(1)));
        assert_eq!(items[1], Value::Num(Num::I64(-2)));
        assert_eq!(items[2], Value::Num(Num::F64(3.5)));
        assert_eq!(items[3], Value::Null);
        assert_eq!(items[4].as_str(), Some("x"));
    }

    #[test]
    fn overlay_keys_win() {
        let base: Arc<Dict> = Arc::new(crate::dict! { "title" => "A", "lede" => "kept" });
        let over: Arc<Dict> = Arc::new(crate::dict! { "title" => "B" });

        let merged = Value::overlay(&base, Some(&over));
        assert_eq!(merged.get("title").and_then(Value::as_str), Some("B"));
        assert_eq!(merged.get("lede").and_then(Value::as_str), Some("kept"));
        assert_eq!(base.get("title").and_then(Value::as_str), Some("A"));

        let untouched = Value::overlay(&base, None);
        assert_eq!(untouched.get("title").and_then(Value::as_str), Some("A"));
    }
}
