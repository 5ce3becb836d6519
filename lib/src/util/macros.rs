/// Builds a [`Dict`](crate::value::Dict) from `key => value` pairs, converting
/// both sides with `Into`.
#[doc(hidden)]
#[macro_export]
macro_rules! dict {
    ($($key:expr => $value:expr),* $(,)?) => ({
        #[allow(unused_mut)]
        let mut dict = $crate::value::Dict::new();
        $(dict.insert($key.into(), $value.into());)*
        dict
    });
}

pub use dict;
