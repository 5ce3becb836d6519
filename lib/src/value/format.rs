use crate::error::{ErrorDetail, Result, Chainable};
use crate::value::Source;

/// A structured data format documents can be deserialized from.
pub trait Format: Sized {
    /// The data format's error type.
    type Error: serde::de::Error + ErrorDetail + 'static;

    /// Human readable name of the format, used in diagnostics.
    const NAME: &'static str;

    /// Parses `string` as the data format `Self` as a `T` or returns an error
    /// if the `string` is an invalid `T`. Usually called through
    /// [`Format::read()`], which also reports where the input came from.
    fn from_str<T: serde::de::DeserializeOwned>(string: &str) -> Result<T, Self::Error>;

    fn read<I: Source, T: serde::de::DeserializeOwned>(input: I) -> Result<T> {
        let origin = input.path().map(|p| p.display().to_string());
        let string = input.read()?;
        Self::from_str(&string).chain_with(|| error! {
            format!("{} deserialization failed", Self::NAME),
            "source" => origin.as_deref().unwrap_or("<string>"),
        })
    }
}

macro_rules! impl_format {
    ($name:ident : $func:expr, $E:ty) => (
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $name;

        impl Format for $name {
            type Error = $E;

            const NAME: &'static str = stringify!($name);

            fn from_str<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, $E> {
                $func(s)
            }
        }
    );
}

impl_format!(Toml: toml::from_str, toml::de::Error);
impl_format!(Json: serde_json::from_str, serde_json::error::Error);
