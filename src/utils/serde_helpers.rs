//! Serde adapters for the way Xero writes XML.

/// Serializes and deserializes an optional value through its `Display` and `FromStr`
/// implementations, treating an empty element as `None`.
///
/// Useful for identifiers and decimal amounts, which arrive as element text.
pub mod display_fromstr {
    use std::{fmt::Display, str::FromStr};

    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    #[allow(clippy::ref_option)]
    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        match value {
            Some(value) => serializer.collect_str(value),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => s.trim().parse().map(Some).map_err(|e| {
                D::Error::custom(format!("unexpected value {s:?}: {e}"))
            }),
        }
    }
}

/// Generates a `with` module for a `Vec<T>` that Xero nests inside a plural wrapper
/// element, e.g. `<LineItems><LineItem>..</LineItem><LineItem>..</LineItem></LineItems>`.
macro_rules! wrapped_list {
    (mod $module:ident: $item:ty => $element:literal) => {
        #[allow(dead_code)]
        mod $module {
            #[allow(clippy::wildcard_imports, unused_imports)]
            use super::*;

            #[derive(serde::Serialize)]
            struct Wrapper<'a> {
                #[serde(rename = $element)]
                items: &'a [$item],
            }

            #[derive(serde::Deserialize)]
            struct OwnedWrapper {
                #[serde(rename = $element, default)]
                items: Vec<$item>,
            }

            pub fn serialize<S>(items: &[$item], serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serde::Serialize::serialize(&Wrapper { items }, serializer)
            }

            pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Vec<$item>, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                <OwnedWrapper as serde::Deserialize>::deserialize(deserializer)
                    .map(|wrapper| wrapper.items)
            }
        }
    };
}

pub(crate) use wrapped_list;

/// Declares a fieldless enum that travels as one of Xero's string codes. Parsing ignores
/// ASCII case, since Xero is not consistent about it (`NoTax` vs `NOTAX`).
macro_rules! xero_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$variant_meta:meta])* $variant:ident => $code:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(into = "String", try_from = "String")]
        pub enum $name {
            $($(#[$variant_meta])* $variant),+
        }

        impl $name {
            /// The code Xero uses for this value.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $code),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                let s = s.trim();
                $(
                    if s.eq_ignore_ascii_case($code) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("unknown {} {s:?}", stringify!($name)))
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

pub(crate) use xero_enum;
