//! Declarative macro for the protocol's enumerated vocabularies
//!
//! Every enumeration the adapter exchanges with configuration strings
//! (object types, property identifiers, engineering units) is a newtype over
//! its numeric protocol code. The macro generates the associated constants,
//! a static name table, and lookups in both directions from one listing.
//! Serialized forms carry the numeric code so unassigned values survive.

/// Defines a protocol enumeration newtype from a `CONST = code => "name"` table.
///
/// # Example
/// ```rust,ignore
/// define_enumeration! {
///     /// Polarity of a binary object
///     pub struct Polarity(u16);
///     NORMAL = 0 => "normal",
///     REVERSE = 1 => "reverse",
/// }
/// ```
macro_rules! define_enumeration {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident($repr:ty);
        $( $konst:ident = $code:literal => $text:literal, )*
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        $vis struct $name(pub $repr);

        #[allow(missing_docs)]
        impl $name {
            $( pub const $konst: $name = $name($code); )*

            /// Every named value in protocol-code order.
            pub const VALUES: &'static [($name, &'static str)] = &[ $( ($name($code), $text), )* ];

            /// Numeric protocol code.
            pub const fn code(self) -> $repr {
                self.0
            }

            /// Protocol name of this value, `None` for unassigned codes.
            pub fn name(self) -> Option<&'static str> {
                match self.0 {
                    $( $code => Some($text), )*
                    _ => None,
                }
            }

            /// Exact, case-sensitive lookup by protocol name.
            pub fn from_name(name: &str) -> Option<Self> {
                Self::names().get(name).copied()
            }

            /// Name table, built once on first use.
            pub fn names() -> &'static std::collections::HashMap<&'static str, $name> {
                static TABLE: std::sync::OnceLock<std::collections::HashMap<&'static str, $name>> =
                    std::sync::OnceLock::new();
                TABLE.get_or_init(|| Self::VALUES.iter().map(|(value, name)| (*name, *value)).collect())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self.name() {
                    Some(name) => f.write_str(name),
                    None => write!(f, "unknown({})", self.0),
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::ApiError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_name(s).ok_or_else(|| $crate::error::ApiError::UnknownName {
                    kind: stringify!($name),
                    name: s.to_string(),
                })
            }
        }
    };
}

pub(crate) use define_enumeration;
