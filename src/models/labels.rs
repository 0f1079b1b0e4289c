//! Closed enumerations with stable string labels
//!
//! Categories, bill statuses and recurrence periods are each declared once
//! with `labeled_enum!`, and the same label is used by serde, by `FromStr`
//! (CLI and import input), by `Display` and by the exporters.

use std::fmt;

/// Error returned when a string is not one of an enumeration's labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLabelError {
    pub kind: &'static str,
    pub value: String,
    pub allowed: &'static [&'static str],
}

impl fmt::Display for ParseLabelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid {} '{}' (expected one of: {})",
            self.kind,
            self.value,
            self.allowed.join(", ")
        )
    }
}

impl std::error::Error for ParseLabelError {}

/// Declares a fieldless enum together with its labels.
///
/// Each variant is `Variant => "label" / "Title"`, optionally followed by
/// `| "alias"` entries accepted when parsing.
macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident as $kind:literal {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $label:literal / $title:literal $(| $alias:literal)*
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $label $(, alias = $alias)*)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Every label, in declaration order
            pub const LABELS: &'static [&'static str] = &[$($label),+];

            /// The stored/serialized label
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            /// Human-readable name for tables and reports
            pub const fn title(&self) -> &'static str {
                match self {
                    $($name::$variant => $title,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::models::labels::ParseLabelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim().to_ascii_lowercase();
                match needle.as_str() {
                    $($label $(| $alias)* => Ok($name::$variant),)+
                    _ => Err($crate::models::labels::ParseLabelError {
                        kind: $kind,
                        value: s.to_string(),
                        allowed: $name::LABELS,
                    }),
                }
            }
        }
    };
}

pub(crate) use labeled_enum;

/// Parse a comma-separated list of labels, ignoring blank items
pub fn parse_label_list<T>(input: &str) -> Result<Vec<T>, ParseLabelError>
where
    T: std::str::FromStr<Err = ParseLabelError> + PartialEq,
{
    let mut out = Vec::new();
    for item in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let value = item.parse::<T>()?;
        if !out.contains(&value) {
            out.push(value);
        }
    }
    Ok(out)
}
