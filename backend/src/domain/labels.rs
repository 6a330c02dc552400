//! Closed string vocabularies shared by journal and goal entities.
//!
//! Each label enum has a stable snake_case wire form used by JSON payloads,
//! CSV exports and database columns. Unknown values are rejected.

/// Error returned when a string does not belong to a label vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}`; expected one of: {expected}")]
pub struct UnknownLabelError {
    kind: &'static str,
    value: String,
    expected: String,
}

impl UnknownLabelError {
    /// Vocabulary name, for example `goal category`.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Rejected input.
    pub fn value(&self) -> &str {
        self.value.as_str()
    }
}

macro_rules! define_label_enum {
    (
        $(#[$outer:meta])*
        $name:ident ($kind:literal) {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $wire:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
        )]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Stable wire representation.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::domain::labels::UnknownLabelError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($wire => Ok(Self::$variant),)+
                    other => Err($crate::domain::labels::UnknownLabelError::new(
                        $kind,
                        other,
                        &[$($wire),+],
                    )),
                }
            }
        }
    };
}

pub(crate) use define_label_enum;

impl UnknownLabelError {
    pub(crate) fn new(kind: &'static str, value: &str, expected: &[&str]) -> Self {
        Self {
            kind,
            value: value.to_owned(),
            expected: expected.join(", "),
        }
    }
}

define_label_enum! {
    /// Urgency attached to insights and goals.
    #[derive(Default)]
    Priority ("priority") {
        /// Nice to have.
        Low => "low",
        /// Default urgency.
        #[default]
        Medium => "medium",
        /// Needs attention soon.
        High => "high",
    }
}
