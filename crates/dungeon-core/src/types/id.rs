//! Newtype wrappers around integers for pool identifiers.
//!
//! Using distinct types prevents accidentally passing a party number where
//! an instance id is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Macro to define a newtype ID wrapper around an unsigned integer.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident($inner:ty)
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            /// Create an identifier from its raw value.
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            /// Return the raw value.
            pub const fn get(self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<$inner>().map(Self)
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $inner {
            fn from(id: $name) -> $inner {
                id.0
            }
        }
    };
}

define_id!(
    /// Identifier of a dungeon instance, in `1..=max_instances`.
    InstanceId(u32)
);

define_id!(
    /// Sequence number assigned to a party when it claims an instance.
    PartyNumber(u64)
);

impl PartyNumber {
    /// Human-readable label shown by displays, e.g. `"Party 3"`.
    pub fn label(self) -> String {
        format!("Party {}", self.0)
    }
}
