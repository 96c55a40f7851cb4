//! Reference identifiers
//!
//! String-backed ids for roles, channels, users, modules and commands.
//! An empty id means "unset".

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create id from raw text
            #[inline]
            #[must_use]
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// The unset id
            #[inline]
            #[must_use]
            pub fn unset() -> Self {
                Self(String::new())
            }

            /// Raw id text
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Check if the id is unset
            #[inline]
            #[must_use]
            pub fn is_unset(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_string())
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }
    };
}

string_id!(
    /// Role snowflake
    RoleId
);
string_id!(
    /// Channel snowflake
    ChannelId
);
string_id!(
    /// User snowflake
    UserId
);
string_id!(
    /// Lower-cased module name
    ModuleId
);
string_id!(
    /// Lower-cased command name
    CommandId
);
string_id!(
    /// Tenant (chat server) id
    TenantId
);
