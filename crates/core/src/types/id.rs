//! Newtype IDs for type-safe entity references.
//!
//! Identities come from the hosted auth backend as UUIDs. The `define_id!`
//! macro wraps them so a user ID can never be handed to something expecting a
//! merchant ID.

pub use uuid::Uuid;

/// Macro to define a type-safe UUID wrapper.
///
/// Creates a newtype around [`Uuid`] with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - `new()`, `random()`, `as_uuid()`
/// - `Display`, `FromStr` and `From<Uuid>` implementations
///
/// # Example
///
/// ```rust
/// # use marketplace_core::define_id;
/// define_id!(UserId);
/// define_id!(MerchantId);
///
/// let user_id = UserId::random();
/// let merchant_id = MerchantId::new(user_id.as_uuid());
///
/// // These are different types, so this won't compile:
/// // let _: UserId = merchant_id;
/// # let _ = merchant_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name($crate::types::id::Uuid);

        impl $name {
            /// Wrap an existing UUID.
            #[must_use]
            pub const fn new(id: $crate::types::id::Uuid) -> Self {
                Self(id)
            }

            /// Generate a fresh random (v4) ID.
            #[must_use]
            pub fn random() -> Self {
                Self($crate::types::id::Uuid::new_v4())
            }

            /// Get the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> $crate::types::id::Uuid {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::id::IdParseError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                $crate::types::id::Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|_| $crate::types::id::IdParseError(s.to_owned()))
            }
        }

        impl From<$crate::types::id::Uuid> for $name {
            fn from(id: $crate::types::id::Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for $crate::types::id::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

/// Error returned when a string is not a valid UUID-backed ID.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid id: {0}")]
pub struct IdParseError(pub String);

define_id!(UserId);
define_id!(MerchantId);

impl From<UserId> for MerchantId {
    /// Every merchant on the marketplace is a signed-in user selling goods.
    fn from(id: UserId) -> Self {
        Self(id.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_display() {
        let id = UserId::random();
        let parsed: UserId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = "not-a-uuid".parse::<UserId>().unwrap_err();
        assert_eq!(err, IdParseError("not-a-uuid".to_string()));
    }

    #[test]
    fn test_serde_transparent() {
        let uuid = Uuid::nil();
        let json = serde_json::to_string(&UserId::new(uuid)).unwrap();
        assert_eq!(json, format!("\"{uuid}\""));
    }

    #[test]
    fn test_merchant_from_user() {
        let user = UserId::random();
        assert_eq!(MerchantId::from(user).as_uuid(), user.as_uuid());
    }
}
