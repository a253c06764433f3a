use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

fn validate_numeric_id(value: u64, kind: &str) -> Result<u64> {
    if value == 0 {
        return Err(Error::InvalidId(format!("{kind} must be positive")));
    }
    Ok(value)
}

fn parse_numeric_id(value: &str, kind: &str) -> Result<u64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidId(format!("{kind} must not be empty")));
    }
    let parsed = trimmed
        .parse::<u64>()
        .map_err(|_| Error::InvalidId(format!("{kind} must be a decimal integer")))?;
    validate_numeric_id(parsed, kind)
}

macro_rules! define_id_type {
    ($(#[$doc:meta])* $name:ident, $kind:expr) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(u64);

        impl $name {
            /// Creates a validated identifier.
            pub fn new(value: u64) -> Result<Self> {
                validate_numeric_id(value, $kind).map(Self)
            }

            /// Creates an identifier from a trusted value without validation.
            pub fn from_raw(value: u64) -> Self {
                Self(value)
            }

            /// Returns the underlying integer.
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(value: &str) -> Result<Self> {
                parse_numeric_id(value, $kind).map(Self)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = Error;

            fn try_from(value: &str) -> Result<Self> {
                value.parse()
            }
        }

        impl TryFrom<u64> for $name {
            type Error = Error;

            fn try_from(value: u64) -> Result<Self> {
                Self::new(value)
            }
        }

        impl From<$name> for u64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

define_id_type!(
    /// User account identifier.
    UserId,
    "user id"
);
define_id_type!(
    /// Product identifier.
    ProductId,
    "product id"
);
define_id_type!(
    /// Category identifier.
    CategoryId,
    "category id"
);
define_id_type!(
    /// Comment identifier.
    CommentId,
    "comment id"
);
define_id_type!(
    /// Like identifier.
    LikeId,
    "like id"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_should_parse_trimmed_decimal() {
        let id = ProductId::try_from(" 42 ").expect("product id");
        assert_eq!(id.get(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn id_should_reject_zero() {
        let err = UserId::new(0).expect_err("must reject");
        assert!(err.to_string().contains("user id"));
    }

    #[test]
    fn id_should_reject_non_numeric() {
        let err = CategoryId::try_from("seven").expect_err("must reject");
        assert!(matches!(err, Error::InvalidId(_)));
        assert!(err.to_string().contains("category id"));
    }

    #[test]
    fn id_should_reject_empty() {
        let err = CommentId::try_from("   ").expect_err("must reject");
        assert!(err.to_string().contains("must not be empty"));
    }
}
