//! Macro for implementing Display and FromStr for wire-string enums
//!
//! Enums such as `Theme`, `AssetType` or `TransactionType` travel as plain
//! lowercase strings (in key-value storage, query strings and JSON bodies).
//! This macro generates both directions of that conversion in one place.
//!
//! # Example
//!
//! ```rust
//! use financeflow_domain::impl_wire_string_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Theme {
//!     Light,
//!     Dark,
//!     System,
//! }
//!
//! impl_wire_string_conversions!(Theme {
//!     Light => "light",
//!     Dark => "dark",
//!     System => "system",
//! });
//! ```

/// Implements Display and FromStr traits for wire-string enums
///
/// - Display writes the given string literal.
/// - FromStr parses case-insensitively; string literals must be lowercase.
#[macro_export]
macro_rules! impl_wire_string_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum AlertKind {
        PriceAbove,
        PriceBelow,
        PercentChange,
    }

    impl_wire_string_conversions!(AlertKind {
        PriceAbove => "price_above",
        PriceBelow => "price_below",
        PercentChange => "percent_change",
    });

    #[test]
    fn test_display_conversion() {
        assert_eq!(AlertKind::PriceAbove.to_string(), "price_above");
        assert_eq!(AlertKind::PercentChange.to_string(), "percent_change");
    }

    #[test]
    fn test_fromstr_is_case_insensitive() {
        assert_eq!(AlertKind::from_str("price_below").unwrap(), AlertKind::PriceBelow);
        assert_eq!(AlertKind::from_str("PRICE_BELOW").unwrap(), AlertKind::PriceBelow);
        assert_eq!(AlertKind::from_str(" Percent_Change ").unwrap(), AlertKind::PercentChange);
    }

    #[test]
    fn test_fromstr_invalid() {
        let result = AlertKind::from_str("sideways");
        assert!(result.unwrap_err().contains("Invalid AlertKind: sideways"));
        assert!(AlertKind::from_str("").is_err());
    }
}
