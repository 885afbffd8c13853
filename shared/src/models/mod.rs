//! Data models
//!
//! Shared between mesa-server, mesa-client and the frontends (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflakes, timestamps are UTC milliseconds and money
//! is `rust_decimal::Decimal`. Every row belongs to exactly one store.

pub mod coupon;
pub mod delivery_zone;
pub mod dining_table;
pub mod driver;
pub mod menu;
pub mod order;
pub mod store;
pub mod table_order;
pub mod user;

// Re-exports
pub use coupon::*;
pub use delivery_zone::*;
pub use dining_table::*;
pub use driver::*;
pub use menu::*;
pub use order::*;
pub use store::*;
pub use table_order::*;
pub use user::*;

/// A stored enum value that does not match any known variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a string-backed enum stored as TEXT.
///
/// Generates `as_str`, `Display`, `FromStr` and `TryFrom<String>` so rows can
/// decode the column with `#[sqlx(try_from = "String")]` and queries can
/// bind `value.as_str()`.
#[macro_export]
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $text ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::models::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok(Self::$variant), )+
                    other => Err($crate::models::UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::models::UnknownVariant;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_enum_round_trips_through_str() {
        assert_eq!(OrderStatus::OutForDelivery.as_str(), "out_for_delivery");
        assert_eq!(
            "out_for_delivery".parse::<OrderStatus>().unwrap(),
            OrderStatus::OutForDelivery
        );
        assert_eq!(
            serde_json::to_string(&StaffRole::Kitchen).unwrap(),
            "\"kitchen\""
        );
    }

    #[test]
    fn text_enum_rejects_unknown_values() {
        let err = TableStatus::try_from("broken".to_string()).unwrap_err();
        assert_eq!(err.kind, "TableStatus");
        assert_eq!(err.to_string(), "unknown TableStatus: 'broken'");
    }
}
