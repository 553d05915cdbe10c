//! 데이터 모델
//!
//! 테이블 행 구조체와 한글 문자열로 저장되는 도메인 열거형을 정의합니다.

/// DB에 한글 문자열로 저장되는 열거형을 정의합니다.
///
/// `as_str`/`FromStr`/`Display`/serde 변환과 `sqlx(try_from = "String")`에 필요한
/// `TryFrom<String>`을 함께 생성합니다.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($label:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::tool::error::AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($text => Ok($name::$variant),)+
                    other => Err($crate::tool::error::AppError::InvalidInput(format!(
                        "알 수 없는 {}: {}",
                        $label, other
                    ))),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::tool::error::AppError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

pub mod admin;
pub mod billing;
pub mod contract;
pub mod room;
pub mod settlement;
pub mod signing;
pub mod tenant;
pub mod transaction;

pub use admin::AdminUser;
pub use billing::{BillingDetail, BillingStatus, MonthlyBilling};
pub use contract::{Contract, ContractDetail, ContractStatus, DepositStatus, TerminationType};
pub use room::{Room, RoomStatus, RoomType};
pub use settlement::Settlement;
pub use signing::{SigningSession, SigningStatus};
pub use tenant::{Tenant, TenantType};
pub use transaction::{Transaction, TransactionCategory, TransactionType};
