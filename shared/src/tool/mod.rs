pub mod error;
pub mod money;
pub mod month;

// Re-export commonly used types
pub use error::*;
pub use money::{format_won, format_won_signed, split_vat, vat_of};
pub use month::YearMonth;
