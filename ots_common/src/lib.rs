mod helpers;
pub mod op;
mod pkr;

pub use helpers::parse_boolean_flag;
pub use pkr::{Pkr, PkrConversionError, PKR_CURRENCY_CODE};
