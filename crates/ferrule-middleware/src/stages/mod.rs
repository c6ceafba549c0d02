//! Stock interceptors.
//!
//! | Interceptor | Short-circuits when |
//! |-------------|---------------------|
//! | [`RequireHeader`] | a header is missing or empty |
//! | [`RateLimit`] | a fixed-window request budget is spent |

mod rate_limit;
mod require_header;

pub use rate_limit::{RateKey, RateLimit};
pub use require_header::RequireHeader;
