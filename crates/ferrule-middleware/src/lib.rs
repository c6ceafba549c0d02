//! # Ferrule Middleware
//!
//! Per-action interceptors that run before argument binding.
//!
//! Each action carries its own ordered [`InterceptorChain`]. Interceptors run
//! in declaration order; the first one to return a result short-circuits the
//! chain and the action never runs.
//!
//! ```text
//! Request → Interceptor 1 → Interceptor 2 → … → Binder → Action
//!               │                 │
//!               └── Some(result) ─┴──→ Serializer (status 200)
//! ```
//!
//! ## Example
//!
//! ```
//! use ferrule_core::{ActionResult, IncomingRequest};
//! use ferrule_middleware::{FnInterceptor, InterceptorChain};
//! use ferrule_middleware::stages::RequireHeader;
//! use http::header::AUTHORIZATION;
//! use http::Method;
//!
//! let chain = InterceptorChain::new()
//!     .with(RequireHeader::new(AUTHORIZATION).redirect_to("/login"))
//!     .with(FnInterceptor::new("audit", |_request| None));
//!
//! let request = IncomingRequest::new(Method::GET, "/admin");
//! assert_eq!(chain.run(&request), Some(ActionResult::redirect("/login")));
//! ```

#![doc(html_root_url = "https://docs.rs/ferrule-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod chain;
mod interceptor;
pub mod stages;

pub use chain::InterceptorChain;
pub use interceptor::{FnInterceptor, Interceptor};
