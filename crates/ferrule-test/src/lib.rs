//! # Ferrule Test
//!
//! In-memory testing for Ferrule actions. Requests are materialized the same
//! way the HTTP server does it and handed to a [`Dispatcher`], so tests
//! exercise routing, interceptors, binding, serialization and error
//! translation without binding a port.
//!
//! ## Example
//!
//! ```ignore
//! use ferrule_test::{MultipartForm, TestClient};
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn creates_a_user() {
//!     let client = TestClient::new(Dispatcher::new(registry()));
//!
//!     client
//!         .post("/users")
//!         .json(&json!({ "name": "Alice" }))
//!         .send()
//!         .await
//!         .assert_status_code(200)
//!         .assert_json_eq(&json!({ "id": 1, "name": "Alice" }));
//!
//!     client
//!         .post("/avatars")
//!         .multipart(MultipartForm::new().file("avatar", "me.png", "image/png", png))
//!         .send()
//!         .await
//!         .assert_status_code(200);
//! }
//! ```
//!
//! [`Dispatcher`]: ferrule_server::Dispatcher

#![doc(html_root_url = "https://docs.rs/ferrule-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::{MultipartForm, TestRequest, TestRequestBuilder, MULTIPART_BOUNDARY};
pub use response::TestResponse;
