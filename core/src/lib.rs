// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Core components for signing DynamoDB API requests.
//!
//! This crate provides the foundational types and traits shared by the
//! dynasign crates.
//!
//! ## Overview
//!
//! - **Context**: a container that holds implementations for HTTP sending and
//!   environment access, injected into clients at construction time.
//! - **Traits**: abstract interfaces for credential loading
//!   ([`ProvideCredential`]) and the transport ([`HttpSend`]).
//! - **Error**: the single error type returned by every fallible operation.
//!
//! ## Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use dynasign_core::{Context, ProvideCredential, Result, SigningCredential};
//!
//! #[derive(Clone, Debug)]
//! struct MyCredential {
//!     key: String,
//!     secret: String,
//! }
//!
//! impl SigningCredential for MyCredential {
//!     fn is_valid(&self) -> bool {
//!         !self.key.is_empty() && !self.secret.is_empty()
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MyLoader;
//!
//! #[async_trait]
//! impl ProvideCredential for MyLoader {
//!     type Credential = MyCredential;
//!
//!     async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
//!         let (Some(key), Some(secret)) = (ctx.env_var("MY_KEY"), ctx.env_var("MY_SECRET")) else {
//!             return Ok(None);
//!         };
//!         Ok(Some(MyCredential { key, secret }))
//!     }
//! }
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: SHA-256 and HMAC-SHA256 helpers
//! - [`time`]: UTC time sampling and SigV4 timestamp formats
//! - [`utils`]: data redaction for debug output

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::Context;
pub use context::Env;
pub use context::HttpSend;
pub use context::NoopEnv;
pub use context::NoopHttpSend;
pub use context::OsEnv;
pub use context::StaticEnv;

mod error;
pub use error::Error;
pub use error::ErrorKind;
pub use error::Result;

mod api;
pub use api::ProvideCredential;
pub use api::SigningCredential;
