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

//! Signed DynamoDB client.
//!
//! This crate signs DynamoDB JSON API calls with AWS Signature Version 4 and
//! sends them through the transport injected in [`dynasign_core::Context`].
//!
//! ## Example
//!
//! ```no_run
//! use dynasign_core::{Context, OsEnv, Result};
//! use dynasign_dynamodb::{Client, Operation, Response};
//!
//! # async fn example(ctx: Context) -> Result<()> {
//! // Credential is resolved from AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY,
//! // AWS_SESSION_TOKEN and AWS_REGION.
//! let client = Client::builder().context(ctx.with_env(OsEnv)).build().await?;
//!
//! match client.submit(Operation::ListTables, "{}").await? {
//!     Response::Success { payload } => println!("tables: {payload}"),
//!     Response::Failure { status, payload } => println!("rejected with {status}: {payload}"),
//! }
//! # Ok(())
//! # }
//! ```

mod constants;

mod operation;
pub use operation::Operation;

mod credential;
pub use credential::Credential;

mod config;
pub use config::Config;

mod provide_credential;
pub use provide_credential::*;

mod request;
pub use request::Request;
pub use request::Response;

mod sign_request;
pub use sign_request::*;

mod client;
pub use client::Client;
pub use client::ClientBuilder;
