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

use crate::Operation;
use http::StatusCode;

/// Request is one call to the DynamoDB API.
///
/// The payload is sent verbatim; it's signed over its UTF-8 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    operation: Operation,
    payload: String,
}

impl Request {
    /// Create a new request for the given operation.
    pub fn new(operation: Operation, payload: impl Into<String>) -> Self {
        Self {
            operation,
            payload: payload.into(),
        }
    }

    /// The operation to invoke.
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// The serialized request body, usually JSON.
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

/// Response of a completed call.
///
/// A call that reached the service always produces a response, even when the
/// service rejected it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The service answered with `200 OK`.
    Success {
        /// The response body.
        payload: String,
    },
    /// The service answered with any other status.
    Failure {
        /// The status returned by the service.
        status: StatusCode,
        /// The response body, typically a JSON error document.
        payload: String,
    },
}

impl Response {
    /// Classify a raw response by its status.
    pub fn from_http(resp: http::Response<String>) -> Self {
        let (parts, payload) = resp.into_parts();
        if parts.status == StatusCode::OK {
            Response::Success { payload }
        } else {
            Response::Failure {
                status: parts.status,
                payload,
            }
        }
    }

    /// Check if the service accepted the call.
    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success { .. })
    }

    /// The response body.
    pub fn payload(&self) -> &str {
        match self {
            Response::Success { payload } | Response::Failure { payload, .. } => payload,
        }
    }

    /// Consume the response and return its body.
    pub fn into_payload(self) -> String {
        match self {
            Response::Success { payload } | Response::Failure { payload, .. } => payload,
        }
    }
}
