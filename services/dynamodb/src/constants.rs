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

use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

// Signing scheme.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";
pub const SERVICE: &str = "dynamodb";
pub const SCOPE_TERMINATOR: &str = "aws4_request";
pub const KEY_PREFIX: &str = "AWS4";

// Wire protocol.
pub const API_VERSION: &str = "DynamoDB_20120810";
pub const DOMAIN_SUFFIX: &str = "amazonaws.com";
pub const CANONICAL_URI: &str = "/";
pub const CONTENT_TYPE_AMZ_JSON: &str = "application/x-amz-json-1.0";

// Headers used in dynamodb requests.
pub const CONTENT_LENGTH: &str = "content-length";
pub const CONTENT_TYPE: &str = "content-type";
pub const HOST: &str = "host";
pub const X_AMZ_DATE: &str = "x-amz-date";
pub const X_AMZ_TARGET: &str = "x-amz-target";
pub const X_AMZ_SECURITY_TOKEN: &str = "x-amz-security-token";

// Env values used to resolve the credential.
pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
pub const AWS_REGION: &str = "AWS_REGION";
// Legacy names, only read when the standard ones are unset.
pub const AWS_ACCESS_KEY: &str = "AWS_ACCESS_KEY";
pub const AWS_SECRET_KEY: &str = "AWS_SECRET_KEY";

/// AsciiSet for [AWS UriEncode](https://docs.aws.amazon.com/AmazonS3/latest/API/sig-v4-header-based-auth.html)
///
/// - URI encode every byte except the unreserved characters: 'A'-'Z', 'a'-'z', '0'-'9', '-', '.', '_', and '~'.
/// - `/` is kept since it separates path segments.
pub static AWS_URI_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
