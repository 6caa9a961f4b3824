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

use crate::constants::*;
use crate::credential::is_valid_region;
use crate::{Credential, Request};
use bytes::Bytes;
use dynasign_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use dynasign_core::time::{format_date, format_iso8601, now, DateTime};
use dynasign_core::{Error, Result};
use http::header::{HeaderName, HeaderValue};
use http::{Method, Uri};
use log::debug;
use percent_encoding::{percent_decode_str, utf8_percent_encode};
use std::fmt::Write;

/// RequestSigner turns a [`Request`] into a signed http request for DynamoDB.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
///
/// Signing is pure computation: the signer holds no state besides an optional
/// pinned time, so one signer can be shared by any number of tasks.
#[derive(Debug, Clone, Default)]
pub struct RequestSigner {
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer that samples the current time for every request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Sign the request, returning the http request ready to be sent.
    ///
    /// The returned body holds the exact bytes that were hashed.
    pub fn sign(&self, cred: &Credential, req: &Request) -> Result<http::Request<Bytes>> {
        // Region is a single label of the signed host.
        if !is_valid_region(&cred.region) {
            return Err(Error::request_invalid(format!(
                "region {:?} is not a valid endpoint host label",
                cred.region
            )));
        }

        // Sample time exactly once: x-amz-date and the scope must agree.
        let now = self.time.unwrap_or_else(now);
        let amz_date = format_iso8601(now);

        let operation = req.operation();
        let target = operation.target();
        let host = endpoint_host(&cred.region);
        let body = Bytes::copy_from_slice(req.payload().as_bytes());
        // Content length counts encoded bytes, not chars.
        let content_length = body.len();

        let signing_key = generate_signing_key(&cred.secret_access_key, now, &cred.region, SERVICE)?;
        let creq = canonical_request_string(
            &Method::POST,
            CANONICAL_URI,
            content_length,
            &body,
            &amz_date,
            &host,
            &target,
        )?;

        // Scope: "20220313/<region>/dynamodb/aws4_request"
        let scope = credential_scope(now, &cred.region, SERVICE);
        debug!("calculated scope: {scope}");

        let signature = compute_signature(&signing_key, &creq, &amz_date, &scope)?;

        let pairs = signed_header_pairs(content_length, &host, &amz_date, &target);
        let mut authorization = HeaderValue::from_str(&authorization_header(
            &cred.access_key_id,
            &scope,
            &signed_headers(&pairs),
            &signature,
        ))?;
        authorization.set_sensitive(true);

        let mut signed = http::Request::new(body);
        *signed.method_mut() = Method::POST;
        *signed.uri_mut() = format!("https://{host}{CANONICAL_URI}").parse::<Uri>()?;

        let headers = signed.headers_mut();
        for (name, value) in pairs {
            headers.insert(HeaderName::from_static(name), HeaderValue::from_str(&value)?);
        }
        headers.insert(http::header::AUTHORIZATION, authorization);

        // Used for temporary security credentials, not part of the signed set.
        if let Some(token) = &cred.session_token {
            let mut value = HeaderValue::from_str(token).map_err(|e| {
                Error::request_invalid("session token is not a valid header value").with_source(e)
            })?;
            value.set_sensitive(true);

            headers.insert(X_AMZ_SECURITY_TOKEN, value);
        }

        debug!("signed dynamodb request {operation} for {host}");
        Ok(signed)
    }
}

/// Host of the DynamoDB endpoint in `region`.
pub fn endpoint_host(region: &str) -> String {
    format!("{SERVICE}.{region}.{DOMAIN_SUFFIX}")
}

/// Credential scope: `<date>/<region>/<service>/aws4_request`.
pub fn credential_scope(time: DateTime, region: &str, service: &str) -> String {
    format!(
        "{}/{}/{}/{}",
        format_date(time),
        region,
        service,
        SCOPE_TERMINATOR
    )
}

/// Derive the signing key scoped to the date of `time`, `region` and `service`.
///
/// Every stage keys the next one, so the chain is strictly sequential.
pub fn generate_signing_key(
    secret: &str,
    time: DateTime,
    region: &str,
    service: &str,
) -> Result<Vec<u8>> {
    // Sign secret
    let secret = format!("{KEY_PREFIX}{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), format_date(time).as_bytes())?;
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes())?;
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), service.as_bytes())?;
    // Sign request
    hmac_sha256(sign_service.as_slice(), SCOPE_TERMINATOR.as_bytes())
}

/// Build the canonical request of a DynamoDB call.
///
/// ```text
/// POST
/// /
///
/// content-length:44
/// content-type:application/x-amz-json-1.0
/// host:dynamodb.us-east-1.amazonaws.com
/// x-amz-date:20150615T000000Z
/// x-amz-target:DynamoDB_20120810.GetItem
///
/// content-length;content-type;host;x-amz-date;x-amz-target
/// <hex sha256 of payload>
/// ```
pub fn canonical_request_string(
    method: &Method,
    uri: &str,
    content_length: usize,
    payload: &[u8],
    amz_date: &str,
    host: &str,
    target: &str,
) -> Result<String> {
    // 512 is specially chosen to avoid reallocation for most requests.
    let mut f = String::with_capacity(512);

    // Insert method
    writeln!(f, "{method}")?;
    // Insert encoded path
    let path = percent_decode_str(uri)
        .decode_utf8()
        .map_err(|e| Error::request_invalid("failed to decode path").with_source(e))?;
    writeln!(f, "{}", utf8_percent_encode(&path, &AWS_URI_ENCODE_SET))?;
    // Insert query, dynamodb calls never carry one.
    writeln!(f)?;
    // Insert signed headers
    let pairs = signed_header_pairs(content_length, host, amz_date, target);
    for (name, value) in pairs.iter() {
        writeln!(f, "{name}:{value}")?;
    }
    writeln!(f)?;
    writeln!(f, "{}", signed_headers(&pairs))?;
    // Insert payload hash
    write!(f, "{}", hex_sha256(payload))?;

    Ok(f)
}

/// StringToSign:
///
/// ```text
/// AWS4-HMAC-SHA256
/// 20220313T072004Z
/// 20220313/<region>/<service>/aws4_request
/// <hashed_canonical_request>
/// ```
pub fn string_to_sign(canonical_request: &str, amz_date: &str, scope: &str) -> Result<String> {
    let mut f = String::with_capacity(256);
    writeln!(f, "{ALGORITHM}")?;
    writeln!(f, "{amz_date}")?;
    writeln!(f, "{scope}")?;
    write!(f, "{}", hex_sha256(canonical_request.as_bytes()))?;
    Ok(f)
}

/// Sign the canonical request with a derived signing key, returning the
/// signature in lowercase hex.
pub fn compute_signature(
    signing_key: &[u8],
    canonical_request: &str,
    amz_date: &str,
    scope: &str,
) -> Result<String> {
    let string_to_sign = string_to_sign(canonical_request, amz_date, scope)?;
    hex_hmac_sha256(signing_key, string_to_sign.as_bytes())
}

/// Value of the `Authorization` header.
pub fn authorization_header(
    access_key_id: &str,
    scope: &str,
    signed_headers: &str,
    signature: &str,
) -> String {
    format!(
        "{ALGORITHM} Credential={access_key_id}/{scope}, SignedHeaders={signed_headers}, Signature={signature}"
    )
}

/// Headers bound into the signature, sorted by name.
///
/// The canonical header block, the `SignedHeaders` list and the headers
/// attached to the outgoing request are all rendered from this array.
fn signed_header_pairs(
    content_length: usize,
    host: &str,
    amz_date: &str,
    target: &str,
) -> [(&'static str, String); 5] {
    [
        (CONTENT_LENGTH, content_length.to_string()),
        (CONTENT_TYPE, CONTENT_TYPE_AMZ_JSON.to_string()),
        (HOST, host.to_string()),
        (X_AMZ_DATE, amz_date.to_string()),
        (X_AMZ_TARGET, target.to_string()),
    ]
}

fn signed_headers(pairs: &[(&'static str, String)]) -> String {
    pairs
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(";")
}
