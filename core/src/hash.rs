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

//! Hash related utils.

use crate::Error;
use crate::Result;
use hmac::Hmac;
use hmac::Mac;
use sha2::Digest;
use sha2::Sha256;

/// SHA256 hash.
pub fn sha256(content: &[u8]) -> Vec<u8> {
    Sha256::digest(content).to_vec()
}

/// Hex encoded SHA256 hash.
///
/// Use this function instead of `hex::encode(sha256(content))` can reduce
/// extra copy.
pub fn hex_sha256(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content).as_slice())
}

/// HMAC with SHA256 hash.
///
/// Returns an error if the MAC can't be keyed with the given key.
pub fn hmac_sha256(key: &[u8], content: &[u8]) -> Result<Vec<u8>> {
    let mut h = new_hmac_sha256(key)?;
    h.update(content);

    Ok(h.finalize().into_bytes().to_vec())
}

/// Hex encoded HMAC with SHA256 hash.
///
/// Use this function instead of `hex::encode(hmac_sha256(key, content))` can
/// reduce extra copy.
pub fn hex_hmac_sha256(key: &[u8], content: &[u8]) -> Result<String> {
    let mut h = new_hmac_sha256(key)?;
    h.update(content);

    Ok(hex::encode(h.finalize().into_bytes()))
}

fn new_hmac_sha256(key: &[u8]) -> Result<Hmac<Sha256>> {
    Hmac::<Sha256>::new_from_slice(key)
        .map_err(|e| Error::unexpected(format!("hmac-sha256 is unavailable: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hex_sha256() {
        assert_eq!(
            hex_sha256(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            hex_sha256(b"Hello, World!"),
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );
        assert_eq!(hex::encode(sha256(b"")), hex_sha256(b""));
    }

    #[test]
    fn test_hmac_sha256() -> Result<()> {
        assert_eq!(
            hex_hmac_sha256(b"key", b"message")?,
            "6e9ef29b75fffc5b7abae527d58fdadb2fe42e7219011976917343065f58ed4a"
        );
        assert_eq!(
            hex::encode(hmac_sha256(b"key", b"message")?),
            hex_hmac_sha256(b"key", b"message")?
        );
        Ok(())
    }

    #[test]
    fn test_hmac_sha256_accepts_any_key_length() -> Result<()> {
        assert_eq!(hmac_sha256(b"", b"message")?.len(), 32);
        assert_eq!(hmac_sha256(&[7u8; 200], b"message")?.len(), 32);
        Ok(())
    }
}
