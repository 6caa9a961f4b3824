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
use crate::Credential;
use dynasign_core::utils::Redact;
use dynasign_core::{Context, Error, Result};
use std::fmt::{Debug, Formatter};

/// Config for the dynamodb client.
///
/// Explicitly set fields always win. [`Config::from_env`] only fills the
/// fields that are still unset.
#[derive(Clone, Default)]
pub struct Config {
    /// `access_key_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_ACCESS_KEY_ID`, then `AWS_ACCESS_KEY`
    pub access_key_id: Option<String>,
    /// `secret_access_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_SECRET_ACCESS_KEY`, then `AWS_SECRET_KEY`
    pub secret_access_key: Option<String>,
    /// `session_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_SESSION_TOKEN`
    pub session_token: Option<String>,
    /// `region` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_REGION`
    pub region: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .field("session_token", &Redact::from(&self.session_token))
            .field("region", &self.region)
            .finish()
    }
}

impl Config {
    /// Load unset fields from env.
    ///
    /// Empty env values are ignored. `AWS_ACCESS_KEY` and `AWS_SECRET_KEY` are
    /// read only when the standard names are unset.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let var = |key: &str| ctx.env_var(key).filter(|v| !v.is_empty());

        if self.access_key_id.is_none() {
            self.access_key_id = var(AWS_ACCESS_KEY_ID).or_else(|| var(AWS_ACCESS_KEY));
        }
        if self.secret_access_key.is_none() {
            self.secret_access_key =
                var(AWS_SECRET_ACCESS_KEY).or_else(|| var(AWS_SECRET_KEY));
        }
        if self.session_token.is_none() {
            self.session_token = var(AWS_SESSION_TOKEN);
        }
        if self.region.is_none() {
            self.region = var(AWS_REGION);
        }

        self
    }

    /// Build a credential out of this config.
    ///
    /// Returns `Ok(None)` if neither access key nor secret key is set, and a
    /// config error naming every missing mandatory field otherwise. A region
    /// that can't be used as an endpoint host label is a config error too.
    pub fn to_credential(&self) -> Result<Option<Credential>> {
        if self.access_key_id.is_none() && self.secret_access_key.is_none() {
            return Ok(None);
        }

        let (Some(ak), Some(sk), Some(region)) = (
            &self.access_key_id,
            &self.secret_access_key,
            &self.region,
        ) else {
            let missing = [
                (self.access_key_id.is_none(), AWS_ACCESS_KEY_ID),
                (self.secret_access_key.is_none(), AWS_SECRET_ACCESS_KEY),
                (self.region.is_none(), AWS_REGION),
            ]
            .into_iter()
            .filter_map(|(missing, name)| missing.then_some(name))
            .collect::<Vec<_>>();

            return Err(Error::config_invalid(format!(
                "missing mandatory aws parameters: {}",
                missing.join(", ")
            )));
        };

        if !is_valid_region(region) {
            return Err(Error::config_invalid(format!(
                "{AWS_REGION} must only contain lowercase letters, digits and '-', got {region:?}"
            )));
        }

        Ok(Some(Credential {
            access_key_id: ak.clone(),
            secret_access_key: sk.clone(),
            session_token: self.session_token.clone(),
            region: region.clone(),
        }))
    }
}
