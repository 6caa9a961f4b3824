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

use crate::{
    Config, ConfigCredentialProvider, Credential, Operation, Request, RequestSigner, Response,
};
use dynasign_core::{Context, Error, ProvideCredential, Result, SigningCredential};
use log::{debug, warn};
use std::sync::Arc;

/// Client sends signed requests to DynamoDB.
///
/// The credential is resolved once by [`ClientBuilder::build`] and stays
/// fixed for the lifetime of the client. Cloning is cheap and clones may be
/// used from any number of tasks.
///
/// ```no_run
/// use dynasign_core::Context;
/// use dynasign_dynamodb::{Client, Operation};
/// # use dynasign_core::Result;
///
/// # async fn example(ctx: Context) -> Result<()> {
/// let client = Client::builder().context(ctx).build().await?;
/// let resp = client.submit(Operation::ListTables, "{}").await?;
/// println!("{}", resp.payload());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    ctx: Context,
    credential: Credential,
    signer: RequestSigner,
}

impl Client {
    /// Create a builder for the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// The credential used to sign every request.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Invoke `operation` with a serialized `payload`.
    pub async fn submit(
        &self,
        operation: Operation,
        payload: impl Into<String>,
    ) -> Result<Response> {
        self.execute(Request::new(operation, payload)).await
    }

    /// Sign and send the request.
    ///
    /// A response with any status is returned as `Ok`; only failures to
    /// complete the exchange are errors. Requests are never retried.
    pub async fn execute(&self, req: Request) -> Result<Response> {
        let operation = req.operation();
        let signed = self.signer.sign(&self.credential, &req)?;
        debug!("sending dynamodb request {operation} to {}", signed.uri());

        let resp = self.ctx.http_send_as_string(signed).await.map_err(|err| {
            Error::unexpected(format!("failed to execute dynamodb request {operation}"))
                .with_source(err)
        })?;

        let resp = Response::from_http(resp);
        match &resp {
            Response::Success { .. } => debug!("dynamodb request {operation} succeeded"),
            Response::Failure { status, payload } => {
                warn!("dynamodb request {operation} failed with status {status}: {payload}")
            }
        }
        Ok(resp)
    }
}

/// Builder for [`Client`].
#[derive(Debug, Default)]
pub struct ClientBuilder {
    ctx: Context,
    config: Config,
    provider: Option<Box<dyn ProvideCredential<Credential = Credential>>>,
    signer: RequestSigner,
}

impl ClientBuilder {
    /// Set the context holding the transport and the environment.
    pub fn context(mut self, ctx: Context) -> Self {
        self.ctx = ctx;
        self
    }

    /// Set the config used to resolve the credential.
    ///
    /// Unset fields are filled from the environment of the context.
    /// Ignored if a credential provider is set.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the credential provider, replacing the config based resolution.
    pub fn credential_provider(
        mut self,
        provider: impl ProvideCredential<Credential = Credential>,
    ) -> Self {
        self.provider = Some(Box::new(provider));
        self
    }

    /// Set the request signer.
    ///
    /// # Note
    ///
    /// The default signer takes current time for every request.
    /// Only use this function for testing.
    pub fn signer(mut self, signer: RequestSigner) -> Self {
        self.signer = signer;
        self
    }

    /// Resolve the credential and build the client.
    ///
    /// Fails with a config error if no complete credential can be found; no
    /// request is attempted in that case.
    pub async fn build(self) -> Result<Client> {
        let provider: Box<dyn ProvideCredential<Credential = Credential>> = match self.provider {
            Some(provider) => provider,
            None => Box::new(ConfigCredentialProvider::new(Arc::new(self.config))),
        };

        let Some(credential) = provider.provide_credential(&self.ctx).await? else {
            return Err(Error::config_invalid(
                "no dynamodb credential found in config or environment",
            ));
        };
        if !credential.is_valid() {
            return Err(Error::credential_invalid(
                "access key id, secret access key and region must not be empty",
            ));
        }
        debug!("dynamodb client uses credential {credential:?}");

        Ok(Client {
            ctx: self.ctx,
            credential,
            signer: self.signer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::StaticCredentialProvider;
    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::{TimeZone, Utc};
    use dynasign_core::{ErrorKind, HttpSend, StaticEnv};
    use http::StatusCode;
    use pretty_assertions::assert_eq;
    use std::sync::{Mutex, MutexGuard};

    /// MockHttpSend records every request and answers with a canned response.
    #[derive(Debug, Clone)]
    struct MockHttpSend {
        status: Option<StatusCode>,
        body: &'static str,
        requests: Arc<Mutex<Vec<http::Request<Bytes>>>>,
    }

    impl MockHttpSend {
        fn respond(status: StatusCode, body: &'static str) -> Self {
            Self {
                status: Some(status),
                body,
                requests: Arc::default(),
            }
        }

        fn broken() -> Self {
            Self {
                status: None,
                body: "",
                requests: Arc::default(),
            }
        }

        fn requests(&self) -> MutexGuard<'_, Vec<http::Request<Bytes>>> {
            self.requests.lock().unwrap()
        }
    }

    #[async_trait]
    impl HttpSend for MockHttpSend {
        async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
            self.requests.lock().unwrap().push(req);

            let Some(status) = self.status else {
                return Err(Error::unexpected("connection reset by peer"));
            };
            let mut resp = http::Response::new(Bytes::from_static(self.body.as_bytes()));
            *resp.status_mut() = status;
            Ok(resp)
        }
    }

    fn full_env() -> StaticEnv {
        StaticEnv::from_pairs([
            (AWS_ACCESS_KEY_ID, "AKIDEXAMPLE"),
            (AWS_SECRET_ACCESS_KEY, "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY"),
            (AWS_REGION, "us-east-1"),
        ])
    }

    #[tokio::test]
    async fn test_submit_success() -> anyhow::Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();

        let http = MockHttpSend::respond(StatusCode::OK, r#"{"TableNames":["Users"]}"#);
        let ctx = Context::new()
            .with_http_send(http.clone())
            .with_env(full_env());
        let client = Client::builder().context(ctx).build().await?;

        let resp = client.submit(Operation::ListTables, "{}").await?;
        assert_eq!(
            resp,
            Response::Success {
                payload: r#"{"TableNames":["Users"]}"#.to_string()
            }
        );

        let requests = http.requests();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.method(), http::Method::POST);
        assert_eq!(req.uri().to_string(), "https://dynamodb.us-east-1.amazonaws.com/");
        assert_eq!(req.headers()[X_AMZ_TARGET], "DynamoDB_20120810.ListTables");
        assert_eq!(req.body().as_ref(), b"{}");
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_remote_rejection() -> anyhow::Result<()> {
        let body = r#"{"__type":"com.amazonaws.dynamodb.v20120810#ResourceNotFoundException","message":"Requested resource not found"}"#;
        let http = MockHttpSend::respond(StatusCode::BAD_REQUEST, body);
        let ctx = Context::new()
            .with_http_send(http.clone())
            .with_env(full_env());
        let client = Client::builder().context(ctx).build().await?;

        let resp = client
            .submit(Operation::DescribeTable, r#"{"TableName":"Missing"}"#)
            .await?;
        assert!(!resp.is_success());
        assert_eq!(
            resp,
            Response::Failure {
                status: StatusCode::BAD_REQUEST,
                payload: body.to_string(),
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_submit_transport_error() -> anyhow::Result<()> {
        let http = MockHttpSend::broken();
        let ctx = Context::new()
            .with_http_send(http.clone())
            .with_env(full_env());
        let client = Client::builder().context(ctx).build().await?;

        let err = client
            .submit(Operation::ListTables, "{}")
            .await
            .expect_err("transport error must be returned");
        assert_eq!(err.kind(), ErrorKind::Unexpected);
        assert!(std::error::Error::source(&err).is_some());
        // Never retried.
        assert_eq!(http.requests().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_build_without_region() {
        let http = MockHttpSend::respond(StatusCode::OK, "{}");
        let ctx = Context::new()
            .with_http_send(http.clone())
            .with_env(StaticEnv::from_pairs([
                (AWS_ACCESS_KEY_ID, "AKIDEXAMPLE"),
                (AWS_SECRET_ACCESS_KEY, "secret"),
            ]));

        let err = Client::builder()
            .context(ctx)
            .build()
            .await
            .expect_err("region is required");
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        assert!(err.message().contains(AWS_REGION));
        assert!(http.requests().is_empty());
    }

    #[tokio::test]
    async fn test_build_without_credential() {
        let http = MockHttpSend::respond(StatusCode::OK, "{}");
        let ctx = Context::new().with_http_send(http.clone());

        let err = Client::builder()
            .context(ctx)
            .build()
            .await
            .expect_err("credential is required");
        assert!(err.is_config_error());
        assert!(http.requests().is_empty());
    }

    #[tokio::test]
    async fn test_build_with_empty_credential() {
        let err = Client::builder()
            .credential_provider(StaticCredentialProvider::new("", "", "us-east-1"))
            .build()
            .await
            .expect_err("empty credential is invalid");
        assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
    }

    #[tokio::test]
    async fn test_build_with_invalid_region() {
        let http = MockHttpSend::respond(StatusCode::OK, "{}");
        let mut env = full_env();
        env.envs
            .insert(AWS_REGION.to_string(), "us-east-1.evil.example/x".to_string());
        let ctx = Context::new().with_http_send(http.clone()).with_env(env);

        let err = Client::builder()
            .context(ctx)
            .build()
            .await
            .expect_err("region must be a host label");
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);

        let err = Client::builder()
            .context(Context::new().with_http_send(http.clone()))
            .credential_provider(StaticCredentialProvider::new(
                "AKIDEXAMPLE",
                "secret",
                "us-east-1.evil.example/x",
            ))
            .build()
            .await
            .expect_err("region must be a host label");
        assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
        assert!(http.requests().is_empty());
    }

    #[tokio::test]
    async fn test_build_with_config() -> anyhow::Result<()> {
        let ctx = Context::new().with_env(full_env());
        let client = Client::builder()
            .context(ctx)
            .config(Config {
                region: Some("ap-northeast-1".to_string()),
                ..Default::default()
            })
            .build()
            .await?;

        assert_eq!(client.credential().access_key_id, "AKIDEXAMPLE");
        assert_eq!(client.credential().region, "ap-northeast-1");
        Ok(())
    }

    #[tokio::test]
    async fn test_execute_golden_authorization() -> anyhow::Result<()> {
        let http = MockHttpSend::respond(StatusCode::OK, "{}");
        let client = Client::builder()
            .context(Context::new().with_http_send(http.clone()))
            .credential_provider(StaticCredentialProvider::new(
                "AKIDEXAMPLE",
                "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY",
                "us-east-1",
            ))
            .signer(
                RequestSigner::new().with_time(Utc.with_ymd_and_hms(2015, 6, 15, 0, 0, 0).unwrap()),
            )
            .build()
            .await?;

        client
            .execute(Request::new(
                Operation::GetItem,
                r#"{"TableName":"Users","Key":{"id":{"S":"1"}}}"#,
            ))
            .await?;

        let requests = http.requests();
        assert_eq!(
            requests[0].headers()[http::header::AUTHORIZATION],
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150615/us-east-1/dynamodb/aws4_request, SignedHeaders=content-length;content-type;host;x-amz-date;x-amz-target, Signature=187da7f67ae358f2b36b2f2b39772468d3dd3378334cad1a431c3a63cd01aad7"
        );
        assert_eq!(requests[0].headers()[X_AMZ_DATE], "20150615T000000Z");
        Ok(())
    }

    #[tokio::test]
    async fn test_execute_with_session_token() -> anyhow::Result<()> {
        let http = MockHttpSend::respond(StatusCode::OK, "{}");
        let mut env = full_env();
        env.envs
            .insert(AWS_SESSION_TOKEN.to_string(), "session-token".to_string());
        let ctx = Context::new().with_http_send(http.clone()).with_env(env);
        let client = Client::builder().context(ctx).build().await?;

        client.submit(Operation::ListTables, "{}").await?;

        let requests = http.requests();
        let headers = requests[0].headers();
        assert_eq!(headers[X_AMZ_SECURITY_TOKEN], "session-token");
        let auth = headers[http::header::AUTHORIZATION].to_str()?;
        assert!(auth.contains(
            "SignedHeaders=content-length;content-type;host;x-amz-date;x-amz-target,"
        ));
        Ok(())
    }
}
