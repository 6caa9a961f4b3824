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

//! Client tests against an in-process transport.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use dynasign_core::{Context, ErrorKind, HttpSend, StaticEnv};
use dynasign_dynamodb::{
    Client, Config, EnvCredentialProvider, Operation, Request, Response,
    StaticCredentialProvider,
};
use http::StatusCode;
use pretty_assertions::assert_eq;
use test_case::test_case;

#[derive(Debug, Clone, Default)]
struct RecordingHttpSend {
    targets: Arc<Mutex<Vec<String>>>,
}

impl RecordingHttpSend {
    fn targets(&self) -> Vec<String> {
        self.targets.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpSend for RecordingHttpSend {
    async fn http_send(
        &self,
        req: http::Request<Bytes>,
    ) -> dynasign_core::Result<http::Response<Bytes>> {
        let target = req.headers()["x-amz-target"].to_str().unwrap().to_string();
        self.targets.lock().unwrap().push(target);

        // Echo the request body so callers can check it went through verbatim.
        let mut resp = http::Response::new(req.into_body());
        if resp.body().starts_with(br#"{"reject""#) {
            *resp.status_mut() = StatusCode::BAD_REQUEST;
        }
        Ok(resp)
    }
}

fn env() -> StaticEnv {
    StaticEnv::from_pairs([
        ("AWS_ACCESS_KEY_ID", "AKIDEXAMPLE"),
        ("AWS_SECRET_ACCESS_KEY", "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY"),
        ("AWS_REGION", "eu-west-1"),
    ])
}

#[test_case(Operation::BatchGetItem, "DynamoDB_20120810.BatchGetItem")]
#[test_case(Operation::CreateTable, "DynamoDB_20120810.CreateTable")]
#[test_case(Operation::DeleteItem, "DynamoDB_20120810.DeleteItem")]
#[test_case(Operation::Scan, "DynamoDB_20120810.Scan")]
#[test_case(Operation::UpdateItem, "DynamoDB_20120810.UpdateItem")]
#[test_case(Operation::UpdateTimeToLive, "DynamoDB_20120810.UpdateTimeToLive")]
#[tokio::test]
async fn test_submit_sets_target(op: Operation, expected: &str) -> Result<()> {
    let http = RecordingHttpSend::default();
    let ctx = Context::new().with_http_send(http.clone()).with_env(env());
    let client = Client::builder()
        .context(ctx)
        .credential_provider(EnvCredentialProvider::new())
        .build()
        .await?;

    let resp = client.submit(op, r#"{"TableName":"Users"}"#).await?;
    assert_eq!(resp.payload(), r#"{"TableName":"Users"}"#);
    assert_eq!(http.targets(), vec![expected.to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_every_operation_is_dispatched() -> Result<()> {
    let http = RecordingHttpSend::default();
    let ctx = Context::new().with_http_send(http.clone());
    let client = Client::builder()
        .context(ctx)
        .credential_provider(StaticCredentialProvider::new("ak", "sk", "us-west-2"))
        .build()
        .await?;

    for op in Operation::ALL {
        client.execute(Request::new(*op, "{}")).await?;
    }

    let expected: Vec<String> = Operation::ALL.iter().map(|op| op.target()).collect();
    assert_eq!(http.targets(), expected);
    assert_eq!(expected.len(), 33);
    Ok(())
}

#[tokio::test]
async fn test_rejection_is_a_response() -> Result<()> {
    let ctx = Context::new()
        .with_http_send(RecordingHttpSend::default())
        .with_env(env());
    let client = Client::builder().context(ctx).build().await?;

    let resp = client.submit(Operation::PutItem, r#"{"reject":true}"#).await?;
    assert_eq!(
        resp,
        Response::Failure {
            status: StatusCode::BAD_REQUEST,
            payload: r#"{"reject":true}"#.to_string(),
        }
    );
    Ok(())
}

#[tokio::test]
async fn test_missing_secret_is_config_error() {
    let http = RecordingHttpSend::default();
    let ctx = Context::new().with_http_send(http.clone());

    let err = Client::builder()
        .context(ctx)
        .config(Config {
            access_key_id: Some("ak".to_string()),
            region: Some("us-east-1".to_string()),
            ..Default::default()
        })
        .build()
        .await
        .expect_err("secret access key is required");

    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    assert!(err.message().contains("AWS_SECRET_ACCESS_KEY"));
    assert!(http.targets().is_empty());
}

#[tokio::test]
async fn test_default_transport_fails() -> Result<()> {
    let client = Client::builder()
        .context(Context::new().with_env(env()))
        .build()
        .await?;

    let err = client
        .submit(Operation::ListTables, "{}")
        .await
        .expect_err("no transport configured");
    assert_eq!(err.kind(), ErrorKind::Unexpected);
    Ok(())
}
