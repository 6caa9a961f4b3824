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


use anyhow::Result;
use bytes::Bytes;
use dynasign_core::Context;
use dynasign_http_send_reqwest::ReqwestHttpSend;
use reqwest::Client;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    // Deadlines are a transport concern: configure them on the reqwest client.
    let client = Client::builder()
        .timeout(Duration::from_secs(10))
        .connect_timeout(Duration::from_secs(3))
        .user_agent("dynasign-example/0.1")
        .build()?;

    let ctx = Context::new().with_http_send(ReqwestHttpSend::new(client));

    // An unsigned call: DynamoDB answers with an error document, which the
    // transport returns as a normal response.
    let req = http::Request::builder()
        .method("POST")
        .uri("https://dynamodb.us-east-1.amazonaws.com/")
        .header("content-type", "application/x-amz-json-1.0")
        .header("x-amz-target", "DynamoDB_20120810.ListTables")
        .body(Bytes::from_static(b"{}"))?;

    match ctx.http_send_as_string(req).await {
        Ok(resp) => {
            println!("Response status: {}", resp.status());
            println!("Response body: {}", resp.body());
        }
        Err(e) => eprintln!("Request failed: {e}"),
    }

    Ok(())
}
