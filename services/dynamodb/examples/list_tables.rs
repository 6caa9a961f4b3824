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
use dynasign_core::{Context, OsEnv};
use dynasign_dynamodb::{Client, Operation, Response};
use dynasign_http_send_reqwest::ReqwestHttpSend;
use serde_json::json;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Create context with a real transport and the process environment
    let ctx = Context::new()
        .with_http_send(ReqwestHttpSend::new(reqwest::Client::new()))
        .with_env(OsEnv);

    // Credential comes from AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY,
    // AWS_SESSION_TOKEN and AWS_REGION.
    let client = match Client::builder().context(ctx).build().await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to build client: {e}");
            return Ok(());
        }
    };
    println!("Using region {}", client.credential().region);

    // Example 1: List tables
    println!("Example 1: Listing DynamoDB tables");

    let body = serde_json::to_string(&json!({ "Limit": 10 }))?;
    match client.submit(Operation::ListTables, body).await {
        Ok(Response::Success { payload }) => {
            let json: serde_json::Value = serde_json::from_str(&payload)?;
            println!("Tables: {}", serde_json::to_string_pretty(&json)?);
        }
        Ok(Response::Failure { status, payload }) => {
            eprintln!("Error response ({status}): {payload}");
        }
        Err(e) => eprintln!("Request failed: {e}"),
    }

    // Example 2: Describe a specific table
    println!("\nExample 2: Describe a table");

    let body = serde_json::to_string(&json!({ "TableName": "MyTestTable" }))?;
    match client.submit(Operation::DescribeTable, body).await {
        Ok(resp) if resp.is_success() => println!("Table: {}", resp.payload()),
        Ok(resp) => eprintln!("Error response: {}", resp.payload()),
        Err(e) => eprintln!("Request failed: {e}"),
    }

    Ok(())
}
