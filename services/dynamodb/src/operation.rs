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

use crate::constants::API_VERSION;
use dynasign_core::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

macro_rules! operations {
    ($($(#[$meta:meta])* $variant:ident => $wire:literal,)+) => {
        /// Operation is the closed set of DynamoDB API operations.
        ///
        /// Every variant carries its wire name, sent as
        /// `x-amz-target: DynamoDB_20120810.<WireName>`.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Operation {
            $($(#[$meta])* $variant,)+
        }

        impl Operation {
            /// All supported operations.
            pub const ALL: &'static [Operation] = &[$(Operation::$variant,)+];

            /// The name of this operation on the wire.
            pub const fn wire_name(self) -> &'static str {
                match self {
                    $(Operation::$variant => $wire,)+
                }
            }
        }
    };
}

operations! {
    /// Read up to 100 items from one or more tables.
    BatchGetItem => "BatchGetItem",
    /// Put or delete up to 25 items in one or more tables.
    BatchWriteItem => "BatchWriteItem",
    CreateBackup => "CreateBackup",
    CreateGlobalTable => "CreateGlobalTable",
    CreateTable => "CreateTable",
    DeleteBackup => "DeleteBackup",
    DeleteItem => "DeleteItem",
    DeleteTable => "DeleteTable",
    DescribeBackup => "DescribeBackup",
    DescribeContinuousBackups => "DescribeContinuousBackups",
    DescribeGlobalTable => "DescribeGlobalTable",
    DescribeGlobalTableSettings => "DescribeGlobalTableSettings",
    DescribeLimits => "DescribeLimits",
    DescribeTable => "DescribeTable",
    DescribeTimeToLive => "DescribeTimeToLive",
    /// Read a single item by primary key.
    GetItem => "GetItem",
    ListBackups => "ListBackups",
    ListGlobalTables => "ListGlobalTables",
    ListTables => "ListTables",
    ListTagsOfResource => "ListTagsOfResource",
    /// Create or replace a single item.
    PutItem => "PutItem",
    Query => "Query",
    RestoreTableFromBackup => "RestoreTableFromBackup",
    RestoreTableToPointInTime => "RestoreTableToPointInTime",
    Scan => "Scan",
    TagResource => "TagResource",
    UntagResource => "UntagResource",
    UpdateContinuousBackups => "UpdateContinuousBackups",
    UpdateGlobalTable => "UpdateGlobalTable",
    UpdateGlobalTableSettings => "UpdateGlobalTableSettings",
    UpdateItem => "UpdateItem",
    UpdateTable => "UpdateTable",
    UpdateTimeToLive => "UpdateTimeToLive",
}

impl Operation {
    /// Value of the `x-amz-target` header for this operation.
    pub fn target(self) -> String {
        format!("{API_VERSION}.{}", self.wire_name())
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .iter()
            .copied()
            .find(|op| op.wire_name() == s)
            .ok_or_else(|| Error::request_invalid(format!("unknown dynamodb operation: {s}")))
    }
}
