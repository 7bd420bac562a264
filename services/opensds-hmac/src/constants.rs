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

// Headers used in the signing scheme.
pub const X_AUTH_DATE: &str = "x-auth-date";
pub const X_AUTH_TOKEN: &str = "x-auth-token";
pub const X_SUBJECT_TOKEN: &str = "x-subject-token";

// Signing scheme literals.
pub const ALGORITHM: &str = "OPENSDS-HMAC-SHA256";
pub const SECRET_PREFIX: &str = "OPENSDS";
pub const TERMINATOR: &str = "sign_request";

/// Hex SHA-256 of the empty string, used as the digest of an empty body.
pub const EMPTY_STRING_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

// Env values used by the providers.
pub const OPENSDS_ACCESS_KEY_ID: &str = "OPENSDS_ACCESS_KEY_ID";
pub const OPENSDS_SECRET_ACCESS_KEY: &str = "OPENSDS_SECRET_ACCESS_KEY";
pub const OS_AUTH_URL: &str = "OS_AUTH_URL";
pub const OS_AUTH_TOKEN: &str = "OS_AUTH_TOKEN";
pub const OS_USERNAME: &str = "OS_USERNAME";
pub const OS_PASSWORD: &str = "OS_PASSWORD";
pub const OS_USER_DOMAIN_NAME: &str = "OS_USER_DOMAIN_NAME";
pub const OS_PROJECT_NAME: &str = "OS_PROJECT_NAME";
pub const OS_PROJECT_DOMAIN_NAME: &str = "OS_PROJECT_DOMAIN_NAME";

// Provider labels stamped on credentials.
pub const STATIC_PROVIDER_NAME: &str = "StaticProvider";
pub const ENV_PROVIDER_NAME: &str = "EnvProvider";
pub const KEYSTONE_PROVIDER_NAME: &str = "KeystoneProvider";

/// AsciiSet for query keys and values.
///
/// - Encode every byte except the unreserved characters: 'A'-'Z', 'a'-'z', '0'-'9', '-', '.', '_', and '~'.
pub static QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
