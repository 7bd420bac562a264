use std::mem;
use std::str::FromStr;

use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::Method;
use http::Uri;

use crate::Result;

/// Signing context for request.
///
/// Both absolute (`https://host/path?q`) and origin-form (`/path?q`) requests
/// are supported, so the same type serves clients and the verifying server.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme, absent for origin-form requests.
    pub scheme: Option<Scheme>,
    /// HTTP authority, absent for origin-form requests.
    pub authority: Option<Authority>,
    /// HTTP path, still percent encoded as sent.
    pub path: String,
    /// HTTP query parameters.
    ///
    /// Filled with percent decoded pairs by [`SigningRequest::build`]; signers
    /// replace them with their canonical encoded form before [`SigningRequest::apply`].
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing context from http::request::Parts.
    ///
    /// Headers are moved out of `parts` and must be returned with [`SigningRequest::apply`].
    /// The uri is left untouched until `apply` succeeds.
    pub fn build(parts: &mut http::request::Parts) -> Self {
        let uri = parts.uri.clone().into_parts();
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme,
            authority: uri.authority,
            path: paq.path().to_string(),
            query: paq
                .query()
                .map(|v| {
                    form_urlencoded::parse(v.as_bytes())
                        .map(|(k, v)| (k.into_owned(), v.into_owned()))
                        .collect()
                })
                .unwrap_or_default(),

            // Take the headers out of the request to avoid copy.
            // We will return it back when apply the context.
            headers: mem::take(&mut parts.headers),
        }
    }

    /// Apply the signing context back to http::request::Parts.
    ///
    /// Headers are always returned. The uri is only replaced when the new one
    /// can be built, so a failure leaves the original uri in place.
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        // Return headers back.
        mem::swap(&mut parts.headers, &mut self.headers);
        parts.method = self.method;

        let paq = if self.query.is_empty() {
            self.path
        } else {
            let mut s = self.path;
            s.push('?');
            s.push_str(&Self::query_to_string(&self.query, "=", "&"));
            s
        };

        let mut uri_parts = http::uri::Parts::default();
        uri_parts.scheme = self.scheme;
        uri_parts.authority = self.authority;
        uri_parts.path_and_query = Some(PathAndQuery::from_str(&paq)?);
        parts.uri = Uri::from_parts(uri_parts)?;

        Ok(())
    }

    /// Convert query pairs to string, keeping the given order.
    ///
    /// `sep` is written even when the value is empty.
    ///
    /// ```shell
    /// [(a, b), (c, "")] => "a=b&c="
    /// ```
    pub fn query_to_string(query: &[(String, String)], sep: &str, join: &str) -> String {
        let mut s = String::with_capacity(16);

        for (idx, (k, v)) in query.iter().enumerate() {
            if idx != 0 {
                s.push_str(join);
            }

            s.push_str(k);
            s.push_str(sep);
            s.push_str(v);
        }

        s
    }

    /// Normalize header value.
    ///
    /// Leading and trailing spaces are removed and every interior run of two
    /// or more spaces is collapsed into one. Other whitespace is kept as is.
    pub fn header_value_normalize(v: &str) -> String {
        let mut s = String::with_capacity(v.len());
        let mut last_is_space = false;

        for c in v.trim_matches(' ').chars() {
            if c == ' ' {
                if !last_is_space {
                    s.push(c);
                }
                last_is_space = true;
            } else {
                s.push(c);
                last_is_space = false;
            }
        }

        s
    }

    /// Convert sorted headers to string.
    ///
    /// ```shell
    /// [(a, b), (c, d)] => "a:b\nc:d"
    /// ```
    pub fn header_to_string(mut headers: Vec<(String, String)>, sep: &str, join: &str) -> String {
        let mut s = String::with_capacity(16);

        // Sort via header name.
        headers.sort();

        for (idx, (k, v)) in headers.into_iter().enumerate() {
            if idx != 0 {
                s.push_str(join);
            }

            s.push_str(&k);
            s.push_str(sep);
            s.push_str(&v);
        }

        s
    }
}
