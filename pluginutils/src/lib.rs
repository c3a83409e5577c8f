use std::collections::HashMap;
use std::ffi::{CStr, CString, NulError};
use std::str::Utf8Error;

use serde_json::{Map, Value};

mod abi;

pub use abi::{
    FieldAccessor, HeaderAccessor, HostAccessors, accessors, request_get_body,
    request_get_header, request_get_method, request_get_uri,
};

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("request {field} contains an interior NUL byte")]
    InteriorNul {
        field: &'static str,
        #[source]
        source: NulError,
    },
    #[error("request {field} is not valid UTF-8")]
    Utf8 {
        field: String,
        #[source]
        source: Utf8Error,
    },
    #[error("failed to serialize headers: {0}")]
    Json(#[from] serde_json::Error),
}

/// A request as the host owns it while a trigger plugin runs.
///
/// Plugins only ever see a `*const c_void` to this value and read it through
/// the `request_get_*` accessors. Header names are stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CRequest {
    pub(crate) method: CString,
    pub(crate) uri: CString,
    pub(crate) headers: HashMap<CString, CString>,
    pub(crate) body: CString,
}

impl CRequest {
    pub fn new(
        method: impl Into<Vec<u8>>,
        uri: impl Into<Vec<u8>>,
        body: impl Into<Vec<u8>>,
    ) -> Result<Self, RequestError> {
        Ok(Self {
            method: c_field("method", method)?,
            uri: c_field("uri", uri)?,
            headers: HashMap::new(),
            body: c_field("body", body)?,
        })
    }

    pub fn with_header(
        mut self,
        name: &str,
        value: impl Into<Vec<u8>>,
    ) -> Result<Self, RequestError> {
        let name = c_field("header name", name.to_ascii_lowercase())?;
        let value = c_field("header value", value)?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn with_headers<I, N, V>(self, headers: I) -> Result<Self, RequestError>
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: Into<Vec<u8>>,
    {
        headers
            .into_iter()
            .try_fold(self, |request, (name, value)| request.with_header(name.as_ref(), value))
    }

    pub fn method(&self) -> Result<&str, RequestError> {
        utf8("method", &self.method)
    }

    pub fn uri(&self) -> Result<&str, RequestError> {
        utf8("uri", &self.uri)
    }

    pub fn body(&self) -> Result<&str, RequestError> {
        utf8("body", &self.body)
    }

    /// Case-insensitive header lookup. Values that are not UTF-8 read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = CString::new(name.to_ascii_lowercase()).ok()?;
        self.headers.get(name.as_c_str()).and_then(|v| v.to_str().ok())
    }

    pub(crate) fn header_c(&self, name: &CStr) -> Option<&CStr> {
        let lowered = CString::new(name.to_bytes().to_ascii_lowercase()).ok()?;
        self.headers.get(lowered.as_c_str()).map(CString::as_c_str)
    }

    pub fn header_count(&self) -> usize {
        self.headers.len()
    }

    /// Render every header as a JSON object keyed by lowercased name.
    pub fn headers_json(&self) -> Result<String, RequestError> {
        let mut map = Map::new();
        for (name, value) in &self.headers {
            let name = utf8("header name", name)?;
            let value = utf8(name, value)?;
            map.insert(name.to_owned(), Value::from(value));
        }
        Ok(serde_json::to_string(&map)?)
    }
}

fn c_field(field: &'static str, bytes: impl Into<Vec<u8>>) -> Result<CString, RequestError> {
    CString::new(bytes).map_err(|source| RequestError::InteriorNul { field, source })
}

fn utf8<'a>(field: &str, value: &'a CStr) -> Result<&'a str, RequestError> {
    value.to_str().map_err(|source| RequestError::Utf8 {
        field: field.to_owned(),
        source,
    })
}
