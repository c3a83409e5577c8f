// Exported accessors that trigger plugins link against.

use std::ffi::{CStr, c_char};
use std::ptr;

use crate::CRequest;

pub type FieldAccessor = unsafe extern "C" fn(*const CRequest) -> *const c_char;
pub type HeaderAccessor = unsafe extern "C" fn(*const CRequest, *const c_char) -> *const c_char;

/// The accessor table a host process hands out to plugins.
///
/// Holding it from a host binary keeps the symbols linked so they can be
/// exported to libraries loaded at runtime.
#[derive(Debug, Clone, Copy)]
pub struct HostAccessors {
    pub get_method: FieldAccessor,
    pub get_uri: FieldAccessor,
    pub get_header: HeaderAccessor,
    pub get_body: FieldAccessor,
}

pub fn accessors() -> HostAccessors {
    HostAccessors {
        get_method: request_get_method,
        get_uri: request_get_uri,
        get_header: request_get_header,
        get_body: request_get_body,
    }
}

/// # Safety
///
/// `req` must be null or point to a live `CRequest`. The returned pointer
/// borrows from it.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn request_get_method(req: *const CRequest) -> *const c_char {
    match unsafe { req.as_ref() } {
        Some(request) => request.method.as_ptr(),
        None => ptr::null(),
    }
}

/// # Safety
///
/// `req` must be null or point to a live `CRequest`. The returned pointer
/// borrows from it.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn request_get_uri(req: *const CRequest) -> *const c_char {
    match unsafe { req.as_ref() } {
        Some(request) => request.uri.as_ptr(),
        None => ptr::null(),
    }
}

/// # Safety
///
/// `req` must be null or point to a live `CRequest`; `key` must be null or a
/// NUL-terminated string. `key` is only borrowed for the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn request_get_header(
    req: *const CRequest,
    key: *const c_char,
) -> *const c_char {
    let Some(request) = (unsafe { req.as_ref() }) else {
        return ptr::null();
    };
    if key.is_null() {
        return ptr::null();
    }
    let key = unsafe { CStr::from_ptr(key) };
    request.header_c(key).map_or(ptr::null(), CStr::as_ptr)
}

/// # Safety
///
/// `req` must be null or point to a live `CRequest`. The returned pointer
/// borrows from it.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn request_get_body(req: *const CRequest) -> *const c_char {
    match unsafe { req.as_ref() } {
        Some(request) => request.body.as_ptr(),
        None => ptr::null(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read<'a>(ptr: *const c_char) -> &'a str {
        assert!(!ptr.is_null());
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap()
    }

    #[test]
    fn accessors_point_into_the_request() {
        let request = CRequest::new("DELETE", "/repos/1", "gone").unwrap();
        let req: *const CRequest = &request;
        unsafe {
            assert_eq!(read(request_get_method(req)), "DELETE");
            assert_eq!(read(request_get_uri(req)), "/repos/1");
            assert_eq!(read(request_get_body(req)), "gone");
        }
    }

    #[test]
    fn null_request_yields_null() {
        unsafe {
            assert!(request_get_method(ptr::null()).is_null());
            assert!(request_get_uri(ptr::null()).is_null());
            assert!(request_get_body(ptr::null()).is_null());
            assert!(request_get_header(ptr::null(), c"host".as_ptr()).is_null());
        }
    }

    #[test]
    fn header_accessor_borrows_key() {
        let request = CRequest::new("GET", "/", "")
            .unwrap()
            .with_header("X-Hub-Signature", "sha1=abc")
            .unwrap();
        let req: *const CRequest = &request;
        let key = c"x-hub-signature";
        unsafe {
            assert_eq!(read(request_get_header(req, key.as_ptr())), "sha1=abc");
            assert_eq!(read(request_get_header(req, c"X-HUB-SIGNATURE".as_ptr())), "sha1=abc");
            assert!(request_get_header(req, c"missing".as_ptr()).is_null());
            assert!(request_get_header(req, ptr::null()).is_null());
        }
        // Still usable after the lookups: the accessor did not take ownership.
        assert_eq!(key.to_str().unwrap(), "x-hub-signature");
    }

    #[test]
    fn table_matches_exported_functions() {
        let request = CRequest::new("PATCH", "/x", "").unwrap();
        let host = accessors();
        unsafe {
            assert_eq!(read((host.get_method)(&request)), "PATCH");
            assert_eq!(read((host.get_uri)(&request)), "/x");
            assert_eq!(read((host.get_body)(&request)), "");
        }
    }
}
