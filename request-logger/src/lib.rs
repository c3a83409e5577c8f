//! A miss-demeanor trigger plugin that echoes each request to stdout.
//!
//! The host loads this library and calls [`trigger`] once per request with an
//! opaque handle. Fields are read back through the host's `request_get_*`
//! accessors, which are resolved against the loading process.

use std::ffi::{CStr, c_char, c_int, c_void};
use std::io::{self, Write};
use std::marker::PhantomData;
use std::sync::OnceLock;

use tracing::{trace, warn};
use tracing_subscriber::EnvFilter;

/// Status returned to the host. The plugin never reports anything else.
pub const SUCCESS: c_int = 0;

unsafe extern "C" {
    fn request_get_method(request: *const c_void) -> *const c_char;
    fn request_get_uri(request: *const c_void) -> *const c_char;
    fn request_get_body(request: *const c_void) -> *const c_char;
}

type Accessor = unsafe extern "C" fn(*const c_void) -> *const c_char;

/// The three request fields a trigger reads, as raw bytes.
pub trait RequestFields {
    fn method(&self) -> &[u8];
    fn uri(&self) -> &[u8];
    fn body(&self) -> &[u8];
}

/// A borrowed view of a host-owned request.
///
/// The view never frees or mutates the handle and cannot outlive `'a`.
pub struct HostRequest<'a> {
    handle: *const c_void,
    _host: PhantomData<&'a c_void>,
}

impl<'a> HostRequest<'a> {
    /// # Safety
    ///
    /// `handle` must be a request owned by the host that stays valid for `'a`.
    pub unsafe fn from_raw(handle: *const c_void) -> Self {
        Self {
            handle,
            _host: PhantomData,
        }
    }

    fn field(&self, accessor: Accessor) -> &'a [u8] {
        let ptr = unsafe { accessor(self.handle) };
        if ptr.is_null() {
            return &[];
        }
        unsafe { CStr::from_ptr(ptr) }.to_bytes()
    }
}

impl RequestFields for HostRequest<'_> {
    fn method(&self) -> &[u8] {
        self.field(request_get_method)
    }

    fn uri(&self) -> &[u8] {
        self.field(request_get_uri)
    }

    fn body(&self) -> &[u8] {
        self.field(request_get_body)
    }
}

/// Write method, URI and body, one per line, exactly as the host gave them.
pub fn write_request<R, W>(request: &R, out: &mut W) -> io::Result<()>
where
    R: RequestFields + ?Sized,
    W: Write + ?Sized,
{
    for field in [request.method(), request.uri(), request.body()] {
        out.write_all(field)?;
        out.write_all(b"\n")?;
    }
    out.flush()
}

static LOGGING: OnceLock<()> = OnceLock::new();

/// The plugin carries its own copy of `tracing`, so the host's subscriber
/// never sees these events. Install one on stderr the first time through.
fn init_logging() {
    LOGGING.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(io::stderr)
            .try_init();
    });
}

/// Echo `request` to `out`. A failed write is logged and still succeeds.
fn echo<R, W>(request: &R, out: &mut W) -> c_int
where
    R: RequestFields + ?Sized,
    W: Write + ?Sized,
{
    if let Err(e) = write_request(request, out) {
        warn!(error = %e, "failed to write request to stdout");
    }
    SUCCESS
}

/// Entry point called by the host for every request routed to this trigger.
///
/// # Safety
///
/// `request` must be a request handle owned by the host and valid for the
/// duration of the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn trigger(request: *const c_void) -> c_int {
    init_logging();
    trace!(?request, "trigger invoked");
    let request = unsafe { HostRequest::from_raw(request) };

    // Held across all three lines so a request's output stays contiguous.
    let mut out = io::stdout().lock();
    echo(&request, &mut out)
}
