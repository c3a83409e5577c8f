use std::ffi::{c_int, c_void};
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};
use missdemeanor::CRequest;
use tracing::debug;

use crate::RunnerError;

/// Signature every trigger plugin exports.
pub type TriggerFn = unsafe extern "C" fn(*const c_void) -> c_int;

/// A loaded trigger plugin. The library stays open for as long as this
/// value lives, which keeps `trigger` callable.
pub struct TriggerPlugin {
    _library: Library,
    trigger: TriggerFn,
    path: PathBuf,
}

impl TriggerPlugin {
    /// Open the shared library at `path` and resolve `symbol`.
    ///
    /// # Safety
    ///
    /// Loading runs the library's initialisers, and the resolved symbol is
    /// trusted to have the [`TriggerFn`] signature.
    pub unsafe fn load(path: impl AsRef<Path>, symbol: &str) -> Result<Self, RunnerError> {
        let path = path.as_ref().to_path_buf();
        let library = unsafe { Library::new(&path) }.map_err(|source| RunnerError::Load {
            path: path.clone(),
            source,
        })?;
        unsafe { Self::from_library(library, path, symbol) }
    }

    /// Resolve `symbol` in an already opened library. `path` is only used for
    /// reporting.
    ///
    /// # Safety
    ///
    /// The resolved symbol is trusted to have the [`TriggerFn`] signature.
    pub unsafe fn from_library(
        library: Library,
        path: PathBuf,
        symbol: &str,
    ) -> Result<Self, RunnerError> {
        let trigger = {
            let resolved: Symbol<TriggerFn> =
                unsafe { library.get(symbol.as_bytes()) }.map_err(|source| {
                    RunnerError::Symbol {
                        name: symbol.to_owned(),
                        source,
                    }
                })?;
            *resolved
        };

        debug!(plugin = %path.display(), symbol, "resolved trigger symbol");
        Ok(Self {
            _library: library,
            trigger,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hand the plugin a borrowed pointer to `request` and return its status.
    pub fn invoke(&self, request: &CRequest) -> c_int {
        let handle: *const c_void = (request as *const CRequest).cast();
        unsafe { (self.trigger)(handle) }
    }
}
