use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use thiserror::Error;

use convoy_core::action::{Action, ActionContext, Flag};
use convoy_core::error::ActionError;

/// Key/value configuration handed to a loaded module's entry point.
pub type ParameterMap = BTreeMap<String, String>;

/// The symbol every loadable module must export.
const INIT_SYMBOL: &[u8] = b"initialize";

/// Signature of the exported entry point.
pub type InitFn = unsafe extern "Rust" fn(&ParameterMap);

/// Dynamic-loading failures, carrying the platform diagnostic text.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to load library '{path}': {detail}")]
    Load { path: String, detail: String },
    #[error("no 'initialize' entry point in library '{path}': {detail}")]
    Symbol { path: String, detail: String },
}

/// Seam between the LoadLibrary action and the platform loader.
///
/// The production backend is [`SystemLoader`]; tests substitute a fake.
pub trait DynamicLoader: Send + Sync {
    /// Load the library at `path`, resolve its `initialize` entry point
    /// and invoke it with the parameter map.
    fn load_and_initialize(&self, path: &str, params: &ParameterMap) -> Result<(), LoaderError>;
}

/// Platform loader backed by `libloading` (dlopen on unix,
/// LoadLibrary on windows).
pub struct SystemLoader;

impl DynamicLoader for SystemLoader {
    fn load_and_initialize(&self, path: &str, params: &ParameterMap) -> Result<(), LoaderError> {
        // Safety: the module is trusted by whoever put it on the plan;
        // the engine only promises to surface the platform diagnostics.
        unsafe {
            let library = libloading::Library::new(path).map_err(|err| LoaderError::Load {
                path: path.to_string(),
                detail: err.to_string(),
            })?;
            let init: libloading::Symbol<InitFn> =
                library.get(INIT_SYMBOL).map_err(|err| LoaderError::Symbol {
                    path: path.to_string(),
                    detail: err.to_string(),
                })?;
            init(params);
            // Loaded modules stay resident for the life of the process;
            // handles are never closed.
            std::mem::forget(library);
        }
        Ok(())
    }
}

/// Loads a shared library and hands it a parameter map through its
/// exported `initialize` entry point.
///
/// Loading cannot be reversed (the module stays resident), so the action
/// is not undoable.
pub struct LoadLibrary {
    description: String,
    path: String,
    parameters: ParameterMap,
    verbosity: Flag,
    loader: Arc<dyn DynamicLoader>,
}

impl LoadLibrary {
    /// Create a loading action for the library at `path`, using the
    /// platform loader.
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_loader(path, Arc::new(SystemLoader))
    }

    /// Create a loading action with an explicit loader backend.
    pub fn with_loader(path: impl Into<String>, loader: Arc<dyn DynamicLoader>) -> Self {
        let path = path.into();
        Self {
            description: format!("loading library '{path}'"),
            path,
            parameters: ParameterMap::new(),
            verbosity: Flag::Inherit,
            loader,
        }
    }

    /// Set the verbosity flag.
    pub fn with_verbosity(mut self, verbosity: Flag) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Replace the whole parameter map.
    pub fn with_parameters(mut self, parameters: ParameterMap) -> Self {
        self.parameters = parameters;
        self
    }

    /// Accumulate a single name/value parameter pair.
    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parameters.insert(name.into(), value.into());
    }

    /// The configured library path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The accumulated parameter map.
    pub fn parameters(&self) -> &ParameterMap {
        &self.parameters
    }
}

#[async_trait]
impl Action for LoadLibrary {
    fn description(&self) -> &str {
        &self.description
    }

    fn verbosity(&self) -> Flag {
        self.verbosity
    }

    fn undoable(&self) -> bool {
        false
    }

    async fn execute(&mut self, ctx: &ActionContext) -> Result<(), ActionError> {
        // Validate before any platform loader call is attempted.
        if self.path.is_empty() {
            return Err(ActionError::data("no library name specified for loading"));
        }

        let verbose = self.is_verbose(ctx);
        if verbose {
            tracing::info!(library = %self.path, "start loading library");
        }
        let started = Instant::now();

        self.loader
            .load_and_initialize(&self.path, &self.parameters)
            .map_err(|err| ActionError::runtime(err.to_string()))?;

        if verbose {
            tracing::info!(
                library = %self.path,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "finished loading library"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Fake loader recording every call it receives.
    #[derive(Default)]
    struct FakeLoader {
        calls: Mutex<Vec<(String, ParameterMap)>>,
        fail_with: Option<fn(&str) -> LoaderError>,
    }

    impl FakeLoader {
        fn calls(&self) -> Vec<(String, ParameterMap)> {
            self.calls.lock().expect("calls poisoned").clone()
        }
    }

    impl DynamicLoader for FakeLoader {
        fn load_and_initialize(
            &self,
            path: &str,
            params: &ParameterMap,
        ) -> Result<(), LoaderError> {
            self.calls
                .lock()
                .expect("calls poisoned")
                .push((path.to_string(), params.clone()));
            match self.fail_with {
                Some(make) => Err(make(path)),
                None => Ok(()),
            }
        }
    }

    #[test]
    fn test_empty_path_fails_before_any_loader_call() {
        tokio_test::block_on(async {
            let loader = Arc::new(FakeLoader::default());
            let mut action = LoadLibrary::with_loader("", loader.clone());
            let err = action
                .execute(&ActionContext::root())
                .await
                .expect_err("empty path");
            assert!(matches!(err, ActionError::Data(_)));
            assert!(loader.calls().is_empty(), "loader must not be touched");
        });
    }

    #[test]
    fn test_initialize_receives_the_parameter_map() {
        tokio_test::block_on(async {
            let loader = Arc::new(FakeLoader::default());
            let mut action = LoadLibrary::with_loader("libforecast.so", loader.clone());
            action.set_parameter("horizon", "12");
            action.set_parameter("granularity", "week");

            action
                .execute(&ActionContext::root())
                .await
                .expect("fake load succeeds");

            let calls = loader.calls();
            assert_eq!(calls.len(), 1);
            assert_eq!(calls[0].0, "libforecast.so");
            assert_eq!(calls[0].1.get("horizon").map(String::as_str), Some("12"));
            assert_eq!(
                calls[0].1.get("granularity").map(String::as_str),
                Some("week")
            );
        });
    }

    #[test]
    fn test_loader_failure_surfaces_as_runtime_with_diagnostics() {
        tokio_test::block_on(async {
            let loader = Arc::new(FakeLoader {
                calls: Mutex::new(Vec::new()),
                fail_with: Some(|path| LoaderError::Symbol {
                    path: path.to_string(),
                    detail: "undefined symbol: initialize".to_string(),
                }),
            });
            let mut action = LoadLibrary::with_loader("libbroken.so", loader);
            let err = action
                .execute(&ActionContext::root())
                .await
                .expect_err("symbol failure");
            assert!(matches!(&err, ActionError::Runtime(_)));
            assert!(err.to_string().contains("undefined symbol"));
            assert!(err.to_string().contains("libbroken.so"));
        });
    }

    #[test]
    fn test_system_loader_reports_platform_diagnostics_for_missing_library() {
        let loader = SystemLoader;
        let err = loader
            .load_and_initialize("/nonexistent/libmissing.so", &ParameterMap::new())
            .expect_err("missing library");
        assert!(matches!(&err, LoaderError::Load { .. }));
        assert!(err.to_string().contains("libmissing.so"));
    }

    #[test]
    fn test_load_library_is_not_undoable() {
        let action = LoadLibrary::new("libforecast.so");
        assert!(!action.undoable());
    }
}
