//! Compiled-questionnaire cache.
//!
//! Compilation is pure and the template file changes rarely, so the service
//! compiles once and hands out shared snapshots until told to invalidate.
//! The compile runs under the cache lock, so concurrent first requests still
//! trigger at most one compile.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::compile::{self, Composition};
use crate::config::CoreConfig;
use crate::constants::MISSING_TREE_COMPOSITION_NAME;

#[derive(Clone)]
pub struct QuestionnaireService {
    template_path: PathBuf,
    cache: Arc<Mutex<Option<Arc<Composition>>>>,
}

impl QuestionnaireService {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            template_path: config.template_path().to_path_buf(),
            cache: Arc::new(Mutex::new(None)),
        }
    }

    /// The current questionnaire, compiling it on first use.
    ///
    /// Never fails: an unreadable or malformed template file compiles to the
    /// sentinel composition, which is cached like any other result so the
    /// log is not flooded on every request.
    pub fn get_or_compile(&self) -> Arc<Composition> {
        let mut cache = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(compiled) = cache.as_ref() {
            return Arc::clone(compiled);
        }
        tracing::info!(template = %self.template_path.display(), "compiling questionnaire");
        let compiled = Arc::new(self.compile_now());
        *cache = Some(Arc::clone(&compiled));
        compiled
    }

    /// Drop the cached questionnaire so the next request recompiles from
    /// the template file.
    pub fn invalidate(&self) {
        let mut cache = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *cache = None;
        tracing::info!("questionnaire cache invalidated");
    }

    fn compile_now(&self) -> Composition {
        match webtemplate::from_file(&self.template_path) {
            Ok(template) => compile::compile(&template),
            Err(err) => {
                tracing::error!(
                    template = %self.template_path.display(),
                    error = %err,
                    "template could not be loaded, serving sentinel composition"
                );
                compile::error_composition(MISSING_TREE_COMPOSITION_NAME)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn service_for(contents: &str) -> (tempfile::TempDir, QuestionnaireService) {
        let dir = tempfile::tempdir().expect("tempdir");
        let template_path = dir.path().join("template.json");
        let mut file = std::fs::File::create(&template_path).expect("create template");
        file.write_all(contents.as_bytes()).expect("write template");
        let config = CoreConfig::new(template_path, dir.path().join("data")).expect("config");
        let service = QuestionnaireService::new(&config);
        (dir, service)
    }

    #[test]
    fn caches_between_calls_and_recompiles_after_invalidate() {
        let (_dir, service) = service_for(
            r#"{"tree": {"id": "form", "rmType": "COMPOSITION", "name": "Cached form"}}"#,
        );
        let first = service.get_or_compile();
        let second = service.get_or_compile();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.name, "Cached form");

        service.invalidate();
        let third = service.get_or_compile();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(*first, *third);
    }

    #[test]
    fn unreadable_template_serves_sentinel() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = CoreConfig::new(dir.path().join("missing.json"), dir.path().join("data"))
            .expect("config");
        let service = QuestionnaireService::new(&config);
        let compiled = service.get_or_compile();
        assert_eq!(compiled.name, MISSING_TREE_COMPOSITION_NAME);
        assert!(compiled.content.is_empty());
    }

    #[test]
    fn malformed_json_serves_sentinel() {
        let (_dir, service) = service_for("{ not json");
        let compiled = service.get_or_compile();
        assert_eq!(compiled.name, MISSING_TREE_COMPOSITION_NAME);
    }
}
