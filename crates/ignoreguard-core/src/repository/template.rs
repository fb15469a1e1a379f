//! Template source trait definition.

use ignoreguard_types::error::TemplateError;

/// Source of the default compliance-file body.
///
/// Loaded on demand at commit time. Callers substitute the fallback body when
/// this returns an error.
pub trait TemplateSource: Send + Sync {
    fn load(&self) -> impl std::future::Future<Output = Result<String, TemplateError>> + Send;
}
