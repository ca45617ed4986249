//! Import allowlist checks.
//!
//! The sandbox gates every `import` a snippet performs against
//! [`ExecutionSettings::allowed_modules`]. The checks live here so both the
//! VM import hook and the tests share one definition of "allowed".
//!
//! A submodule is allowed whenever its top-level package is: importing `json`
//! drags in `json.decoder` and friends, so denying those would break the
//! parent import that was explicitly permitted.

use std::collections::HashSet;

use crate::types::ExecutionSettings;

/// Builds a `HashSet` from [`ExecutionSettings::allowed_modules`] for O(1)
/// lookup on each import.
pub fn allowed_set(settings: &ExecutionSettings) -> HashSet<String> {
    settings.allowed_modules.iter().cloned().collect()
}

/// Whether `module` may be imported under `allowed`.
///
/// `true` for an exact allowlist match, or when the segment before the first
/// `.` matches (submodule of an allowed package).
pub fn module_allowed(module: &str, allowed: &HashSet<String>) -> bool {
    if allowed.contains(module) {
        return true;
    }
    match module.split_once('.') {
        Some((parent, _)) => allowed.contains(parent),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_ALLOWED_MODULES;

    fn default_set() -> HashSet<String> {
        allowed_set(&ExecutionSettings::default())
    }

    #[test]
    fn test_listed_module_allowed() {
        assert!(module_allowed("math", &default_set()));
        assert!(module_allowed("json", &default_set()));
    }

    #[test]
    fn test_unlisted_module_denied() {
        assert!(!module_allowed("socket", &default_set()));
        assert!(!module_allowed("subprocess", &default_set()));
        assert!(!module_allowed("os", &default_set()));
    }

    #[test]
    fn test_submodule_of_allowed_parent() {
        assert!(module_allowed("json.decoder", &default_set()));
        assert!(module_allowed("collections.abc", &default_set()));
    }

    #[test]
    fn test_submodule_of_denied_parent() {
        assert!(!module_allowed("os.path", &default_set()));
    }

    #[test]
    fn test_empty_allowlist_denies_everything() {
        let empty: HashSet<String> = HashSet::new();
        assert!(!module_allowed("math", &empty));
        assert!(!module_allowed("json.decoder", &empty));
    }

    #[test]
    fn test_allowed_set_from_custom_settings() {
        let settings = ExecutionSettings {
            allowed_modules: vec!["math".to_string(), "re".to_string()],
            ..ExecutionSettings::default()
        };
        let set = allowed_set(&settings);
        assert_eq!(set.len(), 2);
        assert!(module_allowed("math", &set));
        assert!(!module_allowed("json", &set));
    }

    #[test]
    fn test_default_allowlist_is_complete() {
        let set = default_set();
        for module in DEFAULT_ALLOWED_MODULES {
            assert!(module_allowed(module, &set), "'{module}' should be allowed");
        }
    }
}
