//! Parameter lookup with model-default fallbacks.

use std::collections::BTreeMap;

use crate::error::{ModelError, Result};
use crate::params::loader::ParamBlock;

/// Defaults consulted when a parameter file leaves a key out.
#[derive(Debug, Clone, Default)]
pub struct FallbackProvider {
    defaults: BTreeMap<&'static str, &'static str>,
}

impl FallbackProvider {
    /// The model's standard defaults. Structural parameters (crown shape,
    /// moisture, composition) have no default on purpose: leaving them out
    /// of a file is an error.
    pub fn standard() -> Self {
        let defaults = BTreeMap::from([
            ("slope", "0"),
            ("air temperature", "20"),
            ("mean fuel diameter", "0.005"),
            ("mean fineness leaves", "0.00025"),
            ("stem order", "3"),
            ("clump separation", "0"),
            ("dead leaf moisture", "0.1"),
            ("proportion dead", "0"),
            ("composition", "1"),
        ]);
        FallbackProvider { defaults }
    }

    /// No defaults at all: every key must come from the file.
    pub fn empty() -> Self {
        FallbackProvider::default()
    }

    pub fn get(&self, key: &str) -> Option<&'static str> {
        self.defaults.get(key).copied()
    }
}

/// A parameter scope bound to its fallback provider.
pub struct ValueAssignments<'a> {
    block: &'a ParamBlock,
    fallback: &'a FallbackProvider,
}

impl<'a> ValueAssignments<'a> {
    pub fn new(block: &'a ParamBlock, fallback: &'a FallbackProvider) -> Self {
        ValueAssignments { block, fallback }
    }

    /// The value for `key`, consulting the fallback provider when absent.
    pub fn str(&self, key: &str) -> Result<&str> {
        if let Some((_, value)) = self.block.first(key) {
            return Ok(value);
        }
        self.fallback
            .get(key)
            .ok_or_else(|| ModelError::MissingFallback(key.to_string()))
    }

    pub fn f64(&self, key: &str) -> Result<f64> {
        let line = self.block.first(key).map(|(line, _)| line);
        let value = self.str(key)?;
        value.parse().map_err(|_| match line {
            Some(line) => ModelError::Params {
                line,
                message: format!("`{key}`: expected a number, got `{value}`"),
            },
            None => ModelError::MissingFallback(key.to_string()),
        })
    }

    /// A value that may legitimately be absent; the fallback provider is
    /// not consulted.
    pub fn f64_opt(&self, key: &str) -> Result<Option<f64>> {
        match self.block.first(key) {
            None => Ok(None),
            Some((line, value)) => value
                .parse()
                .map(Some)
                .map_err(|_| ModelError::Params {
                    line,
                    message: format!("`{key}`: expected a number, got `{value}`"),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::loader::parse;

    #[test]
    fn test_fallback_used_when_absent() {
        let raw = parse("fireline length = 100\n").unwrap();
        let fallback = FallbackProvider::standard();
        let va = ValueAssignments::new(&raw.site, &fallback);
        assert_eq!(va.f64("fireline length").unwrap(), 100.0);
        assert_eq!(va.f64("slope").unwrap(), 0.0);
    }

    #[test]
    fn test_missing_everywhere_fails() {
        let raw = parse("").unwrap();
        let fallback = FallbackProvider::empty();
        let va = ValueAssignments::new(&raw.site, &fallback);
        assert!(matches!(
            va.f64("fireline length"),
            Err(ModelError::MissingFallback(_))
        ));
    }

    #[test]
    fn test_bad_number_reports_line() {
        let raw = parse("fireline length = wide\n").unwrap();
        let fallback = FallbackProvider::standard();
        let va = ValueAssignments::new(&raw.site, &fallback);
        assert!(matches!(
            va.f64("fireline length"),
            Err(ModelError::Params { line: 1, .. })
        ));
    }
}
