//! Plugin options and the policy knobs.

use client_extract_core::error::{ExtractError, Result};
use once_cell::sync::Lazy;
use regex::RegexSet;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

/// What to do when a handler references names that resolve to neither an
/// import, a top-level declaration, nor a known global.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Fatal transform error.
    Error,
    /// Report through the host and proceed; the client module will lack the
    /// names and fail at client load time.
    Warn,
    /// Proceed silently. An explicit escape hatch, nothing else.
    Ignore,
}

/// Additional include/exclude patterns, combined with the defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

/// Where debug output goes.
#[derive(Clone, Default)]
pub enum DebugSink {
    /// No debug output.
    #[default]
    Disabled,
    /// Through `tracing` at debug level.
    Enabled,
    /// Through a caller-supplied callback.
    Logger(Arc<dyn Fn(&str) + Send + Sync>),
}

impl DebugSink {
    pub(crate) fn log(&self, message: impl FnOnce() -> String) {
        match self {
            Self::Disabled => {}
            Self::Enabled => debug!("{}", message()),
            Self::Logger(logger) => logger(&message()),
        }
    }
}

impl fmt::Debug for DebugSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("Disabled"),
            Self::Enabled => f.write_str("Enabled"),
            Self::Logger(_) => f.write_str("Logger(..)"),
        }
    }
}

/// Options accepted by the plugin.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PluginOptions {
    /// Extra filter expressions on top of the defaults.
    pub filter: FilterConfig,
    /// Unresolved-reference policy. Defaults to `warn`, or `error` under
    /// `strict`.
    pub unresolved: Option<UnresolvedPolicy>,
    /// Strict mode: parse failures become fatal and the unresolved default
    /// hardens to `error`.
    pub strict: bool,
    /// Names treated as client globals in addition to the built-in set.
    pub extra_globals: Vec<String>,
    /// Debug output destination.
    #[serde(skip)]
    pub debug: DebugSink,
}

impl PluginOptions {
    pub fn unresolved_policy(&self) -> UnresolvedPolicy {
        self.unresolved.unwrap_or(if self.strict {
            UnresolvedPolicy::Error
        } else {
            UnresolvedPolicy::Warn
        })
    }
}

static DEFAULT_INCLUDE: Lazy<RegexSet> =
    Lazy::new(|| RegexSet::new([r"\.[cm]?[jt]sx?$"]).unwrap());
static DEFAULT_EXCLUDE: Lazy<RegexSet> =
    Lazy::new(|| RegexSet::new([r"(^|[/\\])node_modules([/\\]|$)"]).unwrap());

/// The compiled module filter: defaults plus user expressions.
#[derive(Debug)]
pub(crate) struct CompiledFilter {
    include: Option<RegexSet>,
    exclude: Option<RegexSet>,
}

impl CompiledFilter {
    pub(crate) fn new(config: &FilterConfig) -> Result<Self> {
        let compile = |patterns: &[String]| -> Result<Option<RegexSet>> {
            if patterns.is_empty() {
                return Ok(None);
            }
            RegexSet::new(patterns)
                .map(Some)
                .map_err(|err| ExtractError::msg(format!("invalid filter pattern: {err}")))
        };
        Ok(Self { include: compile(&config.include)?, exclude: compile(&config.exclude)? })
    }

    pub(crate) fn is_match(&self, id: &str) -> bool {
        let included = DEFAULT_INCLUDE.is_match(id)
            || self.include.as_ref().is_some_and(|set| set.is_match(id));
        let excluded = DEFAULT_EXCLUDE.is_match(id)
            || self.exclude.as_ref().is_some_and(|set| set.is_match(id));
        included && !excluded
    }
}
