//! Error taxonomy for the client-extraction transform.
//!
//! Every fatal message begins with the stable `[use-client]` tag and names
//! the absolute module id, so build logs stay grep-able without extra
//! context.

use std::{fmt, path::PathBuf};

pub type Result<T, E = ExtractError> = std::result::Result<T, E>;

/// The unsafe syntactic role a hoisted handler name was found in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallableUse {
    /// `name(...)`
    Call,
    /// `new name(...)`
    Construct,
    /// `` name`...` ``
    TemplateTag,
}

impl fmt::Display for CallableUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Call => "call target",
            Self::Construct => "constructor",
            Self::TemplateTag => "template tag",
        };
        f.write_str(s)
    }
}

/// Various errors raised while extracting client handlers from a module.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The source failed to parse. Routed through the policy engine: fatal
    /// in strict mode, a warning otherwise.
    #[error("[use-client] {}: failed to parse module: {message}", .id.display())]
    Parse {
        /// Absolute id of the module being transformed.
        id: PathBuf,
        /// Parser-reported reason.
        message: String,
    },
    /// The module contains a bare `import "...";`. Such imports are globally
    /// ordered effects and can neither be hoisted into nor erased from an
    /// extracted client module. Always fatal.
    #[error(
        "[use-client] {}: side-effect imports are not supported in modules with client handlers: `{statement}`",
        .id.display()
    )]
    SideEffectImport { id: PathBuf, statement: String },
    /// A handler declared as a named function is used as a callable value
    /// elsewhere in the module. After extraction the name is rebound to a
    /// URL string, so every such use would break at runtime. Always fatal.
    #[error(
        "[use-client] {}: `{name}` is rewritten to a client asset URL but is used as a {usage} elsewhere in the module",
        .id.display()
    )]
    UnsafeCallable {
        id: PathBuf,
        name: String,
        usage: CallableUse,
    },
    /// A handler references names that are neither imported, declared at the
    /// top level, nor known globals. Routed through the `unresolved` policy.
    #[error(
        "[use-client] {}: unresolved references in client handler{}: {}",
        .id.display(),
        .handler.as_deref().map(|h| format!(" `{h}`")).unwrap_or_default(),
        .names.join(", ")
    )]
    UnresolvedReferences {
        id: PathBuf,
        /// Declared handler name, when it has one.
        handler: Option<String>,
        /// Sorted list of every unresolved name.
        names: Vec<String>,
    },
    /// Catch-all for violations of the host contract.
    #[error("[use-client] {0}")]
    Message(String),
}

impl ExtractError {
    /// Convenience constructor for [`ExtractError::Message`].
    pub fn msg(msg: impl fmt::Display) -> Self {
        Self::Message(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_messages_carry_the_stable_tag() {
        let err = ExtractError::SideEffectImport {
            id: "/app/src/page.tsx".into(),
            statement: "import \"./reset.css\";".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("[use-client] /app/src/page.tsx"));
        assert!(msg.contains("side-effect imports"));
        assert!(msg.contains("./reset.css"));
    }

    #[test]
    fn unresolved_message_lists_every_name() {
        let err = ExtractError::UnresolvedReferences {
            id: "/app/a.tsx".into(),
            handler: Some("onClick".to_string()),
            names: vec!["helper".to_string(), "state".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("`onClick`"));
        assert!(msg.contains("helper, state"));

        let anonymous = ExtractError::UnresolvedReferences {
            id: "/app/a.tsx".into(),
            handler: None,
            names: vec!["helper".to_string()],
        };
        assert!(anonymous.to_string().contains("client handler: helper"));
    }

    #[test]
    fn callable_use_names_the_role() {
        let err = ExtractError::UnsafeCallable {
            id: "/app/a.tsx".into(),
            name: "top".to_string(),
            usage: CallableUse::Construct,
        };
        assert!(err.to_string().contains("used as a constructor"));
    }
}
