//! Planning and applying byte-range replacements over the source text.

use crate::locate::HandlerForm;

/// One planned splice: replace `start..end` of the source with `text`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Replacement {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) text: String,
}

/// The text a handler is rewritten to, by syntactic form.
///
/// `url` is the runtime expression resolving to the emitted asset's path.
pub(crate) fn replacement_text(form: HandlerForm, name: Option<&str>, url: &str) -> String {
    match (form, name) {
        (HandlerForm::Expr, _) => url.to_string(),
        (HandlerForm::Decl { exported: false }, Some(name)) => format!("const {name} = {url};"),
        (HandlerForm::Decl { exported: true }, Some(name)) => {
            format!("export const {name} = {url};")
        }
        (HandlerForm::DefaultDecl, Some(name)) => {
            format!("const {name} = {url}; export default {name};")
        }
        (HandlerForm::DefaultDecl, None) => format!("export default {url}"),
        // A declaration always carries a name; fall back to the bare
        // expression rather than emit a nameless binding.
        (HandlerForm::Decl { .. }, None) => url.to_string(),
    }
}

/// Splices `replacements` into `source`, right to left, so earlier indices
/// stay valid without any offset bookkeeping.
///
/// Ranges are disjoint by construction; should one overlap anyway it is
/// dropped rather than applied on top of its neighbor.
pub(crate) fn apply_replacements(source: &str, mut replacements: Vec<Replacement>) -> String {
    replacements.sort_by(|a, b| b.start.cmp(&a.start));
    let mut out = source.to_string();
    let mut last_start = usize::MAX;
    for replacement in &replacements {
        if replacement.end > last_start {
            debug!(
                start = replacement.start,
                end = replacement.end,
                "skipping overlapping replacement"
            );
            continue;
        }
        out.replace_range(replacement.start..replacement.end, &replacement.text);
        last_start = replacement.start;
    }
    out
}
