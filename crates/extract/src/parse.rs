//! Parser adapter: source text in, AST plus span mapping out.

use crate::span::SpanMap;
use client_extract_core::{
    error::{ExtractError, Result},
    utils,
};
use std::path::Path;
use swc_core::{
    common::{input::StringInput, sync::Lrc, FileName, SourceMap},
    ecma::{
        ast::{EsVersion, Module},
        parser::{error::Error as ParserError, lexer::Lexer, Parser, Syntax, TsSyntax},
    },
};

/// A parsed module together with everything later stages need: the AST, the
/// span-to-range mapping, and the source map handle the printer requires.
pub(crate) struct ParsedModule {
    pub(crate) module: Module,
    pub(crate) span_map: SpanMap,
    pub(crate) cm: Lrc<SourceMap>,
}

impl std::fmt::Debug for ParsedModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedModule")
            .field("module", &self.module)
            .field("span_map", &self.span_map)
            .finish_non_exhaustive()
    }
}

/// Parses `code` as a TS module (with JSX unless the extension forbids it),
/// targeting ES2022.
///
/// Parser-recovered errors are reported as failures as well: recovery can
/// leave nodes with unreliable spans behind, and every later stage splices
/// by span.
pub(crate) fn parse_module(code: &str, id: &Path) -> Result<ParsedModule> {
    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(FileName::Real(id.to_path_buf()).into(), code.to_string());

    let syntax = Syntax::Typescript(TsSyntax { tsx: allows_jsx(id), ..Default::default() });
    let lexer = Lexer::new(syntax, EsVersion::Es2022, StringInput::from(&*fm), None);
    let mut parser = Parser::new_from(lexer);

    let module = match parser.parse_module() {
        Ok(module) => module,
        Err(err) => return Err(parse_error(id, &err)),
    };
    if let Some(err) = parser.take_errors().into_iter().next() {
        return Err(parse_error(id, &err));
    }

    let base = base_offset(code, &module, fm.start_pos.0 as usize);
    Ok(ParsedModule { module, span_map: SpanMap::new(code, base), cm })
}

/// JSX is off for plain TypeScript files, where `<T>` is a type assertion.
fn allows_jsx(id: &Path) -> bool {
    !matches!(id.extension().and_then(|ext| ext.to_str()), Some("ts" | "mts" | "cts"))
}

fn parse_error(id: &Path, err: &ParserError) -> ExtractError {
    ExtractError::Parse { id: id.to_path_buf(), message: err.kind().msg().into_owned() }
}

/// Recovers the constant offset between parser spans and byte positions:
/// the module span starts at the first real token, so subtracting the
/// leading-trivia length of the text yields the correction.
fn base_offset(code: &str, module: &Module, file_start: usize) -> usize {
    let lo = module.span.lo.0 as usize;
    if lo == 0 {
        // Degenerate (empty) module; fall back to the allocated start.
        return file_start;
    }
    lo.checked_sub(utils::leading_trivia_len(code)).unwrap_or(file_start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tsx_and_maps_spans_to_the_text() {
        let code = "const a = <div>hi</div>;";
        let parsed = parse_module(code, Path::new("/app/a.tsx")).unwrap();
        let range = parsed.span_map.range(parsed.module.span).unwrap();
        assert_eq!(&code[range], code);
    }

    #[test]
    fn corrects_for_leading_trivia() {
        let code = "// banner\nconst a = 1;";
        let parsed = parse_module(code, Path::new("/app/a.ts")).unwrap();
        let range = parsed.span_map.range(parsed.module.span).unwrap();
        assert_eq!(&code[range], "const a = 1;");
    }

    #[test]
    fn plain_ts_keeps_type_assertions() {
        let code = "const a = <string>JSON.parse(\"null\");";
        assert!(parse_module(code, Path::new("/app/a.ts")).is_ok());
        assert!(parse_module(code, Path::new("/app/a.tsx")).is_err());
    }

    #[test]
    fn surfaces_parse_failures_with_the_module_id() {
        let err = parse_module("const = ;", Path::new("/app/broken.ts")).unwrap_err();
        assert!(err.to_string().contains("/app/broken.ts"));
    }
}
