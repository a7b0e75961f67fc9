use jetpack_common::{LineIndex, Loader};
use swc_core::{
  common::{BytePos, Spanned},
  ecma::{
    ast::{self, EsVersion},
    parser::{self as swc_ecma_parser, EsSyntax},
  },
};
use swc_ecma_parser::{lexer::Lexer, Parser, StringInput, Syntax};

/// Every source text is parsed starting at this position, so `span.lo - START_POS` is a byte offset.
pub const START_POS: BytePos = BytePos(1);

/// Converts a span position back into a byte offset of the parsed source.
pub fn byte_offset(pos: BytePos) -> usize {
  pos.0.saturating_sub(START_POS.0) as usize
}

pub fn syntax_of(loader: Loader) -> Syntax {
  Syntax::Es(EsSyntax {
    jsx: loader.is_jsx(),
    ..Default::default()
  })
}

/// Parses `source` as an ES module. The input is always treated as a module.
///
/// Both fatal errors and the errors the parser recovered from are reported, the first one wins.
pub fn parse(path: &str, source: &str, loader: Loader) -> jetpack_error::Result<ast::Module> {
  let end = BytePos(START_POS.0 + source.len() as u32);
  let lexer = Lexer::new(
    syntax_of(loader),
    EsVersion::latest(),
    StringInput::new(source, START_POS, end),
    None,
  );
  let mut parser = Parser::new_from(lexer);
  let result = parser.parse_module();
  let recovered = parser.take_errors();

  let first_error = match result {
    Err(err) => Some(err),
    Ok(_) if !recovered.is_empty() => recovered.into_iter().next(),
    Ok(module) => return Ok(module),
  };

  match first_error {
    Some(err) => {
      let (line, column) = LineIndex::new(source).position(source, byte_offset(err.span().lo));
      let message = err.kind().msg();
      tracing::debug!("parse failed: {path}: {message}");
      Err(jetpack_error::Error::parse_failed(
        path,
        message,
        line + 1,
        column,
      ))
    }
    None => Err(jetpack_error::Error::panic(format!(
      "parser returned no module for {path}"
    ))),
  }
}
