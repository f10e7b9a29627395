pub mod codegen;
pub mod ir;

use thiserror::Error;

pub use codegen::{assemble, CodegenError, Config};
pub use ir::{parse_program, IrError, Program, Span};

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{0}")]
    Ir(#[from] IrError),
    #[error("{0}")]
    Codegen(#[from] CodegenError),
}

impl CompileError {
    pub fn span(&self) -> Option<&Span> {
        match self {
            CompileError::Ir(err) => Some(err.span()),
            CompileError::Codegen(err) => err.span(),
        }
    }
}

/// Parse an IR listing and lower it to a `sed -n -E` script.
pub fn compile(source: &str, config: &Config) -> Result<String, CompileError> {
    let program = parse_program(source)?;
    let script = assemble(&program, config)?;
    Ok(script)
}

/// Render a human-friendly error with source context and caret pointing to the span.
pub fn format_error(source: &str, err: &CompileError) -> String {
    match err.span() {
        Some(span) => render_snippet(source, span, &err.to_string()),
        None => format!("error: {err}"),
    }
}

fn render_snippet(source: &str, span: &Span, message: &str) -> String {
    let (line_idx, col_idx, line_text) = line_and_col(source, span.start);
    let line_num = line_idx + 1;
    let col_num = col_idx + 1;

    let caret_len = usize::max(1, span.end.saturating_sub(span.start));
    let underline = format!("{}{}", " ".repeat(col_idx), "^".repeat(caret_len));
    let gutter_width = line_num.to_string().len();

    let mut out = String::new();
    out.push_str(&format!("{line_num}:{col_num}: {message}\n"));
    out.push_str(&format!(
        "{:>width$} | {}\n",
        line_num,
        line_text,
        width = gutter_width
    ));
    out.push_str(&format!(
        "{:>width$} | {}",
        "",
        underline,
        width = gutter_width
    ));
    out
}

fn line_and_col(source: &str, byte_index: usize) -> (usize, usize, String) {
    let byte_index = byte_index.min(source.len());
    let mut line_start = 0;
    let mut line_idx = 0;
    for (idx, ch) in source.char_indices() {
        if idx >= byte_index {
            break;
        }
        if ch == '\n' {
            line_idx += 1;
            line_start = idx + ch.len_utf8();
        }
    }
    let line_end = source[line_start..]
        .find('\n')
        .map(|rel| line_start + rel)
        .unwrap_or(source.len());
    let line_text = source[line_start..line_end].trim_end_matches('\r').to_string();
    let col_idx = source[line_start..byte_index].chars().count();
    (line_idx, col_idx, line_text)
}
