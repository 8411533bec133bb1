//! Positional diagnostics and the composite bind failure.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use javelin_core::LineMap;
use text_size::TextSize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    SymbolNotFound,
    CannotResolve,
    TypeParameterQualifier,
    CycleInClassHierarchy,
    NotAnAnnotation,
    NotRepeatable,
    CannotResolveElement,
    MissingAnnotationArgument,
    InvalidAnnotationArgument,
    ExpressionError,
    OperandType,
    UnexpectedType,
    DuplicateDeclaration,
    UnexpectedModifier,
    UnexpectedToken,
    UnexpectedInput,
    FeatureNotSupported,
    AnnotationTargetMismatch,
    NonCanonicalImport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Index into the source set the driver was given.
    pub file: usize,
    pub pos: TextSize,
    pub kind: ErrorKind,
    pub message: String,
}

/// All diagnostics of a failed compilation, raised at the end of the first
/// phase that produced any.
#[derive(Debug)]
pub struct BindError {
    pub diagnostics: Vec<Diagnostic>,
    rendered: String,
}

impl std::error::Error for BindError {}

impl BindError {
    /// Renders each diagnostic as `<path>:<line>: error: <message>` with the
    /// offending line and a caret.
    pub(crate) fn new(sources: &[(String, String)], diagnostics: Vec<Diagnostic>) -> BindError {
        let sep = if cfg!(windows) { "\r\n" } else { "\n" };
        let mut blocks = Vec::with_capacity(diagnostics.len());
        for diag in &diagnostics {
            let (path, text) = &sources[diag.file];
            let map = LineMap::new(text);
            let line = map.line(diag.pos);
            let column = map.column(diag.pos) as usize;
            let line_text = map.line_text(text, line);
            blocks.push(format!(
                "{path}:{line}: error: {msg}{sep}{line_text}{sep}{caret:>width$}",
                msg = diag.message,
                caret = '^',
                width = column + 1,
            ));
        }
        BindError {
            diagnostics,
            rendered: blocks.join(sep),
        }
    }

    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.diagnostics.iter().map(|d| d.kind).collect()
    }
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

/// A shared accumulator handed to each phase.
#[derive(Clone, Default)]
pub(crate) struct DiagSink {
    inner: Rc<RefCell<Vec<Diagnostic>>>,
}

impl DiagSink {
    pub(crate) fn error(
        &self,
        file: usize,
        pos: TextSize,
        kind: ErrorKind,
        message: impl Into<String>,
    ) {
        self.inner.borrow_mut().push(Diagnostic {
            file,
            pos,
            kind,
            message: message.into(),
        });
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    /// Drains the accumulated diagnostics, ordered by source file and
    /// position for deterministic output.
    pub(crate) fn take(&self) -> Vec<Diagnostic> {
        let mut out = std::mem::take(&mut *self.inner.borrow_mut());
        out.sort_by_key(|d| (d.file, d.pos));
        out
    }
}
