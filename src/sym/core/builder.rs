use crate::sym::core::section::Section;
use crate::sym::core::strings::SourceLine;
use crate::sym::types::{
    database::{DatabaseSym, FrameKey},
    errors::{Diagnostic, ErrorSink},
};

/// Parsing state of one document: the database being filled, the diagnostics
/// collected so far, and the section/frame/multiplexer currently open.
#[derive(Debug, Default)]
pub(crate) struct Builder {
    pub(crate) db: DatabaseSym,
    pub(crate) errors: ErrorSink,
    pub(crate) section: Section,
    pub(crate) current_frame: Option<FrameKey>,
    /// Selector value of the last `Mux=` line of the current frame block.
    pub(crate) current_mux: Option<u32>,
}

impl Builder {
    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        self.errors.push(diagnostic);
    }

    /// Key of the frame under construction. Reports the line when there is none.
    pub(crate) fn frame_key(&mut self, line: &SourceLine<'_>) -> Option<FrameKey> {
        if self.current_frame.is_none() {
            let content: String = line.code.to_string();
            let diagnostic: Diagnostic = if self.section.direction().is_some() {
                Diagnostic::NoCurrentFrame {
                    line: line.number,
                    content,
                }
            } else {
                Diagnostic::OutsideSection {
                    line: line.number,
                    content,
                }
            };
            self.report(diagnostic);
        }
        self.current_frame
    }

    pub(crate) fn finish(self) -> (DatabaseSym, Vec<Diagnostic>) {
        (self.db, self.errors.into_vec())
    }
}
