use crate::span::{SourceOffset, SourceText};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Where an insertion goes relative to fragments already at the same offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    /// Prepended ahead of everything inserted at this offset so far.
    BeforeExisting,
    /// Appended after everything inserted at this offset so far.
    AfterExisting,
}

/// The fundamental edit primitive: insert `text` at `offset`.
///
/// Edits never delete or replace original text. Every rule compiles down to a
/// sequence of these; intelligence lives in offset acquisition, not in
/// application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[must_use = "Edit does nothing until inserted into an EditBuffer"]
pub struct Edit {
    pub offset: SourceOffset,
    pub text: String,
    pub placement: Placement,
    /// Follow every newline in `text` with the indentation of the line at
    /// `offset`.
    pub indent_new_lines: bool,
}

impl Edit {
    pub fn new(offset: SourceOffset, text: impl Into<String>, placement: Placement) -> Self {
        Self {
            offset,
            text: text.into(),
            placement,
            indent_new_lines: false,
        }
    }

    pub fn before(offset: SourceOffset, text: impl Into<String>) -> Self {
        Self::new(offset, text, Placement::BeforeExisting)
    }

    pub fn after(offset: SourceOffset, text: impl Into<String>) -> Self {
        Self::new(offset, text, Placement::AfterExisting)
    }

    pub fn indented(mut self, indent_new_lines: bool) -> Self {
        self.indent_new_lines = indent_new_lines;
        self
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("insertion offset {offset} is outside the source text (length {len})")]
    OutOfRange { offset: usize, len: usize },

    #[error("insertion offset {offset} falls inside a UTF-8 character")]
    NotCharBoundary { offset: usize },
}

/// One pending insertion, in materialization order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedInsertion {
    pub offset: SourceOffset,
    pub text: String,
}

/// Offset-indexed collection of pending insertions over one source text.
///
/// Fragments at one offset keep arrival order, adjusted by each edit's
/// [`Placement`]. Fragments at different offsets never interact.
#[derive(Debug)]
pub struct EditBuffer<'src> {
    source: &'src SourceText,
    fragments: BTreeMap<SourceOffset, VecDeque<String>>,
    inserted_bytes: usize,
    fragment_count: usize,
}

impl<'src> EditBuffer<'src> {
    /// Create an empty buffer for `source`.
    pub fn new(source: &'src SourceText) -> Self {
        Self {
            source,
            fragments: BTreeMap::new(),
            inserted_bytes: 0,
            fragment_count: 0,
        }
    }

    pub fn source(&self) -> &'src SourceText {
        self.source
    }

    /// Number of fragments inserted so far.
    pub fn len(&self) -> usize {
        self.fragment_count
    }

    pub fn is_empty(&self) -> bool {
        self.fragment_count == 0
    }

    /// Queue `edit` at its offset.
    pub fn insert(&mut self, edit: Edit) -> Result<(), EditError> {
        let len = self.source.len();
        if edit.offset > len {
            return Err(EditError::OutOfRange {
                offset: edit.offset,
                len,
            });
        }
        if !self.source.is_valid_offset(edit.offset) {
            return Err(EditError::NotCharBoundary {
                offset: edit.offset,
            });
        }

        let text = if edit.indent_new_lines {
            self.source.indent_new_lines(edit.offset, &edit.text)
        } else {
            edit.text
        };

        self.inserted_bytes += text.len();
        self.fragment_count += 1;

        let slot = self.fragments.entry(edit.offset).or_default();
        match edit.placement {
            Placement::BeforeExisting => slot.push_front(text),
            Placement::AfterExisting => slot.push_back(text),
        }
        Ok(())
    }

    /// Pending insertions, offsets ascending, buffer order within an offset.
    pub fn planned_edits(&self) -> Vec<PlannedInsertion> {
        self.fragments
            .iter()
            .flat_map(|(&offset, texts)| {
                texts.iter().map(move |text| PlannedInsertion {
                    offset,
                    text: text.clone(),
                })
            })
            .collect()
    }

    /// Splice every pending fragment into the original text.
    ///
    /// Original bytes between insertion points are copied verbatim; at each
    /// point the fragments are emitted and copying resumes at that same offset.
    pub fn materialize(self) -> String {
        let original = self.source.as_str();
        let mut output = String::with_capacity(original.len() + self.inserted_bytes);
        let mut cursor = 0;

        for (offset, texts) in self.fragments {
            output.push_str(&original[cursor..offset]);
            for text in texts {
                output.push_str(&text);
            }
            cursor = offset;
        }
        output.push_str(&original[cursor..]);

        output
    }
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full write succeeds or the destination is left untouched.
pub fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    // Same directory keeps the rename on one filesystem
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content.as_bytes())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn materialize(source: &str, edits: Vec<Edit>) -> String {
        let source = SourceText::new(source);
        let mut buffer = EditBuffer::new(&source);
        for edit in edits {
            buffer.insert(edit).unwrap();
        }
        buffer.materialize()
    }

    #[test]
    fn empty_buffer_is_identity() {
        assert_eq!(materialize("int main() {}\n", vec![]), "int main() {}\n");
        assert_eq!(materialize("", vec![]), "");
    }

    #[test]
    fn same_offset_after_then_before() {
        let out = materialize(
            "xy",
            vec![
                Edit::after(1, "A"),
                Edit::after(1, "B"),
                Edit::before(1, "C"),
            ],
        );
        assert_eq!(out, "xCABy");
    }

    #[test]
    fn before_is_relative_to_fragments_present_at_insertion() {
        let out = materialize(
            "xy",
            vec![
                Edit::before(1, "A"),
                Edit::before(1, "B"),
                Edit::after(1, "C"),
            ],
        );
        assert_eq!(out, "xBACy");
    }

    #[test]
    fn boundaries_prepend_and_append() {
        let out = materialize("body", vec![Edit::after(4, "!"), Edit::after(0, "> ")]);
        assert_eq!(out, "> body!");
    }

    #[test]
    fn different_offsets_do_not_interact() {
        let out = materialize(
            "a * b",
            vec![Edit::after(0, "("), Edit::after(5, ") + d")],
        );
        assert_eq!(out, "(a * b) + d");
    }

    #[test]
    fn out_of_range_offset_rejected() {
        let source = SourceText::new("short");
        let mut buffer = EditBuffer::new(&source);
        let err = buffer.insert(Edit::after(6, "x")).unwrap_err();
        assert!(matches!(err, EditError::OutOfRange { offset: 6, len: 5 }));
        assert!(buffer.is_empty());
    }

    #[test]
    fn mid_character_offset_rejected() {
        let source = SourceText::new("é");
        let mut buffer = EditBuffer::new(&source);
        let err = buffer.insert(Edit::after(1, "x")).unwrap_err();
        assert!(matches!(err, EditError::NotCharBoundary { offset: 1 }));
    }

    #[test]
    fn indented_insertion_follows_line_indentation() {
        let source = "if (x)\n    return 1;\n";
        let at = source.find("return").unwrap();
        let out = materialize(source, vec![Edit::before(at, "// then\n").indented(true)]);
        assert_eq!(out, "if (x)\n    // then\n    return 1;\n");
    }

    #[test]
    fn planned_edits_follow_materialization_order() {
        let source = SourceText::new("abc");
        let mut buffer = EditBuffer::new(&source);
        buffer.insert(Edit::after(2, "2")).unwrap();
        buffer.insert(Edit::after(0, "0")).unwrap();
        buffer.insert(Edit::before(2, "1")).unwrap();

        let planned: Vec<_> = buffer
            .planned_edits()
            .into_iter()
            .map(|p| (p.offset, p.text))
            .collect();
        assert_eq!(
            planned,
            vec![(0, "0".to_string()), (2, "1".to_string()), (2, "2".to_string())]
        );
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.materialize(), "0ab12c");
    }

    #[test]
    fn atomic_write_replaces_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("out.c");
        fs::write(&file_path, "original").unwrap();

        write_atomic(&file_path, "rewritten").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "rewritten");
    }
}
