use crate::error::{Result, ScspellError};
use std::fs;
use std::path::Path;

/// Replace bytes `start..end` of line `line` (1-based) with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub line: usize,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Apply a replacement plan to a buffer.
///
/// Spans refer to the buffer as it was scanned. They are applied from the
/// last `(line, start)` to the first so that pending spans on the same line
/// keep their offsets. Everything outside the spans, line endings included,
/// is copied unchanged.
pub fn apply(buffer: &str, replacements: &[Replacement]) -> Result<String> {
    if replacements.is_empty() {
        return Ok(buffer.to_string());
    }

    let mut lines: Vec<String> = buffer.split_inclusive('\n').map(str::to_string).collect();
    let mut ordered: Vec<&Replacement> = replacements.iter().collect();
    ordered.sort_by(|a, b| (b.line, b.start).cmp(&(a.line, a.start)));

    let mut previous: Option<&Replacement> = None;
    for rep in ordered {
        let invalid = || ScspellError::InvalidSpan {
            line: rep.line,
            start: rep.start,
            end: rep.end,
        };
        if previous.is_some_and(|p| p.line == rep.line && rep.end > p.start) {
            return Err(invalid());
        }
        let line = rep
            .line
            .checked_sub(1)
            .and_then(|idx| lines.get_mut(idx))
            .ok_or_else(invalid)?;
        let content_len = line.trim_end_matches(['\n', '\r']).len();
        if rep.start > rep.end
            || rep.end > content_len
            || !line.is_char_boundary(rep.start)
            || !line.is_char_boundary(rep.end)
        {
            return Err(invalid());
        }
        line.replace_range(rep.start..rep.end, &rep.text);
        previous = Some(rep);
    }

    Ok(lines.concat())
}

/// Apply `replacements` to `original` and write the result to `path`.
/// Nothing is written when the plan is empty. Returns whether the file was
/// written.
pub fn rewrite_file(path: &Path, original: &str, replacements: &[Replacement]) -> Result<bool> {
    if replacements.is_empty() {
        return Ok(false);
    }
    let updated = apply(original, replacements)?;
    fs::write(path, updated).map_err(|source| ScspellError::SourceFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(true)
}
