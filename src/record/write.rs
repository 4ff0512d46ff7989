use super::encode::{encode_record, ARGUMENT_INDENT};
use super::{ArgumentRole, InvocationRecord, RecordError};
use crate::shared::{atomic_write_file, backup_by_rename};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

pub enum CommentTarget<'a> {
    Stream(&'a mut dyn Write),
    Path(&'a Path),
}

/// What follows the new comment block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Placement {
    /// Only the new block.
    #[default]
    Alone,
    /// The new block, then the comment block already at the top of the
    /// destination file.
    Prepend,
    /// The new block, then a caller supplied block (usually the comments read
    /// ahead from the tool's own input).
    Append(String),
}

#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    pub label: Option<String>,
    pub placement: Placement,
    pub backup: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadingComments {
    pub comments: String,
    /// The first line after the comment block, already consumed from the
    /// reader. Empty at end of stream.
    pub rest: String,
}

/// Reads the comment block at the top of a stream. Quoted values spanning
/// several lines are kept whole even though their inner lines do not start
/// with `#`.
pub fn read_prior_comments<R: BufRead>(mut reader: R) -> std::io::Result<LeadingComments> {
    let mut leading = LeadingComments::default();
    let mut in_quote = false;
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        if in_quote {
            in_quote = quote_open_after(&line, true);
            leading.comments.push_str(&line);
            continue;
        }
        if !line.starts_with('#') {
            leading.rest = line;
            break;
        }
        if let Some(content) = argument_content(&line) {
            in_quote = quote_open_after(content, false);
        }
        leading.comments.push_str(&line);
    }
    Ok(leading)
}

/// Writes the record's comment block to `target` using the placement policy
/// in `options`; newest block always first.
pub fn write_comments(
    target: CommentTarget<'_>,
    record: &InvocationRecord,
    options: &WriteOptions,
) -> Result<(), RecordError> {
    let mut content = encode_record(record, options.label.as_deref())?;

    match target {
        CommentTarget::Stream(writer) => {
            if let Placement::Append(trailing) = &options.placement {
                push_block(&mut content, trailing);
            }
            writer
                .write_all(content.as_bytes())
                .and_then(|_| writer.flush())
                .map_err(|source| RecordError::Write {
                    path: "<stream>".to_string(),
                    source,
                })
        }
        CommentTarget::Path(path) => {
            let prior = match &options.placement {
                Placement::Prepend if path.exists() => read_file_comments(path)?,
                Placement::Append(trailing) => trailing.clone(),
                _ => String::new(),
            };
            push_block(&mut content, &prior);

            if let Some(backup) = &options.backup {
                backup_by_rename(path, backup).map_err(|source| RecordError::Backup {
                    path: path.display().to_string(),
                    backup: backup.display().to_string(),
                    source,
                })?;
            }
            atomic_write_file(path, content.as_bytes()).map_err(|source| RecordError::Write {
                path: path.display().to_string(),
                source,
            })
        }
    }
}

fn read_file_comments(path: &Path) -> Result<String, RecordError> {
    let file = fs::File::open(path).map_err(|source| RecordError::Read {
        path: path.display().to_string(),
        source,
    })?;
    read_prior_comments(BufReader::new(file))
        .map(|leading| leading.comments)
        .map_err(|source| RecordError::Read {
            path: path.display().to_string(),
            source,
        })
}

fn push_block(content: &mut String, block: &str) {
    if block.is_empty() {
        return;
    }
    content.push_str(block);
    if !block.ends_with('\n') {
        content.push('\n');
    }
}

fn argument_content(line: &str) -> Option<&str> {
    let mut chars = line.chars();
    chars.next().filter(|ch| *ch == '#')?;
    chars.next().and_then(ArgumentRole::from_marker)?;
    chars.as_str().strip_prefix(ARGUMENT_INDENT)
}

fn quote_open_after(text: &str, mut open: bool) -> bool {
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if open => {
                chars.next();
            }
            '"' => open = !open,
            _ => {}
        }
    }
    open
}
