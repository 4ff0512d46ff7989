use super::{ArgumentToken, InvocationRecord, RecordError};

pub const SEPARATOR_WIDTH: usize = 80;
pub const SEPARATOR_FILL: char = '#';
pub const ARGUMENT_INDENT: &str = "   ";

const MIN_SEPARATOR_FILL: usize = 2;

/// Separator line framing an optional label, centered in a run of `#`.
pub fn separator_line(label: Option<&str>) -> String {
    let label = label
        .map(|label| label.replace(['\n', '\r'], " "))
        .filter(|label| !label.trim().is_empty());
    let Some(label) = label else {
        return SEPARATOR_FILL.to_string().repeat(SEPARATOR_WIDTH);
    };

    let framed = format!(" {label} ");
    let used = framed.chars().count();
    let pad = SEPARATOR_WIDTH
        .saturating_sub(used)
        .max(MIN_SEPARATOR_FILL * 2);
    let left = (pad / 2).max(MIN_SEPARATOR_FILL);
    let right = (pad - pad / 2).max(MIN_SEPARATOR_FILL);
    format!(
        "{}{framed}{}",
        SEPARATOR_FILL.to_string().repeat(left),
        SEPARATOR_FILL.to_string().repeat(right)
    )
}

/// `#[<][>[VAR]] program`
pub fn header_line(record: &InvocationRecord) -> String {
    let mut line = String::from("#");
    if record.pipe_role.reads_pipe() {
        line.push('<');
    }
    if let Some(variable) = &record.output_variable {
        line.push('>');
        line.push_str(variable.as_str());
    } else if record.pipe_role.writes_pipe() {
        line.push('>');
    }
    line.push(' ');
    line.push_str(&record.program);
    line
}

pub fn argument_line(token: &ArgumentToken) -> String {
    let mut line = format!("#{}{ARGUMENT_INDENT}", token.role.marker());
    let mut parts = Vec::new();
    if let Some(flag) = &token.flag {
        parts.push(flag.clone());
    }
    if let Some(value) = &token.value {
        parts.push(quote_value(value));
    }
    line.push_str(&parts.join(" "));
    line
}

/// Double-quotes `value`, escaping embedded quotes and backslashes. Line
/// breaks are kept literally.
pub fn quote_value(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

/// Renders one comment block: separator, header, then one line per argument
/// token. The result ends with a newline.
pub fn encode_record(
    record: &InvocationRecord,
    label: Option<&str>,
) -> Result<String, RecordError> {
    record.validate()?;

    let mut block = separator_line(label);
    block.push('\n');
    block.push_str(&header_line(record));
    block.push('\n');
    for token in &record.arguments {
        block.push_str(&argument_line(token));
        block.push('\n');
    }
    Ok(block)
}
