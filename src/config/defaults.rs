use super::ConfigError;
use crate::shared::VariableName;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Splits `name:value` on the first `:`.
pub fn parse_substitution(raw: &str) -> Result<(VariableName, String), ConfigError> {
    let Some((name, value)) = raw.split_once(':') else {
        return Err(ConfigError::Substitution {
            raw: raw.to_string(),
            reason: "expected `name:value`".to_string(),
        });
    };
    let name = VariableName::parse(name.trim()).map_err(|reason| ConfigError::Substitution {
        raw: raw.to_string(),
        reason,
    })?;
    Ok((name, value.to_string()))
}

/// Newline-delimited `name:value` pairs; blank lines and `#` comments are
/// skipped. Later lines win.
pub fn parse_defaults(text: &str, path: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut variables = BTreeMap::new();
    for (index, line) in text.lines().enumerate() {
        let trimmed = line.trim_end_matches('\r');
        if trimmed.trim().is_empty() || trimmed.trim_start().starts_with('#') {
            continue;
        }
        let (name, value) =
            parse_substitution(trimmed).map_err(|_| ConfigError::DefaultsLine {
                path: path.to_string(),
                line: index + 1,
                text: trimmed.to_string(),
            })?;
        variables.insert(name.to_string(), value);
    }
    Ok(variables)
}

pub fn load_defaults_file(path: &Path) -> Result<BTreeMap<String, String>, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_defaults(&raw, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutions_split_on_first_colon() {
        let (name, value) = parse_substitution("url:http://host:80/x").expect("parse");
        assert_eq!(name.as_str(), "url");
        assert_eq!(value, "http://host:80/x");

        let (_, empty) = parse_substitution("blank:").expect("parse");
        assert_eq!(empty, "");
    }

    #[test]
    fn substitutions_need_a_valid_name() {
        assert!(parse_substitution("novalue").is_err());
        assert!(parse_substitution(":x").is_err());
        assert!(parse_substitution("a b:x").is_err());
    }

    #[test]
    fn defaults_skip_blanks_and_comments() {
        let text = "# shared defaults\n\nstage:dev\r\nroot:/srv\nstage:prod\n";
        let vars = parse_defaults(text, "defaults.txt").expect("parse");
        assert_eq!(vars.get("stage").map(String::as_str), Some("prod"));
        assert_eq!(vars.get("root").map(String::as_str), Some("/srv"));
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn malformed_default_lines_report_their_position() {
        let err = parse_defaults("a:1\nbroken\n", "d.txt").expect_err("broken");
        assert_eq!(
            err.to_string(),
            "d.txt:2: expected `name:value`, found `broken`"
        );
    }
}
