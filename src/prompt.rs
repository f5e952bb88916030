//! Console prompts for whatever the command line and config file left unset.

use crate::config::ConfigFile;
use crate::error::ConfigError;
use std::io::{BufRead, Write};

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> Result<String, ConfigError> {
    write!(output, "{label}: ")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn ask_number<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
    field: &'static str,
) -> Result<usize, ConfigError> {
    let answer = ask(input, output, label)?;
    answer
        .parse()
        .map_err(|_| ConfigError::Invalid { field, value: answer })
}

/// Prompts, in order, for email, API key, taxid, minimum and maximum length,
/// skipping anything already present in `partial`.
pub fn complete_interactively<R: BufRead, W: Write>(
    mut partial: ConfigFile,
    input: &mut R,
    output: &mut W,
) -> Result<ConfigFile, ConfigError> {
    if partial.email.as_deref().is_none_or(|v| v.trim().is_empty()) {
        partial.email = Some(ask(input, output, "Enter your email address for NCBI")?);
    }
    if partial.api_key.is_none() {
        partial.api_key = Some(ask(input, output, "Enter your NCBI API key")?);
    }
    if partial.taxonomic_id.as_deref().is_none_or(|v| v.trim().is_empty()) {
        partial.taxonomic_id = Some(ask(
            input,
            output,
            "Enter taxonomic ID (taxid) of the organism",
        )?);
    }
    if partial.min_length.is_none() {
        partial.min_length = Some(ask_number(
            input,
            output,
            "Enter minimum sequence length",
            "min_length",
        )?);
    }
    if partial.max_length.is_none() {
        partial.max_length = Some(ask_number(
            input,
            output,
            "Enter maximum sequence length",
            "max_length",
        )?);
    }
    Ok(partial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn prompts_for_everything_in_order() {
        let mut input = Cursor::new("me@example.org\nKEY123\n3702\n100\n1000\n");
        let mut output = Vec::new();
        let filled = complete_interactively(ConfigFile::default(), &mut input, &mut output).unwrap();
        assert_eq!(filled.email.as_deref(), Some("me@example.org"));
        assert_eq!(filled.api_key.as_deref(), Some("KEY123"));
        assert_eq!(filled.taxonomic_id.as_deref(), Some("3702"));
        assert_eq!(filled.min_length, Some(100));
        assert_eq!(filled.max_length, Some(1000));

        let shown = String::from_utf8(output).unwrap();
        let email_at = shown.find("email address").unwrap();
        let key_at = shown.find("API key").unwrap();
        let max_at = shown.find("maximum sequence length").unwrap();
        assert!(email_at < key_at && key_at < max_at);
    }

    #[test]
    fn skips_values_already_known() {
        let partial = ConfigFile {
            email: Some("me@example.org".to_string()),
            api_key: Some(String::new()),
            taxonomic_id: Some("9606".to_string()),
            ..Default::default()
        };
        let mut input = Cursor::new("5\n50\n");
        let mut output = Vec::new();
        let filled = complete_interactively(partial, &mut input, &mut output).unwrap();
        assert_eq!(filled.min_length, Some(5));
        assert_eq!(filled.max_length, Some(50));
        assert!(!String::from_utf8(output).unwrap().contains("email"));
    }

    #[test]
    fn non_numeric_length_is_rejected() {
        let partial = ConfigFile {
            email: Some("me@example.org".to_string()),
            api_key: Some(String::new()),
            taxonomic_id: Some("9606".to_string()),
            ..Default::default()
        };
        let mut input = Cursor::new("many\n");
        let err = complete_interactively(partial, &mut input, &mut Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "min_length",
                ..
            }
        ));
    }
}
