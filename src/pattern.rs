//! Pattern compilation and the output schema derived from it

use crate::error::FatalError;
use clap::ValueEnum;
use regex::bytes::{Captures, Regex};

/// How positional pattern arguments are glued together
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum JoinSeparator {
    /// `foo bar` -> "foo bar"
    #[default]
    Space,
    /// `foo bar` -> "foobar"
    None,
}

impl JoinSeparator {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinSeparator::Space => " ",
            JoinSeparator::None => "",
        }
    }
}

/// The run's single regular expression, compiled once.
///
/// Matching is done on raw bytes so extracted values are byte-identical
/// to the file contents, whatever their encoding.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
    group_count: usize,
}

impl CompiledPattern {
    /// Join the positional arguments and compile them
    pub fn from_args<S: AsRef<str>>(args: &[S], separator: JoinSeparator) -> Result<Self, FatalError> {
        if args.is_empty() {
            return Err(FatalError::NoPatterns);
        }

        let joined = args
            .iter()
            .map(|a| a.as_ref())
            .collect::<Vec<_>>()
            .join(separator.as_str());

        Self::new(&joined)
    }

    pub fn new(pattern: &str) -> Result<Self, FatalError> {
        let regex = Regex::new(pattern).map_err(|source| FatalError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        // captures_len includes the implicit group 0
        let group_count = regex.captures_len() - 1;

        Ok(Self { regex, group_count })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Number of capture groups, excluding the whole match
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    pub fn schema(&self) -> OutputSchema {
        OutputSchema::for_group_count(self.group_count)
    }

    /// Apply the pattern to one line, returning the record values on match
    pub fn extract(&self, line: &[u8]) -> Option<Vec<Vec<u8>>> {
        if self.group_count == 0 {
            return self.regex.is_match(line).then(|| vec![line.to_vec()]);
        }

        self.regex.captures(line).map(|caps| self.group_values(&caps))
    }

    fn group_values(&self, caps: &Captures<'_>) -> Vec<Vec<u8>> {
        (1..=self.group_count)
            .map(|i| caps.get(i).map(|m| m.as_bytes().to_vec()).unwrap_or_default())
            .collect()
    }
}

/// Header row of the output, fixed for the whole run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSchema {
    columns: Vec<String>,
}

impl OutputSchema {
    pub fn for_group_count(group_count: usize) -> Self {
        let mut columns = vec!["repo".to_string(), "file".to_string()];
        if group_count == 0 {
            columns.push("line".to_string());
        } else {
            columns.extend((1..=group_count).map(|i| format!("group{}", i)));
        }
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of value columns after `repo` and `file`
    pub fn value_columns(&self) -> usize {
        self.columns.len() - 2
    }
}
