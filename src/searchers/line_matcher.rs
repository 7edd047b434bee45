use crate::pattern::CompiledPattern;
use std::io::{self, BufRead};

/// Files whose first bytes contain NUL are treated as binary
const BINARY_SNIFF_LEN: usize = 8000;

/// Why scanning one file stopped early
#[derive(Debug)]
pub enum MatchError<E> {
    /// The file could not be read; only this file is affected
    Read(io::Error),
    /// The emit callback failed; this aborts the run
    Emit(E),
}

/// What happened to one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Scanned { matches: usize },
    Binary,
}

/// 1行ずつパターンを適用し、マッチした値を `emit` に渡す
///
/// Lines are split on `\n`; the terminator and a trailing `\r` are not part
/// of the line, and a last line without terminator is still scanned.
pub fn scan<R, F, E>(reader: &mut R, pattern: &CompiledPattern, mut emit: F) -> Result<FileOutcome, MatchError<E>>
where
    R: BufRead + ?Sized,
    F: FnMut(Vec<Vec<u8>>) -> Result<(), E>,
{
    let head = reader.fill_buf().map_err(MatchError::Read)?;
    if head[..head.len().min(BINARY_SNIFF_LEN)].contains(&0) {
        return Ok(FileOutcome::Binary);
    }

    let mut matches = 0;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf).map_err(MatchError::Read)?;
        if read == 0 {
            break;
        }

        if let Some(values) = pattern.extract(trim_terminator(&buf)) {
            emit(values).map_err(MatchError::Emit)?;
            matches += 1;
        }
    }

    Ok(FileOutcome::Scanned { matches })
}

fn trim_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
