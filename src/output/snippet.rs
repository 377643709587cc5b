//! Source-context excerpts for failure reports

/// Up to three numbered source lines around `line` (1-based): the line
/// before, the line itself, and the line after. `None` when the file is
/// unreadable; the excerpt is decoration.
pub(crate) fn source_excerpt(file: &str, line: u32) -> Option<Vec<(u32, String)>> {
    let contents = std::fs::read_to_string(file).ok()?;
    let lines: Vec<&str> = contents.split('\n').collect();

    let target = line as usize;
    let start = target.saturating_sub(2);
    let end = (target + 1).min(lines.len());

    let mut excerpt = Vec::new();
    for index in start..end {
        excerpt.push((index as u32 + 1, lines[index].to_string()));
    }
    Some(excerpt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn excerpt_centers_on_the_requested_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "one\ntwo\nthree\nfour").unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let excerpt = source_excerpt(&path, 2).unwrap();

        let numbers: Vec<u32> = excerpt.iter().map(|(n, _)| *n).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(excerpt[1].1, "two");
    }

    #[test]
    fn excerpt_clamps_at_file_boundaries() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "only").unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let excerpt = source_excerpt(&path, 1).unwrap();
        assert_eq!(excerpt.len(), 1);
        assert_eq!(excerpt[0], (1, "only".to_string()));
    }

    #[test]
    fn unreadable_files_yield_nothing() {
        assert!(source_excerpt("/definitely/not/here.rs", 3).is_none());
    }
}
