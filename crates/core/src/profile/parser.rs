use crate::error::{FolioError, Result};
use crate::profile::directives::{Profile, parse_directive};
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Profile file parser
#[derive(Debug)]
pub struct ProfileParser;

impl ProfileParser {
    /// Parse a single profile file
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Profile> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(FolioError::FileNotFound(path.to_path_buf()));
        }

        let file = std::fs::File::open(path)
            .map_err(|e| FolioError::ProfileError(format!("Cannot open file {}: {}", path.display(), e)))?;

        Self::parse_reader(BufReader::new(file))
    }

    /// Parse a profile from a reader
    pub fn parse_reader<R: BufRead>(reader: R) -> Result<Profile> {
        let mut profile = Profile::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| FolioError::ProfileError(format!("Read error at line {}: {}", index + 1, e)))?;
            Self::parse_line(&mut profile, &line, index + 1)?;
        }

        Ok(profile)
    }

    /// Parse a profile from a string
    pub fn parse_string(content: &str) -> Result<Profile> {
        let mut profile = Profile::new();

        for (index, line) in content.lines().enumerate() {
            Self::parse_line(&mut profile, line, index + 1)?;
        }

        Ok(profile)
    }

    fn parse_line(profile: &mut Profile, line: &str, line_number: usize) -> Result<()> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        let directive = parse_directive(line)
            .map_err(|e| FolioError::ProfileError(format!("Parse error at line {}: {}", line_number, e)))?;
        profile.add_directive(directive);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_string_basic() {
        let content = r#"
# Weekly news magazine
allow_section: Leaders
allow_section: Britain
rubric_class: topper
min_body_chars: 250
all_sections: no
"#;

        let profile = ProfileParser::parse_string(content).unwrap();

        assert_eq!(profile.allow_sections, vec!["Leaders", "Britain"]);
        assert_eq!(profile.rubric_classes, vec!["topper"]);
        assert_eq!(profile.min_body_chars, Some(250));
        assert_eq!(profile.all_sections, Some(false));
    }

    #[test]
    fn test_parse_reader() {
        let cursor = Cursor::new("feed_title: The Weekly\nmax_slug_len: 40\n");
        let profile = ProfileParser::parse_reader(cursor).unwrap();

        assert_eq!(profile.feed_title.as_deref(), Some("The Weekly"));
        assert_eq!(profile.max_slug_len, Some(40));
    }

    #[test]
    fn test_parse_error_reports_line() {
        let content = "allow_section: Leaders\n\nbogus line\n";
        let err = ProfileParser::parse_string(content).unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_parse_empty_and_comments() {
        let profile = ProfileParser::parse_string("# nothing\n\n   \n# here\n").unwrap();
        assert!(profile.is_empty());
    }

    #[test]
    fn test_parse_file_missing() {
        let err = ProfileParser::parse_file("/nonexistent/profile.txt").unwrap_err();
        assert!(matches!(err, FolioError::FileNotFound(_)));
    }
}
