use crate::error::Result;
use crate::profile::directives::Profile;
use crate::profile::parser::ProfileParser;
use std::path::{Path, PathBuf};

/// Name of the per-user profile inside the config directory
pub const USER_PROFILE_NAME: &str = "profile.txt";

/// Loads and merges profile files
#[derive(Debug, Clone, Default)]
pub struct ProfileLoader {
    /// Per-user profile, read if present
    user_file: Option<PathBuf>,
    /// Explicitly requested profiles, read in order
    files: Vec<PathBuf>,
}

impl ProfileLoader {
    /// Create a loader that reads nothing until files are added
    pub fn new() -> Self {
        Self { user_file: None, files: Vec::new() }
    }

    /// Create a loader that starts from `~/.config/folio/profile.txt`
    pub fn with_user_profile() -> Self {
        Self { user_file: Self::default_user_file(), files: Vec::new() }
    }

    /// Add an explicitly requested profile
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P) {
        self.files.push(path.as_ref().to_path_buf());
    }

    /// Load the merged profile.
    ///
    /// A broken user profile is logged and ignored; a missing or broken
    /// explicit profile is an error.
    pub fn load(&self) -> Result<Profile> {
        let mut merged = Profile::new();

        if let Some(user_file) = &self.user_file
            && user_file.is_file()
        {
            match ProfileParser::parse_file(user_file) {
                Ok(profile) => merged.merge(&profile),
                Err(e) => tracing::warn!(path = %user_file.display(), error = %e, "ignoring user profile"),
            }
        }

        for path in &self.files {
            let profile = ProfileParser::parse_file(path)?;
            tracing::debug!(path = %path.display(), "loaded profile");
            merged.merge(&profile);
        }

        Ok(merged)
    }

    /// Files this loader would read, in order
    pub fn files(&self) -> Vec<&Path> {
        self.user_file.iter().chain(self.files.iter()).map(PathBuf::as_path).collect()
    }

    /// Get default user profile path (~/.config/folio/profile.txt)
    fn default_user_file() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("folio").join(USER_PROFILE_NAME))
    }
}

/// Builder for ProfileLoader
#[derive(Debug, Default)]
pub struct ProfileLoaderBuilder {
    user_file: Option<PathBuf>,
    files: Vec<PathBuf>,
}

impl ProfileLoaderBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self { user_file: None, files: Vec::new() }
    }

    /// Set the per-user profile path
    pub fn user_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.user_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use the default per-user profile path
    pub fn default_user_file(mut self) -> Self {
        self.user_file = ProfileLoader::default_user_file();
        self
    }

    /// Add an explicit profile
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.files.push(path.as_ref().to_path_buf());
        self
    }

    /// Build the ProfileLoader
    pub fn build(self) -> ProfileLoader {
        ProfileLoader { user_file: self.user_file, files: self.files }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FolioError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_later_files_override_scalars_and_extend_lists() {
        let temp_dir = TempDir::new().unwrap();
        let user = temp_dir.path().join("profile.txt");
        let explicit = temp_dir.path().join("weekly.txt");

        fs::write(&user, "allow_section: Leaders\nmin_body_chars: 300\nfeed_title: Mine\n").unwrap();
        fs::write(&explicit, "allow_section: Letters\nmin_body_chars: 120\n").unwrap();

        let loader = ProfileLoaderBuilder::new().user_file(&user).file(&explicit).build();
        let profile = loader.load().unwrap();

        assert_eq!(profile.allow_sections, vec!["Leaders", "Letters"]);
        assert_eq!(profile.min_body_chars, Some(120));
        assert_eq!(profile.feed_title.as_deref(), Some("Mine"));
    }

    #[test]
    fn test_missing_user_profile_is_fine() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ProfileLoaderBuilder::new().user_file(temp_dir.path().join("absent.txt")).build();

        assert!(loader.load().unwrap().is_empty());
    }

    #[test]
    fn test_broken_user_profile_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let user = temp_dir.path().join("profile.txt");
        fs::write(&user, "not a directive\n").unwrap();

        let loader = ProfileLoaderBuilder::new().user_file(&user).build();
        assert!(loader.load().unwrap().is_empty());
    }

    #[test]
    fn test_missing_explicit_profile_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = ProfileLoader::new();
        loader.add_file(temp_dir.path().join("absent.txt"));

        assert!(matches!(loader.load(), Err(FolioError::FileNotFound(_))));
    }

    #[test]
    fn test_files_order() {
        let loader = ProfileLoaderBuilder::new().user_file("/home/u/p.txt").file("a.txt").file("b.txt").build();
        let files: Vec<_> = loader.files().iter().map(|p| p.to_string_lossy().into_owned()).collect();

        assert_eq!(files, vec!["/home/u/p.txt", "a.txt", "b.txt"]);
    }
}
