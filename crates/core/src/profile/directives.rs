use crate::error::{FolioError, Result};
use crate::filter::AllowSet;
use crate::pipeline::PipelineConfig;
use crate::render::SiteOptions;

/// A single profile directive
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Section filtering
    AllowSection(String),
    AllSections(bool),

    /// Classifier tuning
    SectionClass(String),
    RubricClass(String),
    LabelMaxChars(usize),

    /// Segmentation and output naming
    MinBodyChars(usize),
    MaxSlugLen(usize),
    AssetPrefix(String),

    /// Text pattern (regex) removed before classification
    StripText(String),

    /// Site output
    FeedTitle(String),
    BaseUrl(String),
}

/// Settings gathered from one or more profile files
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub allow_sections: Vec<String>,
    pub all_sections: Option<bool>,

    pub section_classes: Vec<String>,
    pub rubric_classes: Vec<String>,
    pub label_max_chars: Option<usize>,

    pub min_body_chars: Option<usize>,
    pub max_slug_len: Option<usize>,
    pub asset_prefix: Option<String>,

    pub strip_text: Vec<String>,

    pub feed_title: Option<String>,
    pub base_url: Option<String>,
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directive to this profile
    pub fn add_directive(&mut self, directive: Directive) {
        match directive {
            Directive::AllowSection(name) => self.allow_sections.push(name),
            Directive::AllSections(value) => self.all_sections = Some(value),
            Directive::SectionClass(name) => self.section_classes.push(name),
            Directive::RubricClass(name) => self.rubric_classes.push(name),
            Directive::LabelMaxChars(value) => self.label_max_chars = Some(value),
            Directive::MinBodyChars(value) => self.min_body_chars = Some(value),
            Directive::MaxSlugLen(value) => self.max_slug_len = Some(value),
            Directive::AssetPrefix(prefix) => self.asset_prefix = Some(prefix),
            Directive::StripText(pattern) => self.strip_text.push(pattern),
            Directive::FeedTitle(title) => self.feed_title = Some(title),
            Directive::BaseUrl(url) => self.base_url = Some(url),
        }
    }

    /// Merge another profile into this one.
    /// Lists are extended; scalars set in `other` win.
    pub fn merge(&mut self, other: &Profile) {
        self.allow_sections.extend(other.allow_sections.clone());
        self.section_classes.extend(other.section_classes.clone());
        self.rubric_classes.extend(other.rubric_classes.clone());
        self.strip_text.extend(other.strip_text.clone());

        if other.all_sections.is_some() {
            self.all_sections = other.all_sections;
        }
        if other.label_max_chars.is_some() {
            self.label_max_chars = other.label_max_chars;
        }
        if other.min_body_chars.is_some() {
            self.min_body_chars = other.min_body_chars;
        }
        if other.max_slug_len.is_some() {
            self.max_slug_len = other.max_slug_len;
        }
        if other.asset_prefix.is_some() {
            self.asset_prefix.clone_from(&other.asset_prefix);
        }
        if other.feed_title.is_some() {
            self.feed_title.clone_from(&other.feed_title);
        }
        if other.base_url.is_some() {
            self.base_url.clone_from(&other.base_url);
        }
    }

    /// Apply this profile on top of `config`.
    ///
    /// Configured class names are added to the defaults rather than replacing
    /// them. An `allow_section` list replaces the default allow-list, and
    /// `all_sections: yes` disables filtering altogether.
    pub fn apply(&self, config: &mut PipelineConfig) {
        if self.all_sections == Some(true) {
            config.allow = AllowSet::allow_all();
        } else if !self.allow_sections.is_empty() {
            config.allow = AllowSet::new(&self.allow_sections);
        }

        config.classifier.section_classes.extend(self.section_classes.iter().cloned());
        config.classifier.rubric_classes.extend(self.rubric_classes.iter().cloned());
        config.classifier = config.classifier.clone().normalized();

        if let Some(value) = self.label_max_chars {
            config.classifier.label_max_chars = value;
        }
        if let Some(value) = self.min_body_chars {
            config.min_body_chars = value;
        }
        if let Some(value) = self.max_slug_len {
            config.max_slug_len = value;
        }
        if let Some(prefix) = &self.asset_prefix {
            config.asset_prefix.clone_from(prefix);
        }

        config.preprocess.strip_patterns.extend(self.strip_text.iter().cloned());
    }

    /// Apply the output settings of this profile on top of `options`.
    pub fn apply_site(&self, options: &mut SiteOptions) {
        if let Some(title) = &self.feed_title {
            options.title.clone_from(title);
        }
        if let Some(url) = &self.base_url {
            options.base_url = Some(url.clone());
        }
    }

    /// Check if this profile sets nothing
    pub fn is_empty(&self) -> bool {
        *self == Profile::default()
    }
}

/// Parse a directive line (`key: value`)
pub fn parse_directive(line: &str) -> Result<Directive> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Err(FolioError::ProfileError("Empty or comment line".to_string()));
    }

    let Some((key, value)) = line.split_once(':') else {
        return Err(FolioError::ProfileError(format!("Invalid directive format: {}", line)));
    };

    let key = key.trim();
    let value = value.trim();
    if value.is_empty() {
        return Err(FolioError::ProfileError(format!("Missing value for directive: {}", key)));
    }

    match key {
        "allow_section" => Ok(Directive::AllowSection(value.to_string())),
        "all_sections" => Ok(Directive::AllSections(parse_boolean(value)?)),
        "section_class" => Ok(Directive::SectionClass(value.to_string())),
        "rubric_class" => Ok(Directive::RubricClass(value.to_string())),
        "label_max_chars" => Ok(Directive::LabelMaxChars(parse_count(key, value)?)),
        "min_body_chars" => Ok(Directive::MinBodyChars(parse_count(key, value)?)),
        "max_slug_len" => Ok(Directive::MaxSlugLen(parse_count(key, value)?)),
        "asset_prefix" => Ok(Directive::AssetPrefix(value.to_string())),
        "strip_text" => {
            regex::Regex::new(value)
                .map_err(|e| FolioError::ProfileError(format!("Invalid strip_text pattern {}: {}", value, e)))?;
            Ok(Directive::StripText(value.to_string()))
        }
        "feed_title" => Ok(Directive::FeedTitle(value.to_string())),
        "base_url" => Ok(Directive::BaseUrl(value.to_string())),
        _ => Err(FolioError::ProfileError(format!("Unknown directive: {}", key))),
    }
}

/// Parse a boolean value
fn parse_boolean(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "yes" | "true" | "1" => Ok(true),
        "no" | "false" | "0" => Ok(false),
        _ => Err(FolioError::ProfileError(format!("Invalid boolean value: {}", value))),
    }
}

fn parse_count(key: &str, value: &str) -> Result<usize> {
    match value.parse::<usize>() {
        Ok(0) | Err(_) => Err(FolioError::ProfileError(format!(
            "{} expects a positive integer, got {}",
            key, value
        ))),
        Ok(n) => Ok(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_directive_lists() {
        assert_eq!(
            parse_directive("allow_section: Finance & Economics").unwrap(),
            Directive::AllowSection("Finance & Economics".to_string())
        );
        assert_eq!(
            parse_directive("rubric_class:fly-title").unwrap(),
            Directive::RubricClass("fly-title".to_string())
        );
    }

    #[test]
    fn test_parse_directive_value_with_colon() {
        assert_eq!(
            parse_directive("base_url: https://example.com/issue/").unwrap(),
            Directive::BaseUrl("https://example.com/issue/".to_string())
        );
    }

    #[test]
    fn test_parse_directive_boolean() {
        assert_eq!(parse_directive("all_sections: yes").unwrap(), Directive::AllSections(true));
        assert_eq!(parse_directive("all_sections: no").unwrap(), Directive::AllSections(false));
        assert!(parse_directive("all_sections: maybe").is_err());
    }

    #[test]
    fn test_parse_directive_counts() {
        assert_eq!(parse_directive("label_max_chars: 30").unwrap(), Directive::LabelMaxChars(30));
        assert!(parse_directive("min_body_chars: 0").is_err());
        assert!(parse_directive("max_slug_len: lots").is_err());
    }

    #[test]
    fn test_parse_directive_invalid() {
        assert!(parse_directive("invalid_directive").is_err());
        assert!(parse_directive("unknown: 1").is_err());
        assert!(parse_directive("feed_title:").is_err());
        assert!(parse_directive("strip_text: (unclosed").is_err());
    }

    #[test]
    fn test_profile_merge() {
        let mut first = Profile::new();
        first.add_directive(Directive::AllowSection("Leaders".to_string()));
        first.add_directive(Directive::MinBodyChars(200));
        first.add_directive(Directive::FeedTitle("First".to_string()));

        let mut second = Profile::new();
        second.add_directive(Directive::AllowSection("Letters".to_string()));
        second.add_directive(Directive::MinBodyChars(50));

        first.merge(&second);

        assert_eq!(first.allow_sections, vec!["Leaders", "Letters"]);
        assert_eq!(first.min_body_chars, Some(50));
        assert_eq!(first.feed_title.as_deref(), Some("First"));
    }

    #[test]
    fn test_apply_replaces_allow_list_and_extends_classes() {
        let mut profile = Profile::new();
        profile.add_directive(Directive::AllowSection("Obituary".to_string()));
        profile.add_directive(Directive::RubricClass("Topper".to_string()));
        profile.add_directive(Directive::LabelMaxChars(30));
        profile.add_directive(Directive::StripText("Advertisement".to_string()));

        let mut config = PipelineConfig::default();
        profile.apply(&mut config);

        assert!(config.allow.contains("obituary"));
        assert!(!config.allow.contains("leaders"));
        assert!(config.classifier.rubric_classes.contains(&"topper".to_string()));
        assert!(config.classifier.rubric_classes.contains(&"kicker".to_string()));
        assert_eq!(config.classifier.label_max_chars, 30);
        assert!(config.preprocess.strip_patterns.contains(&"Advertisement".to_string()));
    }

    #[test]
    fn test_apply_all_sections_wins() {
        let mut profile = Profile::new();
        profile.add_directive(Directive::AllowSection("Leaders".to_string()));
        profile.add_directive(Directive::AllSections(true));

        let mut config = PipelineConfig::default();
        profile.apply(&mut config);

        assert!(config.allow.is_allow_all());
    }

    #[test]
    fn test_apply_site() {
        let mut profile = Profile::new();
        profile.add_directive(Directive::FeedTitle("Weekly".to_string()));
        profile.add_directive(Directive::BaseUrl("https://example.com/".to_string()));

        let mut options = SiteOptions::default();
        profile.apply_site(&mut options);

        assert_eq!(options.title, "Weekly");
        assert_eq!(options.base_url.as_deref(), Some("https://example.com/"));
    }

    #[test]
    fn test_profile_is_empty() {
        assert!(Profile::new().is_empty());

        let mut profile = Profile::new();
        profile.add_directive(Directive::MaxSlugLen(40));
        assert!(!profile.is_empty());
    }
}
