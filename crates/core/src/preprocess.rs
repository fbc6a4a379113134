use std::sync::LazyLock;

use regex::Regex;

/// Download watermark appended by some archive mirrors.
pub const DEFAULT_STRIP_PATTERN: &str = r#"This article was downloaded by \S+ from https?://[^\s<"]+"#;

static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment regex"));

/// Configuration for loading a content document before classification
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Whether to remove script tags
    pub remove_scripts: bool,
    /// Whether to remove style and stylesheet link tags
    pub remove_styles: bool,
    /// Whether to remove noscript tags
    pub remove_noscript: bool,
    /// Whether to remove iframe tags
    pub remove_iframes: bool,
    /// Whether to remove nav landmarks (in-book tables of contents)
    pub remove_nav: bool,
    /// Text patterns (regex) removed from the markup
    pub strip_patterns: Vec<String>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            remove_scripts: true,
            remove_styles: true,
            remove_noscript: true,
            remove_iframes: true,
            remove_nav: true,
            strip_patterns: vec![DEFAULT_STRIP_PATTERN.to_string()],
        }
    }
}

/// Strip chrome from a content document so only classifiable markup remains
pub fn preprocess_html(html: &str, config: &PreprocessConfig) -> String {
    let mut processed = html.to_string();

    if config.remove_scripts || config.remove_styles || config.remove_noscript || config.remove_iframes || config.remove_nav
    {
        processed = remove_unwanted_tags(&processed, config);
    }

    processed = remove_comments(&processed);

    if !config.strip_patterns.is_empty() {
        processed = strip_text_patterns(&processed, &config.strip_patterns);
    }

    processed
}

/// Remove script, style, noscript, iframe, and nav tags from HTML
fn remove_unwanted_tags(html: &str, config: &PreprocessConfig) -> String {
    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![
                if config.remove_scripts {
                    Some(lol_html::element!("script", |el| {
                        el.remove();
                        Ok(())
                    }))
                } else {
                    None
                },
                if config.remove_styles {
                    Some(lol_html::element!("style", |el| {
                        el.remove();
                        Ok(())
                    }))
                } else {
                    None
                },
                if config.remove_styles {
                    Some(lol_html::element!(r#"link[rel~="stylesheet"]"#, |el| {
                        el.remove();
                        Ok(())
                    }))
                } else {
                    None
                },
                if config.remove_noscript {
                    Some(lol_html::element!("noscript", |el| {
                        el.remove();
                        Ok(())
                    }))
                } else {
                    None
                },
                if config.remove_iframes {
                    Some(lol_html::element!("iframe", |el| {
                        el.remove();
                        Ok(())
                    }))
                } else {
                    None
                },
                if config.remove_nav {
                    Some(lol_html::element!("nav", |el| {
                        el.remove();
                        Ok(())
                    }))
                } else {
                    None
                },
            ]
            .into_iter()
            .flatten()
            .collect(),
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    if rewriter.write(html.as_bytes()).is_err() {
        return html.to_string();
    }

    if rewriter.end().is_err() {
        return html.to_string();
    }

    if output.is_empty() { html.to_string() } else { output }
}

/// Remove HTML comments from the document
fn remove_comments(html: &str) -> String {
    COMMENT_RE.replace_all(html, "").to_string()
}

/// Remove boilerplate text; invalid patterns are logged and ignored
fn strip_text_patterns(html: &str, patterns: &[String]) -> String {
    let mut result = html.to_string();

    for pattern in patterns {
        match Regex::new(pattern) {
            Ok(re) => result = re.replace_all(&result, "").to_string(),
            Err(e) => tracing::warn!(pattern = %pattern, error = %e, "ignoring invalid strip pattern"),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_unwanted_tags() {
        let html = r#"
            <html>
                <head>
                    <script>alert('test');</script>
                    <style>body{color:red;}</style>
                    <link rel="stylesheet" href="../styles/issue.css"/>
                </head>
                <body>
                    <nav><ol><li><a href="a.xhtml">Contents</a></li></ol></nav>
                    <noscript>Enable JavaScript</noscript>
                    <iframe src="https://example.com"></iframe>
                    <p>Content</p>
                </body>
            </html>
        "#;

        let result = remove_unwanted_tags(html, &PreprocessConfig::default());
        assert!(!result.contains("<script"));
        assert!(!result.contains("<style"));
        assert!(!result.contains("issue.css"));
        assert!(!result.contains("<nav"));
        assert!(!result.contains("Contents"));
        assert!(!result.contains("<noscript"));
        assert!(!result.contains("<iframe"));
        assert!(result.contains("<p>Content</p>"));
    }

    #[test]
    fn test_keep_nav_when_disabled() {
        let html = "<nav><a href='x'>Home</a></nav><p>Body</p>";
        let config = PreprocessConfig { remove_nav: false, ..Default::default() };

        let result = preprocess_html(html, &config);
        assert!(result.contains("<nav>"));
    }

    #[test]
    fn test_remove_comments() {
        let html = "<p>Keep</p><!-- drop\nme --><p>Also</p>";
        assert_eq!(remove_comments(html), "<p>Keep</p><p>Also</p>");
    }

    #[test]
    fn test_strip_download_watermark() {
        let html = "<p>Growth slowed. This article was downloaded by zlibrary from https://example.org/x</p>";
        let result = preprocess_html(html, &PreprocessConfig::default());

        assert!(result.contains("Growth slowed. </p>"));
        assert!(!result.contains("downloaded by"));
    }

    #[test]
    fn test_invalid_strip_pattern_is_ignored() {
        let html = "<p>Text</p>";
        let result = strip_text_patterns(html, &["(unclosed".to_string()]);
        assert_eq!(result, html);
    }
}
