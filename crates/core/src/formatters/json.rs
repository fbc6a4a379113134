use crate::Result;
use crate::article::Article;
use crate::pipeline::RunStats;
use crate::render::group_by_section;
use serde::Serialize;

/// Complete JSON output structure
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'a> {
    /// Site title
    pub title: &'a str,
    /// Sections in first-appearance order
    pub sections: Vec<SectionEntry<'a>>,
    /// Counters for the run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<&'a RunStats>,
    /// Article records in reading order
    pub articles: Vec<ArticleEntry<'a>>,
}

/// A section and how many articles it holds
#[derive(Debug, Clone, Serialize)]
pub struct SectionEntry<'a> {
    pub name: &'a str,
    pub count: usize,
}

/// One article record
#[derive(Debug, Clone, Serialize)]
pub struct ArticleEntry<'a> {
    pub title: &'a str,
    pub section: &'a str,
    pub rubric: &'a str,
    pub display_header: &'a str,
    pub slug: &'a str,
    pub output_path: &'a str,
    pub source_document: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<&'a str>,
    pub word_count: usize,
    pub images: &'a [String],
    /// Body HTML
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<&'a str>,
}

/// Configuration for JSON output
#[derive(Debug, Clone, Default)]
pub struct JsonConfig {
    /// Include body HTML in each record
    pub include_body: bool,
    /// Include run statistics
    pub include_stats: bool,
    /// Pretty print JSON output
    pub pretty: bool,
}

impl<'a> ArticleEntry<'a> {
    fn new(article: &'a Article, include_body: bool) -> Self {
        Self {
            title: &article.title,
            section: &article.section,
            rubric: &article.rubric,
            display_header: &article.display_header,
            slug: &article.slug,
            output_path: &article.output_path,
            source_document: article.source_document.to_string_lossy().replace('\\', "/"),
            date: article.date.as_deref(),
            word_count: article.word_count,
            images: &article.images,
            body: if include_body { Some(&article.body) } else { None },
        }
    }
}

/// Convert articles to the JSON manifest format
pub fn convert_to_json(
    title: &str, articles: &[Article], stats: Option<&RunStats>, config: &JsonConfig,
) -> Result<String> {
    let sections = group_by_section(articles)
        .into_iter()
        .map(|(name, members)| SectionEntry { name, count: members.len() })
        .collect();

    let output = JsonOutput {
        title,
        sections,
        stats: if config.include_stats { stats } else { None },
        articles: articles.iter().map(|a| ArticleEntry::new(a, config.include_body)).collect(),
    };

    if config.pretty { Ok(serde_json::to_string_pretty(&output)?) } else { Ok(serde_json::to_string(&output)?) }
}

/// JSON formatter with configurable options
pub struct JsonFormatter {
    config: JsonConfig,
}

impl JsonFormatter {
    pub fn new(config: JsonConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, title: &str, articles: &[Article], stats: Option<&RunStats>) -> Result<String> {
        convert_to_json(title, articles, stats, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn article(title: &str, section: &str) -> Article {
        let mut article = Article::new(title, section, "Kicker", PathBuf::from("OEBPS/a.xhtml"));
        article.push_body("<p>Content here.</p>", "Content here.");
        article.seal();
        article.slug = title.to_lowercase();
        article.output_path = format!("articles/{}.html", article.slug);
        article
    }

    #[test]
    fn test_convert_to_json_records() {
        let articles = vec![article("One", "Leaders"), article("Two", "Britain"), article("Three", "Leaders")];
        let json = convert_to_json("Weekly", &articles, None, &JsonConfig::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["title"], "Weekly");
        assert_eq!(value["articles"].as_array().unwrap().len(), 3);
        assert_eq!(value["articles"][0]["output_path"], "articles/one.html");
        assert_eq!(value["articles"][0]["source_document"], "OEBPS/a.xhtml");
        assert_eq!(value["articles"][0]["rubric"], "Kicker");
        assert_eq!(value["sections"][0]["name"], "Leaders");
        assert_eq!(value["sections"][0]["count"], 2);
        assert!(value["articles"][0].get("body").is_none());
        assert!(value.get("stats").is_none());
    }

    #[test]
    fn test_convert_to_json_with_body_and_stats() {
        let articles = vec![article("One", "Leaders")];
        let stats = RunStats { documents: 2, kept: 1, segmented: 1, ..Default::default() };
        let config = JsonConfig { include_body: true, include_stats: true, pretty: false };

        let json = convert_to_json("Weekly", &articles, Some(&stats), &config).unwrap();

        assert!(json.contains(r#""body":"<p>Content here.</p>""#));
        assert!(json.contains(r#""documents":2"#));
    }

    #[test]
    fn test_pretty_output() {
        let formatter = JsonFormatter::new(JsonConfig { pretty: true, ..Default::default() });
        let json = formatter.convert("Weekly", &[article("One", "Leaders")], None).unwrap();

        assert!(json.starts_with("{\n"));
        assert!(json.contains("\n  \"title\": \"Weekly\""));
    }

    #[test]
    fn test_empty_articles() {
        let json = convert_to_json("Weekly", &[], None, &JsonConfig::default()).unwrap();
        assert!(json.contains(r#""articles":[]"#));
        assert!(json.contains(r#""sections":[]"#));
    }
}
