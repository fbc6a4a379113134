//! Page, index and feed rendering.
//!
//! Output is plain string templating: article pages are standalone HTML
//! documents, the index lists articles grouped by section in the order the
//! sections first appear, and the feed is RSS 2.0 with the full body in
//! `content:encoded`.

use crate::article::Article;

/// Most items carried in the feed.
pub const DEFAULT_FEED_ITEMS: usize = 30;

/// Default site and feed title.
pub const DEFAULT_SITE_TITLE: &str = "Weekly issue";

const PAGE_STYLE: &str = "body{max-width:720px;margin:0 auto;padding:40px 20px;font-family:Georgia,serif;\
font-size:18px;line-height:1.6;color:#222}.section{color:#e3120b;font-size:12px;text-transform:uppercase;\
letter-spacing:1px;margin-bottom:8px}h1{font-size:32px;margin:0 0 10px;line-height:1.2;font-weight:normal}\
.date{color:#666;font-size:14px;margin-bottom:30px;padding-bottom:20px;border-bottom:1px solid #ddd}\
img{max-width:100%;height:auto;display:block;margin:20px auto}";

const INDEX_STYLE: &str = "body{max-width:800px;margin:40px auto;padding:0 20px;font-family:sans-serif}\
.section-title{color:#e3120b;font-size:14px;text-transform:uppercase;letter-spacing:1px;margin:30px 0 15px;\
border-bottom:2px solid #e3120b}.article{border-bottom:1px solid #eee;padding:12px 0}\
.article a{color:#222;text-decoration:none}";

/// Site-level rendering options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteOptions {
    /// Title of the index page and the feed.
    pub title: String,
    /// Absolute URL the site is published under; feed links are relative without it.
    pub base_url: Option<String>,
    /// Most items carried in the feed.
    pub feed_items: usize,
}

impl Default for SiteOptions {
    fn default() -> Self {
        Self { title: DEFAULT_SITE_TITLE.to_string(), base_url: None, feed_items: DEFAULT_FEED_ITEMS }
    }
}

/// Render one article as a standalone page.
pub fn render_article(article: &Article, site: &SiteOptions) -> String {
    let mut html = String::with_capacity(article.body.len() + 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>{} | {}</title>\n",
        escape_xml(&article.title),
        escape_xml(&site.title)
    ));
    html.push_str(&format!("<style>{}</style>\n</head>\n<body>\n", PAGE_STYLE));

    if !article.display_header.is_empty() {
        html.push_str(&format!("<div class=\"section\">{}</div>\n", escape_xml(&article.display_header)));
    }
    html.push_str(&format!("<h1>{}</h1>\n", escape_xml(&article.title)));
    if let Some(date) = &article.date {
        html.push_str(&format!("<div class=\"date\">{}</div>\n", escape_xml(date)));
    }

    html.push_str("<article>\n");
    html.push_str(&article.body);
    html.push_str("\n</article>\n</body>\n</html>\n");
    html
}

/// Group articles by section, sections in first-appearance order.
pub fn group_by_section(articles: &[Article]) -> Vec<(&str, Vec<&Article>)> {
    let mut groups: Vec<(&str, Vec<&Article>)> = Vec::new();

    for article in articles {
        match groups.iter_mut().find(|(section, _)| *section == article.section) {
            Some((_, members)) => members.push(article),
            None => groups.push((article.section.as_str(), vec![article])),
        }
    }

    groups
}

/// Render the index page.
pub fn render_index(articles: &[Article], site: &SiteOptions) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_xml(&site.title)));
    html.push_str(&format!("<style>{}</style>\n</head>\n<body>\n", INDEX_STYLE));
    html.push_str(&format!("<h1>{}</h1>\n", escape_xml(&site.title)));
    html.push_str(&format!("<div class=\"subtitle\">{} articles</div>\n", articles.len()));

    for (section, members) in group_by_section(articles) {
        html.push_str(&format!("<div class=\"section-title\">{}</div>\n", escape_xml(section)));
        for article in members {
            html.push_str(&format!(
                "<div class=\"article\"><a href=\"{}\">{}</a></div>\n",
                escape_xml(&article.output_path),
                escape_xml(&article.title)
            ));
        }
    }

    html.push_str("<p><a href=\"feed.xml\">RSS feed</a></p>\n</body>\n</html>\n");
    html
}

/// Render the RSS feed for the first `site.feed_items` articles.
///
/// # Errors
///
/// Returns [`crate::FolioError::RenderError`] if `site.base_url` is not a valid URL.
#[cfg(feature = "feed")]
pub fn render_feed(articles: &[Article], site: &SiteOptions, built: time::OffsetDateTime) -> crate::Result<String> {
    use time::format_description::well_known::Rfc2822;

    let base = site.base_url.as_deref().map(parse_base_url).transpose()?;

    let link_to = |path: &str| -> String {
        match &base {
            Some(base) => base.join(path).map(|u| u.to_string()).unwrap_or_else(|_| path.to_string()),
            None => path.to_string(),
        }
    };

    let built = built
        .format(&Rfc2822)
        .map_err(|e| crate::FolioError::RenderError(format!("cannot format build date: {}", e)))?;

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<rss xmlns:content=\"http://purl.org/rss/1.0/modules/content/\" version=\"2.0\">\n<channel>\n");
    xml.push_str(&format!("<title>{}</title>\n", escape_xml(&site.title)));
    xml.push_str(&format!("<link>{}</link>\n", escape_xml(&link_to(""))));
    xml.push_str(&format!("<description>Full-text articles from {}</description>\n", escape_xml(&site.title)));
    xml.push_str("<language>en</language>\n");
    xml.push_str(&format!("<lastBuildDate>{}</lastBuildDate>\n", built));

    for article in articles.iter().take(site.feed_items) {
        let link = escape_xml(&link_to(&article.output_path));
        xml.push_str("<item>\n");
        xml.push_str(&format!("<title>{}</title>\n", cdata(&article.title)));
        xml.push_str(&format!("<link>{}</link>\n<guid>{}</guid>\n", link, link));
        xml.push_str(&format!(
            "<description>{}</description>\n",
            cdata(&format!("{} - {}", article.display_header, article.title))
        ));
        xml.push_str(&format!("<category>{}</category>\n", escape_xml(&article.section)));
        xml.push_str(&format!("<content:encoded>{}</content:encoded>\n", cdata(&article.body)));
        xml.push_str("</item>\n");
    }

    xml.push_str("</channel>\n</rss>\n");
    Ok(xml)
}

/// Parse a base URL so that relative paths join beneath it rather than replace its last segment.
#[cfg(feature = "feed")]
fn parse_base_url(raw: &str) -> crate::Result<url::Url> {
    let with_slash = if raw.ends_with('/') { raw.to_string() } else { format!("{}/", raw) };
    url::Url::parse(&with_slash).map_err(|e| crate::FolioError::RenderError(format!("invalid base URL {}: {}", raw, e)))
}

/// Wrap text in a CDATA section, splitting any embedded terminator.
#[cfg(feature = "feed")]
fn cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}

/// Escape special XML/HTML characters.
pub fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}
