use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;

use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use crate::error::SourceError;
use crate::settings::Settings;

static TOPIC_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a.topictitle").unwrap());
static POST_BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".postbody").unwrap());
static POST_CONTENT: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".content").unwrap());

/// phpBB session id; varies per visitor, so it is not part of a post's identity.
const SESSION_PARAM: &str = "sid";

/// One topic row of a forum listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostLink {
    pub title: String,
    pub url: String,
}

/// Where forum pages, post bodies and the roster export come from.
pub trait ForumSource: Send + Sync + 'static {
    /// Topics on listing page `page` (1-based), in listing order.
    fn fetch_forum_page(
        &self,
        page: u32,
    ) -> impl Future<Output = Result<Vec<PostLink>, SourceError>> + Send;

    /// Body markup of the first post of a topic, `None` if the page has no post body.
    fn fetch_post_body(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Option<String>, SourceError>> + Send;

    /// Raw comma-delimited roster export.
    fn fetch_roster_source(&self) -> impl Future<Output = Result<String, SourceError>> + Send;
}

/// HTTP-backed source for the live forum.
pub struct ForumClient {
    http: reqwest::Client,
    base: Url,
    forum_id: u32,
    topics_per_page: u32,
    roster_url: Option<String>,
}

impl ForumClient {
    pub fn new(settings: &Settings) -> Result<Self, SourceError> {
        let base = Url::parse(&settings.base_url).map_err(|e| SourceError::BadUrl {
            url: settings.base_url.clone(),
            reason: e.to_string(),
        })?;
        let http = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base,
            forum_id: settings.forum_id,
            topics_per_page: settings.topics_per_page,
            roster_url: settings.roster_url.clone(),
        })
    }

    /// Listing URL for a 1-based page number.
    pub fn page_url(&self, page: u32) -> Result<String, SourceError> {
        let start = page
            .saturating_sub(1)
            .checked_mul(self.topics_per_page)
            .ok_or(SourceError::PageOutOfRange(page))?;
        Ok(format!(
            "{}viewforum.php?f={}&start={}",
            self.base, self.forum_id, start
        ))
    }

    async fn get_text(&self, url: &str) -> Result<String, SourceError> {
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Unavailable(format!("{} returned {}", url, status)));
        }
        Ok(resp.text().await?)
    }
}

impl ForumSource for ForumClient {
    async fn fetch_forum_page(&self, page: u32) -> Result<Vec<PostLink>, SourceError> {
        let url = self.page_url(page)?;
        info!("Fetching forum page {}: {}", page, url);
        let html = self.get_text(&url).await?;
        Ok(parse_listing(&html, &self.base))
    }

    async fn fetch_post_body(&self, url: &str) -> Result<Option<String>, SourceError> {
        debug!("Fetching post {}", url);
        let html = self.get_text(url).await?;
        Ok(locate_post_body(&html))
    }

    async fn fetch_roster_source(&self) -> Result<String, SourceError> {
        let url = self.roster_url.as_deref().ok_or(SourceError::MissingRosterUrl)?;
        info!("Fetching roster export: {}", url);
        self.get_text(url).await
    }
}

/// Topic links of a listing page. Anchors without `href` are skipped.
pub fn parse_listing(html: &str, base: &Url) -> Vec<PostLink> {
    let doc = Html::parse_document(html);
    doc.select(&TOPIC_LINK)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            let title = a.text().collect::<String>().trim().to_string();
            match canonical_url(base, href) {
                Some(url) => Some(PostLink { title, url }),
                None => {
                    debug!("Unresolvable topic link: {}", href);
                    None
                }
            }
        })
        .collect()
}

/// Absolute topic URL with the leading `./` and the session id removed.
pub fn canonical_url(base: &Url, href: &str) -> Option<String> {
    let relative = href.trim_start_matches("./");
    let mut url = base.join(relative).ok()?;

    if url.query_pairs().any(|(k, _)| k == SESSION_PARAM) {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != SESSION_PARAM)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
    }
    Some(url.to_string())
}

/// Inner markup of the first post's content, falling back to the whole
/// `.postbody` when it has no `.content` child.
pub fn locate_post_body(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let body: ElementRef = doc.select(&POST_BODY).next()?;
    let content = body.select(&POST_CONTENT).next().unwrap_or(body);
    Some(content.inner_html())
}

// ── Tests ──
