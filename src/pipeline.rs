use std::collections::BTreeMap;
use std::sync::Arc;

use rayon::prelude::*;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::forum::{ForumSource, PostLink};
use crate::mission::{self, MissionRecord};
use crate::roster;

/// Fetches forum pages through a [`ForumSource`] and turns their posts into
/// mission records.
pub struct Pipeline<S> {
    source: Arc<S>,
    concurrency: usize,
}

impl<S: ForumSource> Pipeline<S> {
    pub fn new(source: S, concurrency: usize) -> Self {
        Self {
            source: Arc::new(source),
            concurrency: concurrency.max(1),
        }
    }

    /// Records of pages `1..=pages`, in ascending page order.
    pub async fn missions(&self, pages: u32) -> Result<Vec<MissionRecord>> {
        if pages == 0 {
            return Err(Error::InvalidPageCount(pages));
        }
        let mut records = Vec::new();
        for page in 1..=pages {
            records.extend(self.page_records(page).await?);
        }
        info!("Collected {} missions from {} pages", records.len(), pages);
        Ok(records)
    }

    /// Records of a single listing page.
    pub async fn missions_page(&self, page: u32) -> Result<Vec<MissionRecord>> {
        if page == 0 {
            return Err(Error::InvalidPageNumber(page));
        }
        self.page_records(page).await
    }

    pub async fn roster(&self) -> Result<BTreeMap<String, String>> {
        let text = self
            .source
            .fetch_roster_source()
            .await
            .map_err(Error::RosterUnavailable)?;
        let roster = roster::parse(&text)?;
        info!("Roster has {} entries", roster.len());
        Ok(roster)
    }

    async fn page_records(&self, page: u32) -> Result<Vec<MissionRecord>> {
        let links = self
            .source
            .fetch_forum_page(page)
            .await
            .map_err(|source| Error::PageUnavailable { page, source })?;
        info!("Page {}: {} topics", page, links.len());

        let bodies = self.fetch_bodies(links).await;
        let records = build_records(bodies).await?;

        debug!("Page {}: {} records built", page, records.len());
        Ok(records)
    }

    /// Fetch bodies concurrently, bounded by `concurrency`. Results come back in
    /// listing order; posts that fail or have no body are dropped.
    async fn fetch_bodies(&self, links: Vec<PostLink>) -> Vec<(PostLink, String)> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        let handles: Vec<_> = links
            .into_iter()
            .map(|link| {
                let source = Arc::clone(&self.source);
                let sem = Arc::clone(&semaphore);
                tokio::spawn(async move {
                    let _permit = sem.acquire().await;
                    let body = source.fetch_post_body(&link.url).await;
                    (link, body)
                })
            })
            .collect();

        let mut bodies = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok((link, Ok(Some(html)))) => bodies.push((link, html)),
                Ok((link, Ok(None))) => debug!("No post body at {}, skipping", link.url),
                Ok((link, Err(e))) => warn!("Skipping {}: {}", link.url, e),
                Err(e) => warn!("Post fetch task failed: {}", e),
            }
        }
        bodies
    }
}

/// Build records off the async workers; rayon keeps them in body order.
async fn build_records(bodies: Vec<(PostLink, String)>) -> Result<Vec<MissionRecord>> {
    let records = tokio::task::spawn_blocking(move || {
        bodies
            .par_iter()
            .map(|(link, html)| mission::build_record(link, html))
            .collect::<Vec<MissionRecord>>()
    })
    .await?;
    Ok(records)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::SourceError;
    use crate::parser::MissionType;

    #[derive(Default)]
    struct FakeForum {
        pages: HashMap<u32, Vec<PostLink>>,
        bodies: HashMap<String, Option<String>>,
        roster: Option<String>,
    }

    impl FakeForum {
        fn with_post(mut self, page: u32, title: &str, body: Option<&str>) -> Self {
            let url = format!("https://foro.test/viewtopic.php?t={}", self.bodies.len() + 1);
            self.pages.entry(page).or_default().push(PostLink {
                title: title.to_string(),
                url: url.clone(),
            });
            self.bodies.insert(url, body.map(str::to_string));
            self
        }
    }

    impl ForumSource for FakeForum {
        async fn fetch_forum_page(&self, page: u32) -> std::result::Result<Vec<PostLink>, SourceError> {
            self.pages
                .get(&page)
                .cloned()
                .ok_or_else(|| SourceError::Unavailable(format!("page {}", page)))
        }

        async fn fetch_post_body(&self, url: &str) -> std::result::Result<Option<String>, SourceError> {
            self.bodies
                .get(url)
                .cloned()
                .ok_or_else(|| SourceError::Unavailable(url.to_string()))
        }

        async fn fetch_roster_source(&self) -> std::result::Result<String, SourceError> {
            self.roster.clone().ok_or(SourceError::MissingRosterUrl)
        }
    }

    fn forum() -> FakeForum {
        FakeForum::default()
            .with_post(1, "Sesión del Martes", Some(r#"<b style="color:#80BFFF">Alpha</b>"#))
            .with_post(1, "Tema borrado", None)
            .with_post(1, "Instrucción", Some(r#"<span style="color:#40BFFF">Bravo</span><img src="/i/pasadores/CIAC_pasador.png">"#))
            .with_post(2, "Jueves", Some("Sin marcas"))
    }

    #[tokio::test]
    async fn pages_in_order_and_missing_bodies_skipped() {
        let pipeline = Pipeline::new(forum(), 2);
        let records = pipeline.missions(2).await.unwrap();
        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Sesión del Martes", "Instrucción", "Jueves"]);

        assert_eq!(records[0].mission_type, MissionType::Operational);
        assert_eq!(records[1].mission_type, MissionType::Training);
        assert_eq!(records[1].instruction_code.as_deref(), Some("CIAC"));
        assert_eq!(records[2].mission_type, MissionType::Training);
        assert!(records[2].orbat_lines.is_empty());
    }

    #[tokio::test]
    async fn record_order_survives_parallel_build() {
        let source = (0..40).fold(FakeForum::default(), |f, i| {
            f.with_post(1, &format!("Tema {}", i), Some(r#"<span style="color:#80BFFF">Alpha</span>"#))
        });
        let records = Pipeline::new(source, 8).missions_page(1).await.unwrap();
        let titles: Vec<String> = records.into_iter().map(|r| r.title).collect();
        let expected: Vec<String> = (0..40).map(|i| format!("Tema {}", i)).collect();
        assert_eq!(titles, expected);
    }

    #[tokio::test]
    async fn single_page() {
        let pipeline = Pipeline::new(forum(), 1);
        let records = pipeline.missions_page(2).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Jueves");
    }

    #[tokio::test]
    async fn unreachable_post_is_skipped() {
        let mut source = forum();
        source.bodies.clear();
        let pipeline = Pipeline::new(source, 4);
        assert!(pipeline.missions_page(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_page_fails_request() {
        let pipeline = Pipeline::new(forum(), 4);
        let err = pipeline.missions(3).await.unwrap_err();
        assert!(matches!(err, Error::PageUnavailable { page: 3, .. }));
    }

    #[tokio::test]
    async fn zero_pages_rejected() {
        let pipeline = Pipeline::new(forum(), 4);
        assert!(matches!(pipeline.missions(0).await, Err(Error::InvalidPageCount(0))));
        assert!(matches!(pipeline.missions_page(0).await, Err(Error::InvalidPageNumber(0))));
    }

    #[tokio::test]
    async fn roster_from_source() {
        let mut source = forum();
        source.roster = Some("Nombre,Fecha\nJuan Pérez,2024-01-01\n".to_string());
        let roster = Pipeline::new(source, 1).roster().await.unwrap();
        assert_eq!(roster["juan perez"], "2024-01-01");
    }

    #[tokio::test]
    async fn roster_errors() {
        let err = Pipeline::new(forum(), 1).roster().await.unwrap_err();
        assert!(matches!(err, Error::RosterUnavailable(SourceError::MissingRosterUrl)));

        let mut source = forum();
        source.roster = Some(String::new());
        let err = Pipeline::new(source, 1).roster().await.unwrap_err();
        assert!(matches!(err, Error::EmptySource));
    }
}
