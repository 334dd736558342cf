//! Season table fetching with an on-disk cache and a courtesy delay

pub mod html;

pub use html::parse_first_table;

use crate::config::{DataLayout, SeasonRange, TableKind};
use crate::error::{ProjectionError, Result};
use crate::etl::normalize_raw;
use crate::frame::write_frame;
use std::thread;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fetches one statistics page per season, sleeping between remote requests
pub struct SeasonFetcher {
    client: reqwest::blocking::Client,
    base_url: Url,
    delay: Duration,
    fetched_any: bool,
}

/// Outcome of a fetch run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FetchSummary {
    pub fetched: Vec<(i32, TableKind)>,
    pub skipped: Vec<(i32, TableKind)>,
}

impl SeasonFetcher {
    /// Create a fetcher for `base_url` with `delay` between successive fetches
    pub fn new(base_url: &str, delay: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            delay,
            fetched_any: false,
        })
    }

    /// Page URL for one season, e.g. `.../leagues/NBA_2021_per_game.html`
    pub fn season_url(&self, year: i32, kind: TableKind) -> Result<Url> {
        Ok(self
            .base_url
            .join(&format!("leagues/NBA_{}_{}.html", year, kind.suffix()))?)
    }

    fn throttle(&mut self) {
        if self.fetched_any && !self.delay.is_zero() {
            log::debug!("Sleeping {:?} before next request", self.delay);
            thread::sleep(self.delay);
        }
        self.fetched_any = true;
    }

    /// Download a season page and return its body
    pub fn fetch_page(&mut self, year: i32, kind: TableKind) -> Result<String> {
        let url = self.season_url(year, kind)?;
        self.throttle();

        log::info!("GET {}", url);
        let response = self
            .client
            .get(url.as_str())
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProjectionError::Http(format!(
                "{} {} for {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
                url
            )));
        }

        Ok(response.text()?)
    }

    /// Fetch every season/kind in range that is not cached yet. A cached file
    /// is never re-downloaded. The first failure aborts the run; rerun to resume.
    pub fn fetch_missing(
        &mut self,
        layout: &DataLayout,
        range: SeasonRange,
        kinds: &[TableKind],
    ) -> Result<FetchSummary> {
        let mut summary = FetchSummary::default();

        for year in range.years() {
            for &kind in kinds {
                let path = layout.raw_table(year, kind);
                if path.exists() {
                    log::info!("SKIP {} {}: {} already exists", year, kind, path.display());
                    summary.skipped.push((year, kind));
                    continue;
                }

                let body = self.fetch_page(year, kind)?;
                let mut table = normalize_raw(&parse_first_table(&body)?)?;
                write_frame(&mut table, &path)?;
                log::info!("Saved {} rows -> {}", table.height(), path.display());
                summary.fetched.push((year, kind));
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_season_url() {
        let fetcher = SeasonFetcher::new("https://www.basketball-reference.com/", Duration::ZERO).unwrap();
        assert_eq!(
            fetcher.season_url(2021, TableKind::PerGame).unwrap().as_str(),
            "https://www.basketball-reference.com/leagues/NBA_2021_per_game.html"
        );
        assert_eq!(
            fetcher.season_url(2019, TableKind::Advanced).unwrap().as_str(),
            "https://www.basketball-reference.com/leagues/NBA_2019_advanced.html"
        );
    }

    #[test]
    fn test_cached_seasons_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        for kind in TableKind::ALL {
            let path = layout.raw_table(2020, kind);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, "Rk,Player\n1,A\n").unwrap();
        }

        // unroutable base URL: any real request would fail the test
        let mut fetcher = SeasonFetcher::new("http://127.0.0.1:9/", Duration::ZERO).unwrap();
        let summary = fetcher
            .fetch_missing(&layout, SeasonRange::new(2020, 2020), &TableKind::ALL)
            .unwrap();
        assert!(summary.fetched.is_empty());
        assert_eq!(summary.skipped.len(), 2);
    }

    #[test]
    fn test_throttle_sleeps_between_fetches_only() {
        let delay = Duration::from_millis(200);
        let mut fetcher = SeasonFetcher::new("http://127.0.0.1:9/", delay).unwrap();

        let start = Instant::now();
        fetcher.throttle();
        assert!(start.elapsed() < delay);

        let start = Instant::now();
        fetcher.throttle();
        assert!(start.elapsed() >= delay);
    }

    #[test]
    fn test_cached_seasons_cost_no_delay() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        for year in [2019, 2020] {
            let path = layout.raw_table(year, TableKind::PerGame);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, "Rk,Player\n1,A\n").unwrap();
        }

        let delay = Duration::from_secs(5);
        let mut fetcher = SeasonFetcher::new("http://127.0.0.1:9/", delay).unwrap();
        let start = Instant::now();
        let summary = fetcher
            .fetch_missing(&layout, SeasonRange::new(2019, 2020), &[TableKind::PerGame])
            .unwrap();
        assert_eq!(summary.skipped.len(), 2);
        assert!(start.elapsed() < delay);
        assert!(!fetcher.fetched_any);
    }

    #[test]
    #[ignore] // Requires network access
    fn test_fetch_live_page() {
        let mut fetcher = SeasonFetcher::new(crate::config::DEFAULT_BASE_URL, Duration::ZERO).unwrap();
        let body = fetcher.fetch_page(2021, TableKind::PerGame).unwrap();
        let table = normalize_raw(&parse_first_table(&body).unwrap()).unwrap();
        assert!(crate::frame::has_column(&table, "Player"));
        assert!(table.height() > 100);
    }
}
