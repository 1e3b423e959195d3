// CVPR collector: scrapes the CVF open-access site.
//
// The listing shape depends on the year. Up to 2020 the year's index page
// links to one sub-page per conference day; from 2021 a single `?day=all`
// page lists every paper. The year → layout mapping is a small policy table
// so the boundary can be tested without touching the network.
//
// Each paper link leads to a detail page with the title in `#papertitle`
// and the abstract in `#abstract`. The site serves a "Not Found" page for
// some dead links; those are skipped like any other per-paper failure.

use std::collections::HashSet;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use super::fetcher::PageFetcher;
use super::progress_bar;
use super::traits::{CollectionReport, Collector};
use crate::error::PapersError;
use crate::papers::models::{Conference, PaperRecord};

/// How a year's paper listing is laid out on the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingLayout {
    /// `CVPR{year}` links to per-day pages (`?day=YYYY-MM-DD`), each
    /// listing that day's papers.
    PerDayIndex,
    /// `CVPR{year}?day=all` lists every paper.
    SinglePage,
}

/// Inclusive year ranges and their listing layout. Years not covered are
/// unsupported.
const LAYOUT_POLICY: &[(u16, u16, ListingLayout)] = &[
    (2013, 2020, ListingLayout::PerDayIndex),
    (2021, 2023, ListingLayout::SinglePage),
];

/// Look up the listing layout for `year`, or `None` if the year is unsupported.
pub fn listing_layout(year: u16) -> Option<ListingLayout> {
    LAYOUT_POLICY
        .iter()
        .find(|(first, last, _)| (*first..=*last).contains(&year))
        .map(|(_, _, layout)| *layout)
}

/// First and last supported years.
pub fn supported_years() -> (u16, u16) {
    let first = LAYOUT_POLICY.iter().map(|(f, _, _)| *f).min().unwrap_or(0);
    let last = LAYOUT_POLICY.iter().map(|(_, l, _)| *l).max().unwrap_or(0);
    (first, last)
}

impl ListingLayout {
    /// Entry URL for the year's listing under `base`.
    pub fn listing_url(&self, base: &Url, year: u16) -> Result<Url> {
        let path = match self {
            ListingLayout::PerDayIndex => format!("CVPR{year}"),
            ListingLayout::SinglePage => format!("CVPR{year}?day=all"),
        };
        base.join(&path)
            .with_context(|| format!("Failed to build CVPR {year} listing URL"))
    }
}

struct CvfSelectors {
    paper_title: Selector,
    link: Selector,
    day_link: Selector,
    title: Selector,
    abstract_text: Selector,
    body: Selector,
}

static SELECTORS: LazyLock<CvfSelectors> = LazyLock::new(|| CvfSelectors {
    paper_title: Selector::parse(".ptitle").expect("ptitle selector"),
    link: Selector::parse("a[href]").expect("link selector"),
    day_link: Selector::parse("a[href*='day=']").expect("day link selector"),
    title: Selector::parse("#papertitle").expect("papertitle selector"),
    abstract_text: Selector::parse("#abstract").expect("abstract selector"),
    body: Selector::parse("body").expect("body selector"),
});

/// Paper detail links from a listing page: the first link inside each
/// `.ptitle` element, resolved against `page_url`, in page order.
pub fn parse_paper_links(html: &str, page_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    document
        .select(&SELECTORS.paper_title)
        .filter_map(|title| title.select(&SELECTORS.link).next())
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| page_url.join(href).ok())
        .collect()
}

/// Per-day sub-page links from a pre-2021 year index, in page order.
/// The `day=all` link some indexes carry is excluded.
pub fn parse_day_links(html: &str, page_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let links = document
        .select(&SELECTORS.day_link)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| !href.contains("day=all"))
        .filter_map(|href| page_url.join(href).ok());
    dedup_in_order(links)
}

/// What a paper detail page turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaperPage {
    Found { title: String, abstract_text: String },
    /// The site's "Not Found" placeholder
    NotFound,
    /// A page without the expected title or abstract element
    Malformed(&'static str),
}

pub fn parse_paper_page(html: &str) -> PaperPage {
    let document = Html::parse_document(html);

    let body_text = document
        .select(&SELECTORS.body)
        .next()
        .map(|body| element_text(&body))
        .unwrap_or_else(|| element_text(&document.root_element()));
    if body_text.starts_with("Not Found") {
        return PaperPage::NotFound;
    }

    let Some(title) = document.select(&SELECTORS.title).next().map(|e| element_text(&e)) else {
        return PaperPage::Malformed("missing #papertitle");
    };
    let Some(abstract_text) = document
        .select(&SELECTORS.abstract_text)
        .next()
        .map(|e| element_text(&e))
    else {
        return PaperPage::Malformed("missing #abstract");
    };

    PaperPage::Found {
        title,
        abstract_text,
    }
}

fn element_text(element: &ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn dedup_in_order(urls: impl IntoIterator<Item = Url>) -> Vec<Url> {
    let mut seen = HashSet::new();
    urls.into_iter().filter(|u| seen.insert(u.clone())).collect()
}

/// Collects one CVPR year from the CVF open-access site.
pub struct CvprCollector<F: PageFetcher> {
    fetcher: F,
    base_url: Url,
    year: u16,
    layout: ListingLayout,
    papers: Vec<PaperRecord>,
}

impl<F: PageFetcher> CvprCollector<F> {
    /// Fails with `UnsupportedConfiguration` for years outside the policy
    /// table. No request is made here.
    pub fn new(fetcher: F, base_url: Url, year: u16) -> Result<Self> {
        let Some(layout) = listing_layout(year) else {
            let (first, last) = supported_years();
            return Err(PapersError::unsupported(format!(
                "CVPR {year} is not supported (supported years: {first}–{last})"
            ))
            .into());
        };

        Ok(Self {
            fetcher,
            base_url,
            year,
            layout,
            papers: Vec::new(),
        })
    }

    pub fn layout(&self) -> ListingLayout {
        self.layout
    }

    /// Enumerate every paper detail link for the year. Any failure here
    /// is fatal for the run.
    async fn paper_links(&self) -> Result<Vec<Url>> {
        let listing_url = self.layout.listing_url(&self.base_url, self.year)?;
        let listing = self
            .fetcher
            .fetch_text(&listing_url)
            .await
            .with_context(|| format!("Failed to fetch CVPR {} listing", self.year))?;

        match self.layout {
            ListingLayout::SinglePage => Ok(dedup_in_order(parse_paper_links(&listing, &listing_url))),
            ListingLayout::PerDayIndex => {
                let days = parse_day_links(&listing, &listing_url);
                if days.is_empty() {
                    // Older years list every paper on the index itself
                    debug!(year = self.year, "No day sub-pages, using the index as the listing");
                    return Ok(dedup_in_order(parse_paper_links(&listing, &listing_url)));
                }

                let mut links = Vec::new();
                for day_url in &days {
                    let page = self
                        .fetcher
                        .fetch_text(day_url)
                        .await
                        .with_context(|| format!("Failed to fetch CVPR day listing {day_url}"))?;
                    let day_links = parse_paper_links(&page, day_url);
                    debug!(url = %day_url, papers = day_links.len(), "Day listing parsed");
                    links.extend(day_links);
                }
                Ok(dedup_in_order(links))
            }
        }
    }

    async fn fetch_paper(&self, url: &Url) -> Result<PaperRecord, PapersError> {
        let html = self
            .fetcher
            .fetch_text(url)
            .await
            .map_err(|e| PapersError::ItemFetch {
                url: url.to_string(),
                reason: format!("{e:#}"),
            })?;

        match parse_paper_page(&html) {
            PaperPage::Found {
                title,
                abstract_text,
            } => Ok(PaperRecord {
                year: self.year,
                title,
                abstract_text,
                conference: Conference::Cvpr.as_str().to_string(),
                decision: None,
            }),
            PaperPage::NotFound => Err(PapersError::ItemFetch {
                url: url.to_string(),
                reason: "page reports Not Found".to_string(),
            }),
            PaperPage::Malformed(what) => Err(PapersError::ItemFetch {
                url: url.to_string(),
                reason: what.to_string(),
            }),
        }
    }
}

#[async_trait]
impl<F: PageFetcher> Collector for CvprCollector<F> {
    fn conference(&self) -> Conference {
        Conference::Cvpr
    }

    fn year(&self) -> u16 {
        self.year
    }

    async fn collect(&mut self) -> Result<CollectionReport> {
        let links = self.paper_links().await?;
        info!(year = self.year, count = links.len(), "CVPR papers found");

        let mut report = CollectionReport {
            found: links.len(),
            ..Default::default()
        };

        let pb = progress_bar(links.len(), "CVPR");
        for link in &links {
            match self.fetch_paper(link).await {
                Ok(record) => {
                    self.papers.push(record);
                    report.collected += 1;
                }
                Err(e) => {
                    warn!(error = %e, "Skipping paper");
                    report.skipped += 1;
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        info!(
            year = self.year,
            collected = report.collected,
            skipped = report.skipped,
            "CVPR collection complete"
        );
        Ok(report)
    }

    fn records(&self) -> &[PaperRecord] {
        &self.papers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://openaccess.thecvf.com/").unwrap()
    }

    #[test]
    fn layout_boundaries() {
        assert_eq!(listing_layout(2012), None);
        assert_eq!(listing_layout(2013), Some(ListingLayout::PerDayIndex));
        assert_eq!(listing_layout(2020), Some(ListingLayout::PerDayIndex));
        assert_eq!(listing_layout(2021), Some(ListingLayout::SinglePage));
        assert_eq!(listing_layout(2023), Some(ListingLayout::SinglePage));
        assert_eq!(listing_layout(2024), None);
        assert_eq!(supported_years(), (2013, 2023));
    }

    #[test]
    fn listing_urls() {
        assert_eq!(
            ListingLayout::SinglePage.listing_url(&base(), 2022).unwrap().as_str(),
            "https://openaccess.thecvf.com/CVPR2022?day=all"
        );
        assert_eq!(
            ListingLayout::PerDayIndex.listing_url(&base(), 2019).unwrap().as_str(),
            "https://openaccess.thecvf.com/CVPR2019"
        );
    }

    #[test]
    fn paper_links_resolve_relative_hrefs() {
        let html = r#"
            <dl>
              <dt class="ptitle"><br><a href="/content/CVPR2023/html/A_paper.html">A</a></dt>
              <dd>authors</dd>
              <dt class="ptitle"><br><a href="content/CVPR2023/html/B_paper.html">B</a></dt>
            </dl>"#;
        let page = base().join("CVPR2023?day=all").unwrap();
        let links = parse_paper_links(html, &page);
        assert_eq!(links.len(), 2);
        assert_eq!(
            links[0].as_str(),
            "https://openaccess.thecvf.com/content/CVPR2023/html/A_paper.html"
        );
        assert_eq!(
            links[1].as_str(),
            "https://openaccess.thecvf.com/content/CVPR2023/html/B_paper.html"
        );
    }

    #[test]
    fn day_links_skip_all_and_duplicates() {
        let html = r#"
            <a href="CVPR2019?day=2019-06-18">Day 1</a>
            <a href="CVPR2019?day=2019-06-19">Day 2</a>
            <a href="CVPR2019?day=2019-06-18">Day 1 again</a>
            <a href="CVPR2019?day=all">All</a>
            <a href="menu.html">Menu</a>"#;
        let page = base().join("CVPR2019").unwrap();
        let days = parse_day_links(html, &page);
        let days: Vec<&str> = days.iter().map(Url::as_str).collect();
        assert_eq!(
            days,
            vec![
                "https://openaccess.thecvf.com/CVPR2019?day=2019-06-18",
                "https://openaccess.thecvf.com/CVPR2019?day=2019-06-19",
            ]
        );
    }

    #[test]
    fn paper_page_extracts_title_and_abstract() {
        let html = r#"<html><body>
            <div id="papertitle">
                Fast   Image Segmentation</div>
            <div id="abstract">  We propose
               a method. </div>
            </body></html>"#;
        assert_eq!(
            parse_paper_page(html),
            PaperPage::Found {
                title: "Fast Image Segmentation".to_string(),
                abstract_text: "We propose a method.".to_string(),
            }
        );
    }

    #[test]
    fn not_found_page_is_detected() {
        let html = "<html><body><h1>Not Found</h1><p>The requested URL was not found.</p></body></html>";
        assert_eq!(parse_paper_page(html), PaperPage::NotFound);
    }

    #[test]
    fn page_without_abstract_is_malformed() {
        let html = r#"<html><body><div id="papertitle">Title</div></body></html>"#;
        assert_eq!(parse_paper_page(html), PaperPage::Malformed("missing #abstract"));
    }
}
