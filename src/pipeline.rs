use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{info, warn};
use url::Url;

use crate::collab::{
    ChatAnalyzer, DocumentSource, HttpDocumentSource, HttpFetcher, ModelAnalyzer, PageFetcher,
    SerperSearch, SpiderFetcher, WebSearch,
};
use crate::discovery::{discover_via_homepage, discover_via_search, parse_website, Discovery};
use crate::error::{CollabResult, CollaboratorError};
use crate::events::{EventKind, EventLog};
use crate::extract::suggested::{needs_fallback, suggested_records};
use crate::extract::{ExtractorChain, PageContent, StrategyYield};
use crate::merge::{format_for_output, merge_with, MergeOptions};
use crate::model::{CandidateRecord, ExecutiveProfile, ScopeHint};
use crate::settings::Settings;

/// Which extractor chains run for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionRoute {
    /// Site records as primary, documents as verification.
    #[default]
    Blend,
    WebsiteOnly,
    /// Documents are the only source and are folded as the primary tier.
    DocumentsOnly,
}

impl ExtractionRoute {
    /// Listed companies read filings only; everyone else reads their website.
    pub fn for_listing(listed: bool) -> Self {
        if listed {
            ExtractionRoute::DocumentsOnly
        } else {
            ExtractionRoute::WebsiteOnly
        }
    }

    pub fn runs_website(self) -> bool {
        !matches!(self, ExtractionRoute::DocumentsOnly)
    }

    pub fn runs_documents(self) -> bool {
        !matches!(self, ExtractionRoute::WebsiteOnly)
    }
}

impl FromStr for ExtractionRoute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "blend" => Ok(ExtractionRoute::Blend),
            "website" | "website_only" => Ok(ExtractionRoute::WebsiteOnly),
            "documents" | "documents_only" => Ok(ExtractionRoute::DocumentsOnly),
            other => Err(format!("unknown route '{}' (blend, website, documents)", other)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolveRequest {
    pub company: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub documents: Vec<String>,
    /// "US" or "global" asks for global leadership only.
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub route: ExtractionRoute,
}

impl ResolveRequest {
    pub fn new(company: &str) -> Self {
        ResolveRequest {
            company: company.to_string(),
            ..Default::default()
        }
    }

    pub fn with_website(mut self, website: &str) -> Self {
        self.website = Some(website.to_string());
        self
    }

    pub fn with_documents(mut self, documents: Vec<String>) -> Self {
        self.documents = documents;
        self
    }

    pub fn with_location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    pub fn with_route(mut self, route: ExtractionRoute) -> Self {
        self.route = route;
        self
    }

    pub fn scope_hint(&self) -> Option<ScopeHint> {
        self.location.as_deref().and_then(ScopeHint::from_location)
    }
}

/// Profiles plus the event trail of the run that produced them.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionReport {
    pub company: String,
    pub profiles: Vec<ExecutiveProfile>,
    pub events: EventLog,
}

impl ResolutionReport {
    pub fn render(&self) -> Vec<String> {
        format_for_output(&self.profiles)
    }
}

#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub concurrency: usize,
    pub max_pages: usize,
    pub max_discovered_pages: usize,
    pub max_documents: usize,
    pub fetch_timeout: Duration,
    pub document_timeout: Duration,
    pub analysis_timeout: Duration,
    pub model_fallback_threshold: usize,
    pub scope_floor: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        ResolverOptions::from(&Settings::default())
    }
}

impl From<&Settings> for ResolverOptions {
    fn from(s: &Settings) -> Self {
        ResolverOptions {
            concurrency: s.concurrency.max(1),
            max_pages: s.max_pages,
            max_discovered_pages: s.max_discovered_pages,
            max_documents: s.max_documents,
            fetch_timeout: s.fetch_timeout(),
            document_timeout: s.document_timeout(),
            analysis_timeout: s.analysis_timeout(),
            model_fallback_threshold: s.model_fallback_threshold,
            scope_floor: s.scope_floor,
        }
    }
}

/// Shared, read-only state handed to each extraction unit.
struct UnitContext {
    fetcher: Arc<dyn PageFetcher>,
    analyzer: Option<Arc<dyn ModelAnalyzer>>,
    chain: Arc<ExtractorChain>,
    company: String,
    scope: Option<ScopeHint>,
    fetch_timeout: Duration,
    analysis_timeout: Duration,
    fallback_threshold: usize,
}

enum UnitOutcome {
    Completed {
        locator: String,
        records: Vec<CandidateRecord>,
        yields: Vec<StrategyYield>,
        fallback: Option<(usize, usize)>,
    },
    Failed {
        locator: String,
        error: String,
    },
}

/// Resolves one company per call. Holds collaborators only; no state
/// survives between requests.
pub struct Resolver {
    fetcher: Arc<dyn PageFetcher>,
    search: Option<Arc<dyn WebSearch>>,
    analyzer: Option<Arc<dyn ModelAnalyzer>>,
    documents: Option<Arc<dyn DocumentSource>>,
    site_chain: Arc<ExtractorChain>,
    document_chain: Arc<ExtractorChain>,
    options: ResolverOptions,
}

impl Resolver {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Resolver {
            fetcher,
            search: None,
            analyzer: None,
            documents: None,
            site_chain: Arc::new(ExtractorChain::site_default()),
            document_chain: Arc::new(ExtractorChain::documents_default()),
            options: ResolverOptions::default(),
        }
    }

    pub fn with_search(mut self, search: Arc<dyn WebSearch>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_analyzer(mut self, analyzer: Arc<dyn ModelAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn with_documents(mut self, documents: Arc<dyn DocumentSource>) -> Self {
        self.documents = Some(documents);
        self
    }

    pub fn with_site_chain(mut self, chain: ExtractorChain) -> Self {
        self.site_chain = Arc::new(chain);
        self
    }

    pub fn with_document_chain(mut self, chain: ExtractorChain) -> Self {
        self.document_chain = Arc::new(chain);
        self
    }

    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Wire concrete adapters from settings. Spider is used for pages when a
    /// key is present; search and model analysis are optional.
    pub fn from_settings(settings: &Settings) -> CollabResult<Self> {
        let fetcher: Arc<dyn PageFetcher> = match settings.spider_api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Arc::new(SpiderFetcher::new(key)?),
            _ => Arc::new(HttpFetcher::new(&settings.user_agent, settings.fetch_timeout())?),
        };
        let documents =
            HttpDocumentSource::new(&settings.user_agent, settings.document_timeout())?;

        let mut resolver = Resolver::new(fetcher)
            .with_documents(Arc::new(documents))
            .with_options(ResolverOptions::from(settings));

        if let Some(key) = settings.serper_api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            resolver = resolver.with_search(Arc::new(SerperSearch::new(key, settings.fetch_timeout())?));
        }
        if let Some(key) = settings.llm_api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            resolver = resolver.with_analyzer(Arc::new(ChatAnalyzer::new(
                &settings.llm_endpoint,
                key,
                &settings.llm_model,
                settings.analysis_timeout(),
            )?));
        }
        Ok(resolver)
    }

    pub async fn resolve(&self, request: &ResolveRequest) -> ResolutionReport {
        let mut log = EventLog::new();
        let scope = request.scope_hint();
        info!(company = %request.company, route = ?request.route, "resolving executives");

        let mut site_records = Vec::new();
        if request.route.runs_website() {
            if let Some(website) = request.website.as_deref() {
                match parse_website(website) {
                    Ok(site) => {
                        let discovery = self.discover(&site, scope.as_ref(), &mut log).await;
                        let urls: Vec<String> = discovery
                            .urls()
                            .take(self.options.max_pages)
                            .map(str::to_string)
                            .collect();
                        site_records = self
                            .extract_pages(urls, &request.company, scope.clone(), &mut log)
                            .await;
                    }
                    Err(e) => log.record(EventKind::UnitFailed {
                        locator: website.to_string(),
                        error: e.to_string(),
                    }),
                }
            }
        }

        let mut document_records = Vec::new();
        if request.route.runs_documents() && !request.documents.is_empty() {
            document_records = self.read_documents(&request.documents, &mut log).await;
        }

        let (primary, verification) = match request.route {
            ExtractionRoute::DocumentsOnly => (document_records, Vec::new()),
            _ => (site_records, document_records),
        };

        let merge_options = MergeOptions {
            scope,
            scope_floor: self.options.scope_floor,
        };
        let profiles = merge_with(&primary, &verification, &merge_options, &mut log);
        log.record(EventKind::Finished {
            profiles: profiles.len(),
        });

        ResolutionReport {
            company: request.company.clone(),
            profiles,
            events: log,
        }
    }

    /// Search when available, the homepage and sitemap otherwise.
    async fn discover(&self, site: &Url, scope: Option<&ScopeHint>, log: &mut EventLog) -> Discovery {
        let cap = self.options.max_discovered_pages;
        let mut discovery = match &self.search {
            Some(search) => discover_via_search(search.as_ref(), site, scope, cap).await,
            None => Discovery::default(),
        };

        if discovery.ranked.is_empty() {
            match discover_via_homepage(self.fetcher.as_ref(), site, cap).await {
                Ok(found) => discovery = found,
                Err(e) => log.record(EventKind::UnitFailed {
                    locator: site.to_string(),
                    error: e.to_string(),
                }),
            }
        }

        log.record(EventKind::PagesDiscovered {
            via: if discovery.via.is_empty() { "none" } else { discovery.via },
            found: discovery.found,
            selected: discovery.ranked.len().min(self.options.max_pages),
        });
        discovery
    }

    /// Fetch and extract every page concurrently, then join all of them
    /// before handing records back in page-rank order.
    async fn extract_pages(
        &self,
        urls: Vec<String>,
        company: &str,
        scope: Option<ScopeHint>,
        log: &mut EventLog,
    ) -> Vec<CandidateRecord> {
        if urls.is_empty() {
            return Vec::new();
        }

        let ctx = Arc::new(UnitContext {
            fetcher: Arc::clone(&self.fetcher),
            analyzer: self.analyzer.clone(),
            chain: Arc::clone(&self.site_chain),
            company: company.to_string(),
            scope,
            fetch_timeout: self.options.fetch_timeout,
            analysis_timeout: self.options.analysis_timeout,
            fallback_threshold: self.options.model_fallback_threshold,
        });
        let semaphore = Arc::new(Semaphore::new(self.options.concurrency.max(1)));
        let mut handles = Vec::with_capacity(urls.len());

        for url in urls {
            let ctx = Arc::clone(&ctx);
            let sem = Arc::clone(&semaphore);
            let locator = url.clone();

            let handle = tokio::spawn(async move {
                let Ok(_permit) = sem.acquire().await else {
                    return UnitOutcome::Failed {
                        locator: url,
                        error: "worker pool closed".to_string(),
                    };
                };
                run_unit(&ctx, url).await
            });
            handles.push((locator, handle));
        }

        // Joined in page-rank order; a panicked unit becomes a failure.
        let mut outcomes = Vec::with_capacity(handles.len());
        for (locator, handle) in handles {
            outcomes.push(match handle.await {
                Ok(outcome) => outcome,
                Err(e) => UnitOutcome::Failed {
                    locator,
                    error: format!("extraction unit aborted: {}", e),
                },
            });
        }

        let mut records = Vec::new();
        for outcome in outcomes {
            match outcome {
                UnitOutcome::Completed {
                    locator,
                    records: unit_records,
                    yields,
                    fallback,
                } => {
                    if let Some((found, suggested)) = fallback {
                        log.record(EventKind::ModelFallback {
                            locator: locator.clone(),
                            found,
                            suggested,
                        });
                    }
                    log.record(EventKind::UnitCompleted {
                        locator,
                        records: unit_records.len(),
                        strategies: yields,
                    });
                    records.extend(unit_records);
                }
                UnitOutcome::Failed { locator, error } => {
                    log.record(EventKind::UnitFailed { locator, error });
                }
            }
        }
        records
    }

    async fn read_documents(&self, urls: &[String], log: &mut EventLog) -> Vec<CandidateRecord> {
        let Some(source) = &self.documents else {
            warn!(documents = urls.len(), "no document source configured, skipping documents");
            return Vec::new();
        };

        let mut records = Vec::new();
        for url in urls.iter().take(self.options.max_documents) {
            let text = match timeout(self.options.document_timeout, source.fetch_document(url)).await {
                Ok(Ok(text)) => text,
                Ok(Err(e)) => {
                    log.record(EventKind::UnitFailed {
                        locator: url.clone(),
                        error: e.to_string(),
                    });
                    continue;
                }
                Err(_) => {
                    log.record(EventKind::UnitFailed {
                        locator: url.clone(),
                        error: CollaboratorError::Timeout(self.options.document_timeout.as_secs())
                            .to_string(),
                    });
                    continue;
                }
            };

            let outcome = self.document_chain.run(&PageContent::text(url, text));
            log.record(EventKind::UnitCompleted {
                locator: url.clone(),
                records: outcome.records.len(),
                strategies: outcome.yields,
            });
            records.extend(outcome.records);
        }
        records
    }
}

async fn run_unit(ctx: &UnitContext, url: String) -> UnitOutcome {
    let fetched = match timeout(ctx.fetch_timeout, ctx.fetcher.fetch(&url)).await {
        Ok(Ok(page)) => page,
        Ok(Err(e)) => {
            return UnitOutcome::Failed {
                locator: url,
                error: e.to_string(),
            }
        }
        Err(_) => {
            return UnitOutcome::Failed {
                locator: url,
                error: CollaboratorError::Timeout(ctx.fetch_timeout.as_secs()).to_string(),
            }
        }
    };

    let page = fetched.into_content();
    let outcome = ctx.chain.run(&page);
    let mut records = outcome.records;
    let mut fallback = None;

    if needs_fallback(records.len(), ctx.fallback_threshold) {
        if let Some(analyzer) = &ctx.analyzer {
            let text = page.plain_text();
            let analysis = analyzer.analyze(&text, &ctx.company, ctx.scope.as_ref());
            match timeout(ctx.analysis_timeout, analysis).await {
                Ok(Ok(output)) => {
                    let suggested = suggested_records(&output, &page.locator);
                    fallback = Some((records.len(), suggested.len()));
                    records.extend(suggested);
                }
                Ok(Err(e)) => warn!(url = %page.locator, error = %e, "model analysis failed"),
                Err(_) => warn!(url = %page.locator, "model analysis timed out"),
            }
        }
    }

    UnitOutcome::Completed {
        locator: page.locator,
        records,
        yields: outcome.yields,
        fallback,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::collab::{ContentType, FetchedPage, SearchHit};
    use crate::extract::suggested::{AnalysisOutput, SuggestedExecutive};
    use crate::model::{Confidence, EvidenceNote, ProfileOrigin, SourceKind};
    use crate::roles::CanonicalRole;

    #[derive(Default)]
    struct FakeFetcher {
        pages: HashMap<String, Result<String, u16>>,
        delay: Option<Duration>,
        calls: AtomicUsize,
        panics_on: Option<String>,
    }

    impl FakeFetcher {
        fn page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), Ok(body.to_string()));
            self
        }

        fn failing(mut self, url: &str, status: u16) -> Self {
            self.pages.insert(url.to_string(), Err(status));
            self
        }

        fn panicking(mut self, url: &str) -> Self {
            self.panics_on = Some(url.to_string());
            self
        }
    }

    #[async_trait]
    impl PageFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> CollabResult<FetchedPage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.panics_on.as_deref() == Some(url) {
                panic!("fetcher blew up on {}", url);
            }
            match self.pages.get(url) {
                Some(Ok(body)) => Ok(FetchedPage {
                    url: url.to_string(),
                    body: body.clone(),
                    content_type: ContentType::Html,
                }),
                Some(Err(status)) => Err(CollaboratorError::Status {
                    status: *status,
                    url: url.to_string(),
                }),
                None => Err(CollaboratorError::Status {
                    status: 404,
                    url: url.to_string(),
                }),
            }
        }
    }

    struct FakeSearch {
        hits: Vec<SearchHit>,
    }

    #[async_trait]
    impl WebSearch for FakeSearch {
        async fn search(&self, _query: &str, _max: usize) -> Vec<SearchHit> {
            self.hits.clone()
        }
    }

    struct FakeAnalyzer {
        output: AnalysisOutput,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ModelAnalyzer for FakeAnalyzer {
        async fn analyze(
            &self,
            _text: &str,
            _company: &str,
            _scope: Option<&ScopeHint>,
        ) -> CollabResult<AnalysisOutput> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.output.clone())
        }
    }

    #[derive(Default)]
    struct FakeDocuments {
        docs: HashMap<String, String>,
        requested: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DocumentSource for FakeDocuments {
        async fn fetch_document(&self, url: &str) -> CollabResult<String> {
            self.requested.lock().unwrap().push(url.to_string());
            self.docs
                .get(url)
                .cloned()
                .ok_or_else(|| CollaboratorError::Provider(format!("no document {}", url)))
        }
    }

    fn hit(link: &str, title: &str) -> SearchHit {
        SearchHit {
            title: title.to_string(),
            link: link.to_string(),
            snippet: String::new(),
        }
    }

    fn fixture() -> String {
        std::fs::read_to_string("tests/fixtures/leadership.html").unwrap()
    }

    fn profile<'a>(report: &'a ResolutionReport, name: &str) -> &'a ExecutiveProfile {
        report
            .profiles
            .iter()
            .find(|p| p.display_name == name)
            .unwrap_or_else(|| panic!("no profile for {}", name))
    }

    const LEADERSHIP_URL: &str = "https://acme.com/about/leadership";
    const FILING_URL: &str = "https://sec.gov/acme/def14a.htm";

    fn filing() -> String {
        "Ms. Maria Gonzalez, age 52, has served as our Chief Executive Officer since 2019. \
         Robert Brown was appointed Chief Operating Officer in March 2020."
            .to_string()
    }

    #[tokio::test]
    async fn blends_site_and_documents() {
        let fetcher = FakeFetcher::default().page(LEADERSHIP_URL, &fixture());
        let search = FakeSearch {
            hits: vec![hit(LEADERSHIP_URL, "Leadership Team | Acme")],
        };
        let docs = FakeDocuments {
            docs: HashMap::from([(FILING_URL.to_string(), filing())]),
            ..Default::default()
        };
        let resolver = Resolver::new(Arc::new(fetcher))
            .with_search(Arc::new(search))
            .with_documents(Arc::new(docs));

        let request = ResolveRequest::new("Acme")
            .with_website("acme.com")
            .with_documents(vec![FILING_URL.to_string()]);
        let report = resolver.resolve(&request).await;

        let maria = profile(&report, "Maria Gonzalez");
        assert_eq!(maria.canonical_role, CanonicalRole::Ceo);
        assert_eq!(maria.confidence, Confidence::High);
        assert_eq!(maria.origin, ProfileOrigin::Primary);
        assert!(maria.is_verified());

        let robert = profile(&report, "Robert Brown");
        assert_eq!(robert.origin, ProfileOrigin::DocumentOnly);
        assert_eq!(robert.confidence, Confidence::Medium);
        assert_eq!(report.profiles.last().unwrap().display_name, "Robert Brown");

        assert!(report
            .events
            .kinds()
            .any(|k| matches!(k, EventKind::PagesDiscovered { via: "search", .. })));
        assert!(matches!(
            report.events.kinds().last(),
            Some(EventKind::Finished { .. })
        ));
    }

    #[tokio::test]
    async fn failed_unit_does_not_abort_siblings() {
        let fetcher = FakeFetcher::default()
            .page(LEADERSHIP_URL, &fixture())
            .failing("https://acme.com/team", 503);
        let search = FakeSearch {
            hits: vec![
                hit(LEADERSHIP_URL, "Leadership Team"),
                hit("https://acme.com/team", "Our Team"),
            ],
        };
        let resolver = Resolver::new(Arc::new(fetcher)).with_search(Arc::new(search));
        let report = resolver
            .resolve(&ResolveRequest::new("Acme").with_website("https://acme.com"))
            .await;

        assert!(!report.profiles.is_empty());
        assert!(report.events.kinds().any(|k| matches!(
            k,
            EventKind::UnitFailed { locator, .. } if locator == "https://acme.com/team"
        )));
    }

    #[tokio::test]
    async fn panicked_unit_is_reported_as_failed() {
        let fetcher = FakeFetcher::default()
            .page(LEADERSHIP_URL, &fixture())
            .panicking("https://acme.com/team");
        let search = FakeSearch {
            hits: vec![
                hit(LEADERSHIP_URL, "Leadership Team"),
                hit("https://acme.com/team", "Our Team"),
            ],
        };
        let resolver = Resolver::new(Arc::new(fetcher)).with_search(Arc::new(search));
        let report = resolver
            .resolve(&ResolveRequest::new("Acme").with_website("https://acme.com"))
            .await;

        assert!(report.profiles.iter().any(|p| p.display_name == "Maria Gonzalez"));
        assert!(report.events.kinds().any(|k| matches!(
            k,
            EventKind::UnitFailed { locator, error }
                if locator == "https://acme.com/team" && error.contains("aborted")
        )));
        assert!(report.events.kinds().any(|k| matches!(
            k,
            EventKind::UnitCompleted { locator, .. } if locator == LEADERSHIP_URL
        )));
    }

    #[tokio::test]
    async fn slow_fetch_times_out() {
        let fetcher = FakeFetcher {
            delay: Some(Duration::from_millis(500)),
            ..Default::default()
        }
        .page(LEADERSHIP_URL, &fixture());
        let search = FakeSearch {
            hits: vec![hit(LEADERSHIP_URL, "Leadership")],
        };
        let options = ResolverOptions {
            fetch_timeout: Duration::from_millis(20),
            ..Default::default()
        };
        let resolver = Resolver::new(Arc::new(fetcher))
            .with_search(Arc::new(search))
            .with_options(options);
        let report = resolver
            .resolve(&ResolveRequest::new("Acme").with_website("acme.com"))
            .await;

        assert!(report.profiles.is_empty());
        assert!(report.events.kinds().any(|k| matches!(
            k,
            EventKind::UnitFailed { error, .. } if error.contains("timed out")
        )));
    }

    #[tokio::test]
    async fn sparse_page_asks_the_model() {
        let sparse = "<html><body><h1>About Acme</h1><p>We make widgets.</p></body></html>";
        let fetcher = FakeFetcher::default().page(LEADERSHIP_URL, sparse);
        let search = FakeSearch {
            hits: vec![hit(LEADERSHIP_URL, "About Us")],
        };
        let analyzer = Arc::new(FakeAnalyzer {
            output: AnalysisOutput::Structured(vec![SuggestedExecutive {
                name: "Jane Doe".into(),
                title: "Chief Executive Officer".into(),
                confidence: Some("High".into()),
                location: None,
            }]),
            calls: AtomicUsize::new(0),
        });
        let resolver = Resolver::new(Arc::new(fetcher))
            .with_search(Arc::new(search))
            .with_analyzer(analyzer.clone());
        let report = resolver
            .resolve(&ResolveRequest::new("Acme").with_website("acme.com"))
            .await;

        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 1);
        let jane = profile(&report, "Jane Doe");
        assert_eq!(jane.provenance[0].record.source_kind, SourceKind::ModelSuggested);
        assert_eq!(jane.provenance[0].note, EvidenceNote::Primary);
        assert!(report.events.kinds().any(|k| matches!(
            k,
            EventKind::ModelFallback { found: 0, suggested: 1, .. }
        )));
    }

    #[tokio::test]
    async fn rich_page_skips_the_model() {
        let fetcher = FakeFetcher::default().page(LEADERSHIP_URL, &fixture());
        let search = FakeSearch {
            hits: vec![hit(LEADERSHIP_URL, "Leadership")],
        };
        let analyzer = Arc::new(FakeAnalyzer {
            output: AnalysisOutput::Raw(String::new()),
            calls: AtomicUsize::new(0),
        });
        let resolver = Resolver::new(Arc::new(fetcher))
            .with_search(Arc::new(search))
            .with_analyzer(analyzer.clone());
        resolver
            .resolve(&ResolveRequest::new("Acme").with_website("acme.com"))
            .await;
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn homepage_discovery_without_search() {
        let home = r#"<html><body><a href="/about/leadership">Leadership</a></body></html>"#;
        let fetcher = FakeFetcher::default()
            .page("https://acme.com/", home)
            .page(LEADERSHIP_URL, &fixture());
        let resolver = Resolver::new(Arc::new(fetcher));
        let report = resolver
            .resolve(&ResolveRequest::new("Acme").with_website("acme.com"))
            .await;

        assert!(report
            .events
            .kinds()
            .any(|k| matches!(k, EventKind::PagesDiscovered { via: "homepage", .. })));
        assert!(report.profiles.iter().any(|p| p.display_name == "Jean-Luc Picard"));
    }

    #[tokio::test]
    async fn documents_only_route_skips_website() {
        let fetcher = Arc::new(FakeFetcher::default().page(LEADERSHIP_URL, &fixture()));
        let docs = FakeDocuments {
            docs: HashMap::from([(FILING_URL.to_string(), filing())]),
            ..Default::default()
        };
        let resolver = Resolver::new(fetcher.clone()).with_documents(Arc::new(docs));
        let request = ResolveRequest::new("Acme")
            .with_website("acme.com")
            .with_documents(vec![FILING_URL.to_string()])
            .with_route(ExtractionRoute::for_listing(true));
        let report = resolver.resolve(&request).await;

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        assert!(report
            .profiles
            .iter()
            .all(|p| p.origin == ProfileOrigin::Primary && p.confidence == Confidence::High));
        assert_eq!(profile(&report, "Robert Brown").canonical_role, CanonicalRole::Coo);
    }

    #[tokio::test]
    async fn website_only_route_skips_documents() {
        let fetcher = FakeFetcher::default().page(LEADERSHIP_URL, &fixture());
        let search = FakeSearch {
            hits: vec![hit(LEADERSHIP_URL, "Leadership")],
        };
        let docs = Arc::new(FakeDocuments::default());
        let resolver = Resolver::new(Arc::new(fetcher))
            .with_search(Arc::new(search))
            .with_documents(docs.clone());
        let request = ResolveRequest::new("Acme")
            .with_website("acme.com")
            .with_documents(vec![FILING_URL.to_string()])
            .with_route(ExtractionRoute::WebsiteOnly);
        resolver.resolve(&request).await;
        assert!(docs.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn document_cap_is_respected() {
        let docs = Arc::new(FakeDocuments::default());
        let resolver =
            Resolver::new(Arc::new(FakeFetcher::default())).with_documents(docs.clone());
        let urls: Vec<String> = (0..5).map(|i| format!("https://sec.gov/doc{}", i)).collect();
        let report = resolver
            .resolve(&ResolveRequest::new("Acme").with_documents(urls))
            .await;
        assert_eq!(docs.requested.lock().unwrap().len(), 3);
        assert!(report.profiles.is_empty());
    }

    #[tokio::test]
    async fn nothing_to_read_is_empty_not_error() {
        let resolver = Resolver::new(Arc::new(FakeFetcher::default()));
        let report = resolver.resolve(&ResolveRequest::new("Acme")).await;
        assert!(report.profiles.is_empty());
        assert_eq!(report.events.len(), 1);
        assert!(report.render().is_empty());
    }

    #[test]
    fn route_parsing() {
        assert_eq!("blend".parse::<ExtractionRoute>(), Ok(ExtractionRoute::Blend));
        assert_eq!("Website".parse::<ExtractionRoute>(), Ok(ExtractionRoute::WebsiteOnly));
        assert_eq!("documents".parse::<ExtractionRoute>(), Ok(ExtractionRoute::DocumentsOnly));
        assert!("sideways".parse::<ExtractionRoute>().is_err());
        assert_eq!(ExtractionRoute::for_listing(false), ExtractionRoute::WebsiteOnly);
    }

    #[test]
    fn request_from_json_line() {
        let req: ResolveRequest = serde_json::from_str(
            r#"{"company":"Acme","website":"acme.com","location":"US","route":"website_only"}"#,
        )
        .unwrap();
        assert_eq!(req.route, ExtractionRoute::WebsiteOnly);
        assert_eq!(req.scope_hint(), Some(ScopeHint::GlobalOnly));
        assert!(req.documents.is_empty());
    }
}
