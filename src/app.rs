use crate::error::{ErrorKind, Result};
use cardscan_catalog::CatalogClient;
use cardscan_catalog::display::{CardSummary, search_line};
use cardscan_config::Config;
use cardscan_net::{FetchHandle, Fetcher, HttpFetcher, Url};
use cardscan_offline::{CacheManager, Generation, GenerationStore, Manifest, RoutingPolicy};
use cardscan_resolve::{KnownNames, Resolver, RuleSet};
use cardscan_scanner::{RecognizerHandle, ScanEvent, Scanner, Session, Tesseract};
use cardscan_storage::backend::LocalBackend;
use exn::ResultExt;
use futures::StreamExt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;

const TESSERACT: &str = "tesseract";

/// Everything the commands need, wired once from the configuration.
///
/// All network traffic, catalog lookups included, goes through the offline
/// cache manager.
pub struct App {
    config: Config,
    cache: Arc<CacheManager>,
    catalog: CatalogClient,
    resolver: Arc<Resolver>,
}
impl App {
    pub async fn new(config: Config) -> Result<Self> {
        let origin = config.cache.origin().map_err(ErrorKind::config)?;
        let network: FetchHandle =
            Arc::new(HttpFetcher::new("http").or_raise(|| ErrorKind::Network)?.with_origin(origin.clone()));
        let directory = config.cache.directory().map_err(ErrorKind::config)?;
        let backend = LocalBackend::new("cache", &directory).map_err(ErrorKind::cache)?;
        let manifest = Manifest::resolve(&origin, &config.cache.manifest).map_err(ErrorKind::config)?;
        let policy = RoutingPolicy::new(&config.cache.network_only_hosts, &config.cache.offline_message);
        let cache = Arc::new(CacheManager::new(network, GenerationStore::new(Arc::new(backend)), policy, manifest));
        cache.restore().await.map_err(ErrorKind::cache)?;

        let base_url = config.catalog.base_url().map_err(ErrorKind::config)?;
        let mut catalog = CatalogClient::new(cache.clone(), base_url);
        if let Some(api_key) = &config.catalog.api_key {
            catalog = catalog.with_api_key(api_key);
        }
        let names = match &config.resolver.names {
            Some(path) => KnownNames::from_file(path),
            None => KnownNames::builtin(),
        };
        let resolver = Arc::new(Resolver::new(names.map_err(ErrorKind::config)?, RuleSet::default()));
        Ok(Self { config, cache, catalog, resolver })
    }

    fn recognizer(&self) -> Result<RecognizerHandle> {
        let language = &self.config.recognition.language;
        let tesseract = match &self.config.recognition.binary {
            Some(binary) => Tesseract::with_binary(binary, language),
            None => Tesseract::discover(language).map_err(ErrorKind::failed)?,
        };
        Ok(Arc::new(tesseract))
    }

    fn session(&self, recognizer: RecognizerHandle) -> Session {
        Session::new(Scanner::new(recognizer, self.resolver.clone(), self.catalog.clone()))
    }

    pub async fn scan(&self, image: &Path, quiet: bool) -> Result<()> {
        let bytes = tokio::fs::read(image).await.or_raise(|| ErrorKind::Input(image.to_path_buf()))?;
        let session = self.session(self.recognizer()?);
        if quiet {
            let identification = session.identify(bytes).await.map_err(ErrorKind::failed)?;
            print!("{}", CardSummary::from(&identification.record));
            return Ok(());
        }
        let mut events = session.scan(bytes).map_err(ErrorKind::failed)?;
        while let Some(event) = events.next().await {
            match event.map_err(ErrorKind::failed)? {
                ScanEvent::Progress { stage, percent } => eprintln!("[{percent:>3}%] {stage}"),
                ScanEvent::Recognized(text) => tracing::debug!(%text, "Recognised text"),
                ScanEvent::Resolved(candidate) => {
                    eprintln!("       Found name \"{candidate}\" ({})", candidate.provenance());
                },
                ScanEvent::Found(record) => print!("{}", CardSummary::from(record.as_ref())),
            }
        }
        Ok(())
    }

    pub async fn resolve(&self, file: Option<&Path>) -> Result<()> {
        let text = match file {
            Some(path) => tokio::fs::read_to_string(path).await.or_raise(|| ErrorKind::Input(path.to_path_buf()))?,
            None => {
                let mut text = String::new();
                tokio::io::stdin().read_to_string(&mut text).await.or_raise(|| ErrorKind::Stdin)?;
                text
            },
        };
        let candidate = self.resolver.resolve(&text).map_err(ErrorKind::failed)?;
        let aliases = self.resolver.names().aliases_of(candidate.name());
        let others: Vec<&str> = aliases.into_iter().filter(|alias| *alias != candidate.name()).collect();
        match others.is_empty() {
            true => println!("{candidate}\t{}", candidate.provenance()),
            false => println!("{candidate}\t{}\t{}", candidate.provenance(), others.join(", ")),
        }
        Ok(())
    }

    pub async fn search(&self, term: &str, limit: Option<u32>) -> Result<()> {
        let limit = limit.unwrap_or(self.config.catalog.search_limit);
        // Manual search never runs the recogniser, so it need not be installed.
        let recognition = &self.config.recognition;
        let binary = recognition.binary.clone().unwrap_or_else(|| PathBuf::from(TESSERACT));
        let session = self.session(Arc::new(Tesseract::with_binary(binary, &recognition.language)));
        let records = session.search(term, limit).await.map_err(ErrorKind::failed)?;
        let mut stdout = std::io::stdout().lock();
        for record in &records {
            // A closed pipe just ends the listing.
            if writeln!(stdout, "{}", search_line(record)).is_err() {
                break;
            }
        }
        Ok(())
    }

    pub async fn install(&self, version: Option<u32>) -> Result<()> {
        let version = version.unwrap_or(self.config.cache.version);
        let generation = Generation::new(&self.config.cache.prefix, version).map_err(ErrorKind::config)?;
        let stored = self.cache.install(generation).await.map_err(ErrorKind::cache)?;
        let active = self.cache.activate().await.map_err(ErrorKind::cache)?;
        println!("Installed {stored} resources as {active}");
        Ok(())
    }

    pub async fn status(&self) -> Result<()> {
        let status = self.cache.status().await.map_err(ErrorKind::cache)?;
        match status.lifecycle.current() {
            Some(current) => println!("{}: {current}", status.lifecycle.name()),
            None => println!("{}", status.lifecycle.name()),
        }
        for store in &status.stores {
            let marker = if store.current { '*' } else { ' ' };
            let updated = store.usage.updated.map(|at| at.date().to_string()).unwrap_or_else(|| "-".to_string());
            println!(
                "{marker} {:<24}{:>6} entries{:>12} bytes  {updated}",
                store.tag, store.usage.entries, store.usage.bytes
            );
        }
        Ok(())
    }

    pub async fn fetch(&self, url: &str) -> Result<()> {
        let url = Url::parse(url).or_raise(|| ErrorKind::Input(url.into()))?;
        let response = self.cache.get(&url).await.map_err(ErrorKind::failed)?;
        eprintln!("{} {} ({:?}, {} bytes)", response.status, response.url, response.kind, response.body.len());
        std::io::stdout().lock().write_all(&response.body).or_raise(|| ErrorKind::Output)?;
        Ok(())
    }
}
