use {
    std::path::{Path, PathBuf},
    anyhow::{anyhow, Context},
    async_trait::async_trait,
    reqwest::header::COOKIE,
    serde::Deserialize,
    serde_json::{json, Value},
    tracing::{info, warn},
    crate::{
        config::{CaptureSourceConfig, HttpSourceConfig, ReplaySourceConfig},
        models::CommentPage,
    },
};

/// A paginated feed of comment-list responses with a single logical scroll position.
///
/// `advance` asks for the next page, `wait` resolves with that page's response
/// body. The collector bounds `wait` with its own timeout, so an implementation
/// is allowed to never resolve.
#[async_trait]
pub trait CaptureSource: Send {
    async fn advance(&mut self) -> anyhow::Result<()>;

    async fn wait(&mut self) -> anyhow::Result<Value>;
}

/// Requests pages from a comment-list endpoint, following the `cursor` the endpoint returns.
pub struct HttpCaptureSource {
    client: reqwest::Client,
    config: HttpSourceConfig,
    cursor: u64,
    pending_url: Option<String>,
}

/// Replays response bodies saved from an earlier capture session, one JSON file per page.
pub struct ReplayCaptureSource {
    pages: Vec<PathBuf>,
    next_page: usize,
    pending: Option<PathBuf>,
}

pub enum ConfiguredSource {
    Http(HttpCaptureSource),
    Replay(ReplayCaptureSource),
}

impl HttpCaptureSource {
    pub fn new(config: HttpSourceConfig) -> anyhow::Result<Self> {
        if !config.url_template.contains("{cursor}") {
            warn!("url template has no {{cursor}} placeholder, every page will request the same url");
        }

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent())
            .build()
            .context("failed to build http client")?;

        Ok(Self {
            client,
            cursor: config.initial_cursor(),
            config,
            pending_url: None,
        })
    }

    pub fn page_url(&self) -> String {
        self.config.url_template
            .replace("{cursor}", &self.cursor.to_string())
            .replace("{count}", &self.config.page_size().to_string())
    }
}

#[async_trait]
impl CaptureSource for HttpCaptureSource {
    async fn advance(&mut self) -> anyhow::Result<()> {
        self.pending_url = Some(self.page_url());
        Ok(())
    }

    async fn wait(&mut self) -> anyhow::Result<Value> {
        let url = self.pending_url.take().ok_or_else(|| anyhow!("wait called before advance"))?;

        let mut request = self.client.get(&url);
        if let Some(cookie) = self.config.cookie() {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await
            .with_context(|| format!("request to {} failed", url))?
            .error_for_status()?;
        let body = response.bytes().await?;
        let body: Value = serde_json::from_slice(&body).context("response body is not json")?;

        self.cursor = next_cursor(self.cursor, self.config.page_size(), &body);

        Ok(body)
    }
}

/// Position of the page after `body`: the endpoint's own `cursor` when it sends one,
/// otherwise one page further than `current`.
fn next_cursor(current: u64, page_size: u32, body: &Value) -> u64 {
    CommentPage::deserialize(body)
        .ok()
        .and_then(|page| page.cursor())
        .unwrap_or(current + page_size as u64)
}

impl ReplayCaptureSource {
    pub fn open(directory: &Path) -> anyhow::Result<Self> {
        let mut pages = Vec::new();
        for entry in std::fs::read_dir(directory)
            .with_context(|| format!("failed to read capture directory {}", directory.display()))?
        {
            let path = entry?.path();
            if path.extension().map(|v| v == "json").unwrap_or(false) {
                pages.push(path);
            }
        }
        pages.sort();

        info!("replaying {} captured pages from {}", pages.len(), directory.display());

        Ok(Self {
            pages,
            next_page: 0,
            pending: None,
        })
    }

    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }
}

#[async_trait]
impl CaptureSource for ReplayCaptureSource {
    async fn advance(&mut self) -> anyhow::Result<()> {
        self.pending = self.pages.get(self.next_page).cloned();
        self.next_page += 1;
        if self.next_page == self.total_pages() + 1 {
            info!("all {} captured pages replayed", self.total_pages());
        }
        Ok(())
    }

    async fn wait(&mut self) -> anyhow::Result<Value> {
        match self.pending.take() {
            Some(path) => {
                let body = tokio::fs::read(&path).await
                    .with_context(|| format!("failed to read captured page {}", path.display()))?;
                serde_json::from_slice(&body)
                    .with_context(|| format!("captured page {} is not json", path.display()))
            },
            // past the last saved page the feed behaves like an exhausted list
            None => Ok(json!({ "comments": [], "has_more": 0 })),
        }
    }
}

impl ConfiguredSource {
    pub fn from_config(config: &CaptureSourceConfig) -> anyhow::Result<Self> {
        Ok(match config {
            CaptureSourceConfig::Http(config) => Self::Http(HttpCaptureSource::new(config.clone())?),
            CaptureSourceConfig::Replay(ReplaySourceConfig { directory }) => Self::Replay(ReplayCaptureSource::open(Path::new(directory))?),
        })
    }
}

#[async_trait]
impl CaptureSource for ConfiguredSource {
    async fn advance(&mut self) -> anyhow::Result<()> {
        match self {
            Self::Http(source) => source.advance().await,
            Self::Replay(source) => source.advance().await,
        }
    }

    async fn wait(&mut self) -> anyhow::Result<Value> {
        match self {
            Self::Http(source) => source.wait().await,
            Self::Replay(source) => source.wait().await,
        }
    }
}
