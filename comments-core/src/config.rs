use {
    std::{fs::read_to_string, path::PathBuf, time::Duration},
    tracing::warn,
    serde::Deserialize,
    crate::normalizer::DEFAULT_IRRELEVANT_PATTERNS,
};

#[derive(Deserialize, Debug)]
pub struct Config {
    collector: Option<CollectorConfig>,
    analysis: Option<AnalysisConfig>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct CollectorConfig {
    max_pages: Option<u32>,
    page_timeout_secs: Option<u64>,
    max_consecutive_failures: Option<u32>,
    output_path: Option<String>,
    source: Option<CaptureSourceConfig>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaptureSourceConfig {
    Http(HttpSourceConfig),
    Replay(ReplaySourceConfig),
}

#[derive(Deserialize, Clone, Debug)]
pub struct HttpSourceConfig {
    // e.g. https://example.com/comment/list/?item_id=42&cursor={cursor}&count={count}
    pub url_template: String,
    page_size: Option<u32>,
    initial_cursor: Option<u64>,
    cookie: Option<String>,
    user_agent: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ReplaySourceConfig {
    pub directory: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AnalysisConfig {
    input_path: Option<String>,
    input_encoding: Option<String>,
    stopwords_path: Option<String>,
    positive_lexicon_path: Option<String>,
    negative_lexicon_path: Option<String>,
    irrelevant_patterns: Option<Vec<String>>,
    top_words: Option<usize>,
    cooccurrence_threshold: Option<u64>,
    workers: Option<usize>,
    output_dir: Option<String>,
    #[serde(default)]
    segmenter: SegmenterConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmenterConfig {
    Unicode,
    Dictionary {
        user_dictionary_path: Option<String>,
        max_word_chars: Option<usize>,
    },
    Pretrained {
        identifier: String,
    },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collector: None,
            analysis: None,
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            max_pages: None,
            page_timeout_secs: None,
            max_consecutive_failures: None,
            output_path: None,
            source: None,
        }
    }
}

impl Default for CaptureSourceConfig {
    fn default() -> Self {
        Self::Replay(ReplaySourceConfig {
            directory: "./captures".to_owned(),
        })
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input_path: None,
            input_encoding: None,
            stopwords_path: None,
            positive_lexicon_path: None,
            negative_lexicon_path: None,
            irrelevant_patterns: None,
            top_words: None,
            cooccurrence_threshold: None,
            workers: None,
            output_dir: None,
            segmenter: SegmenterConfig::default(),
        }
    }
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self::Dictionary {
            user_dictionary_path: None,
            max_word_chars: None,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        read_to_string("./config.toml")
            .or_else(|_| read_to_string("/config/config.toml"))
            .map_err(|err| err.to_string())
            .and_then(|v| Self::parse(&v))
            .unwrap_or_else(|err| {
                warn!("failed to read config: {}", err);
                Config::default()
            })
    }

    pub fn parse(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|err| err.to_string())
    }

    pub fn collector(&self) -> CollectorConfig {
        self.collector.as_ref().cloned().unwrap_or_default()
    }

    pub fn analysis(&self) -> AnalysisConfig {
        self.analysis.as_ref().cloned().unwrap_or_default()
    }
}

impl CollectorConfig {
    pub fn max_pages(&self) -> u32 {
        self.max_pages.unwrap_or(500)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs.unwrap_or(30))
    }

    pub fn max_consecutive_failures(&self) -> u32 {
        self.max_consecutive_failures.unwrap_or(3).max(1)
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(self.output_path.as_deref().unwrap_or("data.csv"))
    }

    pub fn source(&self) -> CaptureSourceConfig {
        self.source.as_ref().cloned().unwrap_or_default()
    }
}

impl HttpSourceConfig {
    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(20)
    }

    pub fn initial_cursor(&self) -> u64 {
        self.initial_cursor.unwrap_or(0)
    }

    pub fn cookie(&self) -> Option<&String> {
        self.cookie.as_ref()
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36")
    }
}

impl AnalysisConfig {
    pub fn input_path(&self) -> PathBuf {
        PathBuf::from(self.input_path.as_deref().unwrap_or("data.csv"))
    }

    /// WHATWG encoding label of the comment table, e.g. `gb18030` for tables saved from Excel.
    pub fn input_encoding(&self) -> &str {
        self.input_encoding.as_deref().unwrap_or("utf-8")
    }

    pub fn stopwords_path(&self) -> PathBuf {
        PathBuf::from(self.stopwords_path.as_deref().unwrap_or("cn_stopwords.txt"))
    }

    pub fn positive_lexicon_path(&self) -> PathBuf {
        PathBuf::from(self.positive_lexicon_path.as_deref().unwrap_or("positive_submit.txt"))
    }

    pub fn negative_lexicon_path(&self) -> PathBuf {
        PathBuf::from(self.negative_lexicon_path.as_deref().unwrap_or("negative_submit.txt"))
    }

    pub fn irrelevant_patterns(&self) -> Vec<String> {
        self.irrelevant_patterns.as_ref().cloned().unwrap_or_else(|| {
            DEFAULT_IRRELEVANT_PATTERNS.iter().map(|v| v.to_string()).collect()
        })
    }

    pub fn top_words(&self) -> usize {
        self.top_words.unwrap_or(50)
    }

    pub fn cooccurrence_threshold(&self) -> u64 {
        self.cooccurrence_threshold.unwrap_or(100)
    }

    pub fn workers(&self) -> usize {
        self.workers
            .or_else(|| std::thread::available_parallelism().ok().map(|v| v.get()))
            .unwrap_or(1)
            .max(1)
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(self.output_dir.as_deref().unwrap_or("."))
    }

    pub fn segmenter(&self) -> &SegmenterConfig {
        &self.segmenter
    }
}
