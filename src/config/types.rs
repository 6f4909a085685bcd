use serde::Deserialize;

/// Main configuration structure for Company-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// First listing page; later pages append `page=<n>`
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Highest listing page index to fetch (pages 0..=max_pages)
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Fixed delay between two task launches (milliseconds)
    #[serde(rename = "request-delay-ms", default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Maximum number of requests in flight at once
    #[serde(
        rename = "max-concurrent-requests",
        default = "default_max_concurrent_requests"
    )]
    pub max_concurrent_requests: u32,

    /// Store set holding discovered detail references
    #[serde(rename = "discovery-set", default = "default_discovery_set")]
    pub discovery_set: String,

    /// Glob pattern matching the store keys of extracted records
    #[serde(rename = "record-pattern", default = "default_record_pattern")]
    pub record_pattern: String,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite intermediate store
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path of the exported CSV report
    #[serde(rename = "csv-path")]
    pub csv_path: String,
}

/// Selector rules for listing and detail pages
///
/// Every field has a default matching the job board the crawler was written
/// for, so the whole `[extract]` table may be omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    /// Anchors on a listing page that may point at detail pages
    #[serde(rename = "listing-selector", default = "default_listing_selector")]
    pub listing_selector: String,

    /// Substring an href must contain to count as a detail reference
    #[serde(rename = "reference-marker", default = "default_reference_marker")]
    pub reference_marker: String,

    /// Repeated label/value block on a detail page
    #[serde(rename = "block-selector", default = "default_block_selector")]
    pub block_selector: String,

    /// Label element inside a block
    #[serde(rename = "label-selector", default = "default_label_selector")]
    pub label_selector: String,

    /// Value element inside a block
    #[serde(rename = "value-selector", default = "default_value_selector")]
    pub value_selector: String,

    /// Phone-icon-marked numbers inside the contact block
    #[serde(rename = "phone-icon-selector", default = "default_phone_icon_selector")]
    pub phone_icon_selector: String,

    /// Fallback phone element, searched in every block
    #[serde(
        rename = "phone-title-selector",
        default = "default_phone_title_selector"
    )]
    pub phone_title_selector: String,

    /// Separator used when joining several phone numbers
    #[serde(rename = "phone-separator", default = "default_phone_separator")]
    pub phone_separator: String,

    #[serde(default)]
    pub labels: LabelConfig,
}

/// Label texts identifying the four company fields
#[derive(Debug, Clone, Deserialize)]
pub struct LabelConfig {
    #[serde(default = "default_name_label")]
    pub name: String,

    #[serde(default = "default_business_label")]
    pub business: String,

    #[serde(default = "default_address_label")]
    pub address: String,

    #[serde(default = "default_contact_label")]
    pub contact: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            listing_selector: default_listing_selector(),
            reference_marker: default_reference_marker(),
            block_selector: default_block_selector(),
            label_selector: default_label_selector(),
            value_selector: default_value_selector(),
            phone_icon_selector: default_phone_icon_selector(),
            phone_title_selector: default_phone_title_selector(),
            phone_separator: default_phone_separator(),
            labels: LabelConfig::default(),
        }
    }
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            name: default_name_label(),
            business: default_business_label(),
            address: default_address_label(),
            contact: default_contact_label(),
        }
    }
}

fn default_request_delay_ms() -> u64 {
    200
}

fn default_max_concurrent_requests() -> u32 {
    8
}

fn default_discovery_set() -> String {
    "JOB_LIST".to_string()
}

fn default_record_pattern() -> String {
    "*detail*".to_string()
}

fn default_listing_selector() -> String {
    "div.job-cassette-lst-wrap a".to_string()
}

fn default_reference_marker() -> String {
    "detail".to_string()
}

fn default_block_selector() -> String {
    "dl.job-ditail-tbl-inner".to_string()
}

fn default_label_selector() -> String {
    "dt".to_string()
}

fn default_value_selector() -> String {
    "dd p".to_string()
}

fn default_phone_icon_selector() -> String {
    "span.detail-tel-ico".to_string()
}

fn default_phone_title_selector() -> String {
    "p.detail-tel-ttl".to_string()
}

fn default_phone_separator() -> String {
    ", ".to_string()
}

fn default_name_label() -> String {
    "社名（店舗名）".to_string()
}

fn default_business_label() -> String {
    "会社事業内容".to_string()
}

fn default_address_label() -> String {
    "会社住所".to_string()
}

fn default_contact_label() -> String {
    "問い合わせ番号".to_string()
}
