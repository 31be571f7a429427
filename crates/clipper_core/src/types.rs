use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

/// Monotonic counter identifying one submission. Events tagged with an older
/// generation than the state's current one are discarded.
pub type Generation = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrawlMode {
    #[default]
    Single,
    Sitemap,
    Smart,
}

impl CrawlMode {
    /// Maps the deprecated `sitemap: bool` request flag onto the mode enum.
    pub fn from_legacy(sitemap: bool) -> Self {
        if sitemap {
            CrawlMode::Sitemap
        } else {
            CrawlMode::Single
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CrawlMode::Single => "single",
            CrawlMode::Sitemap => "sitemap",
            CrawlMode::Smart => "smart",
        }
    }
}

impl FromStr for CrawlMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(CrawlMode::Single),
            "sitemap" => Ok(CrawlMode::Sitemap),
            "smart" => Ok(CrawlMode::Smart),
            other => Err(format!("unknown crawl mode `{other}`")),
        }
    }
}

impl fmt::Display for CrawlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A site cookie captured for an authenticated crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: "/".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    pub url: String,
    pub mode: CrawlMode,
    /// Page cap; only meaningful for [`CrawlMode::Smart`].
    pub max_pages: Option<u32>,
    pub credentials: Vec<Cookie>,
}

impl CrawlRequest {
    pub fn new(url: impl Into<String>, mode: CrawlMode) -> Self {
        Self {
            url: url.into(),
            mode,
            max_pages: None,
            credentials: Vec::new(),
        }
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    pub fn with_credentials(mut self, credentials: Vec<Cookie>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Page cap as it should be sent: present only for smart crawls and never zero.
    pub fn effective_max_pages(&self) -> Option<u32> {
        match self.mode {
            CrawlMode::Smart => self.max_pages.filter(|pages| *pages > 0),
            CrawlMode::Single | CrawlMode::Sitemap => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "processing" => Ok(TaskStatus::Processing),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            other => Err(format!("unknown task status `{other}`")),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key for every query about a submitted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle {
    pub task_id: String,
    pub created_at: SystemTime,
}

impl TaskHandle {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            created_at: SystemTime::now(),
        }
    }
}

/// Full server-side view of a task. Each retrieval replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSnapshot {
    pub id: String,
    pub url: String,
    pub status: TaskStatus,
    pub progress: u8,
    pub total_pages: u32,
    pub processed_pages: u32,
    pub result: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub file_id: String,
    pub display_name: String,
    pub web_link: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_sitemap_flag_maps_onto_mode() {
        assert_eq!(CrawlMode::from_legacy(true), CrawlMode::Sitemap);
        assert_eq!(CrawlMode::from_legacy(false), CrawlMode::Single);
    }

    #[test]
    fn max_pages_only_counts_for_smart_crawls() {
        let request = CrawlRequest::new("https://example.com", CrawlMode::Smart).with_max_pages(0);
        assert_eq!(request.effective_max_pages(), None);

        let request = CrawlRequest::new("https://example.com", CrawlMode::Sitemap).with_max_pages(5);
        assert_eq!(request.effective_max_pages(), None);
    }
}
