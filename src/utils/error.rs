use serde::Serialize;
use thiserror::Error;

/// 元件載入與渲染的失敗種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    UnregisteredComponent,
    FetchFailure,
    TemplateNotFound,
    MountPointNotFound,
}

/// 元件層級的錯誤。在偵測點記錄後回傳，呼叫端可以忽略或用 `?` 傳遞。
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FragmentError {
    #[error("Component {name} not found")]
    UnregisteredComponent { name: String },

    #[error("Failed to load component {name} from {location}: {reason}")]
    FetchFailure {
        name: String,
        location: String,
        reason: String,
    },

    #[error("Component template {name} not found ({reason})")]
    TemplateNotFound { name: String, reason: String },

    #[error("Target element {selector} not found for component {component}")]
    MountPointNotFound { component: String, selector: String },
}

impl FragmentError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FragmentError::UnregisteredComponent { .. } => FailureKind::UnregisteredComponent,
            FragmentError::FetchFailure { .. } => FailureKind::FetchFailure,
            FragmentError::TemplateNotFound { .. } => FailureKind::TemplateNotFound,
            FragmentError::MountPointNotFound { .. } => FailureKind::MountPointNotFound,
        }
    }

    pub fn component(&self) -> &str {
        match self {
            FragmentError::UnregisteredComponent { name }
            | FragmentError::FetchFailure { name, .. }
            | FragmentError::TemplateNotFound { name, .. } => name,
            FragmentError::MountPointNotFound { component, .. } => component,
        }
    }
}

#[derive(Error, Debug)]
pub enum SiteError {
    #[error(transparent)]
    Fragment(#[from] FragmentError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP {status} while fetching {url}")]
    HttpStatusError { url: String, status: u16 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Markup parse error: {message}")]
    MarkupError { message: String },

    #[error("Invalid selector '{selector}': {reason}")]
    SelectorError { selector: String, reason: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Page has already been composed")]
    AlreadyComposed,
}

impl SiteError {
    pub fn markup(message: impl Into<String>) -> Self {
        SiteError::MarkupError {
            message: message.into(),
        }
    }

    pub fn selector(selector: &str, reason: impl Into<String>) -> Self {
        SiteError::SelectorError {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SiteError::Fragment(_) => "Check the component registration table and the page's mount points",
            SiteError::HttpError(_) | SiteError::HttpStatusError { .. } => {
                "Check that the fragment base URL is reachable"
            }
            SiteError::IoError(_) => "Check that the page and fragment files exist and are readable",
            SiteError::SerializationError(_) => "Report this as a bug",
            SiteError::MarkupError { .. } => "Check the markup for unclosed tags or comments",
            SiteError::SelectorError { .. } => "Use #id, .class, tag or [attr] selectors",
            SiteError::ConfigError { .. }
            | SiteError::InvalidConfigValueError { .. } => "Fix the site configuration file",
            SiteError::AlreadyComposed => "Create a new composer for each page load",
        }
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;
