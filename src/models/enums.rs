use serde::{Deserialize, Serialize};

/// Kind of uploaded artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Image,
    Note,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Image => "image",
            DocumentKind::Note => "note",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pdf" => Some(DocumentKind::Pdf),
            "image" => Some(DocumentKind::Image),
            "note" => Some(DocumentKind::Note),
            _ => None,
        }
    }
}

/// Kind of share pack audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareEventKind {
    Revoke,
    View,
}

impl ShareEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShareEventKind::Revoke => "revoke",
            ShareEventKind::View => "view",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "revoke" => Some(ShareEventKind::Revoke),
            "view" => Some(ShareEventKind::View),
            _ => None,
        }
    }
}
