use crate::loader::LoadError;
use crate::render::{escape_html, text_to_markup};
use std::fs;
use std::path::Path;
use xxhash_rust::xxh64::xxh64;

/// Raw document bytes as handed to a loader
#[derive(Debug, Clone)]
pub struct DocumentPayload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl DocumentPayload {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a payload from disk, named after the file
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Ok(Self { name, bytes })
    }

    pub fn extension(&self) -> Option<String> {
        extension_of(&self.name)
    }
}

/// Lower-cased extension of a file name, without the dot
pub fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}

/// What a loader hands back: linearized text plus a structural rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    pub text: String,
    pub html: String,
}

impl LoadedDocument {
    /// Wrap plain text, deriving paragraph markup from it
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let html = text_to_markup(&text);
        Self { text, html }
    }
}

/// One loaded document held by the session
#[derive(Debug, Clone)]
pub struct DocumentContent {
    name: String,
    text: String,
    html: String,
    fingerprint: u64,
    marked: Option<String>,
}

impl DocumentContent {
    pub fn new(name: impl Into<String>, loaded: LoadedDocument) -> Self {
        let fingerprint = fingerprint(&loaded.text);
        Self {
            name: name.into(),
            text: loaded.text,
            html: loaded.html,
            fingerprint,
            marked: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub fn marked(&self) -> Option<&str> {
        self.marked.as_deref()
    }

    pub(crate) fn set_marked(&mut self, markup: String) {
        self.marked = Some(markup);
    }

    pub(crate) fn clear_marked(&mut self) {
        self.marked = None;
    }

    /// Markup used to display the unmarked document
    pub fn display_markup(&self) -> String {
        if self.html.is_empty() {
            escape_html(&self.text).replace('\n', "<br>")
        } else {
            self.html.clone()
        }
    }
}

/// XXHash64 of the text content
pub fn fingerprint(text: &str) -> u64 {
    xxh64(text.as_bytes(), 0)
}
