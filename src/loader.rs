use crate::config::LoaderSettings;
use crate::document::{DocumentPayload, LoadedDocument, extension_of};
use crate::messages::{LoadRequest, LoadResponse};
use std::io;
use std::string::FromUtf8Error;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Document is not valid UTF-8: {0}")]
    Decode(#[from] FromUtf8Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Document parsing failed: {0}")]
    Parse(String),
}

/// Converts a document payload into plain text and structural markup
pub trait DocumentLoader {
    /// Whether the payload name has a format this loader understands
    fn accepts(&self, name: &str) -> bool;

    fn load(&self, payload: &DocumentPayload) -> Result<LoadedDocument, LoadError>;
}

/// Loader for UTF-8 text files
pub struct PlainTextLoader {
    extensions: Vec<String>,
}

impl PlainTextLoader {
    pub fn new(settings: &LoaderSettings) -> Self {
        Self {
            extensions: settings
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }
}

impl Default for PlainTextLoader {
    fn default() -> Self {
        Self::new(&LoaderSettings::default())
    }
}

impl DocumentLoader for PlainTextLoader {
    fn accepts(&self, name: &str) -> bool {
        extension_of(name).is_some_and(|ext| self.extensions.contains(&ext))
    }

    fn load(&self, payload: &DocumentPayload) -> Result<LoadedDocument, LoadError> {
        if !self.accepts(&payload.name) {
            return Err(LoadError::UnsupportedFormat(payload.name.clone()));
        }
        let text = String::from_utf8(payload.bytes.clone())?;
        Ok(LoadedDocument::from_text(text))
    }
}

pub struct LoadWorker<L> {
    loader: L,
    receiver: Receiver<LoadRequest>,
    response_sender: Sender<LoadResponse>,
}

impl<L: DocumentLoader> LoadWorker<L> {
    pub fn new(
        loader: L,
        receiver: Receiver<LoadRequest>,
        response_sender: Sender<LoadResponse>,
    ) -> Self {
        Self {
            loader,
            receiver,
            response_sender,
        }
    }

    pub fn run(&self) {
        while let Ok(message) = self.receiver.recv() {
            match message {
                LoadRequest::Load(side, payload) => {
                    debug!("Loading {:?} document {}", side, payload.name);
                    let response = LoadResponse {
                        side,
                        name: payload.name.clone(),
                        result: self.loader.load(&payload),
                    };
                    if let Err(e) = self.response_sender.send(response) {
                        error!("Failed to send load response: {}", e);
                        break;
                    }
                }
            }
        }
    }
}

/// Run a loader on a background thread; the worker exits when the
/// request sender is dropped
pub fn spawn_loader<L>(loader: L) -> (Sender<LoadRequest>, Receiver<LoadResponse>)
where
    L: DocumentLoader + Send + 'static,
{
    let (sender, receiver) = std::sync::mpsc::channel();
    let (response_sender, response_receiver) = std::sync::mpsc::channel();
    thread::spawn(move || {
        let worker = LoadWorker::new(loader, receiver, response_sender);
        worker.run();
    });
    (sender, response_receiver)
}
