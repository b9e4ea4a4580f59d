//! Comparison session: the two loaded documents and the active diff.
//!
//! Every user action maps to one method. Control enablement is derived from
//! the session through [`Session::controls`]; the methods still check their
//! own preconditions and return early without touching state.

use crate::config::Settings;
use crate::constant::{
    BASE_LABEL, COMPARE_FIRST_PLACEHOLDER, COMPARE_LABEL, MARK_BASE_PLACEHOLDER,
    MARK_COMPARE_PLACEHOLDER, MARK_FAILED_PLACEHOLDER,
};
use crate::diff::{DiffResult, SimilarDiffer, Stats, compare_texts, compute_stats};
use crate::document::{DocumentContent, DocumentPayload, LoadedDocument};
use crate::exporter::{ExportError, ExportRequest, Publisher};
use crate::loader::{DocumentLoader, LoadError};
use crate::messages::LoadResponse;
use crate::render::{Side, mark_side};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("{0:?} document is not loaded")]
    MissingDocument(Side),

    #[error("No comparison has been run")]
    NoComparison,

    #[error("{0:?} document is still loading")]
    Busy(Side),

    #[error("Diff algorithm {0:?} is unavailable")]
    DifferUnavailable(String),

    #[error("Failed to load {name}: {source}")]
    Load {
        name: String,
        #[source]
        source: LoadError,
    },

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideStatus {
    Empty,
    Loading,
    Loaded,
    Failed(String),
    Marked,
}

#[derive(Debug)]
struct SideState {
    name: Option<String>,
    status: SideStatus,
    content: Option<DocumentContent>,
    mark_failed: bool,
}

impl SideState {
    fn new() -> Self {
        Self {
            name: None,
            status: SideStatus::Empty,
            content: None,
            mark_failed: false,
        }
    }

    fn is_loaded(&self) -> bool {
        self.content.is_some() && self.status != SideStatus::Loading
    }

    /// Drop marked markup derived from a diff that no longer exists
    fn reset_marking(&mut self) {
        self.mark_failed = false;
        if let Some(content) = self.content.as_mut() {
            content.clear_marked();
        }
        if self.status == SideStatus::Marked {
            self.status = SideStatus::Loaded;
        }
    }
}

/// Which actions are currently available
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlState {
    pub compare: bool,
    pub mark_base: bool,
    pub mark_compare: bool,
    pub export_base: bool,
    pub export_compare: bool,
}

pub struct Session {
    id: Uuid,
    settings: Settings,
    differ: Option<SimilarDiffer>,
    publisher: Box<dyn Publisher>,
    base: SideState,
    compare: SideState,
    diff: Option<DiffResult>,
}

impl Session {
    pub fn new(settings: Settings, publisher: Box<dyn Publisher>) -> Self {
        let id = Uuid::new_v4();
        let differ = SimilarDiffer::from_name(&settings.diff.algorithm);
        if differ.is_none() {
            error!(
                "Session {}: unknown diff algorithm {:?}, comparison disabled",
                id, settings.diff.algorithm
            );
        }
        Self {
            id,
            settings,
            differ,
            publisher,
            base: SideState::new(),
            compare: SideState::new(),
            diff: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn differ_available(&self) -> bool {
        self.differ.is_some()
    }

    fn side(&self, side: Side) -> &SideState {
        match side {
            Side::Base => &self.base,
            Side::Compare => &self.compare,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut SideState {
        match side {
            Side::Base => &mut self.base,
            Side::Compare => &mut self.compare,
        }
    }

    pub fn load_base(
        &mut self,
        loader: &dyn DocumentLoader,
        payload: DocumentPayload,
    ) -> Result<(), SessionError> {
        self.load(Side::Base, loader, payload)
    }

    pub fn load_compare(
        &mut self,
        loader: &dyn DocumentLoader,
        payload: DocumentPayload,
    ) -> Result<(), SessionError> {
        self.load(Side::Compare, loader, payload)
    }

    /// Load a side synchronously through `loader`
    pub fn load(
        &mut self,
        side: Side,
        loader: &dyn DocumentLoader,
        payload: DocumentPayload,
    ) -> Result<(), SessionError> {
        self.begin_load(side, &payload.name);
        let result = loader.load(&payload);
        self.complete_load(side, result)
    }

    /// Mark a side busy while its document is parsed elsewhere
    pub fn begin_load(&mut self, side: Side, name: &str) {
        info!("Session {}: loading {:?} document {}", self.id, side, name);
        let state = self.side_mut(side);
        state.name = Some(name.to_string());
        state.status = SideStatus::Loading;
    }

    /// Apply the outcome of a load started with [`Session::begin_load`]
    pub fn complete_load(
        &mut self,
        side: Side,
        result: Result<LoadedDocument, LoadError>,
    ) -> Result<(), SessionError> {
        let id = self.id;
        let name = self.side(side).name.clone().unwrap_or_default();

        // A new document (or a failed one) invalidates any previous comparison
        self.reset_results();

        match result {
            Ok(loaded) => {
                let content = DocumentContent::new(name.clone(), loaded);
                info!(
                    "Session {}: loaded {:?} document {} ({:016x})",
                    id,
                    side,
                    name,
                    content.fingerprint()
                );
                let state = self.side_mut(side);
                state.content = Some(content);
                state.status = SideStatus::Loaded;
                Ok(())
            }
            Err(source) => {
                error!("Session {}: failed to load {}: {}", id, name, source);
                let state = self.side_mut(side);
                state.content = None;
                state.status = SideStatus::Failed(source.to_string());
                Err(SessionError::Load { name, source })
            }
        }
    }

    /// Route a response from the background load worker
    pub fn apply_load_response(&mut self, response: LoadResponse) -> Result<(), SessionError> {
        self.side_mut(response.side).name = Some(response.name);
        self.complete_load(response.side, response.result)
    }

    pub fn clear_base(&mut self) {
        self.clear(Side::Base);
    }

    pub fn clear_compare(&mut self) {
        self.clear(Side::Compare);
    }

    pub fn clear(&mut self, side: Side) {
        info!("Session {}: clearing {:?} document", self.id, side);
        *self.side_mut(side) = SideState::new();
        self.reset_results();
    }

    fn reset_results(&mut self) {
        if self.diff.take().is_some() {
            debug!("Session {}: discarding active comparison", self.id);
        }
        self.base.reset_marking();
        self.compare.reset_marking();
    }

    pub fn run_compare(&mut self) -> Result<&DiffResult, SessionError> {
        let base = match &self.base.content {
            Some(content) if self.base.is_loaded() => content,
            _ => return Err(SessionError::MissingDocument(Side::Base)),
        };
        let compare = match &self.compare.content {
            Some(content) if self.compare.is_loaded() => content,
            _ => return Err(SessionError::MissingDocument(Side::Compare)),
        };
        let Some(differ) = self.differ.as_ref() else {
            warn!("Session {}: comparison aborted, no differ", self.id);
            return Err(SessionError::DifferUnavailable(
                self.settings.diff.algorithm.clone(),
            ));
        };

        if base.fingerprint() == compare.fingerprint() {
            debug!("Session {}: documents have identical content", self.id);
        }

        let result = compare_texts(
            differ,
            base.text(),
            compare.text(),
            self.settings.diff.max_continuous_changes,
        );
        let stats = compute_stats(&result);
        info!("Session {}: {}", self.id, stats);

        self.base.reset_marking();
        self.compare.reset_marking();
        Ok(&*self.diff.insert(result))
    }

    pub fn diff(&self) -> Option<&DiffResult> {
        self.diff.as_ref()
    }

    pub fn stats(&self) -> Option<Stats> {
        self.diff.as_ref().map(compute_stats)
    }

    pub fn mark_base(&mut self) -> Result<&str, SessionError> {
        self.mark(Side::Base)
    }

    pub fn mark_compare(&mut self) -> Result<&str, SessionError> {
        self.mark(Side::Compare)
    }

    /// Render the side's marked markup, attach it and hand it to the publisher
    pub fn mark(&mut self, side: Side) -> Result<&str, SessionError> {
        if self.is_busy(side) {
            return Err(SessionError::Busy(side));
        }
        let Some(diff) = self.diff.as_ref() else {
            return Err(SessionError::NoComparison);
        };
        let state = match side {
            Side::Base => &mut self.base,
            Side::Compare => &mut self.compare,
        };
        let Some(content) = state.content.as_mut() else {
            return Err(SessionError::MissingDocument(side));
        };

        let markup = mark_side(diff.parts(), content.html(), side, &self.settings.render);
        content.set_marked(markup.clone());

        let request = ExportRequest {
            side,
            label: side_label(side).to_string(),
            original_text: content.text().to_string(),
            marked_markup: markup,
        };

        if let Err(e) = self.publisher.publish(&request) {
            error!("Session {}: marking {:?} failed: {}", self.id, side, e);
            content.clear_marked();
            state.mark_failed = true;
            state.status = SideStatus::Loaded;
            return Err(e.into());
        }

        info!("Session {}: marked {:?} document", self.id, side);
        state.mark_failed = false;
        state.status = SideStatus::Marked;
        Ok(content.marked().unwrap_or_default())
    }

    pub fn status(&self, side: Side) -> &SideStatus {
        &self.side(side).status
    }

    pub fn is_busy(&self, side: Side) -> bool {
        self.side(side).status == SideStatus::Loading
    }

    pub fn document(&self, side: Side) -> Option<&DocumentContent> {
        self.side(side).content.as_ref()
    }

    /// Unmarked markup for the side's document pane
    pub fn original_view(&self, side: Side) -> Option<String> {
        self.side(side)
            .content
            .as_ref()
            .map(DocumentContent::display_markup)
    }

    /// What the marked pane for `side` should show
    pub fn marked_view(&self, side: Side) -> &str {
        if self.diff.is_none() {
            return COMPARE_FIRST_PLACEHOLDER;
        }
        let state = self.side(side);
        if state.mark_failed {
            return MARK_FAILED_PLACEHOLDER;
        }
        match state.content.as_ref().and_then(DocumentContent::marked) {
            Some(markup) => markup,
            None => match side {
                Side::Base => MARK_BASE_PLACEHOLDER,
                Side::Compare => MARK_COMPARE_PLACEHOLDER,
            },
        }
    }

    pub fn controls(&self) -> ControlState {
        let compared = self.diff.is_some();
        let markable = |side: Side| compared && !self.is_busy(side);
        ControlState {
            compare: self.base.is_loaded() && self.compare.is_loaded() && self.differ.is_some(),
            mark_base: markable(Side::Base),
            mark_compare: markable(Side::Compare),
            export_base: markable(Side::Base) && self.base.content.is_some(),
            export_compare: markable(Side::Compare) && self.compare.content.is_some(),
        }
    }
}

pub fn side_label(side: Side) -> &'static str {
    match side {
        Side::Base => BASE_LABEL,
        Side::Compare => COMPARE_LABEL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporter::NullPublisher;
    use crate::loader::{PlainTextLoader, spawn_loader};
    use crate::messages::LoadRequest;
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;
    use std::time::Duration;

    /// Publisher that records requests and can be told to fail
    #[derive(Clone, Default)]
    struct RecordingPublisher {
        requests: Rc<RefCell<Vec<ExportRequest>>>,
        fail: Rc<RefCell<bool>>,
    }

    impl Publisher for RecordingPublisher {
        fn publish(&mut self, request: &ExportRequest) -> Result<(), ExportError> {
            if *self.fail.borrow() {
                return Err(ExportError::Io(io::Error::other("disk full")));
            }
            self.requests.borrow_mut().push(request.clone());
            Ok(())
        }
    }

    fn payload(name: &str, text: &str) -> DocumentPayload {
        DocumentPayload::new(name, text)
    }

    fn loaded_session(base: &str, compare: &str) -> (Session, RecordingPublisher) {
        let publisher = RecordingPublisher::default();
        let mut session = Session::new(Settings::default(), Box::new(publisher.clone()));
        let loader = PlainTextLoader::default();
        session.load_base(&loader, payload("base.txt", base)).unwrap();
        session
            .load_compare(&loader, payload("compare.txt", compare))
            .unwrap();
        (session, publisher)
    }

    #[test]
    fn test_full_workflow() {
        let (mut session, publisher) = loaded_session("The cat sat.", "The dog sat.");
        assert!(session.controls().compare);
        assert!(!session.controls().mark_base);

        session.run_compare().unwrap();
        let stats = session.stats().unwrap();
        assert_eq!(stats.additions, 3);
        assert_eq!(stats.deletions, 3);

        let controls = session.controls();
        assert!(controls.mark_base && controls.mark_compare);
        assert!(controls.export_base && controls.export_compare);

        let base = session.mark_base().unwrap().to_string();
        assert!(base.contains("<span class=\"modified-text\">cat</span>"));
        assert!(!base.contains("dog"));
        assert_eq!(session.status(Side::Base), &SideStatus::Marked);
        assert_eq!(session.marked_view(Side::Base), base);
        assert_eq!(
            session.document(Side::Base).unwrap().marked(),
            Some(base.as_str())
        );

        let compare = session.mark_compare().unwrap().to_string();
        assert!(compare.contains("<span class=\"added-text\">dog</span>"));
        assert!(!compare.contains("cat"));

        let requests = publisher.requests.borrow();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].side, Side::Base);
        assert_eq!(requests[0].label, BASE_LABEL);
        assert_eq!(requests[0].original_text, "The cat sat.");
        assert_eq!(requests[0].marked_markup, base);
        assert_eq!(requests[1].label, COMPARE_LABEL);
    }

    #[test]
    fn test_placeholders() {
        let (mut session, _) = loaded_session("a", "b");
        assert_eq!(session.marked_view(Side::Base), COMPARE_FIRST_PLACEHOLDER);
        assert_eq!(session.marked_view(Side::Compare), COMPARE_FIRST_PLACEHOLDER);

        session.run_compare().unwrap();
        assert_eq!(session.marked_view(Side::Base), MARK_BASE_PLACEHOLDER);
        assert_eq!(session.marked_view(Side::Compare), MARK_COMPARE_PLACEHOLDER);
    }

    #[test]
    fn test_compare_requires_both_documents() {
        let mut session = Session::new(Settings::default(), Box::new(NullPublisher));
        assert!(!session.controls().compare);
        assert!(matches!(
            session.run_compare(),
            Err(SessionError::MissingDocument(Side::Base))
        ));

        let loader = PlainTextLoader::default();
        session.load_base(&loader, payload("a.txt", "text")).unwrap();
        assert!(matches!(
            session.run_compare(),
            Err(SessionError::MissingDocument(Side::Compare))
        ));
        assert!(session.diff().is_none());
    }

    #[test]
    fn test_mark_requires_comparison() {
        let (mut session, publisher) = loaded_session("a", "b");
        assert!(matches!(session.mark_base(), Err(SessionError::NoComparison)));
        assert!(matches!(session.mark_compare(), Err(SessionError::NoComparison)));
        assert!(publisher.requests.borrow().is_empty());
        assert_eq!(session.status(Side::Base), &SideStatus::Loaded);
    }

    #[test]
    fn test_unknown_algorithm_blocks_compare() {
        let mut settings = Settings::default();
        settings.diff.algorithm = "histogram".to_string();
        let mut session = Session::new(settings, Box::new(NullPublisher));
        let loader = PlainTextLoader::default();
        session.load_base(&loader, payload("a.txt", "x")).unwrap();
        session.load_compare(&loader, payload("b.txt", "y")).unwrap();

        assert!(!session.differ_available());
        assert!(!session.controls().compare);
        assert!(matches!(
            session.run_compare(),
            Err(SessionError::DifferUnavailable(name)) if name == "histogram"
        ));
        assert!(session.diff().is_none());
    }

    #[test]
    fn test_load_failure_resets_comparison() {
        let (mut session, _) = loaded_session("The cat sat.", "The dog sat.");
        session.run_compare().unwrap();
        session.mark_compare().unwrap();

        let loader = PlainTextLoader::default();
        let err = session
            .load_base(&loader, payload("base.docx", "binary"))
            .unwrap_err();
        assert!(matches!(err, SessionError::Load { ref name, .. } if name == "base.docx"));

        assert!(matches!(session.status(Side::Base), SideStatus::Failed(_)));
        assert!(session.document(Side::Base).is_none());
        assert!(session.diff().is_none());
        assert!(!session.controls().compare);

        // The other side keeps its document but loses derived markup
        let compare = session.document(Side::Compare).unwrap();
        assert_eq!(compare.text(), "The dog sat.");
        assert!(compare.marked().is_none());
        assert_eq!(session.status(Side::Compare), &SideStatus::Loaded);
    }

    struct BrokenConverter;

    impl DocumentLoader for BrokenConverter {
        fn accepts(&self, _name: &str) -> bool {
            true
        }

        fn load(&self, _payload: &DocumentPayload) -> Result<LoadedDocument, LoadError> {
            Err(LoadError::Parse("corrupt archive".to_string()))
        }
    }

    #[test]
    fn test_converter_error_leaves_other_side() {
        let (mut session, _) = loaded_session("one", "two");
        let err = session
            .load_compare(&BrokenConverter, payload("compare.docx", ""))
            .unwrap_err();

        assert!(err.to_string().contains("corrupt archive"));
        assert_eq!(
            session.status(Side::Compare),
            &SideStatus::Failed("Document parsing failed: corrupt archive".to_string())
        );
        assert_eq!(session.status(Side::Base), &SideStatus::Loaded);
        assert_eq!(session.document(Side::Base).unwrap().text(), "one");
    }

    #[test]
    fn test_reload_supersedes_comparison() {
        let (mut session, _) = loaded_session("one", "two");
        session.run_compare().unwrap();

        let loader = PlainTextLoader::default();
        session
            .load_compare(&loader, payload("compare.txt", "one"))
            .unwrap();
        assert!(session.diff().is_none());

        let result = session.run_compare().unwrap();
        assert!(!result.has_changes());
        assert_eq!(session.stats().unwrap().similarity, 100.0);
    }

    #[test]
    fn test_clear_side() {
        let (mut session, _) = loaded_session("one", "two");
        session.run_compare().unwrap();

        session.clear_compare();
        assert_eq!(session.status(Side::Compare), &SideStatus::Empty);
        assert!(session.document(Side::Compare).is_none());
        assert!(session.diff().is_none());
        assert!(session.document(Side::Base).is_some());
        assert_eq!(session.controls(), ControlState::default());
    }

    #[test]
    fn test_publish_failure_shows_error_placeholder() {
        let (mut session, publisher) = loaded_session("The cat sat.", "The dog sat.");
        session.run_compare().unwrap();

        *publisher.fail.borrow_mut() = true;
        assert!(matches!(session.mark_base(), Err(SessionError::Export(_))));
        assert_eq!(session.marked_view(Side::Base), MARK_FAILED_PLACEHOLDER);
        assert!(session.document(Side::Base).unwrap().marked().is_none());
        assert_eq!(session.status(Side::Base), &SideStatus::Loaded);

        *publisher.fail.borrow_mut() = false;
        session.mark_base().unwrap();
        assert!(session.marked_view(Side::Base).contains("modified-text"));
    }

    #[test]
    fn test_new_comparison_resets_marking() {
        let (mut session, _) = loaded_session("The cat sat.", "The dog sat.");
        session.run_compare().unwrap();
        session.mark_base().unwrap();

        session.run_compare().unwrap();
        assert_eq!(session.status(Side::Base), &SideStatus::Loaded);
        assert_eq!(session.marked_view(Side::Base), MARK_BASE_PLACEHOLDER);
    }

    #[test]
    fn test_mark_is_idempotent() {
        let (mut session, _) = loaded_session("Version 1 draft", "Version 2 final draft");
        session.run_compare().unwrap();
        let first = session.mark_base().unwrap().to_string();
        let second = session.mark_base().unwrap().to_string();
        assert_eq!(first, second);
    }

    #[test]
    fn test_loading_side_disables_its_actions() {
        let (mut session, publisher) = loaded_session("The cat sat.", "The dog sat.");
        session.run_compare().unwrap();

        session.begin_load(Side::Base, "next.txt");
        assert!(session.is_busy(Side::Base));

        let controls = session.controls();
        assert!(!controls.mark_base && !controls.export_base);
        assert!(controls.mark_compare && controls.export_compare);
        assert!(!controls.compare);

        assert!(matches!(session.mark_base(), Err(SessionError::Busy(Side::Base))));
        assert!(publisher.requests.borrow().is_empty());
        assert_eq!(session.marked_view(Side::Base), MARK_BASE_PLACEHOLDER);

        session
            .complete_load(Side::Base, Ok(LoadedDocument::from_text("The cow sat.")))
            .unwrap();
        assert!(session.diff().is_none());
        session.run_compare().unwrap();
        assert!(session.mark_base().unwrap().contains("cow"));
        assert_eq!(publisher.requests.borrow().len(), 1);
    }

    #[test]
    fn test_original_view() {
        let (session, _) = loaded_session("a < b\n\nc", "c");
        assert_eq!(
            session.original_view(Side::Base).as_deref(),
            Some("<p>a &lt; b</p><p>c</p>")
        );

        let empty = Session::new(Settings::default(), Box::new(NullPublisher));
        assert!(empty.original_view(Side::Compare).is_none());
    }

    #[test]
    fn test_background_load() {
        let mut session = Session::new(Settings::default(), Box::new(NullPublisher));
        let (sender, receiver) = spawn_loader(PlainTextLoader::default());

        for (side, name, text) in [
            (Side::Base, "base.txt", "abc123 日本語"),
            (Side::Compare, "compare.txt", "abc124 日本"),
        ] {
            session.begin_load(side, name);
            assert!(session.is_busy(side));
            sender
                .send(LoadRequest::Load(side, payload(name, text)))
                .unwrap();
        }
        assert!(!session.controls().compare);

        for _ in 0..2 {
            let response = receiver.recv_timeout(Duration::from_secs(5)).unwrap();
            session.apply_load_response(response).unwrap();
        }

        assert!(!session.is_busy(Side::Base));
        assert!(!session.is_busy(Side::Compare));
        assert!(session.controls().compare);

        let result = session.run_compare().unwrap();
        assert_eq!(result.reconstruct_base(), "abc123 日本語");
        assert_eq!(result.reconstruct_compare(), "abc124 日本");
    }
}
