use crate::document::{DocumentPayload, LoadedDocument};
use crate::loader::LoadError;
use crate::render::Side;

/// Request sent to the background load worker
pub enum LoadRequest {
    Load(Side, DocumentPayload),
}

/// Response messages from background load operations
pub struct LoadResponse {
    pub side: Side,
    pub name: String,
    pub result: Result<LoadedDocument, LoadError>,
}
