//! Song upload / track selection / delete flow, as typed requests and
//! responses.
//!
//! The network transport belongs to the host app. This module decides which
//! endpoint a request targets, encodes its form fields, decodes the reply
//! by endpoint, and owns the player state that a completed request resets.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::colors::ColorMap;
use crate::error::{LickError, Result};
use crate::model::Stave;

/// Tablature formats the server accepts.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["gp3", "gp4", "gp5"];

pub type TrackId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Analyse the selected tracks of a song
    Upload,
    /// List the guitar tracks of a song without analysing it
    TabInfo,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Upload => "/upload",
            Endpoint::TabInfo => "/tabinfo",
        }
    }
}

/// A tab file upload, optionally restricted to some tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub file_name: String,
    pub tracks: Vec<TrackId>,
}

impl UploadRequest {
    pub fn new(file_name: impl Into<String>, tracks: Vec<TrackId>) -> Result<Self> {
        let file_name = file_name.into();
        let supported = file_name
            .rsplit_once('.')
            .is_some_and(|(_, ext)| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
        if !supported {
            return Err(LickError::UnsupportedTab(file_name));
        }
        Ok(Self { file_name, tracks })
    }

    /// Selecting tracks asks for analysis; no selection asks for the
    /// track listing.
    pub fn endpoint(&self) -> Endpoint {
        if self.tracks.is_empty() {
            Endpoint::TabInfo
        } else {
            Endpoint::Upload
        }
    }

    /// JSON-encoded track list, as the checkbox values (strings).
    pub fn tracks_field(&self) -> String {
        let values: Vec<String> = self.tracks.iter().map(|t| t.to_string()).collect();
        serde_json::to_string(&values).unwrap_or_else(|_| "[]".to_string())
    }

    /// Multipart form fields other than the file body itself.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("tab", self.file_name.clone()),
            ("tracks", self.tracks_field()),
        ]
    }

    /// Decode the reply according to the endpoint this request targeted.
    pub fn decode_response(&self, body: &str) -> Result<UploadResponse> {
        match self.endpoint() {
            Endpoint::Upload => Ok(UploadResponse::Analysis(serde_json::from_str(body)?)),
            Endpoint::TabInfo => {
                let raw: BTreeMap<String, String> = serde_json::from_str(body)?;
                let tracks = raw
                    .into_iter()
                    .map(|(id, label)| {
                        let id = id
                            .parse::<TrackId>()
                            .map_err(|e| LickError::Json(format!("track id '{id}': {e}")))?;
                        Ok(TrackOption { id, label })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(UploadResponse::TrackListing(TrackListing::new(tracks)))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackOption {
    pub id: TrackId,
    pub label: String,
}

/// Guitar tracks of an uploaded song, ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackListing {
    pub tracks: Vec<TrackOption>,
}

impl TrackListing {
    pub fn new(mut tracks: Vec<TrackOption>) -> Self {
        tracks.sort_by_key(|t| t.id);
        Self { tracks }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadResponse {
    Analysis(AnalysisResult),
    TrackListing(TrackListing),
}

/// `DELETE /songs/<id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub song_id: String,
}

impl DeleteRequest {
    pub fn new(song_id: impl Into<String>) -> Self {
        Self {
            song_id: song_id.into(),
        }
    }

    pub fn method(&self) -> &'static str {
        "DELETE"
    }

    pub fn path(&self) -> String {
        format!("/songs/{}", self.song_id)
    }
}

/// Checkbox state for the track selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackSelection {
    listing: TrackListing,
    checked: BTreeSet<TrackId>,
}

impl TrackSelection {
    /// Add the listed tracks as unchecked options.
    pub fn populate(&mut self, listing: TrackListing) {
        let mut tracks = std::mem::take(&mut self.listing.tracks);
        for option in listing.tracks {
            if !tracks.iter().any(|t| t.id == option.id) {
                tracks.push(option);
            }
        }
        self.listing = TrackListing::new(tracks);
    }

    pub fn options(&self) -> &[TrackOption] {
        &self.listing.tracks
    }

    /// Check or uncheck a track. Unknown ids are ignored.
    pub fn set_checked(&mut self, id: TrackId, checked: bool) {
        if !self.listing.tracks.iter().any(|t| t.id == id) {
            log::debug!("ignoring selection of unknown track {id}");
            return;
        }
        if checked {
            self.checked.insert(id);
        } else {
            self.checked.remove(&id);
        }
    }

    /// Checked track ids in listing order.
    pub fn selected(&self) -> Vec<TrackId> {
        self.listing
            .tracks
            .iter()
            .map(|t| t.id)
            .filter(|id| self.checked.contains(id))
            .collect()
    }
}

/// Per-page player state. Completed uploads and deletions reset it, which
/// stands in for reloading the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSession {
    pub selection: TrackSelection,
    pub staves: Vec<Stave>,
    pub colors: ColorMap,
}

impl Default for PlayerSession {
    fn default() -> Self {
        Self {
            selection: TrackSelection::default(),
            staves: Vec::new(),
            colors: ColorMap::hidden(),
        }
    }
}

impl PlayerSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Build the upload request for `file_name` from the current selection.
    pub fn upload_request(&self, file_name: &str) -> Result<UploadRequest> {
        UploadRequest::new(file_name, self.selection.selected())
    }

    /// Handle a finished upload. Failures are logged and leave the state
    /// untouched; the user re-triggers the action.
    pub fn on_upload_complete(&mut self, outcome: Result<UploadResponse>) {
        match outcome {
            Ok(UploadResponse::Analysis(result)) => {
                log::info!("analysis finished (success: {})", result.success);
                self.reset();
            }
            Ok(UploadResponse::TrackListing(listing)) => {
                log::debug!("received {} selectable tracks", listing.tracks.len());
                self.selection.populate(listing);
            }
            Err(e) => log::error!("upload failed: {e}"),
        }
    }

    /// Handle a finished song deletion.
    pub fn on_delete_complete(&mut self, outcome: Result<()>) {
        match outcome {
            Ok(()) => self.reset(),
            Err(e) => log::error!("delete failed: {e}"),
        }
    }
}
