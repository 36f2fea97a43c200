//! Recognition session: selection state plus the decode and submission stages.
//!
//! Work that suspends (decoding a file, submitting a request) is handed out
//! as a job carrying the generation it was issued under. The session applies
//! a completion only if no newer job of the same kind has been issued since,
//! so the most recently started decode or submission is the one displayed.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::client::RecognitionService;
use crate::decode::{self, DecodedImage, Preview};
use crate::error::{DecodeError, SubmitError, TransportError, ValidationError};
use crate::models::{AccessDirection, AreaRef, ModelRef, RecognitionResult};
use crate::outcome::{Outcome, RecognitionReport};
use crate::request::{BiometricFile, RecognitionRequest, Selection};

pub const CATALOG_LOAD_FAILED: &str = "Failed to load data";
pub const RECOGNITION_FAILED: &str = "Fingerprint recognition failed";

/// Areas and models offered for selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalogs {
    pub areas: Vec<AreaRef>,
    pub segmentation_models: Vec<ModelRef>,
    pub recognition_models: Vec<ModelRef>,
}

impl Catalogs {
    /// Fetch all three catalogs concurrently; fails if any one fails.
    pub async fn load<S: RecognitionService>(service: &S) -> Result<Self, TransportError> {
        let (areas, segmentation_models, recognition_models) = tokio::try_join!(
            service.areas(),
            service.segmentation_models(),
            service.recognition_models()
        )?;
        Ok(Self {
            areas,
            segmentation_models,
            recognition_models,
        })
    }
}

/// Pending preview decode for one selected file.
#[derive(Debug, Clone)]
pub struct DecodeJob {
    generation: u64,
    file: BiometricFile,
}

/// Decode outcome tagged with the generation of its job.
#[derive(Debug, Clone)]
pub struct DecodeCompletion {
    generation: u64,
    result: Result<DecodedImage, Arc<DecodeError>>,
}

impl DecodeJob {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub async fn run(self) -> DecodeCompletion {
        let generation = self.generation;
        let file = self.file;
        let result = tokio::task::spawn_blocking(move || decode::decode(&file.name, &file.bytes))
            .await
            .unwrap_or_else(|e| Err(DecodeError::Export(format!("Decode task failed: {}", e))))
            .map_err(Arc::new);
        DecodeCompletion { generation, result }
    }
}

impl DecodeCompletion {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A validated request waiting to be sent.
#[derive(Debug, Clone)]
pub struct SubmissionJob {
    generation: u64,
    direction: AccessDirection,
    request: RecognitionRequest,
}

/// Submission outcome tagged with the generation of its job.
#[derive(Debug, Clone)]
pub struct SubmissionCompletion {
    generation: u64,
    direction: AccessDirection,
    result: Result<RecognitionResult, Arc<TransportError>>,
}

impl SubmissionJob {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request(&self) -> &RecognitionRequest {
        &self.request
    }

    pub async fn run<S: RecognitionService>(self, service: &S) -> SubmissionCompletion {
        let result = service.recognize(self.request).await.map_err(Arc::new);
        SubmissionCompletion {
            generation: self.generation,
            direction: self.direction,
            result,
        }
    }
}

impl SubmissionCompletion {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// All state of one operator's recognition screen.
#[derive(Debug, Clone)]
pub struct RecognitionSession {
    id: Uuid,
    catalogs: Catalogs,
    area: Option<AreaRef>,
    segmentation_model: Option<ModelRef>,
    recognition_model: Option<ModelRef>,
    direction: AccessDirection,
    file: Option<BiometricFile>,
    decoded: Option<DecodedImage>,
    preview_error: Option<String>,
    error: Option<String>,
    result: Option<RecognitionResult>,
    report: Option<RecognitionReport>,
    next_generation: u64,
    latest_decode: u64,
    latest_submission: u64,
    submitting: bool,
}

impl Default for RecognitionSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RecognitionSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            catalogs: Catalogs::default(),
            area: None,
            segmentation_model: None,
            recognition_model: None,
            direction: AccessDirection::default(),
            file: None,
            decoded: None,
            preview_error: None,
            error: None,
            result: None,
            report: None,
            next_generation: 0,
            latest_decode: 0,
            latest_submission: 0,
            submitting: false,
        }
    }

    fn bump(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    /// Load the catalogs and pre-select the first model of each kind.
    pub async fn load_catalogs<S: RecognitionService>(
        &mut self,
        service: &S,
    ) -> Result<(), TransportError> {
        let loaded = Catalogs::load(service).await;
        self.apply_catalogs(loaded)
    }

    /// Install loaded catalogs. A failed load leaves the catalogs empty.
    pub fn apply_catalogs<E: std::fmt::Display>(
        &mut self,
        loaded: Result<Catalogs, E>,
    ) -> Result<(), E> {
        match loaded {
            Ok(catalogs) => {
                info!(
                    session = %self.id,
                    areas = catalogs.areas.len(),
                    segmentation_models = catalogs.segmentation_models.len(),
                    recognition_models = catalogs.recognition_models.len(),
                    "catalogs loaded"
                );
                self.segmentation_model = catalogs.segmentation_models.first().cloned();
                self.recognition_model = catalogs.recognition_models.first().cloned();
                self.catalogs = catalogs;
                Ok(())
            }
            Err(e) => {
                warn!(session = %self.id, error = %e, "catalog load failed");
                self.catalogs = Catalogs::default();
                self.error = Some(CATALOG_LOAD_FAILED.to_string());
                Err(e)
            }
        }
    }

    /// Select an area by id. An unknown or empty id clears the selection.
    pub fn select_area(&mut self, id: &str) {
        self.area = self.catalogs.areas.iter().find(|a| a.id == id).cloned();
    }

    pub fn select_segmentation_model(&mut self, id: &str) {
        self.segmentation_model = find_model(&self.catalogs.segmentation_models, id);
    }

    pub fn select_recognition_model(&mut self, id: &str) {
        self.recognition_model = find_model(&self.catalogs.recognition_models, id);
    }

    pub fn set_direction(&mut self, direction: AccessDirection) {
        self.direction = direction;
    }

    /// Replace the held file. The previous preview is dropped immediately; a
    /// new one arrives once the returned job completes. `None` (a cancelled
    /// picker) clears both the file and the preview.
    pub fn select_file(&mut self, file: Option<BiometricFile>) -> Option<DecodeJob> {
        let generation = self.bump();
        self.latest_decode = generation;
        self.decoded = None;
        self.preview_error = None;

        match file {
            None => {
                debug!(session = %self.id, generation, "file selection cleared");
                self.file = None;
                None
            }
            Some(file) => {
                debug!(
                    session = %self.id,
                    generation,
                    file_name = %file.name,
                    size = file.bytes.len(),
                    "file selected"
                );
                self.file = Some(file.clone());
                Some(DecodeJob { generation, file })
            }
        }
    }

    /// Apply a finished decode. Returns false when the completion is stale.
    pub fn complete_decode(&mut self, completion: DecodeCompletion) -> bool {
        if completion.generation != self.latest_decode {
            debug!(
                session = %self.id,
                generation = completion.generation,
                latest = self.latest_decode,
                "discarding stale decode"
            );
            return false;
        }
        match completion.result {
            Ok(decoded) => {
                self.decoded = Some(decoded);
                self.preview_error = None;
            }
            Err(e) => {
                warn!(session = %self.id, error = %e, "preview decode failed");
                self.decoded = None;
                self.preview_error = Some(e.to_string());
            }
        }
        true
    }

    /// Validate the selection and issue a submission job.
    pub fn prepare_submission(&mut self) -> Result<SubmissionJob, ValidationError> {
        let selection = Selection {
            file: self.file.as_ref(),
            area: self.area.as_ref(),
            segmentation_model: self.segmentation_model.as_ref(),
            recognition_model: self.recognition_model.as_ref(),
            direction: self.direction,
        };
        let request = match RecognitionRequest::assemble(&selection) {
            Ok(request) => request,
            Err(e) => {
                info!(session = %self.id, error = %e, "submission blocked");
                self.error = Some(e.to_string());
                return Err(e);
            }
        };

        let generation = self.bump();
        self.latest_submission = generation;
        self.submitting = true;
        Ok(SubmissionJob {
            generation,
            direction: self.direction,
            request,
        })
    }

    /// Apply a finished submission. Returns false when the completion is stale.
    pub fn complete_submission(&mut self, completion: SubmissionCompletion) -> bool {
        self.finish_submission(completion).is_some()
    }

    /// `None` when the completion is stale, otherwise the transport error
    /// (if any) after it has been recorded as session state.
    fn finish_submission(
        &mut self,
        completion: SubmissionCompletion,
    ) -> Option<Result<(), Arc<TransportError>>> {
        if completion.generation != self.latest_submission {
            debug!(
                session = %self.id,
                generation = completion.generation,
                latest = self.latest_submission,
                "discarding stale submission"
            );
            return None;
        }
        self.submitting = false;
        match completion.result {
            Ok(result) => {
                let report = RecognitionReport::new(&result, completion.direction);
                info!(
                    session = %self.id,
                    outcome = ?report.outcome,
                    confidence = result.confidence,
                    "recognition completed"
                );
                self.result = Some(result);
                self.report = Some(report);
                self.error = None;
                Some(Ok(()))
            }
            Err(e) => {
                warn!(session = %self.id, error = %e, "recognition failed");
                self.result = None;
                self.report = None;
                self.error = Some(RECOGNITION_FAILED.to_string());
                Some(Err(e))
            }
        }
    }

    /// Validate, send and apply a submission in one go.
    pub async fn submit<S: RecognitionService>(
        &mut self,
        service: &S,
    ) -> Result<&RecognitionReport, SubmitError> {
        let job = self.prepare_submission()?;
        let completion = job.run(service).await;
        match self.finish_submission(completion) {
            None => Err(SubmitError::Superseded),
            Some(Err(e)) => Err(SubmitError::Transport(e)),
            Some(Ok(())) => self.report.as_ref().ok_or(SubmitError::Superseded),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    pub fn selected_area(&self) -> Option<&AreaRef> {
        self.area.as_ref()
    }

    pub fn selected_segmentation_model(&self) -> Option<&ModelRef> {
        self.segmentation_model.as_ref()
    }

    pub fn selected_recognition_model(&self) -> Option<&ModelRef> {
        self.recognition_model.as_ref()
    }

    pub fn direction(&self) -> AccessDirection {
        self.direction
    }

    pub fn file(&self) -> Option<&BiometricFile> {
        self.file.as_ref()
    }

    pub fn decoded(&self) -> Option<&DecodedImage> {
        self.decoded.as_ref()
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.decoded.as_ref().map(|d| &d.preview)
    }

    /// True while a file is held but its preview has not arrived or failed yet.
    pub fn is_preview_pending(&self) -> bool {
        self.file.is_some() && self.decoded.is_none() && self.preview_error.is_none()
    }

    pub fn preview_error(&self) -> Option<&str> {
        self.preview_error.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn result(&self) -> Option<&RecognitionResult> {
        self.result.as_ref()
    }

    pub fn report(&self) -> Option<&RecognitionReport> {
        self.report.as_ref()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.report.as_ref().map(|r| r.outcome)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }
}

fn find_model(models: &[ModelRef], id: &str) -> Option<ModelRef> {
    models.iter().find(|m| m.id == id).cloned()
}
