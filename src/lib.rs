pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod logging;
pub mod models;
pub mod outcome;
pub mod pipeline;
pub mod request;

pub use client::{RecognitionClient, RecognitionService};
pub use config::ClientConfig;
pub use decode::{DecodedImage, DecodedRaster, Preview, RasterKind};
pub use error::{ConfigError, DecodeError, SubmitError, TransportError, ValidationError};
pub use models::{
    AccessDirection, AccessLog, AreaRef, EmployeeRef, ModelRef, RecognitionResult, ScalarValue,
};
pub use outcome::{Outcome, RecognitionReport};
pub use pipeline::{Catalogs, RecognitionSession};
pub use request::{BiometricFile, RecognitionRequest, Selection};

#[cfg(feature = "gui")]
pub mod gui;
