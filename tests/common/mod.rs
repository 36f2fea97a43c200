#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from fingerprint_access for tests
pub use fingerprint_access::{
    AccessDirection, AreaRef, BiometricFile, Catalogs, ModelRef, Outcome, RecognitionRequest,
    RecognitionResult, RecognitionService, RecognitionSession, ScalarValue, TransportError,
    ValidationError,
};
