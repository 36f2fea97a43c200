use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::Mutex;

use fingerprint_access::{
    AreaRef, ModelRef, RecognitionRequest, RecognitionResult, RecognitionService, ScalarValue,
    TransportError,
};
use image::{ImageBuffer, ImageFormat, Luma, Rgb};
use tiff::encoder::{TiffEncoder, colortype};

/// Encodes a grayscale gradient as a single-page TIFF.
pub fn create_test_tiff(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, y| Luma([((x * 7 + y * 3) % 256) as u8]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Tiff)
        .expect("Failed to encode test TIFF");
    out.into_inner()
}

/// Encodes two grayscale pages of different sizes and solid values into one
/// TIFF container.
pub fn create_two_page_tiff(first: (u32, u32, u8), second: (u32, u32, u8)) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut out).expect("Failed to create TIFF encoder");
        for (width, height, value) in [first, second] {
            let data = vec![value; (width * height) as usize];
            encoder
                .write_image::<colortype::Gray8>(width, height, &data)
                .expect("Failed to encode TIFF page");
        }
    }
    out.into_inner()
}

/// Encodes a solid red BMP.
pub fn create_test_bmp(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |_, _| Rgb([255u8, 0u8, 0u8]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Bmp)
        .expect("Failed to encode test BMP");
    out.into_inner()
}

pub fn sample_areas() -> Vec<AreaRef> {
    vec![
        AreaRef {
            id: "3f1c2a9e-area-server".to_string(),
            name: "Server Room".to_string(),
            security_level: 5,
            description: Some("Primary data center and server infrastructure".to_string()),
        },
        AreaRef {
            id: "8b7d41c0-area-lobby".to_string(),
            name: "Main Lobby".to_string(),
            security_level: 1,
            description: Some("Reception area and visitor check-in".to_string()),
        },
    ]
}

pub fn sample_segmentation_models() -> Vec<ModelRef> {
    vec![
        ModelRef::new("m1", "seg_v2", 0.87)
            .with_field("extra", ScalarValue::String("x".to_string()))
            .with_field("pathName", ScalarValue::String("models/seg_v2.pt".to_string())),
        ModelRef::new("m2", "seg_v3", 0.91),
    ]
}

pub fn sample_recognition_models() -> Vec<ModelRef> {
    vec![
        ModelRef::new("r1", "rec_v1", 0.93)
            .with_field("valAccuracy", ScalarValue::Float(0.9))
            .with_field("version", ScalarValue::String("1.0.0".to_string())),
    ]
}

/// A successful match with standing rights and an authorized attempt.
pub fn authorized_result_json() -> serde_json::Value {
    serde_json::json!({
        "matched": true,
        "confidence": 0.97,
        "employeeId": "e42",
        "employee": {
            "id": "e42",
            "fullName": "Nguyen Van A",
            "photoUrl": "https://cdn.example.com/e42.png"
        },
        "accessable": true,
        "authorized": true,
        "accessLog": {
            "timestamp": "2024-05-01T10:15:30.123",
            "accessType": "ENTRY",
            "authorized": true,
            "area": { "id": "3f1c2a9e-area-server", "name": "Server Room" }
        }
    })
}

pub fn authorized_result() -> RecognitionResult {
    serde_json::from_value(authorized_result_json()).expect("fixture JSON should decode")
}

pub fn no_match_result(confidence: f64) -> RecognitionResult {
    serde_json::from_value(serde_json::json!({
        "matched": false,
        "confidence": confidence,
        "authorized": false
    }))
    .expect("fixture JSON should decode")
}

/// In-process service that records every recognition request it receives.
pub struct RecordingService {
    areas: Vec<AreaRef>,
    segmentation_models: Vec<ModelRef>,
    recognition_models: Vec<ModelRef>,
    fail_catalogs: bool,
    responses: Mutex<VecDeque<Result<RecognitionResult, TransportError>>>,
    requests: Mutex<Vec<RecognitionRequest>>,
}

impl RecordingService {
    pub fn new() -> Self {
        Self {
            areas: sample_areas(),
            segmentation_models: sample_segmentation_models(),
            recognition_models: sample_recognition_models(),
            fail_catalogs: false,
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_catalogs() -> Self {
        Self {
            fail_catalogs: true,
            ..Self::new()
        }
    }

    pub fn respond_with(self, response: Result<RecognitionResult, TransportError>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<RecognitionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn catalog<T: Clone>(&self, items: &[T]) -> Result<Vec<T>, TransportError> {
        if self.fail_catalogs {
            Err(TransportError::Status {
                status: 503,
                message: "catalog unavailable".to_string(),
            })
        } else {
            Ok(items.to_vec())
        }
    }
}

impl RecognitionService for RecordingService {
    async fn areas(&self) -> Result<Vec<AreaRef>, TransportError> {
        self.catalog(&self.areas)
    }

    async fn segmentation_models(&self) -> Result<Vec<ModelRef>, TransportError> {
        self.catalog(&self.segmentation_models)
    }

    async fn recognition_models(&self) -> Result<Vec<ModelRef>, TransportError> {
        self.catalog(&self.recognition_models)
    }

    async fn recognize(
        &self,
        request: RecognitionRequest,
    ) -> Result<RecognitionResult, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(authorized_result()))
    }
}
