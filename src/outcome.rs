//! Classification of a recognition response into the outcome shown to the operator.

use std::fmt;

use crate::models::{AccessDirection, RecognitionResult};

/// Exactly one of these is derived from every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// No fingerprint matched
    NoMatch,
    /// A fingerprint matched but no employee record is attached to it
    NoEmployee,
    /// The employee has no standing rights to the area
    NotAccessable,
    /// Access granted
    Authorized,
    /// The employee has rights but this attempt was rejected
    Denied,
}

impl Outcome {
    /// Derive the outcome. Checks short-circuit in this order: match,
    /// employee, standing rights, attempt authorization.
    ///
    /// `accessable` and `authorized` are independent flags. A missing flag
    /// counts as false.
    pub fn classify(result: &RecognitionResult) -> Self {
        if !result.matched {
            return Self::NoMatch;
        }
        if result.employee.is_none() {
            return Self::NoEmployee;
        }
        if !result.accessable.unwrap_or(false) {
            return Self::NotAccessable;
        }
        if result.authorized.unwrap_or(false) {
            Self::Authorized
        } else {
            Self::Denied
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::NoMatch => "No matching fingerprint found",
            Self::NoEmployee => "No employee matches this fingerprint",
            Self::NotAccessable => "Fingerprint has no access rights to this area",
            Self::Authorized => "Fingerprint verified successfully",
            Self::Denied => "Fingerprint was not verified",
        }
    }

    pub fn is_granted(self) -> bool {
        matches!(self, Self::Authorized)
    }

    pub fn is_match(self) -> bool {
        !matches!(self, Self::NoMatch)
    }

    /// Whether employee details are safe to show alongside the outcome.
    pub fn shows_employee(self) -> bool {
        !matches!(self, Self::NoMatch | Self::NoEmployee)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Everything displayed for a completed recognition, whatever the outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionReport {
    pub outcome: Outcome,
    pub employee_name: Option<String>,
    pub employee_id: Option<String>,
    pub photo_url: Option<String>,
    pub confidence: f64,
    pub timestamp: Option<String>,
    pub area_name: Option<String>,
    pub direction: AccessDirection,
}

impl RecognitionReport {
    pub fn new(result: &RecognitionResult, direction: AccessDirection) -> Self {
        let outcome = Outcome::classify(result);
        let employee = result.employee.as_ref().filter(|_| outcome.shows_employee());
        let log = result.access_log.as_ref();
        Self {
            outcome,
            employee_name: employee.and_then(|e| e.full_name.clone()),
            employee_id: employee.map(|e| e.id.clone()),
            photo_url: employee.and_then(|e| e.photo_url.clone()),
            confidence: result.confidence,
            timestamp: log.and_then(|l| l.display_timestamp()),
            area_name: log.and_then(|l| l.area_name()).map(str::to_string),
            direction,
        }
    }

    pub fn confidence_percent(&self) -> String {
        format!("{:.2}%", self.confidence * 100.0)
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.outcome.message().to_string()];
        // A match without an employee record still gets the placeholder lines
        if self.outcome.is_match() {
            lines.push(format!(
                "Employee: {}",
                self.employee_name.as_deref().unwrap_or("Unknown")
            ));
            lines.push(format!(
                "Employee ID: {}",
                self.employee_id.as_deref().unwrap_or("N/A")
            ));
        }
        lines.push(format!("Confidence: {}", self.confidence_percent()));
        lines.push(format!(
            "Time: {}",
            self.timestamp.as_deref().unwrap_or("N/A")
        ));
        lines.push(format!(
            "Area: {}",
            self.area_name.as_deref().unwrap_or("Unknown")
        ));
        lines.push(format!("Access type: {}", self.direction));
        lines
    }
}

impl fmt::Display for RecognitionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}
