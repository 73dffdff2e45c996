//! Bus inspection reports received as multipart forms
//!
//! The HTTP layer collects the form parts into [`FormData`]; this module reads
//! the report out of it. Seat photos are keyed `seatPhoto_<i>` with a sibling
//! `seatPhoto_<i>_approved` flag, contiguous from 0 up to the first missing
//! index.

use serde::Serialize;
use std::collections::BTreeMap;
use tripcheck_common::SEAT_PHOTO_PREFIX;

/// Metadata of an uploaded file part
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
}

/// Value of one form part
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File(UploadedFile),
}

impl FormValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::File(_) => None,
        }
    }

    #[must_use]
    pub fn as_file(&self) -> Option<&UploadedFile> {
        match self {
            Self::Text(_) => None,
            Self::File(file) => Some(file),
        }
    }
}

/// Form parts by name; a repeated name keeps its first value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: BTreeMap<String, FormValue>,
}

impl FormData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FormValue) {
        self.fields.entry(name.into()).or_insert(value);
    }

    pub fn insert_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.insert(name, FormValue::Text(value.into()));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FormValue::as_text)
    }

    #[must_use]
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.get(name).and_then(FormValue::as_file)
    }

    /// True iff the part is the text `"true"`
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        self.text(name) == Some("true")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatPhoto {
    pub index: usize,
    /// `None` when the part was sent as text instead of a file
    pub file: Option<UploadedFile>,
    pub approved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionReport {
    pub driver_name: Option<String>,
    pub driver_number: Option<String>,
    pub bus_number: Option<String>,
    pub driver_photo_approved: bool,
    pub bus_front_photo_approved: bool,
    pub driver_photo: Option<UploadedFile>,
    pub bus_front_photo: Option<UploadedFile>,
    pub seat_photos: Vec<SeatPhoto>,
}

impl InspectionReport {
    #[must_use]
    pub fn from_form(form: &FormData) -> Self {
        let seat_photos = (0..)
            .map(|index| (index, format!("{SEAT_PHOTO_PREFIX}{index}")))
            .take_while(|(_, key)| form.has(key))
            .map(|(index, key)| SeatPhoto {
                index,
                file: form.file(&key).cloned(),
                approved: form.flag(&format!("{key}_approved")),
            })
            .collect();

        Self {
            driver_name: form.text("driverName").map(str::to_string),
            driver_number: form.text("driverNumber").map(str::to_string),
            bus_number: form.text("busNumber").map(str::to_string),
            driver_photo_approved: form.flag("driverPhotoApproved"),
            bus_front_photo_approved: form.flag("busFrontPhotoApproved"),
            driver_photo: form.file("driverPhoto").cloned(),
            bus_front_photo: form.file("busFrontPhoto").cloned(),
            seat_photos,
        }
    }

    #[must_use]
    pub fn total_seats(&self) -> usize {
        self.seat_photos.len()
    }

    #[must_use]
    pub fn approved_seats(&self) -> usize {
        self.seat_photos.iter().filter(|seat| seat.approved).count()
    }

    #[must_use]
    pub fn acknowledgement(&self) -> InspectionAck {
        InspectionAck {
            success: true,
            message: "Inspection report received successfully".to_string(),
            received_data: ReceivedData {
                driver_name: self.driver_name.clone(),
                bus_number: self.bus_number.clone(),
                total_seats: self.total_seats(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bus_number: Option<String>,
    pub total_seats: usize,
}

/// Body of the 201 answer to an inspection report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionAck {
    pub success: bool,
    pub message: String,
    pub received_data: ReceivedData,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(name: &str) -> FormValue {
        FormValue::File(UploadedFile {
            file_name: Some(name.to_string()),
            content_type: Some("image/jpeg".to_string()),
            size: 1024,
        })
    }

    fn form() -> FormData {
        let mut form = FormData::new();
        form.insert_text("driverName", "Ravi Kumar");
        form.insert_text("driverNumber", "9876543210");
        form.insert_text("busNumber", "KA-01-F-1234");
        form.insert_text("driverPhotoApproved", "true");
        form.insert_text("busFrontPhotoApproved", "false");
        form.insert("driverPhoto", photo("driver.jpg"));
        form.insert("busFrontPhoto", photo("front.jpg"));
        form
    }

    #[test]
    fn test_report_fields() {
        let report = InspectionReport::from_form(&form());
        assert_eq!(report.driver_name.as_deref(), Some("Ravi Kumar"));
        assert!(report.driver_photo_approved);
        assert!(!report.bus_front_photo_approved);
        assert_eq!(
            report.driver_photo.unwrap().file_name.as_deref(),
            Some("driver.jpg")
        );
        assert!(report.seat_photos.is_empty());
    }

    #[test]
    fn test_approval_requires_exact_true() {
        let mut form = FormData::new();
        form.insert_text("driverPhotoApproved", "TRUE");
        form.insert_text("busFrontPhotoApproved", "1");
        let report = InspectionReport::from_form(&form);
        assert!(!report.driver_photo_approved);
        assert!(!report.bus_front_photo_approved);
    }

    #[test]
    fn test_seat_photos_stop_at_first_gap() {
        let mut form = form();
        form.insert("seatPhoto_0", photo("s0.jpg"));
        form.insert_text("seatPhoto_0_approved", "true");
        form.insert("seatPhoto_1", photo("s1.jpg"));
        form.insert("seatPhoto_3", photo("s3.jpg"));
        form.insert_text("seatPhoto_3_approved", "true");

        let report = InspectionReport::from_form(&form);
        assert_eq!(report.total_seats(), 2);
        assert_eq!(report.approved_seats(), 1);
        assert!(!report.seat_photos[1].approved);
    }

    #[test]
    fn test_repeated_part_keeps_first_value() {
        let mut form = FormData::new();
        form.insert_text("busNumber", "first");
        form.insert_text("busNumber", "second");
        assert_eq!(form.text("busNumber"), Some("first"));
    }

    #[test]
    fn test_acknowledgement_shape() {
        let mut form = form();
        form.insert("seatPhoto_0", photo("s0.jpg"));
        let ack = InspectionReport::from_form(&form).acknowledgement();

        let value = serde_json::to_value(ack).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["message"], "Inspection report received successfully");
        assert_eq!(value["receivedData"]["driverName"], "Ravi Kumar");
        assert_eq!(value["receivedData"]["busNumber"], "KA-01-F-1234");
        assert_eq!(value["receivedData"]["totalSeats"], 1);
    }
}
