//! Core data model for the patientor client: diagnoses, patients and the
//! tagged union of medical entries, plus the keyed patient store.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// ICD-style reference data, fetched once and read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnosis {
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latin: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

/// Ordinal rating attached to health check entries. Serialized as the bare
/// integer 0..=3; anything else is rejected at the serde boundary.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(into = "u8", try_from = "u8")]
pub enum HealthCheckRating {
    #[default]
    Healthy = 0,
    LowRisk = 1,
    HighRisk = 2,
    CriticalRisk = 3,
}

impl HealthCheckRating {
    pub const ALL: [HealthCheckRating; 4] = [
        HealthCheckRating::Healthy,
        HealthCheckRating::LowRisk,
        HealthCheckRating::HighRisk,
        HealthCheckRating::CriticalRisk,
    ];

    pub fn label(self) -> &'static str {
        match self {
            HealthCheckRating::Healthy => "Healthy",
            HealthCheckRating::LowRisk => "LowRisk",
            HealthCheckRating::HighRisk => "HighRisk",
            HealthCheckRating::CriticalRisk => "CriticalRisk",
        }
    }
}

impl From<HealthCheckRating> for u8 {
    fn from(rating: HealthCheckRating) -> Self {
        rating as u8
    }
}

impl TryFrom<u8> for HealthCheckRating {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(HealthCheckRating::Healthy),
            1 => Ok(HealthCheckRating::LowRisk),
            2 => Ok(HealthCheckRating::HighRisk),
            3 => Ok(HealthCheckRating::CriticalRisk),
            other => Err(CoreError::InvalidRating(other)),
        }
    }
}

/// Hospital discharge information, both fields required by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Discharge {
    pub date: String,
    pub criteria: String,
}

/// Sick leave period on occupational entries. The form always carries the
/// object; either date may be an empty string.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SickLeave {
    pub start_date: String,
    pub end_date: String,
}

/// Discriminant shared by form selection and entry rendering. Adding a
/// variant here forces both dispatch sites to be extended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EntryKind {
    HealthCheck,
    Hospital,
    OccupationalHealthcare,
}

impl EntryKind {
    pub const ALL: [EntryKind; 3] = [
        EntryKind::HealthCheck,
        EntryKind::Hospital,
        EntryKind::OccupationalHealthcare,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EntryKind::HealthCheck => "Health Check",
            EntryKind::Hospital => "Hospital",
            EntryKind::OccupationalHealthcare => "Occupational Healthcare",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckEntry {
    pub id: String,
    pub description: String,
    pub date: NaiveDate,
    pub specialist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis_codes: Option<Vec<String>>,
    pub health_check_rating: HealthCheckRating,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HospitalEntry {
    pub id: String,
    pub description: String,
    pub date: NaiveDate,
    pub specialist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis_codes: Option<Vec<String>>,
    pub discharge: Discharge,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OccupationalHealthcareEntry {
    pub id: String,
    pub description: String,
    pub date: NaiveDate,
    pub specialist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis_codes: Option<Vec<String>>,
    pub employer_name: String,
    #[serde(default)]
    pub sick_leave: SickLeave,
}

/// A persisted medical entry. Closed sum over exactly three variants,
/// discriminated by the `type` tag on the wire. An unrecognized tag is a
/// deserialization error, not a value to recover from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Entry {
    HealthCheck(HealthCheckEntry),
    Hospital(HospitalEntry),
    OccupationalHealthcare(OccupationalHealthcareEntry),
}

impl Entry {
    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::HealthCheck(_) => EntryKind::HealthCheck,
            Entry::Hospital(_) => EntryKind::Hospital,
            Entry::OccupationalHealthcare(_) => EntryKind::OccupationalHealthcare,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Entry::HealthCheck(entry) => &entry.id,
            Entry::Hospital(entry) => &entry.id,
            Entry::OccupationalHealthcare(entry) => &entry.id,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Entry::HealthCheck(entry) => &entry.description,
            Entry::Hospital(entry) => &entry.description,
            Entry::OccupationalHealthcare(entry) => &entry.description,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            Entry::HealthCheck(entry) => entry.date,
            Entry::Hospital(entry) => entry.date,
            Entry::OccupationalHealthcare(entry) => entry.date,
        }
    }

    pub fn specialist(&self) -> &str {
        match self {
            Entry::HealthCheck(entry) => &entry.specialist,
            Entry::Hospital(entry) => &entry.specialist,
            Entry::OccupationalHealthcare(entry) => &entry.specialist,
        }
    }

    pub fn diagnosis_codes(&self) -> &[String] {
        let codes = match self {
            Entry::HealthCheck(entry) => &entry.diagnosis_codes,
            Entry::Hospital(entry) => &entry.diagnosis_codes,
            Entry::OccupationalHealthcare(entry) => &entry.diagnosis_codes,
        };
        codes.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckDraft {
    pub description: String,
    pub date: String,
    pub specialist: String,
    pub diagnosis_codes: Vec<String>,
    pub health_check_rating: HealthCheckRating,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HospitalDraft {
    pub description: String,
    pub date: String,
    pub specialist: String,
    pub diagnosis_codes: Vec<String>,
    pub discharge: Discharge,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OccupationalDraft {
    pub description: String,
    pub date: String,
    pub specialist: String,
    pub diagnosis_codes: Vec<String>,
    pub employer_name: String,
    pub sick_leave: SickLeave,
}

/// Pre-submission entry payload: an `Entry` variant minus `id`. Dates stay
/// strings here because they come straight from form inputs and the backend
/// is the sole validator. The server response is what carries the id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum EntryDraft {
    HealthCheck(HealthCheckDraft),
    Hospital(HospitalDraft),
    OccupationalHealthcare(OccupationalDraft),
}

impl EntryDraft {
    pub fn kind(&self) -> EntryKind {
        match self {
            EntryDraft::HealthCheck(_) => EntryKind::HealthCheck,
            EntryDraft::Hospital(_) => EntryKind::Hospital,
            EntryDraft::OccupationalHealthcare(_) => EntryKind::OccupationalHealthcare,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub occupation: String,
    pub gender: Gender,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

/// Body of the create-patient call; the backend assigns the id and an empty
/// entry list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    pub name: String,
    pub occupation: String,
    pub gender: Gender,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("no patient with id {0}")]
    UnknownPatient(String),
    #[error("health check rating out of range: {0}")]
    InvalidRating(u8),
}

/// Keyed patient store. Iteration preserves insertion order (the order the
/// backend returned the list in) and all entry appends go through
/// [`PatientDirectory::append_entry`], so only the matching patient can
/// change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientDirectory {
    order: Vec<String>,
    patients: HashMap<String, Patient>,
}

impl PatientDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole collection, e.g. after the startup fetch.
    pub fn replace_all(&mut self, patients: Vec<Patient>) {
        self.order.clear();
        self.patients.clear();
        for patient in patients {
            self.insert(patient);
        }
    }

    /// Adds a patient; an existing patient with the same id is replaced in
    /// place without changing its position.
    pub fn insert(&mut self, patient: Patient) {
        let id = patient.id.clone();
        if self.patients.insert(id.clone(), patient).is_none() {
            self.order.push(id);
        }
    }

    pub fn get(&self, id: &str) -> Option<&Patient> {
        self.patients.get(id)
    }

    /// The single mutation entry point for entries: appends to exactly the
    /// matching patient and leaves everyone else untouched.
    pub fn append_entry(&mut self, patient_id: &str, entry: Entry) -> Result<&Patient, CoreError> {
        let patient = self
            .patients
            .get_mut(patient_id)
            .ok_or_else(|| CoreError::UnknownPatient(patient_id.to_string()))?;
        patient.entries.push(entry);
        Ok(patient)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Patient> {
        self.order.iter().filter_map(|id| self.patients.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl From<Vec<Patient>> for PatientDirectory {
    fn from(patients: Vec<Patient>) -> Self {
        let mut directory = Self::new();
        directory.replace_all(patients);
        directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn health_check_entry(id: &str) -> Entry {
        Entry::HealthCheck(HealthCheckEntry {
            id: id.to_string(),
            description: "Annual checkup".to_string(),
            date: NaiveDate::from_ymd_opt(2019, 10, 20).unwrap(),
            specialist: "MD House".to_string(),
            diagnosis_codes: None,
            health_check_rating: HealthCheckRating::Healthy,
        })
    }

    fn patient(id: &str, name: &str) -> Patient {
        Patient {
            id: id.to_string(),
            name: name.to_string(),
            occupation: "Engineer".to_string(),
            gender: Gender::Other,
            ssn: None,
            date_of_birth: None,
            entries: Vec::new(),
        }
    }

    #[test]
    fn entry_deserializes_by_tag() {
        let value = json!({
            "type": "Hospital",
            "id": "d811e46d-70b3-4d90-b090-4535c7cf8fb1",
            "description": "Broken leg",
            "date": "2015-01-02",
            "specialist": "MD House",
            "diagnosisCodes": ["S62.5"],
            "discharge": { "date": "2015-01-16", "criteria": "Thumb healed" }
        });

        let entry: Entry = serde_json::from_value(value).unwrap();
        assert_eq!(entry.kind(), EntryKind::Hospital);
        assert_eq!(entry.diagnosis_codes(), ["S62.5"]);
        match entry {
            Entry::Hospital(hospital) => assert_eq!(hospital.discharge.date, "2015-01-16"),
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn unknown_tag_is_an_error() {
        let value = json!({
            "type": "Dental",
            "id": "x",
            "description": "",
            "date": "2015-01-02",
            "specialist": ""
        });

        assert!(serde_json::from_value::<Entry>(value).is_err());
    }

    #[test]
    fn rating_out_of_range_is_an_error() {
        let value = json!({
            "type": "HealthCheck",
            "id": "x",
            "description": "",
            "date": "2019-10-20",
            "specialist": "",
            "healthCheckRating": 4
        });

        assert!(serde_json::from_value::<Entry>(value).is_err());
        assert_eq!(
            HealthCheckRating::try_from(4),
            Err(CoreError::InvalidRating(4))
        );
    }

    #[test]
    fn rating_serializes_as_integer() {
        let entry = health_check_entry("e1");
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["healthCheckRating"], json!(0));
        assert_eq!(value["type"], json!("HealthCheck"));
    }

    #[test]
    fn absent_diagnosis_codes_are_omitted() {
        let value = serde_json::to_value(health_check_entry("e1")).unwrap();
        assert!(value.get("diagnosisCodes").is_none());
    }

    #[test]
    fn append_targets_only_the_matching_patient() {
        let mut directory =
            PatientDirectory::from(vec![patient("p1", "Ada"), patient("p2", "Grace")]);
        let untouched = directory.get("p2").cloned().unwrap();

        let updated = directory
            .append_entry("p1", health_check_entry("e1"))
            .unwrap();
        assert_eq!(updated.entries.len(), 1);
        assert_eq!(directory.get("p2").unwrap(), &untouched);
    }

    #[test]
    fn append_keeps_order_and_puts_new_entry_last() {
        let mut directory = PatientDirectory::from(vec![patient("p1", "Ada")]);
        directory
            .append_entry("p1", health_check_entry("e1"))
            .unwrap();
        directory
            .append_entry("p1", health_check_entry("e2"))
            .unwrap();

        let entries = &directory.get("p1").unwrap().entries;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries.last().unwrap().id(), "e2");
    }

    #[test]
    fn append_to_unknown_patient_fails() {
        let mut directory = PatientDirectory::from(vec![patient("p1", "Ada")]);
        assert_eq!(
            directory.append_entry("missing", health_check_entry("e1")),
            Err(CoreError::UnknownPatient("missing".to_string()))
        );
    }

    #[test]
    fn directory_iterates_in_insertion_order() {
        let directory = PatientDirectory::from(vec![patient("p2", "Grace"), patient("p1", "Ada")]);
        let ids: Vec<&str> = directory.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["p2", "p1"]);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut directory =
            PatientDirectory::from(vec![patient("p1", "Ada"), patient("p2", "Grace")]);
        directory.insert(patient("p1", "Ada Lovelace"));

        assert_eq!(directory.len(), 2);
        let names: Vec<&str> = directory.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Ada Lovelace", "Grace"]);
    }
}
