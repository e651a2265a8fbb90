//! Entry form builders, the composing state machine and the read-only entry
//! renderer. Everything here is pure state-in/state-out so it can be driven
//! by the wasm UI and exercised natively.

use chrono::NaiveDate;
use patientor_core::{
    Diagnosis, Entry, EntryDraft, EntryKind, HealthCheckDraft, HealthCheckRating, HospitalDraft,
    OccupationalDraft,
};

/// Splits a raw diagnosis-codes input into codes.
///
/// Only the **first** space is removed, then the text is split on commas.
/// Typing `"A10, B20, C30"` therefore yields `["A10", "B20", " C30"]` with
/// the leading space retained on later codes. The backend accepts these
/// entries verbatim, so the parse stays untouched; see DESIGN.md. An empty
/// input yields an empty list, matching the form's initial state.
pub fn parse_diagnosis_codes(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.replacen(' ', "", 1)
        .split(',')
        .map(str::to_string)
        .collect()
}

/// Advisory check mirroring HTML date input semantics: a date field is
/// either empty or a `%Y-%m-%d` calendar date. The backend remains the
/// validator of record.
pub fn is_calendar_date(value: &str) -> bool {
    value.is_empty() || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Text field holding the diagnosis-codes list. Each keystroke re-parses the
/// whole input; the echoed text is the parsed list joined with commas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosisCodesField {
    codes: Vec<String>,
}

impl DiagnosisCodesField {
    pub fn set(&mut self, raw: &str) {
        self.codes = parse_diagnosis_codes(raw);
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn text(&self) -> String {
        self.codes.join(",")
    }
}

/// Fields shared by every entry variant. Defaults are empty strings, the
/// starting point of a freshly opened form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonFields {
    pub description: String,
    pub date: String,
    pub specialist: String,
    pub diagnosis_codes: DiagnosisCodesField,
}

impl CommonFields {
    /// Routes a named input change; returns false when the name belongs to a
    /// variant-specific field.
    fn set_field(&mut self, name: &str, value: &str) -> bool {
        match name {
            "description" => self.description = value.to_string(),
            "date" => self.date = value.to_string(),
            "specialist" => self.specialist = value.to_string(),
            "diagnosisCodes" => self.diagnosis_codes.set(value),
            _ => return false,
        }
        true
    }
}

/// Capability set of a variant form: collect named input, hand over the
/// draft. One implementation per entry variant; the draft carries that
/// variant's shape and nothing from the other two.
pub trait DraftForm: Default {
    fn kind(&self) -> EntryKind;

    /// Applies one input change, addressed by the input's `name` attribute.
    /// Nested fields use dotted names (`discharge.date`, `sickLeave.endDate`)
    /// and merge into the sub-object without disturbing its siblings.
    /// Unknown names are ignored.
    fn set_field(&mut self, name: &str, value: &str);

    /// The current draft, as-is. No cross-field validation happens here; the
    /// backend owns it.
    fn to_draft(&self) -> EntryDraft;

    fn common(&self) -> &CommonFields;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthCheckForm {
    pub common: CommonFields,
    pub rating: HealthCheckRating,
}

impl HealthCheckForm {
    /// Select inputs deliver the rating as a number; out-of-range values
    /// leave the current selection alone.
    pub fn set_rating(&mut self, value: u8) {
        if let Ok(rating) = HealthCheckRating::try_from(value) {
            self.rating = rating;
        }
    }
}

impl DraftForm for HealthCheckForm {
    fn kind(&self) -> EntryKind {
        EntryKind::HealthCheck
    }

    fn set_field(&mut self, name: &str, value: &str) {
        if self.common.set_field(name, value) {
            return;
        }
        if name == "healthCheckRating" {
            if let Ok(parsed) = value.parse::<u8>() {
                self.set_rating(parsed);
            }
        }
    }

    fn to_draft(&self) -> EntryDraft {
        EntryDraft::HealthCheck(HealthCheckDraft {
            description: self.common.description.clone(),
            date: self.common.date.clone(),
            specialist: self.common.specialist.clone(),
            diagnosis_codes: self.common.diagnosis_codes.codes().to_vec(),
            health_check_rating: self.rating,
        })
    }

    fn common(&self) -> &CommonFields {
        &self.common
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HospitalForm {
    pub common: CommonFields,
    pub discharge_date: String,
    pub discharge_criteria: String,
}

impl DraftForm for HospitalForm {
    fn kind(&self) -> EntryKind {
        EntryKind::Hospital
    }

    fn set_field(&mut self, name: &str, value: &str) {
        if self.common.set_field(name, value) {
            return;
        }
        match name {
            "discharge.date" => self.discharge_date = value.to_string(),
            "discharge.criteria" => self.discharge_criteria = value.to_string(),
            _ => {}
        }
    }

    fn to_draft(&self) -> EntryDraft {
        EntryDraft::Hospital(HospitalDraft {
            description: self.common.description.clone(),
            date: self.common.date.clone(),
            specialist: self.common.specialist.clone(),
            diagnosis_codes: self.common.diagnosis_codes.codes().to_vec(),
            discharge: patientor_core::Discharge {
                date: self.discharge_date.clone(),
                criteria: self.discharge_criteria.clone(),
            },
        })
    }

    fn common(&self) -> &CommonFields {
        &self.common
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupationalForm {
    pub common: CommonFields,
    pub employer_name: String,
    pub sick_leave_start: String,
    pub sick_leave_end: String,
}

impl DraftForm for OccupationalForm {
    fn kind(&self) -> EntryKind {
        EntryKind::OccupationalHealthcare
    }

    fn set_field(&mut self, name: &str, value: &str) {
        if self.common.set_field(name, value) {
            return;
        }
        match name {
            "employerName" => self.employer_name = value.to_string(),
            "sickLeave.startDate" => self.sick_leave_start = value.to_string(),
            "sickLeave.endDate" => self.sick_leave_end = value.to_string(),
            _ => {}
        }
    }

    fn to_draft(&self) -> EntryDraft {
        EntryDraft::OccupationalHealthcare(OccupationalDraft {
            description: self.common.description.clone(),
            date: self.common.date.clone(),
            specialist: self.common.specialist.clone(),
            diagnosis_codes: self.common.diagnosis_codes.codes().to_vec(),
            employer_name: self.employer_name.clone(),
            sick_leave: patientor_core::SickLeave {
                start_date: self.sick_leave_start.clone(),
                end_date: self.sick_leave_end.clone(),
            },
        })
    }

    fn common(&self) -> &CommonFields {
        &self.common
    }
}

/// UI state of the patient detail view: either no form is shown, or exactly
/// one variant form is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ComposerState {
    #[default]
    Idle,
    Composing(EntryKind),
}

/// Drives `Idle ⇄ Composing(kind)` transitions. Both cancel and a successful
/// submit land back in `Idle`; picking another kind while a form is open
/// simply switches forms (the previous draft is discarded).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryComposer {
    state: ComposerState,
}

impl EntryComposer {
    pub fn state(&self) -> ComposerState {
        self.state
    }

    pub fn composing(&self) -> Option<EntryKind> {
        match self.state {
            ComposerState::Idle => None,
            ComposerState::Composing(kind) => Some(kind),
        }
    }

    pub fn open(&mut self, kind: EntryKind) {
        self.state = ComposerState::Composing(kind);
    }

    pub fn cancel(&mut self) {
        self.state = ComposerState::Idle;
    }

    pub fn submitted(&mut self) {
        self.state = ComposerState::Idle;
    }
}

/// One diagnosis row of a rendered entry. `name` stays `None` when the code
/// is not present in the loaded diagnosis list; the row still renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosisLine {
    pub code: String,
    pub name: Option<String>,
}

/// Display structure of a persisted entry, independent of any widget
/// toolkit. The wasm UI maps this to HTML, the CLI to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEntry {
    pub kind: EntryKind,
    pub date: String,
    pub description: String,
    pub specialist_line: String,
    pub employer: Option<String>,
    pub diagnoses: Vec<DiagnosisLine>,
}

/// Pure dispatch over the entry variants. Health check cards never list
/// diagnosis codes, even when the entry carries some; the other two variants
/// do.
pub fn render_entry(entry: &Entry, diagnoses: &[Diagnosis]) -> RenderedEntry {
    let base = |employer: Option<String>, codes: &[String]| RenderedEntry {
        kind: entry.kind(),
        date: entry.date().format("%Y-%m-%d").to_string(),
        description: entry.description().to_string(),
        specialist_line: format!("Diagnose by {}", entry.specialist()),
        employer,
        diagnoses: resolve_codes(codes, diagnoses),
    };

    match entry {
        Entry::HealthCheck(_) => base(None, &[]),
        Entry::Hospital(_) => base(None, entry.diagnosis_codes()),
        Entry::OccupationalHealthcare(occupational) => base(
            Some(occupational.employer_name.clone()),
            entry.diagnosis_codes(),
        ),
    }
}

fn resolve_codes(codes: &[String], diagnoses: &[Diagnosis]) -> Vec<DiagnosisLine> {
    codes
        .iter()
        .map(|code| DiagnosisLine {
            code: code.clone(),
            name: diagnoses
                .iter()
                .find(|diagnosis| diagnosis.code == *code)
                .map(|diagnosis| diagnosis.name.clone()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use patientor_core::{Discharge, HospitalEntry, OccupationalHealthcareEntry, SickLeave};

    fn diagnoses() -> Vec<Diagnosis> {
        vec![
            Diagnosis {
                code: "M24.2".to_string(),
                name: "Disorder of ligament".to_string(),
                latin: Some("Morbositas ligamenti".to_string()),
            },
            Diagnosis {
                code: "S62.5".to_string(),
                name: "Fracture of thumb".to_string(),
                latin: None,
            },
        ]
    }

    #[test]
    fn first_space_only_is_stripped() {
        assert_eq!(
            parse_diagnosis_codes("A10, B20, C30"),
            vec!["A10", "B20", " C30"]
        );
    }

    #[test]
    fn single_code_with_no_space() {
        assert_eq!(parse_diagnosis_codes("A10"), vec!["A10"]);
    }

    #[test]
    fn empty_input_yields_no_codes() {
        assert!(parse_diagnosis_codes("").is_empty());
    }

    #[test]
    fn cleared_codes_field_submits_no_codes() {
        let mut field = DiagnosisCodesField::default();
        field.set("A10, B20");
        field.set("");
        assert!(field.codes().is_empty());
        assert_eq!(field.text(), "");
    }

    #[test]
    fn codes_field_echo_joins_with_commas() {
        let mut field = DiagnosisCodesField::default();
        field.set("A10, B20, C30");
        assert_eq!(field.text(), "A10,B20, C30");
    }

    #[test]
    fn calendar_date_check_allows_empty() {
        assert!(is_calendar_date(""));
        assert!(is_calendar_date("2019-10-20"));
        assert!(!is_calendar_date("20.10.2019"));
        assert!(!is_calendar_date("2019-13-01"));
    }

    #[test]
    fn health_check_draft_has_only_its_own_fields() {
        let mut form = HealthCheckForm::default();
        form.set_field("description", "Yearly control");
        form.set_field("date", "2019-10-20");
        form.set_field("specialist", "MD House");
        form.set_field("diagnosisCodes", "M24.2, S62.5");
        form.set_field("healthCheckRating", "2");

        let draft = form.to_draft();
        assert_eq!(draft.kind(), EntryKind::HealthCheck);

        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["type"], "HealthCheck");
        assert_eq!(value["healthCheckRating"], 2);
        assert_eq!(value["diagnosisCodes"], serde_json::json!(["M24.2", "S62.5"]));
        assert!(value.get("discharge").is_none());
        assert!(value.get("employerName").is_none());
        assert!(value.get("sickLeave").is_none());
        assert!(value.get("id").is_none());
    }

    #[test]
    fn hospital_draft_has_only_its_own_fields() {
        let mut form = HospitalForm::default();
        form.set_field("description", "Surgery");
        form.set_field("date", "2015-01-02");
        form.set_field("specialist", "MD House");
        form.set_field("discharge.date", "2015-01-16");
        form.set_field("discharge.criteria", "Thumb healed");

        let value = serde_json::to_value(form.to_draft()).unwrap();
        assert_eq!(value["type"], "Hospital");
        assert_eq!(value["discharge"]["date"], "2015-01-16");
        assert_eq!(value["discharge"]["criteria"], "Thumb healed");
        assert!(value.get("healthCheckRating").is_none());
        assert!(value.get("employerName").is_none());
        assert!(value.get("id").is_none());
    }

    #[test]
    fn occupational_draft_has_only_its_own_fields() {
        let mut form = OccupationalForm::default();
        form.set_field("employerName", "HyPD");
        form.set_field("sickLeave.startDate", "2019-08-05");
        form.set_field("sickLeave.endDate", "2019-08-28");

        let value = serde_json::to_value(form.to_draft()).unwrap();
        assert_eq!(value["type"], "OccupationalHealthcare");
        assert_eq!(value["employerName"], "HyPD");
        assert_eq!(value["sickLeave"]["startDate"], "2019-08-05");
        assert_eq!(value["sickLeave"]["endDate"], "2019-08-28");
        assert!(value.get("healthCheckRating").is_none());
        assert!(value.get("discharge").is_none());
        assert!(value.get("id").is_none());
    }

    #[test]
    fn dotted_updates_leave_sibling_nested_fields_alone() {
        let mut form = OccupationalForm::default();
        form.set_field("sickLeave.startDate", "2019-08-05");
        form.set_field("sickLeave.endDate", "2019-08-28");
        form.set_field("sickLeave.startDate", "2019-08-06");

        assert_eq!(form.sick_leave_start, "2019-08-06");
        assert_eq!(form.sick_leave_end, "2019-08-28");
    }

    #[test]
    fn unknown_field_names_are_ignored() {
        let mut form = HealthCheckForm::default();
        form.set_field("bogus", "value");
        assert_eq!(form, HealthCheckForm::default());
    }

    #[test]
    fn out_of_range_rating_keeps_current_selection() {
        let mut form = HealthCheckForm::default();
        form.set_rating(3);
        form.set_rating(9);
        assert_eq!(form.rating, HealthCheckRating::CriticalRisk);
    }

    #[test]
    fn forms_start_from_empty_defaults() {
        let form = HospitalForm::default();
        assert_eq!(form.common.description, "");
        assert_eq!(form.common.date, "");
        assert_eq!(form.discharge_date, "");
        assert!(form.common.diagnosis_codes.codes().is_empty());
    }

    #[test]
    fn composer_transitions() {
        let mut composer = EntryComposer::default();
        assert_eq!(composer.state(), ComposerState::Idle);

        composer.open(EntryKind::Hospital);
        assert_eq!(composer.composing(), Some(EntryKind::Hospital));

        composer.open(EntryKind::HealthCheck);
        assert_eq!(composer.composing(), Some(EntryKind::HealthCheck));

        composer.cancel();
        assert_eq!(composer.state(), ComposerState::Idle);

        composer.open(EntryKind::OccupationalHealthcare);
        composer.submitted();
        assert_eq!(composer.state(), ComposerState::Idle);
    }

    #[test]
    fn unresolved_codes_render_without_a_name() {
        let entry = Entry::Hospital(HospitalEntry {
            id: "e1".to_string(),
            description: "Broken leg".to_string(),
            date: NaiveDate::from_ymd_opt(2015, 1, 2).unwrap(),
            specialist: "MD House".to_string(),
            diagnosis_codes: Some(vec!["S62.5".to_string(), "Z99.9".to_string()]),
            discharge: Discharge {
                date: "2015-01-16".to_string(),
                criteria: "Healed".to_string(),
            },
        });

        let rendered = render_entry(&entry, &diagnoses());
        assert_eq!(rendered.diagnoses.len(), 2);
        assert_eq!(
            rendered.diagnoses[0].name.as_deref(),
            Some("Fracture of thumb")
        );
        assert_eq!(rendered.diagnoses[1].name, None);
        assert_eq!(rendered.specialist_line, "Diagnose by MD House");
    }

    #[test]
    fn health_check_render_skips_diagnosis_rows() {
        let entry = Entry::HealthCheck(patientor_core::HealthCheckEntry {
            id: "e2".to_string(),
            description: "Yearly control".to_string(),
            date: NaiveDate::from_ymd_opt(2019, 10, 20).unwrap(),
            specialist: "MD House".to_string(),
            diagnosis_codes: Some(vec!["M24.2".to_string()]),
            health_check_rating: HealthCheckRating::Healthy,
        });

        let rendered = render_entry(&entry, &diagnoses());
        assert!(rendered.diagnoses.is_empty());
        assert_eq!(rendered.date, "2019-10-20");
        assert_eq!(rendered.employer, None);
    }

    #[test]
    fn occupational_render_carries_the_employer() {
        let entry = Entry::OccupationalHealthcare(OccupationalHealthcareEntry {
            id: "e3".to_string(),
            description: "Ankle sprain".to_string(),
            date: NaiveDate::from_ymd_opt(2019, 9, 10).unwrap(),
            specialist: "MD House".to_string(),
            diagnosis_codes: None,
            employer_name: "HyPD".to_string(),
            sick_leave: SickLeave::default(),
        });

        let rendered = render_entry(&entry, &diagnoses());
        assert_eq!(rendered.employer.as_deref(), Some("HyPD"));
        assert!(rendered.diagnoses.is_empty());
    }
}
