use std::fs;

use patientor_core::{
    Diagnosis, Entry, EntryDraft, EntryKind, HealthCheckEntry, Patient, PatientDirectory,
};
use patientor_entries::{render_entry, DraftForm, HealthCheckForm};

fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn load_patients() -> Vec<Patient> {
    let data = fs::read_to_string(fixture_path("patients.json")).expect("missing patients fixture");
    serde_json::from_str(&data).expect("patients fixture is not valid")
}

fn load_diagnoses() -> Vec<Diagnosis> {
    let data =
        fs::read_to_string(fixture_path("diagnoses.json")).expect("missing diagnoses fixture");
    serde_json::from_str(&data).expect("diagnoses fixture is not valid")
}

/// Stands in for the backend: the draft comes back as a persisted entry with
/// a server-assigned id.
fn persist(draft: &EntryDraft, id: &str) -> Entry {
    let mut value = serde_json::to_value(draft).expect("draft does not serialize");
    value["id"] = serde_json::Value::String(id.to_string());
    serde_json::from_value(value).expect("persisted entry does not deserialize")
}

#[test]
fn fixture_loads_in_backend_order() {
    let directory = PatientDirectory::from(load_patients());

    assert_eq!(directory.len(), 4);
    let first = directory.iter().next().unwrap();
    assert_eq!(first.name, "John McClane");
    assert_eq!(first.entries.len(), 1);
    assert_eq!(first.entries[0].kind(), EntryKind::Hospital);
}

#[test]
fn unknown_route_id_resolves_to_nothing() {
    let directory = PatientDirectory::from(load_patients());
    assert!(directory.get("no-such-patient").is_none());
}

#[test]
fn rendering_resolves_known_codes_and_keeps_unknown_ones() {
    let directory = PatientDirectory::from(load_patients());
    let diagnoses = load_diagnoses();

    let riggs = directory.get("d2773598-f723-11e9-8f0b-362b9e155667").unwrap();
    let rendered = render_entry(&riggs.entries[0], &diagnoses);

    assert_eq!(rendered.kind, EntryKind::OccupationalHealthcare);
    assert_eq!(rendered.employer.as_deref(), Some("HyPD"));
    assert_eq!(rendered.diagnoses.len(), 3);
    assert_eq!(
        rendered.diagnoses[0].name.as_deref(),
        Some("Occupational exposure to radiation")
    );
    // Z74.3 is not in the loaded diagnosis list: code only, no failure.
    assert_eq!(rendered.diagnoses[1].code, "Z74.3");
    assert_eq!(rendered.diagnoses[1].name, None);
}

#[test]
fn form_submit_roundtrip_appends_exactly_one_entry() {
    let mut directory = PatientDirectory::from(load_patients());
    let scully_id = "d27736ec-f723-11e9-8f0b-362b9e155667";
    let before_scully = directory.get(scully_id).unwrap().entries.len();
    let others_before: Vec<Patient> = directory
        .iter()
        .filter(|p| p.id != scully_id)
        .cloned()
        .collect();

    let mut form = HealthCheckForm::default();
    form.set_field("description", "Follow-up visit");
    form.set_field("date", "2019-11-02");
    form.set_field("specialist", "MD House");
    form.set_field("healthCheckRating", "1");

    let entry = persist(&form.to_draft(), "server-assigned-id");
    directory.append_entry(scully_id, entry).unwrap();

    let scully = directory.get(scully_id).unwrap();
    assert_eq!(scully.entries.len(), before_scully + 1);
    match scully.entries.last().unwrap() {
        Entry::HealthCheck(HealthCheckEntry { id, description, .. }) => {
            assert_eq!(id, "server-assigned-id");
            assert_eq!(description, "Follow-up visit");
        }
        other => panic!("wrong variant appended: {other:?}"),
    }

    let others_after: Vec<Patient> = directory
        .iter()
        .filter(|p| p.id != scully_id)
        .cloned()
        .collect();
    assert_eq!(others_before, others_after);
}
