use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use patientor_core::{Diagnosis, Patient, PatientDirectory};
use patientor_entries::render_entry;

#[derive(Parser, Debug)]
#[command(
    name = "patientor-cli",
    about = "In danh sách bệnh nhân hoặc chi tiết một bệnh nhân từ file JSON."
)]
struct Args {
    /// Đường dẫn tới file JSON danh sách bệnh nhân.
    #[arg(short, long)]
    patients: PathBuf,

    /// File JSON danh mục chẩn đoán, dùng để diễn giải mã chẩn đoán.
    #[arg(short, long)]
    diagnoses: Option<PathBuf>,

    /// Id bệnh nhân cần xem chi tiết; bỏ trống để in danh sách.
    #[arg(short = 'i', long)]
    patient_id: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let data = std::fs::read_to_string(&args.patients)
        .with_context(|| format!("Không đọc được file {:?}", args.patients))?;
    let patients: Vec<Patient> =
        serde_json::from_str(&data).context("File bệnh nhân không đúng định dạng")?;
    let directory = PatientDirectory::from(patients);

    let diagnoses: Vec<Diagnosis> = match &args.diagnoses {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("Không đọc được file {path:?}"))?;
            serde_json::from_str(&data).context("File chẩn đoán không đúng định dạng")?
        }
        None => Vec::new(),
    };

    match &args.patient_id {
        Some(id) => {
            let patient = directory
                .get(id)
                .with_context(|| format!("Không tìm thấy bệnh nhân {id}"))?;
            print_patient(patient, &diagnoses);
        }
        None => {
            for patient in directory.iter() {
                println!(
                    "{}\t{}\t{} ({} entries)",
                    patient.id,
                    patient.name,
                    patient.occupation,
                    patient.entries.len()
                );
            }
        }
    }

    Ok(())
}

fn print_patient(patient: &Patient, diagnoses: &[Diagnosis]) {
    println!("{} ({})", patient.name, patient.gender.label());
    if let Some(ssn) = &patient.ssn {
        println!("ssn: {ssn}");
    }
    println!("occupation: {}", patient.occupation);

    for entry in &patient.entries {
        let rendered = render_entry(entry, diagnoses);
        println!();
        println!("{} [{}]", rendered.date, rendered.kind.label());
        if let Some(employer) = &rendered.employer {
            println!("  Employer name: {employer}");
        }
        println!("  {}", rendered.description);
        for line in &rendered.diagnoses {
            match &line.name {
                Some(name) => println!("  - {} {name}", line.code),
                None => println!("  - {}", line.code),
            }
        }
        println!("  {}", rendered.specialist_line);
    }
}
