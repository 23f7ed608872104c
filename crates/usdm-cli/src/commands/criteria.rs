use crate::support::{
    EXIT_UNUSABLE, load_input_or_exit, load_profile_or_exit, render_json_or_exit,
};
use serde_json::{Value, json};
use usdm_kernel::Document;
use usdm_study::{criterion_texts, first_version};

pub fn run(input: String, profile: Option<String>, json_output: bool) {
    let profile = load_profile_or_exit(profile.as_deref());
    let loaded = load_input_or_exit(&input);
    if let Err(error) = Document::new(&loaded.document) {
        eprintln!("error: {}: {error}", loaded.path.display());
        std::process::exit(EXIT_UNUSABLE);
    }
    let Some(version) = first_version(&loaded.document) else {
        eprintln!("error: {} has no study version", loaded.path.display());
        std::process::exit(1);
    };

    if json_output {
        let designs: Vec<Value> = version
            .designs
            .iter()
            .map(|design| {
                json!({
                    "design": design.label(),
                    "criteria": criterion_texts(&version, design, &profile),
                })
            })
            .collect();
        let payload = json!({
            "inputPath": loaded.path.display().to_string(),
            "designs": designs,
        });
        println!("{}", render_json_or_exit(&payload, "criteria"));
        return;
    }

    for design in &version.designs {
        let texts = criterion_texts(&version, design, &profile);
        println!("{} ({} criteria)", design.label(), texts.len());
        for row in texts {
            let category = row.category.as_deref().unwrap_or("Uncategorized");
            let id = row.id.as_deref().unwrap_or("-");
            println!("  [{category}] {id}: {}", row.text);
        }
    }
}
