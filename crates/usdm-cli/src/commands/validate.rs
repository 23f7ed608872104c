use crate::support::{
    EXIT_UNUSABLE, load_input_or_exit, load_profile_or_exit, render_json_or_exit,
};
use serde_json::json;
use std::fs;
use usdm_study::check_study;

pub fn run(input: String, profile: Option<String>, json_output: bool, json_path: Option<String>) {
    let profile = load_profile_or_exit(profile.as_deref());
    let loaded = load_input_or_exit(&input);
    let check = check_study(&loaded.document, &profile).unwrap_or_else(|error| {
        eprintln!("error: {}: {error}", loaded.path.display());
        std::process::exit(EXIT_UNUSABLE);
    });

    let report = check.report.to_check_report();
    let payload = json!({
        "checkKind": report.check_kind,
        "inputPath": loaded.path.display().to_string(),
        "inputSha256": loaded.sha256,
        "result": report.result,
        "blockingClasses": report.blocking_classes,
        "advisoryClasses": report.advisory_classes,
        "summary": report.summary,
        "blocking": report.blocking,
        "advisory": report.advisory,
        "informational": report.informational,
    });

    if json_output || json_path.is_some() {
        let rendered = render_json_or_exit(&payload, "validate");
        if let Some(path) = json_path {
            fs::write(&path, format!("{rendered}\n")).unwrap_or_else(|error| {
                eprintln!("error: failed to write {path}: {error}");
                std::process::exit(EXIT_UNUSABLE);
            });
        }
        if json_output {
            println!("{rendered}");
        }
    }
    if !json_output {
        print!("{}", check.report.render());
    }

    if !check.is_acceptable() {
        std::process::exit(1);
    }
}
