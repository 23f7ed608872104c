use crate::support::{
    EXIT_UNUSABLE, load_input_or_exit, load_profile_or_exit, render_json_or_exit,
};
use serde_json::{Value, json};
use usdm_kernel::OrderedCollection;
use usdm_kernel::linked_list::item_id;
use usdm_study::check_study;

const ORDER_KIND: &str = "usdm.collection.order.v1";

fn labels(collection: &OrderedCollection<'_>) -> Vec<String> {
    collection
        .items
        .iter()
        .enumerate()
        .map(|(position, item)| match item_id(item) {
            Some(id) => id.to_string(),
            None => format!("#{position}"),
        })
        .collect()
}

pub fn run(input: String, collection: Option<String>, profile: Option<String>, json_output: bool) {
    let profile = load_profile_or_exit(profile.as_deref());
    let loaded = load_input_or_exit(&input);
    let check = check_study(&loaded.document, &profile).unwrap_or_else(|error| {
        eprintln!("error: {}: {error}", loaded.path.display());
        std::process::exit(EXIT_UNUSABLE);
    });

    let selected: Vec<&OrderedCollection<'_>> = match collection.as_deref() {
        Some(field) => check.collections_named(field).collect(),
        None => check.collections.iter().collect(),
    };
    if let Some(field) = collection.as_deref()
        && selected.is_empty()
    {
        eprintln!("error: no ordered collection named '{field}' in {}", loaded.path.display());
        std::process::exit(EXIT_UNUSABLE);
    }

    if json_output {
        let collections: Vec<Value> = selected
            .iter()
            .map(|collection| {
                json!({
                    "name": collection.name,
                    "ids": labels(collection),
                })
            })
            .collect();
        let payload = json!({
            "orderKind": ORDER_KIND,
            "inputPath": loaded.path.display().to_string(),
            "inputSha256": loaded.sha256,
            "acceptable": check.is_acceptable(),
            "collections": collections,
        });
        println!("{}", render_json_or_exit(&payload, "order"));
        return;
    }

    for collection in selected {
        println!("{}: {}", collection.name, labels(collection).join(" -> "));
    }
}
