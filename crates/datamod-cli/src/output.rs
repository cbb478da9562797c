use std::fmt::Write;

use serde_json::{json, Value};

use datamod::{AcceptedMap, PipelineReport};

pub fn to_json(accepted: &AcceptedMap, report: &PipelineReport) -> serde_json::Result<String> {
    let packages: Vec<Value> = accepted
        .values()
        .map(|record| {
            json!({
                "name": record.mod_name(),
                "state": record.state(),
                "directory": record.directory(),
                "declaration": record.declaration(),
            })
        })
        .collect();

    serde_json::to_string_pretty(&json!({
        "accepted": packages,
        "rejected": report.rejected,
        "conflicting_names": report.conflicting_names,
        "candidates": report.candidates,
        "physical_duplicates": report.physical_duplicates,
        "content": report.content,
    }))
}

pub fn to_text(accepted: &AcceptedMap, report: &PipelineReport) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} packages loaded ({} candidates)",
        accepted.len(),
        report.candidates
    );
    for record in accepted.values() {
        let decl = record.declaration();
        let _ = writeln!(
            out,
            "  {:<24} {:<10} {}",
            record.mod_name(),
            decl.version,
            record.directory().display()
        );
    }

    if !report.rejected.is_empty() {
        let _ = writeln!(out, "{} packages rejected", report.rejected.len());
        for rejected in &report.rejected {
            let _ = writeln!(
                out,
                "  {:<24} {:<22} {}",
                rejected.mod_name,
                rejected.state.to_string(),
                rejected.declaration_path.display()
            );
        }
    }

    if !report.conflicting_names.is_empty() {
        let _ = writeln!(
            out,
            "conflicting names: {}",
            report.conflicting_names.join(", ")
        );
    }
    if report.physical_duplicates > 0 {
        let _ = writeln!(
            out,
            "{} repeat discoveries ignored",
            report.physical_duplicates
        );
    }

    let c = &report.content;
    let _ = writeln!(
        out,
        "{} items, {} recipes, {} assets in {} asset bundles",
        c.items, c.recipes, c.assets, c.asset_bundle_files
    );
    out
}
