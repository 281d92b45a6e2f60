use crate::support::{build_manager_or_exit, exit_with, print_json_or_exit};
use serde_json::json;

pub fn run(config: String, setup: bool, json_output: bool) {
    let manager = build_manager_or_exit(&config, setup);
    let summaries = manager.cuts().summaries().unwrap_or_else(|e| exit_with(e));

    if json_output {
        print_json_or_exit(&json!({
            "config": config,
            "cutCount": summaries.len(),
            "cuts": summaries,
        }));
    } else {
        println!("cutgraph check {config}");
        println!("  Cuts: {}", summaries.len());
        for summary in &summaries {
            if summary.children.is_empty() {
                println!("  - {} [{}]", summary.name, summary.type_id);
            } else {
                println!(
                    "  - {} [{}] <- {}",
                    summary.name,
                    summary.type_id,
                    summary.children.join(", ")
                );
            }
        }
    }
}
