use crate::support::{build_manager_or_exit, exit_with, print_json_or_exit};
use cutgraph_kernel::SelectionStatus;
use serde_json::json;

pub struct Args {
    pub config: String,
    pub cut: String,
    pub entries: u64,
    pub setup: bool,
    pub json: bool,
}

pub fn run(args: Args) {
    if args.entries == 0 {
        exit_with("--entries must be at least 1");
    }
    let manager = build_manager_or_exit(&args.config, args.setup);
    let cut = manager.get_cut(&args.cut).unwrap_or_else(|e| exit_with(e));

    let mut last = SelectionStatus::Inapplicable;
    for _ in 0..args.entries {
        last = cut.process().unwrap_or_else(|e| exit_with(e));
    }
    let summary = cut.summary().unwrap_or_else(|e| exit_with(e));

    if args.json {
        print_json_or_exit(&json!({
            "cut": args.cut,
            "entries": args.entries,
            "lastStatus": last,
            "summary": summary,
        }));
    } else {
        println!("cutgraph run {} --cut {}", args.config, args.cut);
        println!("  Entries: {}", args.entries);
        println!("  Last status: {last}");
        println!(
            "  Counters: accepted={} rejected={} inapplicable={}",
            summary.counters.accepted, summary.counters.rejected, summary.counters.inapplicable
        );
        match manager.cuts().tree_dump() {
            Ok(dump) => print!("{dump}"),
            Err(e) => exit_with(e),
        }
    }
}
