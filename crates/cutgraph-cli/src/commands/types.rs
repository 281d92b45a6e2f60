use crate::support::print_json_or_exit;
use cutgraph_kernel::builtin_kinds;
use serde_json::json;

pub fn run(json_output: bool) {
    let kinds = builtin_kinds();
    if json_output {
        print_json_or_exit(&json!({
            "typeIds": kinds,
            "count": kinds.len(),
        }));
    } else {
        for kind in kinds {
            println!("{kind}");
        }
    }
}
