//! Rendering a pipeline response for the terminal

use crate::args::OutputFormat;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use sqlprobe_core::{QueryResult, Value};
use sqlprobe_drivers::DriverRegistry;
use sqlprobe_query::QueryResponse;

/// Render `response` in the requested format
pub fn render(
    response: &QueryResponse,
    format: OutputFormat,
    pretty: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(response.to_json(pretty)?),
        OutputFormat::Table => Ok(render_table(response)),
    }
}

/// Registered backends with their connection string formats
pub fn backend_help(registry: &DriverRegistry) -> String {
    let backends = registry.list();
    if backends.is_empty() {
        return "No database backends are available in this build.".to_string();
    }

    let mut out = String::from("Supported backends (--backend):\n");
    for kind in backends {
        if let Ok(driver) = registry.get(kind) {
            out.push_str(&format!(
                "  {:<10} {}: {}\n",
                kind.as_str(),
                driver.display_name(),
                driver.connection_string_help()
            ));
        }
    }
    out
}

fn render_table(response: &QueryResponse) -> String {
    match response {
        QueryResponse::Error { error } => format!("Error: {}", error),
        QueryResponse::Success {
            results,
            execution_time_millis,
            query_plan,
            suggestions,
        } => {
            let mut out = results_table(results);
            out.push_str(&format!(
                "\n({} rows, {:.3} ms)\n\nQuery plan:\n{}\n",
                results.row_count(),
                execution_time_millis,
                query_plan
            ));
            if !suggestions.is_empty() {
                out.push_str("\nSuggestions:\n");
                for suggestion in suggestions {
                    out.push_str(&format!("  - {}\n", suggestion));
                }
            }
            out
        }
    }
}

fn results_table(results: &QueryResult) -> String {
    let Some(first) = results.rows().first() else {
        return "(no rows)".to_string();
    };

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(first.keys().cloned().collect::<Vec<_>>());

    for record in results.rows() {
        table.add_row(record.values().map(Value::to_string).collect::<Vec<_>>());
    }
    table.to_string()
}
