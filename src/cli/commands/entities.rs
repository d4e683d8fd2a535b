use serde_json::json;

use crate::cli::OutputFormat;
use crate::entities;

pub fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let bindings: Vec<_> = entities::ALL
                .iter()
                .map(|t| {
                    json!({
                        "name": t.name,
                        "table": t.table,
                        "primaryKey": t.primary_key,
                        "columns": t.all_columns(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&bindings)?);
        }
        OutputFormat::Text => {
            for table in entities::ALL {
                let columns: Vec<String> = table
                    .columns
                    .iter()
                    .map(|c| if c.required { format!("{}*", c.name) } else { c.name.to_string() })
                    .collect();
                println!("{:<18} {:<18} {}", table.name, table.table, columns.join(", "));
            }
        }
    }
    Ok(())
}
