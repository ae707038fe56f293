//! Operations command implementation.

use picledger_core::Operation;
use serde::Serialize;

/// Description of one operation.
#[derive(Debug, Serialize)]
pub struct OperationInfo {
    /// Invocation name.
    pub name: &'static str,
    /// Argument names, in order.
    pub parameters: &'static [&'static str],
}

/// Lists every operation the ledger accepts.
pub fn list() -> Vec<OperationInfo> {
    Operation::ALL
        .into_iter()
        .map(|op| OperationInfo {
            name: op.name(),
            parameters: op.parameters(),
        })
        .collect()
}

/// Runs the operations command.
pub fn run(format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let operations = list();
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&operations)?);
        }
        _ => {
            for op in &operations {
                println!("{:<28} {}", op.name, op.parameters.join(", "));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_operation() {
        let operations = list();
        assert_eq!(operations.len(), Operation::ALL.len());
        assert_eq!(operations[0].name, "create");
        assert_eq!(operations[0].parameters, ["id", "category", "quantity", "owner"]);
    }
}
