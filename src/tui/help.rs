//! Help text content for the help modal

use gridcalc_engine::engine::FunctionRegistry;

/// Keybinding help for the grid view.
pub fn get_help_text() -> Vec<String> {
    vec![
        "Navigation:",
        "  h/j/k/l      Move left/down/up/right",
        "  Arrow keys   Move cursor",
        "",
        "Editing:",
        "  e / Enter    Edit cell",
        "  Enter        Commit edit",
        "  Esc          Cancel edit",
        "  x / Delete   Clear cell",
        "",
        "Undo/Redo:",
        "  u / Ctrl+z   Undo",
        "  Ctrl+r/y     Redo",
        "",
        "Other:",
        "  s            Save workspace",
        "  ?            This help",
        "  q / Esc      Back to menu",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Formula syntax and the registered functions.
pub fn get_functions_help(registry: &FunctionRegistry) -> Vec<String> {
    let mut lines: Vec<String> = vec![
        "Formulas",
        "",
        "  Postfix:  A1 B1 +     5 2 * C3 -",
        "  Infix:    A1+B1       5*2-C3",
        "  Operators + - * /  (x / 0 gives x)",
        "  References A1..Z9, ranges A1:C3",
        "",
        "Functions:",
    ]
    .into_iter()
    .map(str::to_string)
    .collect();

    for (name, description) in registry.describe() {
        lines.push(format!("  {:<12} {}", format!("{}(...)", name), description));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_functions_help_lists_builtins() {
        let lines = get_functions_help(&FunctionRegistry::with_builtins());
        for name in ["sum", "mean", "max", "min"] {
            assert!(
                lines.iter().any(|l| l.trim_start().starts_with(&format!("{}(", name))),
                "missing {name}"
            );
        }
    }
}
