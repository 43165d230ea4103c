//! Module listing command.

use clap::Args;
use patchcord_registry::{ModuleCategory, global};

#[derive(Args)]
pub struct ListArgs {
    /// Print the catalog as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: ListArgs) -> anyhow::Result<()> {
    let registry = global();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&registry.all())?);
        return Ok(());
    }

    println!("Available Modules");
    println!("=================");

    for category in ModuleCategory::ALL {
        let modules = registry.in_category(category);
        if modules.is_empty() {
            continue;
        }
        println!();
        println!("{}", category.name());
        for module in modules {
            println!("  {:12} - {}", module.id, module.description);
        }
    }

    println!();
    println!("Use 'patchcord info <module>' for inputs and outputs.");
    Ok(())
}
