use cartplan_core::{Recipe, StaticRecipeCatalog};
use serde::Serialize;

use crate::commands::{CommandResult, EXIT_CATALOG};

const COMMAND: &str = "recipes";

#[derive(Debug, Serialize)]
struct RecipesPayload<'a> {
    command: &'static str,
    status: &'static str,
    recipes: Vec<&'a Recipe>,
}

pub fn run(json: bool) -> CommandResult {
    let catalog = match StaticRecipeCatalog::bundled() {
        Ok(catalog) => catalog,
        Err(error) => {
            return CommandResult::failure(COMMAND, "catalog", error.to_string(), EXIT_CATALOG)
        }
    };

    if json {
        return CommandResult::success_with(&RecipesPayload {
            command: COMMAND,
            status: "ok",
            recipes: catalog.known_recipes().collect(),
        });
    }

    let mut lines = vec![format!("known recipes ({}):", catalog.known_recipes().count())];
    lines.extend(catalog.known_recipes().map(|recipe| {
        format!("- {} ({} ingredients)", recipe.name, recipe.ingredients.len())
    }));
    lines.push(format!(
        "anything else uses the generic set: {}",
        catalog
            .generic()
            .iter()
            .map(|ingredient| ingredient.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    ));

    CommandResult::text(lines.join("\n"))
}
