use log::{debug, error};
use recipe_extract::{extract_recipe_from_url, ExtractError, Recipe, RecipeExtractor, Settings};
use std::env;
use std::path::Path;
use std::process::ExitCode;

const USAGE: &str = "Usage: recipe-extract <url-or-path> [source-url]";

async fn run(target: &str, source_url: Option<&str>) -> Result<Recipe, ExtractError> {
    let settings = Settings::load()?;

    if Path::new(target).is_file() {
        debug!("Reading local file {}", target);
        let html = tokio::fs::read_to_string(target).await?;
        let source_url = source_url.unwrap_or(target);
        return RecipeExtractor::new(settings.extraction).extract(&html, source_url);
    }

    extract_recipe_from_url(target, &settings).await
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let Some(target) = args.get(1) else {
        eprintln!("{USAGE}");
        return ExitCode::FAILURE;
    };

    let recipe = match run(target, args.get(2).map(String::as_str)).await {
        Ok(recipe) => recipe,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&recipe) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to serialize recipe: {}", e);
            ExitCode::FAILURE
        }
    }
}
