use recipe_extract::config::ExtractionConfig;
use recipe_extract::{extract_recipe, ExtractError, ExtractionMethod, RecipeExtractor};

fn page_with_scripts(scripts: &[&str]) -> String {
    let blocks: String = scripts
        .iter()
        .map(|json| format!(r#"<script type="application/ld+json">{json}</script>"#))
        .collect();
    format!("<!DOCTYPE html><html><head><title>Page</title>{blocks}</head><body></body></html>")
}

#[test]
fn test_malformed_block_is_skipped() {
    let html = page_with_scripts(&[
        r#"{"@type": "Recipe", "name": "Broken", "#,
        r#"{"@context": "https://schema.org", "@type": "Recipe", "name": "Working Stew Recipe",
            "recipeIngredient": ["1 lb beef", "2 carrots"],
            "recipeInstructions": [{"@type": "HowToStep", "text": "Simmer for 2 hours."}]}"#,
    ]);

    let recipe = extract_recipe(&html, "https://www.stew.test/beef").unwrap();

    assert_eq!(recipe.name, "Working Stew");
    assert_eq!(recipe.extraction_method, ExtractionMethod::StructuredData);
    assert_eq!(recipe.ingredients, vec!["1 lb beef", "2 carrots"]);
    assert_eq!(recipe.instructions, vec!["Simmer for 2 hours."]);
    assert_eq!(recipe.author, "stew.test");
}

#[test]
fn test_nameless_json_ld_falls_back_to_html() {
    let html = r#"<html><head>
        <script type="application/ld+json">
        {"@type": "Recipe", "recipeIngredient": ["ignored"]}
        </script>
    </head><body>
        <div itemscope itemtype="http://schema.org/Recipe">
            <h1 itemprop="name">Flatbread</h1>
            <ul>
                <li itemprop="recipeIngredient">2 cups flour</li>
                <li itemprop="recipeIngredient">1 cup water</li>
            </ul>
            <ol>
                <li itemprop="recipeInstructions">Mix into a dough.</li>
                <li itemprop="recipeInstructions">Cook in a hot pan.</li>
            </ol>
        </div>
    </body></html>"#;

    let recipe = extract_recipe(html, "https://bread.test/flatbread").unwrap();

    assert_eq!(recipe.name, "Flatbread");
    assert_eq!(recipe.extraction_method, ExtractionMethod::HtmlFallback);
    assert_eq!(recipe.ingredients, vec!["2 cups flour", "1 cup water"]);
    assert_eq!(recipe.instructions, vec!["Mix into a dough.", "Cook in a hot pan."]);
}

#[test]
fn test_no_recipe_carries_source() {
    let html = "<html><body><h1>Contact</h1><p>Write to us.</p></body></html>";

    let err = extract_recipe(html, "/tmp/contact.html").unwrap_err();

    assert!(matches!(err, ExtractError::NoRecipeFound(ref source) if source == "/tmp/contact.html"));
    assert!(!err.is_recoverable());
}

#[test]
fn test_image_with_largest_width() {
    let html = page_with_scripts(&[r#"{
        "@type": "Recipe",
        "name": "Salad",
        "recipeIngredient": ["lettuce"],
        "image": [
            {"@type": "ImageObject", "url": "https://img.test/small.jpg", "width": 300},
            {"@type": "ImageObject", "url": "https://img.test/large.jpg", "width": 1200},
            {"@type": "ImageObject", "url": "https://img.test/medium.jpg", "width": 800}
        ]
    }"#]);

    let recipe = extract_recipe(&html, "https://img.test/salad").unwrap();
    assert_eq!(recipe.image_url.as_deref(), Some("https://img.test/large.jpg"));
}

#[test]
fn test_cyclic_graph_terminates() {
    // The WebPage's @graph holds the Recipe, which points back at the WebPage
    let html = page_with_scripts(&[r#"{
        "@context": "https://schema.org",
        "@id": "https://cycle.test/#webpage",
        "@type": "WebPage",
        "mainEntity": {"@id": "https://cycle.test/#recipe"},
        "@graph": [
            {
                "@id": "https://cycle.test/#recipe",
                "@type": "Recipe",
                "name": "Loop Cake",
                "mainEntityOfPage": {"@id": "https://cycle.test/#webpage"},
                "isPartOf": {"@id": "https://cycle.test/#webpage"},
                "recipeInstructions": "Bake."
            }
        ]
    }"#]);

    let recipe = extract_recipe(&html, "https://cycle.test/cake").unwrap();
    assert_eq!(recipe.name, "Loop Cake");
}

#[test]
fn test_cycle_without_recipe_reports_no_recipe() {
    let html = page_with_scripts(&[r##"{
        "@id": "#page",
        "@type": "WebPage",
        "@graph": [
            {"@id": "#article", "@type": "Article", "isPartOf": {"@id": "#page"}, "hasPart": {"@id": "#article"}}
        ],
        "mainEntity": {"@id": "#article"}
    }"##]);

    let err = extract_recipe(&html, "https://cycle.test/article").unwrap_err();
    assert!(matches!(err, ExtractError::NoRecipeFound(_)));
}

#[test]
fn test_same_input_gives_same_output() {
    let html = page_with_scripts(&[r#"{
        "@type": "Recipe",
        "name": "Chicken Parmesan Recipe",
        "author": [{"@type": "Person", "name": "Ann"}],
        "totalTime": "PT1H30M",
        "recipeYield": 4,
        "recipeIngredient": ["2 chicken breasts", "1 cup ((shredded)) mozzarella"],
        "recipeInstructions": [
            {"@type": "HowToSection", "name": "Prep", "itemListElement": [
                {"@type": "HowToStep", "text": "Pound the chicken."},
                {"@type": "HowToStep", "text": "Bread it."}
            ]},
            "HowToStep"
        ]
    }"#]);

    let first = extract_recipe(&html, "https://parm.test/r").unwrap();
    let second = extract_recipe(&html, "https://parm.test/r").unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(first.name, "Chicken Parmesan");
    assert_eq!(first.author, "Ann");
    assert_eq!(first.total_time_minutes, Some(90));
    assert_eq!(first.servings.as_deref(), Some("4 servings"));
    assert_eq!(first.ingredients[1], "1 cup (shredded) mozzarella");
    assert_eq!(first.instructions, vec!["Pound the chicken.", "Bread it."]);
}

#[test]
fn test_page_metadata() {
    let html = r#"<html lang="en"><head>
        <link rel="canonical" href="https://meta.test/pie">
        <meta property="og:site_name" content="Meta Bakes">
        <script type="application/ld+json">
        {"@type": "Recipe", "name": "Pie", "recipeIngredient": ["apples"],
         "aggregateRating": {"@type": "AggregateRating", "ratingValue": "4.8", "ratingCount": "120"}}
        </script>
    </head></html>"#;

    let recipe = extract_recipe(html, "https://meta.test/pie?utm=x").unwrap();

    assert_eq!(recipe.site_name.as_deref(), Some("Meta Bakes"));
    assert_eq!(recipe.canonical_url.as_deref(), Some("https://meta.test/pie"));
    assert_eq!(recipe.language.as_deref(), Some("en"));
    assert_eq!(recipe.author, "Meta Bakes");
    let rating = recipe.rating.unwrap();
    assert_eq!(rating.value, 4.8);
    assert_eq!(rating.count, Some(120));
}

#[test]
fn test_fraction_normalization_config() {
    let html = page_with_scripts(&[r#"{
        "@type": "Recipe", "name": "Rice", "recipeIngredient": ["1½ cups rice", "¾ tsp salt"]
    }"#]);

    let plain = extract_recipe(&html, "https://rice.test").unwrap();
    assert_eq!(plain.ingredients, vec!["1½ cups rice", "¾ tsp salt"]);

    let extractor = RecipeExtractor::new(ExtractionConfig {
        normalize_fractions: true,
        ..ExtractionConfig::default()
    });
    let normalized = extractor.extract(&html, "https://rice.test").unwrap();
    assert_eq!(normalized.ingredients, vec!["11/2 cups rice", "3/4 tsp salt"]);
}

#[test]
fn test_equipment_nutrition_and_host() {
    let html = page_with_scripts(&[r#"{
        "@type": "Recipe",
        "name": "Pressure Cooker Dal",
        "recipeIngredient": ["1 cup lentils"],
        "recipeInstructions": "Cook on high for 12 minutes.",
        "tool": [{"@type": "HowToTool", "name": "Pressure cooker"}],
        "suitableForDiet": "https://schema.org/VeganDiet",
        "cookingMethod": "Pressure cooking",
        "nutrition": {"@type": "NutritionInformation", "calories": "310 calories", "proteinContent": "18 g"}
    }"#]);

    let recipe = extract_recipe(&html, "https://www.dal.test/recipes/dal").unwrap();

    assert_eq!(recipe.equipment, vec!["Pressure cooker"]);
    assert_eq!(recipe.dietary_restrictions, vec!["Vegan"]);
    assert_eq!(recipe.cooking_method.as_deref(), Some("Pressure cooking"));
    assert_eq!(recipe.nutrients["calories"], "310 calories");
    assert_eq!(recipe.nutrients["proteinContent"], "18 g");
    assert_eq!(recipe.host.as_deref(), Some("www.dal.test"));
    assert_eq!(recipe.author, "dal.test");

    let json = serde_json::to_value(&recipe).unwrap();
    assert_eq!(json["dietaryRestrictions"][0], "Vegan");
    assert_eq!(json["nutrients"]["proteinContent"], "18 g");
}

#[test]
fn test_short_instruction_steps_are_kept() {
    let html = page_with_scripts(&[r#"{
        "@type": "Recipe",
        "name": "Toast",
        "recipeIngredient": ["bread"],
        "recipeInstructions": [
            {"@type": "HowToStep", "text": "Toast."},
            {"@type": "HowToStep", "text": "Butter."},
            "itemListElement"
        ]
    }"#]);

    let recipe = extract_recipe(&html, "/home/cook/toast.html").unwrap();
    assert_eq!(recipe.instructions, vec!["Toast.", "Butter."]);
    assert_eq!(recipe.host, None);
}
