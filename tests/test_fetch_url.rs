use recipe_extract::fetchers::RequestFetcher;
use recipe_extract::{extract_recipe_from_url, ExtractError, ExtractionMethod, FetchConfig, Settings};

const MICRODATA_PAGE: &str = r#"
<html>
<head><meta property="og:site_name" content="Soup Kitchen"></head>
<body>
<div itemscope itemtype="https://schema.org/Recipe">
    <h1 itemprop="name">Miso Soup</h1>
    <li itemprop="recipeIngredient">1 tbsp miso</li>
    <li itemprop="recipeIngredient">2 cups dashi</li>
</div>
</body>
</html>
"#;

#[tokio::test]
async fn test_fetch_sends_configured_headers() {
    let mut server = mockito::Server::new_async().await;
    let config = FetchConfig {
        user_agent: "recipe-extract-test/1.0".to_string(),
        accept_language: "de-DE".to_string(),
        ..FetchConfig::default()
    };

    let m = server
        .mock("GET", "/page")
        .match_header("user-agent", "recipe-extract-test/1.0")
        .match_header("accept-language", "de-DE")
        .with_status(200)
        .with_body("<html></html>")
        .create_async()
        .await;

    let fetcher = RequestFetcher::new(&config).unwrap();
    let body = fetcher
        .fetch(&format!("{}/page", server.url()))
        .await
        .unwrap();

    assert_eq!(body, "<html></html>");
    m.assert_async().await;
}

#[tokio::test]
async fn test_http_error_status() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/missing")
        .with_status(404)
        .create_async()
        .await;

    let url = format!("{}/missing", server.url());
    let err = extract_recipe_from_url(&url, &Settings::default())
        .await
        .unwrap_err();

    match err {
        ExtractError::HttpStatus { status, url: failed } => {
            assert_eq!(status, 404);
            assert_eq!(failed, url);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_fetch_and_extract_html_fallback() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/miso")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(MICRODATA_PAGE)
        .create_async()
        .await;

    let url = format!("{}/miso", server.url());
    let recipe = extract_recipe_from_url(&url, &Settings::default())
        .await
        .unwrap();

    assert_eq!(recipe.name, "Miso Soup");
    assert_eq!(recipe.source_url, url);
    assert_eq!(recipe.extraction_method, ExtractionMethod::HtmlFallback);
    assert_eq!(recipe.ingredients, vec!["1 tbsp miso", "2 cups dashi"]);
    assert_eq!(recipe.author, "Soup Kitchen");
}

#[tokio::test]
async fn test_page_without_recipe() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/about")
        .with_status(200)
        .with_body("<html><body><h1>About</h1></body></html>")
        .create_async()
        .await;

    let url = format!("{}/about", server.url());
    let err = extract_recipe_from_url(&url, &Settings::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractError::NoRecipeFound(ref source) if source == &url));
    assert_eq!(err.to_string(), format!("No recipe found at {url}"));
}
