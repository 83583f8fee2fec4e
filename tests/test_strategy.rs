use mealie_import::strategy::{known_domain_method, LARGE_PAGE_THRESHOLD};
use mealie_import::{
    choose_method, recommend_method, ImportMethod, ImportSettings, PageAnalysis,
};

fn analysis(domain: &str, has_structured_recipe: bool, document_size: usize) -> PageAnalysis {
    PageAnalysis {
        has_structured_recipe,
        document_size,
        domain: domain.to_string(),
        ..Default::default()
    }
}

fn settings() -> ImportSettings {
    ImportSettings::new("https://mealie.example.com", "token")
}

#[test]
fn test_known_site_uses_structured_extraction() {
    let domain = "cooking.nytimes.com";
    let method = choose_method(
        domain,
        "https://cooking.nytimes.com/recipes/1015819",
        &analysis(domain, false, 1_000),
        &settings(),
    );
    assert_eq!(method, ImportMethod::StructuredExtraction);
}

#[test]
fn test_large_page_with_json_ld_uses_structured_extraction() {
    let domain = "unknown-blog.example";
    let method = choose_method(
        domain,
        "https://unknown-blog.example/stew",
        &analysis(domain, true, 600_000),
        &settings(),
    );
    assert_eq!(method, ImportMethod::StructuredExtraction);

    let at_threshold = choose_method(
        domain,
        "https://unknown-blog.example/stew",
        &analysis(domain, true, LARGE_PAGE_THRESHOLD),
        &settings(),
    );
    assert_eq!(at_threshold, ImportMethod::UrlImport);
}

#[test]
fn test_default_is_url_import() {
    let domain = "unknown-blog.example";
    let method = choose_method(
        domain,
        "https://unknown-blog.example/stew",
        &analysis(domain, false, 600_000),
        &settings(),
    );
    assert_eq!(method, ImportMethod::UrlImport);
}

#[test]
fn test_member_path_with_json_ld_only() {
    let domain = "unknown-blog.example";
    let page = analysis(domain, true, 20_000);
    assert_eq!(
        choose_method(
            domain,
            "https://unknown-blog.example/members/stew",
            &page,
            &settings()
        ),
        ImportMethod::StructuredExtraction
    );

    // Microdata on the page means the server can read it as well
    let with_microdata = PageAnalysis {
        has_embedded_attributes: true,
        ..page.clone()
    };
    assert_eq!(
        choose_method(
            domain,
            "https://unknown-blog.example/members/stew",
            &with_microdata,
            &settings()
        ),
        ImportMethod::UrlImport
    );

    // Only the path counts, not the host
    assert_eq!(
        choose_method(
            "subscriber.example",
            "https://subscriber.example/stew",
            &analysis("subscriber.example", true, 20_000),
            &settings()
        ),
        ImportMethod::UrlImport
    );
}

#[test]
fn test_stored_preference_wins() {
    let mut settings = settings();
    settings
        .domain_preferences
        .insert("allrecipes.com".to_string(), ImportMethod::HtmlParse);
    settings
        .domain_preferences
        .insert("unknown-blog.example".to_string(), ImportMethod::UrlImport);

    assert_eq!(
        choose_method(
            "allrecipes.com",
            "https://www.allrecipes.com/recipe/1",
            &analysis("allrecipes.com", true, 900_000),
            &settings
        ),
        ImportMethod::HtmlParse
    );
    assert_eq!(
        choose_method(
            "unknown-blog.example",
            "https://unknown-blog.example/stew",
            &analysis("unknown-blog.example", true, 900_000),
            &settings
        ),
        ImportMethod::UrlImport
    );
}

#[test]
fn test_choice_is_deterministic() {
    let page = analysis("unknown-blog.example", true, 750_000);
    let first = choose_method("unknown-blog.example", "https://unknown-blog.example/a", &page, &settings());
    for _ in 0..5 {
        assert_eq!(
            choose_method("unknown-blog.example", "https://unknown-blog.example/a", &page, &settings()),
            first
        );
    }
}

#[test]
fn test_known_domains_match_by_substring_in_order() {
    assert_eq!(
        known_domain_method("americastestkitchen.com"),
        Some(ImportMethod::StructuredExtraction)
    );
    assert_eq!(known_domain_method("food.com"), Some(ImportMethod::UrlImport));
    assert_eq!(known_domain_method("example.org"), None);
}

#[test]
fn test_recommend_from_markup() {
    let html = r#"<html><head>
        <script type="application/ld+json">{"@type": "Recipe", "name": "Ragu"}</script>
        </head><body></body></html>"#;
    assert_eq!(
        recommend_method("https://www.epicurious.com/recipes/ragu", html, &settings()),
        ImportMethod::StructuredExtraction
    );
    assert_eq!(
        recommend_method("https://someblog.example/ragu", html, &settings()),
        ImportMethod::UrlImport
    );
}
