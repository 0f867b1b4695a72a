use anyhow::Result;
use httpmock::prelude::*;
use site_composer::core::PropertyMap;
use site_composer::markup::Document;
use site_composer::utils::error::FailureKind;
use site_composer::{ComponentRegistry, HttpSource};

/// 同一個元件只會發出一次請求
#[tokio::test]
async fn test_load_fetches_each_component_once() -> Result<()> {
    let server = MockServer::start();
    let hero_mock = server.mock(|when, then| {
        when.method(GET).path("/components/hero.html");
        then.status(200)
            .header("Content-Type", "text/html")
            .body("<section class=\"hero\"><h1>{{headline}}</h1></section>");
    });

    let registry = ComponentRegistry::new(HttpSource::new(&server.base_url())?);
    registry.register("hero", "components/hero.html");

    registry.load("hero").await?;
    registry.load("hero").await?;
    let (a, b) = tokio::join!(registry.load("hero"), registry.load("hero"));
    a?;
    b?;

    hero_mock.assert_hits(1);
    assert!(registry.is_loaded("hero"));
    Ok(())
}

#[tokio::test]
async fn test_load_many_survives_one_failing_source() -> Result<()> {
    let server = MockServer::start();
    let navbar_mock = server.mock(|when, then| {
        when.method(GET).path("/components/navbar.html");
        then.status(200).body("<nav id=\"navbar\">Nav</nav>");
    });
    let footer_mock = server.mock(|when, then| {
        when.method(GET).path("/components/footer.html");
        then.status(200).body("<footer>Footer</footer>");
    });
    let hero_mock = server.mock(|when, then| {
        when.method(GET).path("/components/hero.html");
        then.status(500);
    });

    let registry = ComponentRegistry::new(HttpSource::new(&server.base_url())?);
    registry.register_all([
        ("navbar", "components/navbar.html"),
        ("hero", "components/hero.html"),
        ("footer", "components/footer.html"),
    ]);

    let summary = registry.load_many(&["navbar", "hero", "footer"]).await;

    navbar_mock.assert();
    footer_mock.assert();
    hero_mock.assert();
    assert_eq!(summary.loaded, vec!["navbar", "footer"]);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].kind(), FailureKind::FetchFailure);
    assert!(summary.failed[0].to_string().contains("500"));
    assert!(registry.is_loaded("navbar"));
    assert!(registry.is_loaded("footer"));
    assert!(!registry.is_loaded("hero"));

    let diagnostics = registry.diagnostics().entries();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].component(), "hero");
    Ok(())
}

#[tokio::test]
async fn test_render_fetches_before_mounting() -> Result<()> {
    let server = MockServer::start();
    let greeting_mock = server.mock(|when, then| {
        when.method(GET).path("/site/components/greeting.html");
        then.status(200).body("\n  <p class=\"{{user}}\">Hello, {{user}}!</p>\n");
    });

    let registry = ComponentRegistry::new(HttpSource::new(&server.url("/site"))?);
    registry.register("greeting", "components/greeting.html");

    let mut doc = Document::parse("<div id=\"greeting\"><em>loading</em></div>")?;
    let mut props = PropertyMap::new();
    props.insert("user".to_string(), "Alex".to_string());

    registry.render(&mut doc, "greeting", "#greeting", &props).await?;

    greeting_mock.assert();
    assert_eq!(
        doc.to_html(),
        "<div id=\"greeting\"><p class=\"{{user}}\">Hello, Alex!</p></div>"
    );

    // 同一個模板再渲染一次，不帶屬性
    registry
        .render(&mut doc, "greeting", "#greeting", &PropertyMap::new())
        .await?;
    greeting_mock.assert_hits(1);
    assert_eq!(
        doc.to_html(),
        "<div id=\"greeting\"><p class=\"{{user}}\">Hello, {{user}}!</p></div>"
    );
    Ok(())
}

#[tokio::test]
async fn test_unregistered_component_is_safe_noop() -> Result<()> {
    let server = MockServer::start();
    let registry = ComponentRegistry::new(HttpSource::new(&server.base_url())?);
    let mut doc = Document::parse("<div id=\"slot\">keep</div>")?;

    assert!(registry.load("nonexistent").await.is_err());
    assert_eq!(registry.diagnostics().len(), 1);

    let result = registry
        .render(&mut doc, "nonexistent", "#slot", &PropertyMap::new())
        .await;

    assert_eq!(result.unwrap_err().kind(), FailureKind::TemplateNotFound);
    assert_eq!(registry.diagnostics().len(), 2);
    assert_eq!(doc.to_html(), "<div id=\"slot\">keep</div>");
    Ok(())
}
