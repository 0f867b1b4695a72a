use anyhow::Context;
use clap::Parser;
use site_composer::core::ConfigProvider;
use site_composer::utils::{logger, validation::Validate};
use site_composer::{AnySource, CliConfig, ComponentRegistry, Page, PageComposer, SiteConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting site-composer");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let mut config = match &cli.config {
        Some(path) => SiteConfig::from_file(path)
            .with_context(|| format!("failed to load site config {}", path.display()))?,
        None => SiteConfig::default(),
    };
    if let Some(base) = &cli.base {
        config.site.base = base.clone();
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let source = AnySource::from_base(config.base_location())?;
    let registry = Arc::new(ComponentRegistry::from_config(source, &config));

    let html = tokio::fs::read_to_string(&cli.page)
        .await
        .with_context(|| format!("failed to read page {}", cli.page.display()))?;
    let mut page = Page::parse(&html)?;

    let mut composer = PageComposer::from_config(registry, &config);
    let report = composer.compose(&mut page, &cli.navigation_path()).await?;

    let output = page.to_html();
    match &cli.output {
        Some(path) => {
            tokio::fs::write(path, output)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!("📁 Output saved to: {}", path.display());
        }
        None => println!("{}", output),
    }

    if cli.report {
        eprintln!("{}", report.to_json()?);
    }

    if cli.strict {
        if let Err(e) = report.into_result() {
            tracing::error!("❌ Composition incomplete: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(2);
        }
    }

    Ok(())
}
