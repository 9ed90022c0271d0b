use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::time::Duration;

use scribe::core::{config, corpus, fallback, llm, pipeline, post, themes};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config_path = "config.toml";
    if !std::path::Path::new(config_path).exists() {
        std::fs::write(config_path, config::starter_config())?;
        log::info!("Wrote starter config to {}", config_path);
    }
    let config = config::load_config(config_path)?;

    let today = chrono::Local::now().date_naive();
    let mut rng = StdRng::from_entropy();
    log::info!("Generating diary post for {}", today);

    // Reference corpus
    let corpus_cfg = config.corpus();
    let corpus = corpus::load_corpus(
        &corpus_cfg.export_files(),
        corpus_cfg.style_samples(),
        &mut rng,
    );
    log::info!(
        "Corpus loaded: {} titles, {} style samples, {} articles",
        corpus.titles.len(),
        corpus.style_samples.len(),
        corpus.articles.len()
    );

    // Theme balance: legacy export vs the freshest local posts
    let posts_cfg = config.posts();
    let posts_dir = PathBuf::from(posts_cfg.dir());
    let recent_titles = corpus::recent_post_titles(&posts_dir, posts_cfg.recent_window());

    let legacy_counts = themes::tally(&corpus.titles);
    let recent_counts = themes::tally(&recent_titles);
    let priority = themes::build_priority(&legacy_counts, &recent_counts);
    for (theme, score) in &priority {
        log::info!("  theme '{}' score {}", theme.label(), score);
    }
    let theme = themes::select_theme(&priority, &mut rng);
    log::info!("Selected theme: {}", theme.label());

    // Agent pipeline, with wholesale template fallback on any pipeline error
    let llm_cfg = config.llm();
    let api_key = std::env::var(config::API_KEY_ENV).ok();
    if api_key.is_none() {
        log::warn!("{} not set; expecting template fallback", config::API_KEY_ENV);
    }
    let backend = llm::GeminiBackend::new(llm_cfg.clone(), api_key);
    let caller = llm::ResilientCaller::new(
        backend,
        llm_cfg.models(),
        llm_cfg.max_retries(),
        Duration::from_millis(llm_cfg.retry_base_ms()),
    );

    let output = match pipeline::run(&caller, theme, &corpus, today, &mut rng).await {
        Ok(output) => output,
        Err(e) => {
            log::warn!("Pipeline failed: {}. Falling back to templates.", e);
            fallback::generate(theme, &mut rng)
        }
    };

    // Assemble and persist
    let post = post::Post {
        title: output.plan.title.clone(),
        date: today,
        mood: post::mood_for_hint(&output.plan.mood_hint, &mut rng),
        weather: post::random_weather(&mut rng),
        tags: output.seo.tags.clone(),
        description: output.seo.description.clone(),
        keywords: output.seo.keywords.clone(),
        agents: output.agents.clone(),
        body: post::normalize_body(&output.body),
    };
    let path = post::write_post(&posts_dir, &post, &mut rng)?;

    log::info!("Post written: {}", path.display());
    log::info!("  title: {}", post.title);
    log::info!("  theme: {}", output.plan.theme.label());
    log::info!("  tags: {}", post.tags.join(", "));
    Ok(())
}
