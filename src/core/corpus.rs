use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Channel-level placeholder title present in the legacy export; filtered out
/// everywhere, it is not a real post.
pub const LEGACY_CHANNEL_TITLE: &str = "Genesis Vault - Legacy Notes";

/// Cap on each style sample, in characters.
const STYLE_SAMPLE_MAX_CHARS: usize = 500;
/// Samples shorter than this carry no usable style signal.
const STYLE_SAMPLE_MIN_CHARS: usize = 100;

#[derive(Debug, Clone)]
pub struct Article {
    pub title: String,
    pub text: String,
}

/// Derived views over the legacy export files. Missing or unreadable files
/// contribute nothing; loading never fails.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub titles: Vec<String>,
    pub style_samples: Vec<String>,
    pub articles: Vec<Article>,
}

pub fn load_corpus<R: Rng>(export_files: &[String], max_samples: usize, rng: &mut R) -> Corpus {
    let title_re =
        Regex::new(r"(?s)<title>\s*<!\[CDATA\[\s*(.+?)\s*\]\]>\s*</title>").unwrap();
    let content_re =
        Regex::new(r"(?s)<content:encoded>\s*<!\[CDATA\[\s*(.*?)\s*\]\]>\s*</content:encoded>")
            .unwrap();
    let item_re = Regex::new(r"(?s)<item>(.*?)</item>").unwrap();

    let mut titles = Vec::new();
    let mut samples = Vec::new();
    let mut articles = Vec::new();
    let mut seen_samples = HashSet::new();

    for file in export_files {
        let raw = match fs::read_to_string(file) {
            Ok(raw) => raw,
            Err(_) => {
                log::info!("Export file {} not readable, skipping", file);
                continue;
            }
        };

        for cap in title_re.captures_iter(&raw) {
            let title = cap[1].trim().to_string();
            if !title.is_empty() && title != LEGACY_CHANNEL_TITLE {
                titles.push(title);
            }
        }

        for cap in content_re.captures_iter(&raw) {
            let text = clamp_chars(&plain_text(&cap[1]), STYLE_SAMPLE_MAX_CHARS);
            if text.chars().count() > STYLE_SAMPLE_MIN_CHARS && seen_samples.insert(text.clone()) {
                samples.push(text);
            }
        }

        for cap in item_re.captures_iter(&raw) {
            let item = &cap[1];
            let title = match title_re.captures(item) {
                Some(t) => t[1].trim().to_string(),
                None => continue,
            };
            if title == LEGACY_CHANNEL_TITLE {
                continue;
            }
            let text = match content_re.captures(item) {
                Some(c) => plain_text(&c[1]),
                None => continue,
            };
            if text.chars().count() > 50 {
                articles.push(Article { title, text });
            }
        }
    }

    let style_samples = samples
        .choose_multiple(rng, max_samples)
        .cloned()
        .collect();

    Corpus {
        titles,
        style_samples,
        articles,
    }
}

/// Frontmatter titles from the newest n generated posts, newest first. The
/// date-prefixed filename makes a descending name sort chronological.
pub fn recent_post_titles(posts_dir: &Path, n: usize) -> Vec<String> {
    let title_re = Regex::new(r#"(?m)^title:\s*"((?:\\.|[^"\\])*)""#).unwrap();

    let entries = match fs::read_dir(posts_dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name.ends_with(".md"))
        .collect();
    names.sort();
    names.reverse();

    let mut titles = Vec::new();
    for name in names.into_iter().take(n) {
        let raw = match fs::read_to_string(posts_dir.join(&name)) {
            Ok(raw) => raw,
            Err(_) => continue,
        };
        if let Some(cap) = title_re.captures(&raw) {
            titles.push(cap[1].replace("\\\"", "\"").replace("\\\\", "\\"));
        }
    }
    titles
}

/// Strips markup and HTML entities, collapses whitespace.
fn plain_text(input: &str) -> String {
    let tag_re = Regex::new(r"<[^>]*>").unwrap();
    let space_re = Regex::new(r"\s+").unwrap();

    let mut text = tag_re.replace_all(input, " ").to_string();
    text = text.replace("&nbsp;", " ");
    text = text.replace("&amp;", "&");
    text = text.replace("&lt;", "<");
    text = text.replace("&gt;", ">");
    text = text.replace("&quot;", "\"");
    text = text.replace("&apos;", "'");
    text = text.replace("&#39;", "'");

    space_re.replace_all(&text, " ").trim().to_string()
}

fn clamp_chars(input: &str, max: usize) -> String {
    input.chars().take(max).collect()
}
