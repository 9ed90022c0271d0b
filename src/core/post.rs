use crate::core::pipeline::AgentAttribution;
use anyhow::Result;
use chrono::NaiveDate;
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};

const MOODS: [&str; 10] = ["🌿", "💭", "📖", "✨", "🌸", "🍃", "🔥", "🌊", "🌙", "☕"];
const WEATHERS: [&str; 8] = ["☀️", "☁️", "🌧️", "🌤️", "⛅", "🌈", "❄️", "🌬️"];

/// The unit of persistence. Immutable once written.
#[derive(Debug, Clone)]
pub struct Post {
    pub title: String,
    pub date: NaiveDate,
    pub mood: String,
    pub weather: String,
    pub tags: Vec<String>,
    pub description: String,
    pub keywords: Vec<String>,
    pub agents: Option<AgentAttribution>,
    pub body: String,
}

/// Mood field from the plan's hint: known hints map to a fixed emoji, anything
/// else gets a random one, and a blank hint becomes "reflection".
pub fn mood_for_hint<R: Rng>(hint: &str, rng: &mut R) -> String {
    let hint = hint.trim();
    let emoji = match hint {
        "stillness" => "📖",
        "reflection" => "💭",
        "peace" => "🌿",
        "discovery" => "✨",
        "passion" => "🔥",
        _ => MOODS[rng.gen_range(0..MOODS.len())],
    };
    let label = if hint.is_empty() { "reflection" } else { hint };
    format!("{} {}", emoji, label)
}

pub fn random_weather<R: Rng>(rng: &mut R) -> String {
    WEATHERS[rng.gen_range(0..WEATHERS.len())].to_string()
}

/// Strips accidental code-fence wrapping and a duplicated leading frontmatter
/// block that upstream stages sometimes emit.
pub fn normalize_body(raw: &str) -> String {
    let mut body = raw.trim().to_string();

    for fence in ["```markdown\n", "```md\n", "```\n"] {
        if let Some(rest) = body.strip_prefix(fence) {
            body = rest.to_string();
            break;
        }
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest.trim_end().to_string();
    }
    body = body.trim().to_string();

    if body.starts_with("---") {
        if let Some(end) = body[3..].find("---") {
            body = body[3 + end + 3..].trim().to_string();
        }
    }

    body
}

fn escape_quotes(text: &str) -> String {
    text.replace('"', "\\\"")
}

fn quoted_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("\"{}\"", escape_quotes(v)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Frontmatter with fixed field order, blank line, then the body.
pub fn render(post: &Post) -> String {
    let mut out = String::new();
    out.push_str("---\n");
    out.push_str(&format!("title: \"{}\"\n", escape_quotes(&post.title)));
    out.push_str(&format!("date: {}\n", post.date.format("%Y-%m-%d")));
    out.push_str(&format!("mood: \"{}\"\n", escape_quotes(&post.mood)));
    out.push_str(&format!("weather: \"{}\"\n", post.weather));
    out.push_str(&format!("tags: [{}]\n", quoted_list(&post.tags)));
    out.push_str(&format!(
        "description: \"{}\"\n",
        escape_quotes(&post.description)
    ));
    out.push_str(&format!("keywords: [{}]\n", quoted_list(&post.keywords)));
    if let Some(agents) = &post.agents {
        out.push_str("agents:\n");
        out.push_str(&format!("  ceo: \"{}\"\n", agents.ceo));
        out.push_str(&format!("  seo: \"{}\"\n", agents.seo));
        out.push_str(&format!("  writer: \"{}\"\n", agents.writer));
        out.push_str(&format!("  editor: \"{}\"\n", agents.editor));
    }
    out.push_str("---\n\n");
    out.push_str(&post.body);
    out.push('\n');
    out
}

fn random_slug<R: Rng>(rng: &mut R) -> String {
    const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    (0..6)
        .map(|_| CHARS[rng.gen_range(0..CHARS.len())] as char)
        .collect()
}

/// Whole-file write of `<date>-post-<slug>.md` under the posts directory,
/// creating it if absent. Slug randomness is the only collision guard; two
/// runs on the same date produce two distinct files.
pub fn write_post<R: Rng>(posts_dir: &Path, post: &Post, rng: &mut R) -> Result<PathBuf> {
    fs::create_dir_all(posts_dir)?;
    let filename = format!(
        "{}-post-{}.md",
        post.date.format("%Y-%m-%d"),
        random_slug(rng)
    );
    let path = posts_dir.join(filename);
    fs::write(&path, render(post))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::corpus::recent_post_titles;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use regex::Regex;

    fn sample_post() -> Post {
        Post {
            title: "A quiet afternoon".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 8, 30).unwrap(),
            mood: "💭 reflection".to_string(),
            weather: "☀️".to_string(),
            tags: vec!["daily life".to_string(), "noticing".to_string()],
            description: "An entry about nothing in particular.".to_string(),
            keywords: vec!["diary".to_string()],
            agents: Some(AgentAttribution::pipeline()),
            body: "## Section\n\nBody text.".to_string(),
        }
    }

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "scribe-{}-{}-{}",
            tag,
            std::process::id(),
            rand::thread_rng().gen::<u32>()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn normalize_body_strips_code_fences() {
        assert_eq!(
            normalize_body("```markdown\n## Hi\n\ntext\n```"),
            "## Hi\n\ntext"
        );
        assert_eq!(normalize_body("```\ntext\n```"), "text");
        assert_eq!(normalize_body("plain text"), "plain text");
    }

    #[test]
    fn normalize_body_strips_duplicated_frontmatter() {
        let raw = "---\ntitle: \"sneaky\"\n---\n\n## Actual body\n\ntext";
        assert_eq!(normalize_body(raw), "## Actual body\n\ntext");
    }

    #[test]
    fn render_uses_fixed_field_order() {
        let content = render(&sample_post());
        let order = [
            "title:", "date:", "mood:", "weather:", "tags:", "description:", "keywords:",
            "agents:",
        ];
        let mut last = 0;
        for field in order {
            let pos = content.find(field).unwrap_or_else(|| panic!("missing {}", field));
            assert!(pos > last || last == 0, "{} out of order", field);
            last = pos;
        }
        assert!(content.contains("tags: [\"daily life\", \"noticing\"]"));
        assert!(content.contains("  writer: \"VE-002\"\n"));
        assert!(content.contains("---\n\n## Section"));
    }

    #[test]
    fn render_omits_agents_block_when_absent() {
        let mut post = sample_post();
        post.agents = None;
        assert!(!render(&post).contains("agents:"));
    }

    #[test]
    fn quoted_titles_escape_and_round_trip() {
        let mut post = sample_post();
        post.title = "She said \"stay curious\"".to_string();
        let content = render(&post);
        assert!(content.contains("title: \"She said \\\"stay curious\\\"\"\n"));

        let dir = temp_dir("roundtrip");
        let mut rng = StdRng::seed_from_u64(21);
        write_post(&dir, &post, &mut rng).unwrap();
        let titles = recent_post_titles(&dir, 5);
        assert_eq!(titles, vec!["She said \"stay curious\""]);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn write_post_creates_dir_and_dated_slug_filename() {
        let dir = temp_dir("write").join("nested/posts");
        let mut rng = StdRng::seed_from_u64(22);
        let path = write_post(&dir, &sample_post(), &mut rng).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        let pattern = Regex::new(r"^2026-08-30-post-[a-z0-9]{6}\.md$").unwrap();
        assert!(pattern.is_match(&name), "unexpected filename {}", name);

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("---\n"));
        fs::remove_dir_all(dir.parent().unwrap()).unwrap();
    }

    #[test]
    fn two_writes_on_the_same_date_produce_distinct_files() {
        let dir = temp_dir("distinct");
        let mut rng = StdRng::seed_from_u64(23);
        let a = write_post(&dir, &sample_post(), &mut rng).unwrap();
        let b = write_post(&dir, &sample_post(), &mut rng).unwrap();
        assert_ne!(a, b);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn mood_hint_mapping() {
        let mut rng = StdRng::seed_from_u64(24);
        assert_eq!(mood_for_hint("stillness", &mut rng), "📖 stillness");
        assert_eq!(mood_for_hint("passion", &mut rng), "🔥 passion");
        let blank = mood_for_hint("", &mut rng);
        assert!(blank.ends_with(" reflection"));
        let unknown = mood_for_hint("weird", &mut rng);
        assert!(unknown.ends_with(" weird"));
    }
}
