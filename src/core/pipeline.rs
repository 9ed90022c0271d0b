use crate::core::corpus::Corpus;
use crate::core::llm::{ResilientCaller, TextBackend};
use crate::core::themes::Theme;
use anyhow::{bail, Result};
use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Persona shared by every stage prompt.
const PERSONA: &str = "You are Mina Eureka Ernst, author of the personal blog Genesis Vault. \
You are a digital nomad in your late twenties, curious and well-read, writing about \
technology, philosophy, crypto, the beauty of the everyday, culture, and books from \
your own point of view. Your register is a soft diary voice that speaks directly to \
the reader: first person, reflective, warm, never lecturing.";

pub const AGENT_CEO: &str = "VE-001";
pub const AGENT_SEO: &str = "VE-003";
pub const AGENT_WRITER: &str = "VE-002";
pub const AGENT_EDITOR: &str = "VE-006";

/// Planning output. The theme is stamped in by the balancer before any model
/// call and no response field can replace it.
#[derive(Debug, Clone)]
pub struct PlanDocument {
    pub theme: Theme,
    pub topic: String,
    pub angle: String,
    pub title: String,
    pub mood_hint: String,
}

#[derive(Debug, Clone)]
pub struct SeoDocument {
    pub tags: Vec<String>,
    pub keywords: Vec<String>,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct AgentAttribution {
    pub ceo: String,
    pub seo: String,
    pub writer: String,
    pub editor: String,
}

impl AgentAttribution {
    pub fn pipeline() -> Self {
        Self {
            ceo: AGENT_CEO.to_string(),
            seo: AGENT_SEO.to_string(),
            writer: AGENT_WRITER.to_string(),
            editor: AGENT_EDITOR.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub plan: PlanDocument,
    pub seo: SeoDocument,
    pub body: String,
    pub agents: Option<AgentAttribution>,
}

// Stage responses; no theme field on purpose, a conflicting value from the
// model is dropped at parse time.
#[derive(Debug, Deserialize, Default)]
struct PlanResponse {
    #[serde(default)]
    topic: String,
    #[serde(default)]
    angle: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    mood_hint: String,
}

#[derive(Debug, Deserialize, Default)]
struct SeoResponse {
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    description: String,
}

/// Runs Plan → Seo → Draft → Edit. Structured stages substitute static
/// defaults on failure; an empty draft aborts the whole pipeline so the
/// caller can fall back to templates.
pub async fn run<B: TextBackend, R: Rng>(
    caller: &ResilientCaller<B>,
    theme: Theme,
    corpus: &Corpus,
    today: NaiveDate,
    rng: &mut R,
) -> Result<PipelineOutput> {
    let plan = plan_stage(caller, theme, corpus, today, rng).await;
    log::info!(
        "[{}] plan: theme={} topic={} title={}",
        AGENT_CEO,
        plan.theme.label(),
        plan.topic,
        plan.title
    );

    let seo = seo_stage(caller, &plan).await;
    log::info!(
        "[{}] seo: tags={:?} keywords={:?}",
        AGENT_SEO,
        seo.tags,
        seo.keywords
    );

    let draft = draft_stage(caller, &plan, &seo, corpus).await?;
    log::info!("[{}] draft complete ({} chars)", AGENT_WRITER, draft.chars().count());

    let body = edit_stage(caller, &plan, &seo, &draft).await;
    log::info!("[{}] edit complete ({} chars)", AGENT_EDITOR, body.chars().count());

    Ok(PipelineOutput {
        plan,
        seo,
        body,
        agents: Some(AgentAttribution::pipeline()),
    })
}

async fn plan_stage<B: TextBackend, R: Rng>(
    caller: &ResilientCaller<B>,
    theme: Theme,
    corpus: &Corpus,
    today: NaiveDate,
    rng: &mut R,
) -> PlanDocument {
    let sample_titles = corpus
        .titles
        .choose_multiple(rng, 10)
        .map(|t| format!("- {}", t))
        .collect::<Vec<_>>()
        .join("\n");
    let samples = numbered_samples(&corpus.style_samples);

    let prompt = format!(
        "{persona}\n\n\
        You are the planning desk for the next diary entry of Genesis Vault.\n\
        Today's theme is already fixed: {theme}. Do not change it.\n\
        Decide the concrete topic, the angle, and a short appealing title within that theme.\n\n\
        Past post titles:\n{titles}\n\n\
        Past style samples:\n{samples}\n\n\
        Today is {date}.\n\n\
        Reply with this JSON object and nothing else:\n\
        {{\n\
          \"topic\": \"the concrete topic, e.g. what my morning coffee has in common with consensus\",\n\
          \"angle\": \"one or two sentences describing the unique point of view\",\n\
          \"title\": \"the diary title, short and evocative\",\n\
          \"mood_hint\": \"one of: stillness, reflection, peace, discovery, passion\"\n\
        }}",
        persona = PERSONA,
        theme = theme.label(),
        titles = sample_titles,
        samples = samples,
        date = today.format("%Y-%m-%d"),
    );

    let parsed: Option<PlanResponse> = match caller.generate(&prompt).await {
        Some(raw) => parse_stage_json(&raw),
        None => None,
    };

    match parsed {
        Some(resp) if !resp.title.trim().is_empty() => PlanDocument {
            theme,
            topic: resp.topic,
            angle: resp.angle,
            title: resp.title,
            mood_hint: resp.mood_hint,
        },
        _ => {
            log::warn!("[{}] plan stage fell back to static defaults", AGENT_CEO);
            PlanDocument {
                theme,
                topic: "small discoveries hiding in the everyday".to_string(),
                angle: "pulling a quiet philosophical question out of an ordinary moment"
                    .to_string(),
                title: "Thoughts from a quiet afternoon".to_string(),
                mood_hint: "reflection".to_string(),
            }
        }
    }
}

async fn seo_stage<B: TextBackend>(
    caller: &ResilientCaller<B>,
    plan: &PlanDocument,
) -> SeoDocument {
    let prompt = format!(
        "{persona}\n\n\
        You are the SEO desk for Genesis Vault. Produce metadata for this entry plan.\n\n\
        Plan:\n\
        - theme: {theme}\n\
        - topic: {topic}\n\
        - title: {title}\n\
        - angle: {angle}\n\n\
        Reply with this JSON object and nothing else:\n\
        {{\n\
          \"tags\": [\"tag1\", \"tag2\", \"tag3\", \"tag4\", \"tag5\"],\n\
          \"keywords\": [\"seo keyword 1\", \"seo keyword 2\", \"seo keyword 3\"],\n\
          \"description\": \"meta description, at most 120 characters, concise and inviting\"\n\
        }}",
        persona = PERSONA,
        theme = plan.theme.label(),
        topic = plan.topic,
        title = plan.title,
        angle = plan.angle,
    );

    let parsed: Option<SeoResponse> = match caller.generate(&prompt).await {
        Some(raw) => parse_stage_json(&raw),
        None => None,
    };

    let fallback = default_seo(plan);
    match parsed {
        Some(resp) => {
            let tags = non_empty(resp.tags);
            let keywords = non_empty(resp.keywords);
            let description = resp.description.trim().to_string();
            SeoDocument {
                tags: if tags.is_empty() { fallback.tags } else { tags },
                keywords: if keywords.is_empty() {
                    fallback.keywords
                } else {
                    keywords
                },
                description: if description.is_empty() {
                    fallback.description
                } else {
                    clamp_chars(&description, 120)
                },
            }
        }
        None => {
            log::warn!("[{}] seo stage fell back to static defaults", AGENT_SEO);
            fallback
        }
    }
}

async fn draft_stage<B: TextBackend>(
    caller: &ResilientCaller<B>,
    plan: &PlanDocument,
    seo: &SeoDocument,
    corpus: &Corpus,
) -> Result<String> {
    let samples = numbered_samples(&corpus.style_samples);
    let prompt = format!(
        "{persona}\n\n\
        You are the writing desk for Genesis Vault. Write the diary entry for this plan.\n\n\
        Plan:\n\
        - theme: {theme}\n\
        - topic: {topic}\n\
        - title: {title}\n\
        - angle: {angle}\n\
        - mood: {mood}\n\n\
        SEO keywords to weave in naturally: {keywords}\n\n\
        Past style samples for reference:\n{samples}\n\n\
        Writing rules:\n\
        1. Length: between 1000 and 2000 characters.\n\
        2. Soft diary register, first person, addressed to the reader.\n\
        3. Structure: opening, two or three sections under Markdown h2 (##), short closing.\n\
        4. Use concrete episodes and imagery, not abstractions.\n\
        5. Output the body only. No title, no frontmatter.",
        persona = PERSONA,
        theme = plan.theme.label(),
        topic = plan.topic,
        title = plan.title,
        angle = plan.angle,
        mood = plan.mood_hint,
        keywords = seo.keywords.join(", "),
        samples = samples,
    );

    match caller.generate(&prompt).await {
        Some(draft) => Ok(draft),
        None => bail!("writer stage produced no draft"),
    }
}

async fn edit_stage<B: TextBackend>(
    caller: &ResilientCaller<B>,
    plan: &PlanDocument,
    seo: &SeoDocument,
    draft: &str,
) -> String {
    let prompt = format!(
        "{persona}\n\n\
        You are the editing desk for Genesis Vault. Revise this diary entry.\n\n\
        Title: {title}\n\
        Expected mood: {mood}\n\n\
        Draft:\n{draft}\n\n\
        Checklist:\n\
        1. Voice consistent with the persona.\n\
        2. Length between 1000 and 2000 characters; trim overruns.\n\
        3. Typos and grammar.\n\
        4. Section structure stays readable.\n\
        5. SEO keywords ({keywords}) remain woven in naturally.\n\
        6. Smooth out phrasing that sounds machine-written.\n\n\
        Output the revised body only, as Markdown. No title, no frontmatter, no notes.",
        persona = PERSONA,
        title = plan.title,
        mood = plan.mood_hint,
        draft = draft,
        keywords = seo.keywords.join(", "),
    );

    match caller.generate(&prompt).await {
        Some(edited) if edited.trim().chars().count() >= 10 => edited,
        Some(_) => {
            log::warn!("[{}] edit returned near-empty text, keeping draft", AGENT_EDITOR);
            draft.to_string()
        }
        None => {
            log::warn!("[{}] edit stage failed, keeping draft", AGENT_EDITOR);
            draft.to_string()
        }
    }
}

fn default_seo(plan: &PlanDocument) -> SeoDocument {
    SeoDocument {
        tags: vec![
            plan.theme.label().to_string(),
            "diary".to_string(),
            "reflection".to_string(),
        ],
        keywords: vec![plan.theme.label().to_string(), plan.topic.clone()],
        description: clamp_chars(
            &format!(
                "{} — Mina Eureka's diary on {}.",
                plan.title,
                plan.theme.label()
            ),
            120,
        ),
    }
}

fn non_empty(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

fn clamp_chars(input: &str, max: usize) -> String {
    input.chars().take(max).collect()
}

fn numbered_samples(samples: &[String]) -> String {
    if samples.is_empty() {
        return "(no samples available)".to_string();
    }
    samples
        .iter()
        .enumerate()
        .map(|(i, s)| format!("[sample {}]\n{}", i + 1, s))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// First balanced `{...}` span in free-form text, tolerant of surrounding
/// prose and of braces inside JSON strings.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let bytes = raw.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_stage_json<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let span = extract_json_object(raw)?;
    serde_json::from_str(span).ok()
}
