use rand::Rng;
use std::collections::HashMap;

/// Topic categories the blog rotates through. Order matters: `classify` is
/// first-match-wins over this enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Theme {
    Technology,
    DailyLife,
    Culture,
    Philosophy,
    Crypto,
    Reading,
}

impl Theme {
    pub const ALL: [Theme; 6] = [
        Theme::Technology,
        Theme::DailyLife,
        Theme::Culture,
        Theme::Philosophy,
        Theme::Crypto,
        Theme::Reading,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Technology => "technology",
            Theme::DailyLife => "daily life",
            Theme::Culture => "culture",
            Theme::Philosophy => "philosophy",
            Theme::Crypto => "crypto",
            Theme::Reading => "reading",
        }
    }

    /// Lowercase substrings that pull a text into this bucket.
    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Theme::Technology => &[
                "technology", "tech", "digital", "software", "machine learning",
                "robot", "internet", "gadget", "algorithm",
            ],
            Theme::DailyLife => &[
                "daily", "morning", "coffee", "routine", "walk", "weekend",
                "everyday", "ordinary", "kitchen",
            ],
            Theme::Culture => &[
                "culture", "music", "film", "museum", "language", "tradition",
                "festival", "travel",
            ],
            Theme::Philosophy => &[
                "philosophy", "philosoph", "meaning", "question", "thought",
                "stillness", "existence", "mind",
            ],
            Theme::Crypto => &[
                "crypto", "bitcoin", "blockchain", "web3", "token", "defi",
                "wallet", "decentral",
            ],
            Theme::Reading => &[
                "reading", "book", "novel", "library", "bookshelf", "chapter",
                "essay",
            ],
        }
    }
}

/// Occurrence counts per theme for one corpus.
#[derive(Debug, Clone, Default)]
pub struct ThemeCount {
    counts: HashMap<Theme, u32>,
}

impl ThemeCount {
    pub fn get(&self, theme: Theme) -> u32 {
        self.counts.get(&theme).copied().unwrap_or(0)
    }

    pub fn bump(&mut self, theme: Theme) {
        *self.counts.entry(theme).or_insert(0) += 1;
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }
}

/// Returns the first theme (in enumeration order) with any keyword substring
/// match, or `None`. A text carries at most one label.
pub fn classify(text: &str) -> Option<Theme> {
    let lowered = text.to_lowercase();
    Theme::ALL
        .iter()
        .copied()
        .find(|theme| theme.keywords().iter().any(|kw| lowered.contains(kw)))
}

pub fn tally<I, S>(texts: I) -> ThemeCount
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts = ThemeCount::default();
    for text in texts {
        if let Some(theme) = classify(text.as_ref()) {
            counts.bump(theme);
        }
    }
    counts
}

/// Weighted usage scores, lowest (least used) first. Recent posts weigh three
/// times as much as the legacy export.
pub fn build_priority(legacy: &ThemeCount, recent: &ThemeCount) -> Vec<(Theme, u32)> {
    let mut priority: Vec<(Theme, u32)> = Theme::ALL
        .iter()
        .map(|&theme| (theme, recent.get(theme) * 3 + legacy.get(theme)))
        .collect();
    priority.sort_by_key(|&(_, score)| score);
    priority
}

/// Picks today's theme from the lowest-score tier. A singleton lowest tier is
/// widened with the next tier so one uniquely exhausted theme does not pin
/// every following run to itself.
pub fn select_theme<R: Rng>(priority: &[(Theme, u32)], rng: &mut R) -> Theme {
    if priority.is_empty() {
        return Theme::ALL[rng.gen_range(0..Theme::ALL.len())];
    }

    let lowest = priority[0].1;
    let mut candidates: Vec<Theme> = priority
        .iter()
        .filter(|&&(_, score)| score == lowest)
        .map(|&(theme, _)| theme)
        .collect();

    if candidates.len() == 1 && priority.len() > 1 {
        if let Some(next) = priority
            .iter()
            .map(|&(_, score)| score)
            .find(|&score| score > lowest)
        {
            candidates.extend(
                priority
                    .iter()
                    .filter(|&&(_, score)| score == next)
                    .map(|&(theme, _)| theme),
            );
        }
    }

    candidates[rng.gen_range(0..candidates.len())]
}
