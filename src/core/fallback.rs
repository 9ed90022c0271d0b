use crate::core::pipeline::{PipelineOutput, PlanDocument, SeoDocument};
use crate::core::themes::Theme;
use rand::Rng;

/// One canned entry per theme so the fallback can honor whatever theme the
/// balancer picked. Entirely local; never touches the network.
struct ThemeTemplate {
    theme: Theme,
    titles: &'static [&'static str],
    tags: &'static [&'static str],
    body: &'static str,
}

const TEMPLATES: [ThemeTemplate; 6] = [
    ThemeTemplate {
        theme: Theme::Technology,
        titles: &[
            "Coffee by the window, and a digital dawn",
            "Where technology meets the everyday",
            "What the machines are teaching me",
        ],
        tags: &["technology", "thoughts", "digital"],
        body: "## The morning routine\n\n\
My day starts by the window with a cup of coffee, watching the steam rise while \
the phone lights up with its little column of notifications. Behind that small \
screen, a whole world is waiting.\n\n\
Technology has dissolved into our days so completely that we barely notice it \
anymore. The alarm, the weather, the feed over breakfast. We are swimming in a \
digital sea before the coffee is even finished.\n\n\
## Keeping a distance\n\n\
Still, sometimes I stop and wonder what all this convenience is quietly costing \
us. I remember the years of handwritten journals, the drag of the pen, the smell \
of paper. There was a slowness in it that no app has ever given me back. And yet \
I don't hate the speed of now, the way an answer arrives before the question has \
fully formed.\n\n\
What matters, I think, is choosing. Using the tools on purpose instead of being \
used by them, and noticing where that line runs on any given day.\n\n\
## Today's small finding\n\n\
Like the coffee by the window: my pace, my hour, my ritual. Tomorrow I will sit \
here again, and that simple repetition might be the most luxurious technology I \
own.",
    },
    ThemeTemplate {
        theme: Theme::DailyLife,
        titles: &[
            "Inside an ordinary day",
            "The worth of an unremarkable moment",
            "Small surprises hiding in the everyday",
        ],
        tags: &["daily life", "noticing", "lifestyle"],
        body: "## Nothing happened today\n\n\
That was my first thought at the kitchen table tonight. No news, no plans that \
came together or fell apart. Just bread in the morning, a walk at noon, the \
usual emails, the usual light moving across the floor.\n\n\
## Or did it\n\n\
But writing it down, I notice the day was full. The baker remembered my order. \
A stranger's dog leaned against my leg at the crossing as if we were old \
friends. The afternoon smelled like rain that never arrived.\n\n\
An ordinary day is only ordinary if you summarize it. Up close, at the level of \
minutes, it is all texture. I keep relearning this: the diary itself is the \
instrument that makes the ordinary visible.\n\n\
## Before sleep\n\n\
So tonight I am grateful for a day that offered nothing to report and \
everything to notice. Tomorrow will probably be the same, and I hope it is.",
    },
    ThemeTemplate {
        theme: Theme::Culture,
        titles: &[
            "Standing at the crossing point of cultures",
            "What languages carry with them",
            "Learning to see with borrowed eyes",
        ],
        tags: &["culture", "thoughts", "diversity"],
        body: "## A word with no translation\n\n\
A friend taught me a word from her language today, one of those words that takes \
an entire English sentence to approximate and still loses something on the way. \
We laughed at my attempts, but the word stayed with me all evening.\n\n\
## Borrowed eyes\n\n\
Every culture is a set of eyes. Growing up inside one, you mistake its way of \
seeing for seeing itself. Then you travel, or you befriend someone who grew up \
elsewhere, and suddenly the obvious needs explaining. That moment of explaining \
is where I learn the most, about them and about myself in equal measure.\n\n\
Living between places, I have stopped asking which way of seeing is correct. \
The better question is what each one lets you notice that the others miss.\n\n\
## Tonight\n\n\
I wrote the untranslatable word on a sticky note above my desk. Not to use it, \
exactly. Just to remember that my language, too, has edges, and that the world \
continues past them.",
    },
    ThemeTemplate {
        theme: Theme::Philosophy,
        titles: &[
            "Fragments of philosophy from a walking path",
            "What lies beyond the question",
            "A journey through a thought",
        ],
        tags: &["philosophy", "thoughts", "introspection"],
        body: "## The world at my feet\n\n\
On today's walk a small pebble caught my eye, rounded soft by years of water. \
One stone, holding a span of time I can barely imagine, and I stood there on \
the path longer than I mean to admit.\n\n\
Philosophy sounds grand, but I think it mostly lives in moments like this. \
Small noticings, stacked up over a life.\n\n\
## Asking why\n\n\
As children we asked why about everything. Somewhere along the way the asking \
slows down, and I suspect the world fades a little for every why we skip. The \
pebble is just a pebble until you wonder how it came to be so round.\n\n\
I want to keep the asking alive in my days. It is my method for keeping the \
world interesting, and it costs nothing but attention.\n\n\
## Dusk\n\n\
On the way home the sky went orange. Finding that beautiful is its own small \
philosophy. The world shows its secrets to whoever keeps asking, so tomorrow I \
will walk the same path and ask again.",
    },
    ThemeTemplate {
        theme: Theme::Crypto,
        titles: &[
            "The night I dreamed of blockchains",
            "A decentralized kind of future",
            "Digital assets and the shape of trust",
        ],
        tags: &["crypto", "technology", "web3"],
        body: "## A strange dream\n\n\
Last night I dreamed of transparent blocks floating in the air, each one \
chained to the next, and inside them people's promises glowed like small \
lights. I woke up convinced the dream had explained something: that the heart \
of a blockchain is not the technology but a new shape for trust.\n\n\
## The idea of decentralization\n\n\
Spend any time around crypto and you hear the word decentralization until it \
loses meaning. But underneath the jargon is a genuinely old idea, a village \
idea: nobody holds the ledger alone, everybody holds it together. A system \
that works without asking anyone to be the single trusted keeper feels, oddly, \
very human to me.\n\n\
The gap between that ideal and the day-to-day reality of the space is wide, I \
know. Still, the direction of travel gives me something like hope.\n\n\
## Waiting for morning\n\n\
I don't know what this technology will look like when it grows up. Being \
around for the early, unfinished years of something is its own kind of luck. \
Maybe tonight the transparent blocks will come back.",
    },
    ThemeTemplate {
        theme: Theme::Reading,
        titles: &[
            "What a book left behind",
            "Reading as a kind of travel",
            "The pleasure of turning pages",
        ],
        tags: &["reading", "daily life", "learning"],
        body: "## The last page\n\n\
I finished a novel this afternoon and sat for a while with the closed book in \
my lap, the way you linger at a door after saying goodbye. A good book does \
not end when it ends. It keeps unpacking itself for days.\n\n\
## Travel without moving\n\n\
People ask why I read so much when I already live on the move. But reading is \
the one journey where you travel inward and outward at once, wearing another \
person's life like a coat. For three hundred pages I kept someone else's \
memories, feared their fears, and came back to my own chair slightly \
rearranged.\n\n\
That rearrangement is the point, I think. Not information, not even story. \
The quiet shift in how the room looks when you lift your eyes from the page.\n\n\
## Tomorrow's book\n\n\
Tonight I will choose the next one from the shelf, which is its own small \
pleasure, standing there reading first sentences like trying on shoes. The \
stack by my bed never gets shorter, and I have decided that is a sign of a \
life going well.",
    },
];

pub fn generate<R: Rng>(theme: Theme, rng: &mut R) -> PipelineOutput {
    log::info!("Using template fallback for theme '{}'", theme.label());

    let template = TEMPLATES
        .iter()
        .find(|t| t.theme == theme)
        .unwrap_or(&TEMPLATES[0]);
    let title = template.titles[rng.gen_range(0..template.titles.len())].to_string();

    PipelineOutput {
        plan: PlanDocument {
            theme: template.theme,
            topic: title.clone(),
            angle: "the crossing point of the everyday and a fixed idea".to_string(),
            title: title.clone(),
            mood_hint: "reflection".to_string(),
        },
        seo: SeoDocument {
            tags: template.tags.iter().map(|t| t.to_string()).collect(),
            keywords: vec![
                template.theme.label().to_string(),
                "diary".to_string(),
                "Genesis Vault".to_string(),
            ],
            description: format!("{} — a diary entry from Mina Eureka's everyday.", title),
        },
        body: template.body.to_string(),
        agents: None,
    }
}
