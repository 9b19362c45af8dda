//! Immutable story content: chapters, memories, rank titles and the archive.
//!
//! Catalog entries are plain data. Whether a memory is unlocked or which
//! title a rank carries is derived in [`crate::progression`].

use serde::Serialize;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Knight,
    Gunslinger,
    You,
    Narrator,
    Director,
}

impl Speaker {
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::Knight => "THE KNIGHT",
            Speaker::Gunslinger => "THE GUNSLINGER",
            Speaker::You => "YOU",
            Speaker::Narrator => "",
            Speaker::Director => "THE DIRECTOR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DialogueLine {
    pub speaker: Speaker,
    pub text: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chapter {
    pub id: u32,
    pub title: &'static str,
    /// Focus time required to clear the chapter.
    pub focus_minutes: u64,
    pub focus_title: &'static str,
    pub focus_description: &'static str,
    pub lines: &'static [DialogueLine],
}

impl Chapter {
    pub fn focus_secs(&self) -> u64 {
        self.focus_minutes.saturating_mul(60)
    }
}

/// A narrative fragment unlocked by cumulative focus sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Memory {
    pub id: &'static str,
    pub title: &'static str,
    pub content: &'static str,
    pub unlock_threshold: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Figure {
    pub name: &'static str,
    pub role: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Archive {
    pub chronicle: &'static str,
    pub figures: Vec<Figure>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    chapters: Vec<Chapter>,
    memories: Vec<Memory>,
    rank_titles: Vec<&'static str>,
    archive: Archive,
}

impl Catalog {
    /// Build a catalog, rejecting content the controller cannot run.
    ///
    /// # Errors
    /// Fails if there are no chapters or rank titles, or a chapter requires
    /// zero focus minutes.
    pub fn new(
        chapters: Vec<Chapter>,
        memories: Vec<Memory>,
        rank_titles: Vec<&'static str>,
        archive: Archive,
    ) -> Result<Self, ValidationError> {
        if chapters.is_empty() {
            return Err(ValidationError::EmptyCollection("chapters".into()));
        }
        if rank_titles.is_empty() {
            return Err(ValidationError::EmptyCollection("rank titles".into()));
        }
        if let Some(bad) = chapters.iter().find(|c| c.focus_minutes == 0) {
            return Err(ValidationError::InvalidValue {
                field: format!("chapter {}.focus_minutes", bad.id),
                message: "must be positive".into(),
            });
        }
        Ok(Self {
            chapters,
            memories,
            rank_titles,
            archive,
        })
    }

    /// The shipped story.
    pub fn builtin() -> Self {
        Self {
            chapters: CHAPTERS.to_vec(),
            memories: MEMORIES.to_vec(),
            rank_titles: RANK_TITLES.to_vec(),
            archive: Archive {
                chronicle: CHRONICLE,
                figures: FIGURES.to_vec(),
            },
        }
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn last_chapter_index(&self) -> usize {
        self.chapters.len() - 1
    }

    /// The chapter at `index`, clamped into range.
    pub fn chapter(&self, index: usize) -> &Chapter {
        &self.chapters[index.min(self.last_chapter_index())]
    }

    pub fn memories(&self) -> &[Memory] {
        &self.memories
    }

    pub fn rank_titles(&self) -> &[&'static str] {
        &self.rank_titles
    }

    pub fn archive(&self) -> &Archive {
        &self.archive
    }
}

const CHAPTERS: &[Chapter] = &[
    Chapter {
        id: 1,
        title: "Opening Night",
        focus_minutes: 25,
        focus_title: "Hold the Curtain",
        focus_description: "The house lights dim. Keep your attention on the stage until the first act ends.",
        lines: &[
            DialogueLine { speaker: Speaker::Narrator, text: "Rain taps the roof of the abandoned opera house. Someone has lit every candle in the gallery." },
            DialogueLine { speaker: Speaker::Knight, text: "You came. I wagered a rose that you would not." },
            DialogueLine { speaker: Speaker::You, text: "The invitation said the performance could not begin without me." },
            DialogueLine { speaker: Speaker::Knight, text: "Then sit, and do not look away. Beauty punishes the distracted." },
        ],
    },
    Chapter {
        id: 2,
        title: "A Bullet in the Wings",
        focus_minutes: 25,
        focus_title: "Steady Hands",
        focus_description: "A shot rang out backstage. Stay still and listen for the second one.",
        lines: &[
            DialogueLine { speaker: Speaker::Gunslinger, text: "Evening, partner. Mind the glass, somebody got careless with the chandelier." },
            DialogueLine { speaker: Speaker::You, text: "Was that you firing just now?" },
            DialogueLine { speaker: Speaker::Gunslinger, text: "If it were me, you would not have heard a miss." },
            DialogueLine { speaker: Speaker::Narrator, text: "Somewhere above the stage, a rope creaks under a weight that should not be there." },
        ],
    },
    Chapter {
        id: 3,
        title: "The Director's Ledger",
        focus_minutes: 30,
        focus_title: "Read Between the Lines",
        focus_description: "The ledger lists every actor who never returned. Study it without blinking.",
        lines: &[
            DialogueLine { speaker: Speaker::Director, text: "Every name in this book once took a bow on my stage." },
            DialogueLine { speaker: Speaker::Knight, text: "And every one of them left it in a coffin." },
            DialogueLine { speaker: Speaker::Director, text: "Art demands an audience that stays until the end. I merely enforce the house rules." },
        ],
    },
    Chapter {
        id: 4,
        title: "Thorns and Powder",
        focus_minutes: 30,
        focus_title: "Between Two Duels",
        focus_description: "The knight and the gunslinger circle each other. Do not let either of them see you waver.",
        lines: &[
            DialogueLine { speaker: Speaker::Gunslinger, text: "Flowers and speeches. You fight like you are auditioning." },
            DialogueLine { speaker: Speaker::Knight, text: "And you like a man who has forgotten anyone is watching." },
            DialogueLine { speaker: Speaker::You, text: "Enough. The Director wants us divided. Look at the box seats." },
            DialogueLine { speaker: Speaker::Narrator, text: "In the darkened balcony, a single opera glass catches the candlelight." },
        ],
    },
    Chapter {
        id: 5,
        title: "Final Curtain",
        focus_minutes: 45,
        focus_title: "The Last Act",
        focus_description: "The house is burning and the play is not finished. Stay until the final line.",
        lines: &[
            DialogueLine { speaker: Speaker::Director, text: "No encore? A pity. You were my most attentive guest." },
            DialogueLine { speaker: Speaker::Gunslinger, text: "Curtain's coming down, boss. Your stage, your funeral." },
            DialogueLine { speaker: Speaker::Knight, text: "A rose for the audience, then. They earned it." },
            DialogueLine { speaker: Speaker::Narrator, text: "The applause you hear is only the rain. It is enough." },
        ],
    },
];

const MEMORIES: &[Memory] = &[
    Memory {
        id: "first-rose",
        title: "The First Rose",
        content: "Before the knight swore any oath, they were a stagehand who kept the flowers fresh for actors who never thanked them.",
        unlock_threshold: 1,
    },
    Memory {
        id: "spent-casing",
        title: "A Spent Casing",
        content: "The gunslinger keeps one brass casing on a chain. It is from the only shot he ever regretted.",
        unlock_threshold: 2,
    },
    Memory {
        id: "empty-seat",
        title: "Row F, Seat 12",
        content: "The Director reserves the same seat for every performance. No one has sat in it for thirty years.",
        unlock_threshold: 4,
    },
    Memory {
        id: "rewritten-script",
        title: "The Rewritten Script",
        content: "The original ending had no fire. Someone crossed it out in red ink the night the theatre closed.",
        unlock_threshold: 6,
    },
    Memory {
        id: "your-name",
        title: "Your Name on the Playbill",
        content: "Your name was printed on the very first playbill, under a role that had not yet been written.",
        unlock_threshold: 10,
    },
];

const RANK_TITLES: &[&str] = &[
    "Empty Seat",
    "Late Arrival",
    "Attentive Guest",
    "Season Ticket",
    "Box Seat Regular",
    "Understudy",
    "Stagehand of Thorns",
    "Leading Role",
    "Keeper of the Final Curtain",
];

const CHRONICLE: &str = "The Crimson Opera closed the night its director vanished mid-performance. Decades later the candles are lit again, and the play resumes for anyone who will watch without looking away.";

const FIGURES: &[Figure] = &[
    Figure {
        name: "The Knight",
        role: "Defender of Beauty",
        description: "A duelist who fights with a lance and a bouquet, and believes attention is the highest form of devotion.",
    },
    Figure {
        name: "The Gunslinger",
        role: "Hired Gun",
        description: "A drifter with a cybernetic arm and no patience for theatre, paid to make sure the show ends.",
    },
    Figure {
        name: "The Director",
        role: "Master of the House",
        description: "The vanished owner of the Crimson Opera. His voice still gives the cues.",
    },
];
