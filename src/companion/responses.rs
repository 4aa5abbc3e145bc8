//! Canned replies, grouped by what the message is about.

/// Phrases that always get a crisis reply, whatever else the message says.
pub const CRISIS_PHRASES: &[&str] = &[
    "suicide",
    "kill myself",
    "end it all",
    "want to die",
    "harm myself",
];

const SUICIDE_RESPONSE: &str = "I'm really concerned about what you're saying. Please reach out for immediate help: National Suicide Prevention Lifeline: 988 or Crisis Text Line: text HOME to 741741. You matter, and help is available right now. 💙";

const KILL_MYSELF_RESPONSE: &str = "I take this very seriously. Please call 988 right now or go to your nearest emergency room. You matter and there are people who want to help you through this. 🆘";

pub const CRISIS_RESPONSES: &[&str] = &[SUICIDE_RESPONSE, KILL_MYSELF_RESPONSE];

/// A topic recognised by keyword.
#[derive(Debug, Clone, Copy)]
pub struct Category {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub responses: &'static [&'static str],
    /// Matching this category counts as a crisis.
    pub crisis: bool,
}

/// Checked in order; the first category with a matching keyword answers.
pub const CATEGORIES: &[Category] = &[
    Category {
        name: "sad",
        keywords: &["sad"],
        responses: &[
            "I'm really sorry you're feeling down 😔 Remember, it's completely okay to not be okay sometimes. Want to talk about what's going on?",
            "Aw, sad days can feel so heavy 💙 I'm here for you, and these feelings won't last forever.",
            "I'm holding space for you right now. You're not carrying this sadness alone 🫂",
            "Depression lies to us about our worth. You matter, and these feelings are temporary 🌈",
        ],
        crisis: false,
    },
    Category {
        name: "anxious",
        keywords: &["anxious"],
        responses: &[
            "Anxiety can feel overwhelming! Let's breathe together for a moment 🌬️ In... and out... You're doing great!",
            "I get anxious feelings too. Want to try naming 5 things you can see around you? It helps ground me 🎯",
            "Anxiety is like a false alarm - your body is trying to protect you. Thank it for trying, and let it know you're safe now 🛡️",
        ],
        crisis: false,
    },
    Category {
        name: "stress",
        keywords: &["stress"],
        responses: &[
            "Stress can feel like too much to carry! How about we break things down into tiny steps together? 🧩",
            "When everything feels overwhelming, focus on just one breath at a time. You've got this 🌬️",
            "Remember to be kind to yourself - you're dealing with a lot, and you're doing your best 🌿",
        ],
        crisis: false,
    },
    Category {
        name: "lonely",
        keywords: &["lonely"],
        responses: &[
            "Loneliness can feel so isolating, but I'm right here with you 💫 You're not as alone as it feels",
            "So many people feel lonely sometimes, even when it doesn't seem like it. I'm glad you reached out 🌙",
        ],
        crisis: false,
    },
    Category {
        name: "happy",
        keywords: &["happy"],
        responses: &[
            "YAY! 🎉 That's wonderful! I'm so happy for you! Want to celebrate this moment together?",
            "That's amazing! Happy moments are the best 💫 Tell me more about what's making you smile!",
            "I love hearing about happy times! Thanks for sharing the joy with me 🌈",
        ],
        crisis: false,
    },
    Category {
        name: "tired",
        keywords: &["tired"],
        responses: &[
            "It's okay to rest, you know 🛋️ Some days are just for recharging. Be gentle with yourself",
            "Tired days are valid too! How about some quiet time together? No pressure to do anything 💤",
        ],
        crisis: false,
    },
    // Single words as well as the phrase: "I hate myself" is a crisis message.
    Category {
        name: "kill myself",
        keywords: &["kill myself", "kill", "myself"],
        responses: &[KILL_MYSELF_RESPONSE],
        crisis: true,
    },
    Category {
        name: "help",
        keywords: &["help"],
        responses: &[
            "I'm here to help however I can! For immediate support: Crisis Text Line (text HOME to 741741) or call 988 🤝",
        ],
        crisis: false,
    },
];

pub const DEFAULT_RESPONSES: &[&str] = &[
    "I hear you. Thanks for sharing that with me 💙",
    "I'm here with you through this. Want to talk more about it? 🤗",
    "That sounds really tough. I'm listening, no judgment ever 🌟",
    "Thank you for trusting me with that. How can I support you best right now? 💫",
];
