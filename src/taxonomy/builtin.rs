//! Built-in taxonomy: synthetic telecoms customer complaints.
//!
//! Urgency (skewed 35/40/25) by emotion (uniform) forms a 3x3 grid. Scenarios are
//! restricted to the urgency levels where they make sense.

use super::{Affinity, Axis, DivergenceNotes, PrimaryAxes, Taxonomy};

const LEVELS: [&str; 3] = ["Low", "Medium", "High"];

pub const SCENARIOS: [&str; 8] = [
    "Billing overcharge / unexpected fees",
    "Network outage / poor coverage",
    "Contract dispute / early termination fee",
    "Slow or unreliable internet speed",
    "Rude or unhelpful customer service",
    "Porting / number transfer issues",
    "Roaming charges / international billing",
    "Service cancellation difficulty",
];

pub const STYLES: [&str; 5] = [
    "Formal professional",
    "Casual conversational",
    "Angry and blunt",
    "Passive-aggressive / sarcastic",
    "Non-native English",
];

pub const CHANNELS: [&str; 4] = ["Email", "Live chat", "Online form", "Social media"];

pub const CUSTOMER_PROFILES: [&str; 6] = [
    "Long-standing customer",
    "New customer",
    "Small business owner",
    "Elderly customer",
    "Student on a budget",
    "Customer in a vulnerable situation",
];

pub const COMPLAINT_HISTORY: [&str; 4] = [
    "First contact about this issue",
    "Second contact, previous reply unhelpful",
    "Multiple prior contacts with no resolution",
    "Previously escalated, still unresolved",
];

fn urgency() -> Axis {
    Axis::new("urgency", &LEVELS)
        .with_weights(&[0.35, 0.40, 0.25])
        .ordinal()
        .with_description(
            "Low",
            "Minor inconvenience, no financial or service impact, can wait for resolution \
             (e.g., a small billing query, cosmetic app issue).",
        )
        .with_description(
            "Medium",
            "Noticeable disruption but not critical, moderate financial impact or partial \
             service loss (e.g., intermittent connectivity, unexpected charge under £50).",
        )
        .with_description(
            "High",
            "Severe impact: complete service loss, significant financial harm, \
             legal/regulatory implications, or safety concern (e.g., total network outage \
             for days, hundreds overcharged, number ported without consent).",
        )
}

fn emotion() -> Axis {
    Axis::new("emotion", &LEVELS)
        .ordinal()
        .with_description(
            "Low",
            "Calm, factual, neutral tone. No exclamation marks, no capitalised words for \
             emphasis, no strong adjectives. Plain and matter-of-fact.",
        )
        .with_description(
            "Medium",
            "Noticeably frustrated or disappointed. Some emotional language like 'really \
             frustrating' or 'quite disappointed'. Occasional exclamation marks, tone firm \
             but still measured.",
        )
        .with_description(
            "High",
            "Angry, distressed, or exasperated. Use CAPITALISED WORDS for emphasis, multiple \
             exclamation marks (!! or !!!), bold demands for escalation and emotionally \
             charged language. The complaint should visually look intense.",
        )
}

fn scenario() -> Axis {
    let affinity = Affinity::new("urgency")
        .allow(SCENARIOS[0], &["Low", "Medium", "High"])
        .allow(SCENARIOS[1], &["Medium", "High"])
        .allow(SCENARIOS[2], &["Medium", "High"])
        .allow(SCENARIOS[3], &["Low", "Medium"])
        .allow(SCENARIOS[4], &["Low", "Medium"])
        .allow(SCENARIOS[5], &["Medium", "High"])
        .allow(SCENARIOS[6], &["Low", "Medium", "High"])
        .allow(SCENARIOS[7], &["Low", "Medium", "High"]);
    Axis::new("scenario", &SCENARIOS).with_affinity(affinity)
}

const INSTRUCTIONS: [&str; 3] = [
    "You are a complaint-writing assistant. Your task is to produce realistic customer \
     complaints addressed to a telecoms provider, as if submitted via email, online form, \
     or live chat. Write only the complaint text: no labels, headings, metadata, or \
     preamble. Vary the length naturally. Use realistic but varied customer names, or omit \
     the name entirely. Never use placeholder names like 'John Doe'. When the emotion \
     level is High, reflect anger through formatting: CAPITALISED WORDS, multiple \
     exclamation marks and emotionally charged phrases.",
    "Imagine you are different real customers contacting a telecommunications company to \
     complain. For each complaint, output nothing but the raw complaint message: no \
     titles, no tags, no explanations. The complaints should feel authentic, varying in \
     length, tone, and detail. If a name is used, make it sound genuine and diverse. When \
     emotion is high, write like a genuinely angry customer: CAPS for emphasis, \
     exclamation marks!!!, short punchy sentences, demands for managers.",
    "Act as a generator of customer complaint messages for a telecoms company. Each output \
     must read like a genuine message a customer would send through a support channel. \
     Provide only the complaint body, without metadata, labels, or framing text. Let the \
     complaints differ naturally in length and specificity. Use believable names when \
     appropriate. For high-emotion complaints, make the text visually intense: CAPITALISE \
     key words, use !!! liberally, include raw frustrated language.",
];

const GUIDANCE: [&str; 6] = [
    "Account or reference numbers (e.g., ACC-7291834, REF-20240315)",
    "Specific dates of incidents and prior contacts",
    "Names of staff spoken to previously",
    "Prior contact history ('I have already called three times')",
    "Greetings and sign-offs appropriate to the channel",
    "Channel-appropriate formatting (emails have paragraphs; live chats are short and \
     immediate; online forms are concise; social media posts are brief and public-facing, \
     possibly with @mentions or hashtags)",
];

/// The telecoms complaint dataset.
pub fn telecoms_complaints() -> Taxonomy {
    Taxonomy {
        name: "telecoms-complaints".to_string(),
        item_noun: "customer complaints".to_string(),
        primary: PrimaryAxes {
            first: urgency(),
            second: emotion(),
        },
        secondary: vec![
            scenario(),
            Axis::new("style", &STYLES),
            Axis::new("channel", &CHANNELS),
            Axis::new("profile", &CUSTOMER_PROFILES),
            Axis::new("history", &COMPLAINT_HISTORY),
        ],
        instructions: INSTRUCTIONS.iter().map(|s| s.to_string()).collect(),
        guidance: GUIDANCE.iter().map(|s| s.to_string()).collect(),
        divergence: Some(DivergenceNotes {
            min_gap: 2,
            first_higher: "The urgency and emotion levels are intentionally different. The \
                customer is describing a severe, high-impact issue but writing in a calm, \
                composed, factual manner. Do NOT let the severity of the issue bleed into \
                the tone. Keep the writing measured and neutral."
                .to_string(),
            second_higher: "The urgency and emotion levels are intentionally different. The \
                customer is highly emotional and upset, but the underlying issue is \
                relatively minor. Write the complaint with authentic high emotion while \
                keeping the actual problem minor in scope."
                .to_string(),
        }),
    }
}
