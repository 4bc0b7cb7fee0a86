// SPDX-License-Identifier: EUPL-1.2

//! Demo catalog loaded into fresh stores.
//!
//! Tools start without reviews, so their rating is `0.0` until someone
//! comments.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::models::{Category, Page, PriceTier, Tool};

pub struct DemoCatalog {
    pub categories: Vec<Category>,
    pub tools: Vec<Tool>,
    pub pages: Vec<Page>,
}

struct Listing {
    name: &'static str,
    one_liner: &'static str,
    description: &'static str,
    tags: &'static [&'static str],
    category: &'static str,
    price: PriceTier,
    views: u64,
    featured: bool,
    video: Option<&'static str>,
    age_days: i64,
}

const CATEGORIES: &[(&str, &[&str])] = &[
    ("Text", &["writing", "content", "copywriting", "summarization"]),
    ("Image", &["image generation", "design", "avatar", "art"]),
    ("Voice", &["voice", "text-to-speech", "transcription", "audio"]),
    ("Chat", &["chatbot", "conversation", "assistant"]),
    ("Video", &["video", "animation", "editing"]),
];

const LISTINGS: &[Listing] = &[
    Listing {
        name: "WriterAI",
        one_liner: "Create compelling content with AI-powered assistance",
        description: "Drafts blog posts, articles and marketing copy with AI suggestions.",
        tags: &["writing", "content", "copywriting"],
        category: "Text",
        price: PriceTier::Freemium,
        views: 1240,
        featured: true,
        video: None,
        age_days: 420,
    },
    Listing {
        name: "ImageCraft",
        one_liner: "Generate stunning images from text descriptions",
        description: "Creates original images from a plain description for social posts and web graphics.",
        tags: &["image generation", "design", "art"],
        category: "Image",
        price: PriceTier::Free,
        views: 980,
        featured: true,
        video: None,
        age_days: 385,
    },
    Listing {
        name: "VoiceGenius",
        one_liner: "Convert text to natural-sounding speech in seconds",
        description: "Turns written content into lifelike speech in many languages and accents.",
        tags: &["voice", "text-to-speech", "audio"],
        category: "Voice",
        price: PriceTier::Paid,
        views: 1450,
        featured: false,
        video: Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
        age_days: 370,
    },
    Listing {
        name: "SummarizeBot",
        one_liner: "Condense long articles into clear, concise summaries",
        description: "Distills lengthy content into accurate, readable summaries.",
        tags: &["summarization", "content", "reading"],
        category: "Text",
        price: PriceTier::Free,
        views: 860,
        featured: false,
        video: None,
        age_days: 334,
    },
    Listing {
        name: "AvatarMaker",
        one_liner: "Create personalized AI avatars from your photos",
        description: "Transforms photos into stylized avatars for social media and gaming profiles.",
        tags: &["avatar", "image generation", "design"],
        category: "Image",
        price: PriceTier::Freemium,
        views: 1120,
        featured: false,
        video: None,
        age_days: 300,
    },
    Listing {
        name: "TranscribeNow",
        one_liner: "Convert audio to text with high accuracy",
        description: "Transcribes meetings, interviews and podcasts with speaker detection.",
        tags: &["transcription", "voice", "audio"],
        category: "Voice",
        price: PriceTier::Paid,
        views: 940,
        featured: false,
        video: None,
        age_days: 264,
    },
    Listing {
        name: "ChatCompanion",
        one_liner: "Intelligent chatbot for customer support and engagement",
        description: "Answers customer questions around the clock and hands off to humans when needed.",
        tags: &["chatbot", "customer service", "conversation"],
        category: "Chat",
        price: PriceTier::Freemium,
        views: 780,
        featured: true,
        video: None,
        age_days: 253,
    },
    Listing {
        name: "VideoEdit Pro",
        one_liner: "Edit videos with AI-powered tools and effects",
        description: "Cuts, grades and animates footage with automatic scene detection.",
        tags: &["video", "editing", "animation"],
        category: "Video",
        price: PriceTier::Paid,
        views: 1350,
        featured: false,
        video: Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
        age_days: 208,
    },
];

const PAGES: &[(&str, &str, &str)] = &[
    (
        "about",
        "About",
        "Toolshelf is a community directory of AI tools. Browse by category, \
         compare ratings and keep a shortlist of the tools you like.",
    ),
    (
        "privacy",
        "Privacy Policy",
        "We store your name, email and the reviews and bookmarks you create. \
         Nothing is shared with third parties.",
    ),
];

pub fn demo_catalog(now: DateTime<Utc>) -> DemoCatalog {
    let categories = CATEGORIES
        .iter()
        .map(|(name, tags)| Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            linked_tags: tags.iter().map(|t| t.to_string()).collect(),
            hidden: false,
        })
        .collect();

    let tools = LISTINGS
        .iter()
        .map(|l| Tool {
            id: Uuid::new_v4(),
            name: l.name.to_string(),
            logo: "/placeholder.svg".to_string(),
            one_liner: l.one_liner.to_string(),
            description: l.description.to_string(),
            external_link: "https://example.com".to_string(),
            video_link: l.video.map(str::to_string),
            tags: l.tags.iter().map(|t| t.to_string()).collect(),
            categories: vec![l.category.to_string()],
            price: l.price,
            view_count: l.views,
            rating: 0.0,
            rating_count: 0,
            hidden: false,
            featured: l.featured,
            created_at: now - Duration::days(l.age_days),
        })
        .collect();

    let pages = PAGES
        .iter()
        .map(|(slug, title, content)| Page {
            slug: slug.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            updated_at: now,
        })
        .collect();

    DemoCatalog { categories, tools, pages }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listing_points_at_a_known_category() {
        let demo = demo_catalog(Utc::now());
        for tool in &demo.tools {
            for name in &tool.categories {
                assert!(demo.categories.iter().any(|c| &c.name == name), "{name}");
            }
            assert_eq!(tool.rating_count, 0);
        }
    }
}
