//! Closed value domains for every content axis.

use serde::{Deserialize, Serialize};

/// Turns a `snake_case` axis value into `Title Case` words.
pub fn humanize(value: &str) -> String {
    value
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

macro_rules! dimension_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $axis:expr, {
            $($variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            /// Every value of this axis, in catalog order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const AXIS: Axis = $axis;

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }

            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($value => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn humanize(&self) -> String {
                humanize(self.as_str())
            }

            /// Position of this value inside [`Self::ALL`].
            pub fn ordinal(&self) -> usize {
                *self as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

/// Names of the axes that make up the combination space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Theme,
    Language,
    Style,
    Platform,
    Audience,
    Emotion,
    Occasion,
    Length,
}

impl Axis {
    pub const ALL: &'static [Axis] = &[
        Axis::Theme,
        Axis::Language,
        Axis::Style,
        Axis::Platform,
        Axis::Audience,
        Axis::Emotion,
        Axis::Occasion,
        Axis::Length,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Theme => "theme",
            Axis::Language => "language",
            Axis::Style => "style",
            Axis::Platform => "platform",
            Axis::Audience => "audience",
            Axis::Emotion => "emotion",
            Axis::Occasion => "occasion",
            Axis::Length => "length",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "theme" => Some(Axis::Theme),
            "language" => Some(Axis::Language),
            "style" => Some(Axis::Style),
            "platform" => Some(Axis::Platform),
            "audience" => Some(Axis::Audience),
            "emotion" => Some(Axis::Emotion),
            "occasion" => Some(Axis::Occasion),
            "length" => Some(Axis::Length),
            _ => None,
        }
    }

    /// Raw values of this axis, in the same order the variation engine indexes them.
    pub fn values(&self) -> Vec<&'static str> {
        match self {
            Axis::Theme => Theme::ALL.iter().map(|v| v.as_str()).collect(),
            Axis::Language => Language::ALL.iter().map(|v| v.as_str()).collect(),
            Axis::Style => Style::ALL.iter().map(|v| v.as_str()).collect(),
            Axis::Platform => Platform::ALL.iter().map(|v| v.as_str()).collect(),
            Axis::Audience => Audience::ALL.iter().map(|v| v.as_str()).collect(),
            Axis::Emotion => Emotion::ALL.iter().map(|v| v.as_str()).collect(),
            Axis::Occasion => Occasion::ALL.iter().map(|v| v.as_str()).collect(),
            Axis::Length => Length::ALL.iter().map(|v| v.as_str()).collect(),
        }
    }

    pub fn cardinality(&self) -> usize {
        match self {
            Axis::Theme => Theme::ALL.len(),
            Axis::Language => Language::ALL.len(),
            Axis::Style => Style::ALL.len(),
            Axis::Platform => Platform::ALL.len(),
            Axis::Audience => Audience::ALL.len(),
            Axis::Emotion => Emotion::ALL.len(),
            Axis::Occasion => Occasion::ALL.len(),
            Axis::Length => Length::ALL.len(),
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

dimension_enum!(
    /// What the page is about.
    Theme, Axis::Theme, {
        LoveQuotes => "love_quotes",
        RomanticShayari => "romantic_shayari",
        SadQuotes => "sad_quotes",
        BreakupStatus => "breakup_status",
        AttitudeStatus => "attitude_status",
        MotivationalQuotes => "motivational_quotes",
        SuccessQuotes => "success_quotes",
        FriendshipQuotes => "friendship_quotes",
        BirthdayWishes => "birthday_wishes",
        GoodMorning => "good_morning",
        FestivalGreetings => "festival_greetings",
        LifeLessons => "life_lessons",
        LeadershipQuotes => "leadership_quotes",
        CareerAdvice => "career_advice",
        RealEstateTips => "real_estate_tips",
    }
);

dimension_enum!(
    Language, Axis::Language, {
        English => "english",
        Hindi => "hindi",
        Hinglish => "hinglish",
        Marathi => "marathi",
        Bengali => "bengali",
        Tamil => "tamil",
        Telugu => "telugu",
        Gujarati => "gujarati",
        Punjabi => "punjabi",
        Urdu => "urdu",
    }
);

dimension_enum!(
    /// Visual treatment the template pack targets.
    Style, Axis::Style, {
        Minimal => "minimal",
        DarkTheme => "dark_theme",
        NeonGlow => "neon_glow",
        Vintage => "vintage",
        Gradient => "gradient",
        Typography => "typography",
        Aesthetic => "aesthetic",
        BoldText => "bold_text",
    }
);

dimension_enum!(
    Platform, Axis::Platform, {
        InstagramReel => "instagram_reel",
        InstagramPost => "instagram_post",
        YoutubeShorts => "youtube_shorts",
        WhatsappStatus => "whatsapp_status",
        FacebookPost => "facebook_post",
        TwitterPost => "twitter_post",
        LinkedinPost => "linkedin_post",
        PinterestPin => "pinterest_pin",
        SnapchatStory => "snapchat_story",
        MojVideo => "moj_video",
    }
);

dimension_enum!(
    Audience, Axis::Audience, {
        Students => "students",
        Kids => "kids",
        Teenagers => "teenagers",
        YoungAdults => "young_adults",
        Couples => "couples",
        Parents => "parents",
        Professionals => "professionals",
        Entrepreneurs => "entrepreneurs",
        Seniors => "seniors",
        Everyone => "everyone",
    }
);

dimension_enum!(
    Emotion, Axis::Emotion, {
        Romantic => "romantic",
        Happy => "happy",
        Sad => "sad",
        Motivational => "motivational",
        Inspirational => "inspirational",
        Nostalgic => "nostalgic",
        Angry => "angry",
        Peaceful => "peaceful",
        Grateful => "grateful",
        Confident => "confident",
    }
);

dimension_enum!(
    Occasion, Axis::Occasion, {
        ValentinesDay => "valentines_day",
        Diwali => "diwali",
        Holi => "holi",
        NewYear => "new_year",
        Birthday => "birthday",
        Anniversary => "anniversary",
        MothersDay => "mothers_day",
        IndependenceDay => "independence_day",
        Eid => "eid",
        Christmas => "christmas",
    }
);

dimension_enum!(
    Length, Axis::Length, {
        Short => "short",
        Medium => "medium",
        Long => "long",
    }
);
