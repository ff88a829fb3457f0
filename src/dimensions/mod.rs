//! The dimension catalog: axis domains, filler words and the combination space.

mod axes;
mod space;
mod tuple;
pub mod words;

pub use axes::{
    humanize, Audience, Axis, Emotion, Language, Length, Occasion, Platform, Style, Theme,
};
pub use space::CombinationSpace;
pub use tuple::{DimensionError, DimensionTuple};
