//! Statistical charts for tissue-microarray (TMA) tables.
//!
//! A CSV is loaded into a [`data::model::Table`], filtered, and drawn as a
//! box plot, a slide-layout heatmap or a histogram. Renderers return encoded
//! image bytes; [`render::encode_base64`] turns them into the single line the
//! command-line tool prints.

pub mod color;
pub mod data;
pub mod error;
pub mod grid;
pub mod options;
pub mod render;
pub mod style;

pub use error::{ChartError, Result};
