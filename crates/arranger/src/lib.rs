pub mod allocate;
pub mod config;
pub mod constants;
pub mod duration;
pub mod error;
pub mod render;
pub mod sections;

pub use allocate::{Arrangement, Entry, Fade, PlacedSection, SectionLength, allocate, allocate_in};
pub use config::Config;
pub use constants::{DEFAULT_BEATS_PER_MEASURE, FADE_LABEL};
pub use duration::SongLength;
pub use error::{ArrangerError, Result};
pub use render::{OutputFormat, render, render_catalog, render_to_string};
pub use sections::{SectionCatalog, SectionDef, SectionKind};
