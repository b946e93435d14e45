//! Source registry - builds the configured position sources.

use skyfuse::config::SkyfuseConfig;
use std::sync::Arc;

use crate::sources::{CelesTrakSource, OpenSkySource};
use crate::PositionSource;

/// Returns every enabled source, aircraft first.
pub fn build_sources(config: &SkyfuseConfig) -> Vec<Arc<dyn PositionSource>> {
    let mut sources: Vec<Arc<dyn PositionSource>> = Vec::new();
    if config.aircraft.enabled {
        sources.push(Arc::new(OpenSkySource::new(
            &config.aircraft,
            config.bounding_box,
        )));
    }
    if config.satellites.enabled {
        sources.push(Arc::new(CelesTrakSource::new(&config.satellites)));
    }
    sources
}
