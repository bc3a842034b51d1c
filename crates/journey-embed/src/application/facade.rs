//! `create_journey`: the narrow entry point handed to host pages.

use std::rc::Rc;

use journey_core::{EmbedSettings, JourneyError, JourneyStatus};

use crate::application::config::JourneyConfig;
use crate::application::journey::Journey;
use crate::infrastructure::platform::Platform;

/// The only operations a host page gets on a journey.
pub struct JourneyHandle<P: Platform> {
    journey: Journey<P>,
}

impl<P: Platform> JourneyHandle<P> {
    pub fn start(&self) -> Result<(), JourneyError> {
        self.journey.start()
    }

    pub fn close(&self) {
        self.journey.close();
    }

    pub fn remove(&self) {
        self.journey.remove();
    }

    pub fn status(&self) -> JourneyStatus {
        self.journey.status()
    }
}

/// Builds a journey with default settings.
///
/// # Errors
///
/// Fails with the configuration or overlay error that [`Journey::new`]
/// reports; `on_error` has already been called by then.
pub fn create_journey<P: Platform>(
    config: JourneyConfig,
    platform: Rc<P>,
) -> Result<JourneyHandle<P>, JourneyError> {
    create_journey_with_settings(config, EmbedSettings::default(), platform)
}

pub fn create_journey_with_settings<P: Platform>(
    config: JourneyConfig,
    settings: EmbedSettings,
    platform: Rc<P>,
) -> Result<JourneyHandle<P>, JourneyError> {
    let journey = Journey::with_settings(config, settings, platform)?;
    Ok(JourneyHandle { journey })
}
