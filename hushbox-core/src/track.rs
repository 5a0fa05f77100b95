use thiserror::Error;

use crate::catalog::Sound;

pub const CUSTOM_TRACK_TITLE: &str = "Custom Track";
pub const CUSTOM_TRACK_DURATION: &str = "N/A";
pub const DEFAULT_TRACK_DOMAIN: &str = "soundcloud.com";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackError {
    #[error("Please enter a link.")]
    Empty,
    #[error("Please enter a valid {domain} link.")]
    ForeignDomain { domain: String },
}

/// Check a user supplied track URL. Returns the trimmed locator.
pub fn validate_custom_track(input: &str, domain: &str) -> Result<String, TrackError> {
    let locator = input.trim();
    if locator.is_empty() {
        return Err(TrackError::Empty);
    }
    if !locator.contains(domain) {
        return Err(TrackError::ForeignDomain {
            domain: domain.to_string(),
        });
    }
    Ok(locator.to_string())
}

/// Catalog entry for an accepted custom URL, before its title is known
pub fn custom_sound(locator: String) -> Sound {
    Sound {
        name: CUSTOM_TRACK_TITLE.to_string(),
        locator,
        duration: Some(CUSTOM_TRACK_DURATION.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_service_urls() {
        let locator =
            validate_custom_track("  https://soundcloud.com/artist/track \n", DEFAULT_TRACK_DOMAIN);
        assert_eq!(locator, Ok("https://soundcloud.com/artist/track".to_string()));
    }

    #[test]
    fn rejects_other_domains() {
        let err = validate_custom_track("https://example.com/track", DEFAULT_TRACK_DOMAIN)
            .unwrap_err();
        assert_eq!(err.to_string(), "Please enter a valid soundcloud.com link.");
    }

    #[test]
    fn rejects_blank_input() {
        assert_eq!(validate_custom_track("   ", DEFAULT_TRACK_DOMAIN), Err(TrackError::Empty));
    }

    #[test]
    fn custom_sound_uses_placeholder_title() {
        let sound = custom_sound("https://soundcloud.com/a/b".to_string());
        assert_eq!(sound.name, CUSTOM_TRACK_TITLE);
        assert_eq!(sound.duration.as_deref(), Some("N/A"));
    }
}
