use serde::Deserialize;

/// A playable sound from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Sound {
    pub name: String,
    /// Remote track URL
    #[serde(alias = "url")]
    pub locator: String,
    /// Human readable length, e.g. "75 min"
    #[serde(default)]
    pub duration: Option<String>,
}

impl Sound {
    pub fn new(name: &str, locator: &str, duration: &str) -> Self {
        Self {
            name: name.to_string(),
            locator: locator.to_string(),
            duration: Some(duration.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub sounds: Vec<Sound>,
}

/// Read-only, ordered collection of categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    categories: Vec<Category>,
    default_sound: Sound,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// Build a catalog; the first sound becomes the default.
    ///
    /// Returns `None` when there is no sound at all.
    pub fn from_categories(categories: Vec<Category>) -> Option<Self> {
        let categories: Vec<Category> = categories
            .into_iter()
            .filter(|c| !c.sounds.is_empty())
            .collect();
        let default_sound = categories.first()?.sounds.first()?.clone();
        Some(Self {
            categories,
            default_sound,
        })
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn default_sound(&self) -> &Sound {
        &self.default_sound
    }

    pub fn find_by_locator(&self, locator: &str) -> Option<&Sound> {
        self.sounds().find(|s| s.locator == locator)
    }

    /// All sounds in display order
    pub fn sounds(&self) -> impl Iterator<Item = &Sound> {
        self.categories.iter().flat_map(|c| c.sounds.iter())
    }

    pub fn len(&self) -> usize {
        self.sounds().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn builtin() -> Self {
        let rain = Sound::new(
            "Raining Sounds for Sleeping",
            "https://soundcloud.com/relaxing-white-noise/raining-sounds-for-sleeping-featuring-rain-on-window-white-noise-no-thunder-75-minutes",
            "75 min",
        );
        let categories = vec![
            category("Rain", vec![
                rain.clone(),
                Sound::new("Perfect Rain Sounds", "https://soundcloud.com/relaxing-white-noise/perfect-rain-sounds-for-sleep", "75 min"),
                Sound::new("Forest Rain Sounds", "https://soundcloud.com/relaxing-white-noise/forest-rain-sounds-for-sleeping-or-studying-75-minutes", "75 min"),
                Sound::new("Rain In The Woods", "https://soundcloud.com/relaxing-white-noise/rain-in-the-woods-sleep-sound-5-hours", "5 h"),
                Sound::new("Thunder & Rain", "https://soundcloud.com/relaxing-white-noise/epic-rain-and-thunder-5-hours", "5 h"),
                Sound::new("ASMR Rain on Car Roof", "https://soundcloud.com/ampvil/asmr-rain-on-car-roof-1-hour", "1 h"),
                Sound::new("Rain on Car (30 minutes)", "https://soundcloud.com/user-727114568/30-minutes-video-of-rain-on-car-relaxing-soothing-sounds-of-rain", "30 min"),
            ]),
            category("Ocean", vec![
                Sound::new("Ocean Waves for Deep Sleep", "https://soundcloud.com/relaxing-white-noise/ocean-waves-for-deep-sleep-studying-focus-75-minutes", "75 min"),
                Sound::new("Most Relaxing Ocean Waves", "https://soundcloud.com/relaxing_guru/most-relaxing-ocean-waves-sounds-6-hours-sound-of-the-sea-to-fall-asleep-faster", "6 h"),
                Sound::new("Ocean Waves + Rain", "https://soundcloud.com/relaxing-white-noise/ocean-waves-and-gentle-rain-75-minutes", "75 min"),
            ]),
            category("Nature", vec![
                Sound::new("Forest Night Sounds", "https://soundcloud.com/relaxing-white-noise/forest-night-nature-sounds", "75 min"),
                Sound::new("Morning Birds in Nature Reserve", "https://soundcloud.com/heinz-pichler-676677735/mornings-in-the-nature-conservancy-forest-birds-birds-birds-field-recording-nature", "75 min"),
                Sound::new("Wind In The Trees", "https://soundcloud.com/relaxing-white-noise/wind-in-the-trees-white-noise-75-minutes", "75 min"),
            ]),
            category("Noise", vec![
                Sound::new("Sleep Sounds White Noise", "https://soundcloud.com/relaxing-white-noise/sleep-sounds-white-noise-ambience", "75 min"),
                Sound::new("Pink Noise", "https://soundcloud.com/relaxing-white-noise/pink-noise-75-minutes", "75 min"),
                Sound::new("Brown Noise 1950s Vinyl", "https://soundcloud.com/neilbalfour/brown-noise-1-hour-1950s-vinyl", "1 h"),
            ]),
            category("Fan", vec![
                Sound::new("Fan Sounds White Noise", "https://soundcloud.com/relaxing-white-noise/fan-white-noise-5-hours", "5 h"),
                Sound::new("Box Fan White Noise", "https://soundcloud.com/relaxing-white-noise/box-fan-white-noise", "75 min"),
                Sound::new("Oscillating Fan", "https://soundcloud.com/relaxing-white-noise/oscillating-fan-white-noise", "75 min"),
            ]),
            category("Fireplace", vec![
                Sound::new("Fireplace with Crackling", "https://soundcloud.com/relaxing-white-noise/fireplace-with-crackling", "75 min"),
                Sound::new("Winter Storm + Fireplace", "https://soundcloud.com/relaxing-white-noise/relax-to-winter-storm-sounds-crackling-fireplace-comfy-vibe-75-minutes", "75 min"),
            ]),
            category("Piano", vec![
                Sound::new("Relaxing Piano Music", "https://soundcloud.com/soothingrelaxation/relaxing-piano-music-relaxing-music-sleep-music-meditation-music-spa-music-109", "3 h"),
                Sound::new("I'll Stay - Piano Music", "https://soundcloud.com/soothingrelaxation/ill-stay-relaxing-piano-music-for-sleeping-studying-soothing-world", "3 h"),
                Sound::new("Forever - Beautiful Piano", "https://soundcloud.com/soothingrelaxation/relaxing-piano-music-beautiful-relaxing-music-sleep-music-peaceful-music-romantic-music-145", "3 h"),
            ]),
            category("Meditation", vec![
                Sound::new("Bamboo Water Fountain + Tibetan Bowls", "https://soundcloud.com/relaxing-white-noise/bamboo-water-fountain-tibetan", "75 min"),
                Sound::new("432Hz Tibetan Singing Bowls", "https://soundcloud.com/brucecohn/432hz-tibetan-singing-bowls-for-deep-sleep-healing-and-relaxation", "1 h"),
                Sound::new("Tibetan Bowls + Rain + Ocean", "https://soundcloud.com/relaxing-white-noise/tibetan-singing-bowls-music-to-sleep-with-rain-sounds-and-ocean-waves-in-hawaii-75-minutes", "75 min"),
            ]),
            category("Focus", vec![
                Sound::new("Good Morning Meditation", "https://soundcloud.com/sonic-yogi/good-morning", "30 min"),
                Sound::new("Summer Night Meditation", "https://soundcloud.com/sonic-yogi/summernightmeditation", "30 min"),
                Sound::new("Super Intelligence Focus Music", "https://soundcloud.com/spiritualmoment/super-inteligencia-1-hora", "1 h"),
            ]),
            category("Lofi", vec![
                Sound::new("Lofi Sleep Mix", "https://soundcloud.com/yawn-label/lofi-sleep-mix-lofi-sleep-relax-meditation", "1 h"),
                Sound::new("1 Hour Chill Aesthetic Lofi", "https://soundcloud.com/lofi_and_chill/1-hour-chill-aesthetic-lofi-mix-for-sleeping-chillhop-jazzhop", "1 h"),
            ]),
            category("Ambient", vec![
                Sound::new("1 Hour Relaxing Lounge Chillout", "https://soundcloud.com/fm_freemusic/1-hour-relaxing-lounge-chillout-background-music-ambient-calm-cinematic-music-by-oleg-mazur", "1 h"),
                Sound::new("Essential Ambient Mix", "https://soundcloud.com/ambientmusicalgenre/essential-ambient-mix", "2 h"),
                Sound::new("3 Hours Balearic Summer Time", "https://soundcloud.com/eyad-shebli/3-hours-relaxing-music-ambient", "3 h"),
            ]),
            category("Café", vec![
                Sound::new("Café Leblanc Ambience", "https://soundcloud.com/grant-lewers-185714392/cafe-leblanc-coffee-shop-ambience-smooth-jazz-persona-music-rain-to-study-relax-sleep", "1 h"),
            ]),
        ];

        Self {
            categories,
            default_sound: rain,
        }
    }
}

fn category(name: &str, sounds: Vec<Sound>) -> Category {
    Category {
        name: name.to_string(),
        sounds,
    }
}
