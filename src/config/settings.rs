#[derive(Debug, Clone)]
pub struct RatingSettings {
    pub k_factor: f64,
    pub baseline_rating: f64,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            k_factor: 32.0,
            baseline_rating: 1500.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub games_page_limit: usize,
    pub recent_games_limit: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            games_page_limit: 50,
            recent_games_limit: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub rating: RatingSettings,
    pub server: ServerSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            rating: RatingSettings::default(),
            server: ServerSettings::default(),
        }
    }
}
