use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Base URL of the NutriCare REST API, e.g. `https://api.nutricare.app`.
    pub api_base_url: String,
    /// Minimum display duration of each generation phase, in milliseconds.
    pub phase_min_ms: u64,
    /// Days between routine checkups used for the dashboard countdown.
    pub checkup_interval_days: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_base_url = std::env::var("NUTRICARE_API_BASE_URL")?;
        let phase_min_ms = std::env::var("NUTRICARE_PHASE_MIN_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(1500);
        let checkup_interval_days = std::env::var("NUTRICARE_CHECKUP_INTERVAL_DAYS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(15);
        Ok(Self {
            api_base_url,
            phase_min_ms,
            checkup_interval_days,
        })
    }
}
