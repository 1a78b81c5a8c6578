#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub sentry_dsn: Option<String>,
    pub portfolio_endpoint: Option<String>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            sentry_dsn: non_empty_var("SENTRY_DSN"),
            portfolio_endpoint: non_empty_var("PORTFOLIO_ENDPOINT"),
        })
    }

    /// `--endpoint` wins over `PORTFOLIO_ENDPOINT`, which wins over the built-in URL.
    pub fn resolve_endpoint(&self, arg: Option<&str>) -> String {
        arg.or(self.portfolio_endpoint.as_deref())
            .unwrap_or(folio_core::fetch::PORTFOLIO_ENDPOINT)
            .to_string()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}
