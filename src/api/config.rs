use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct ApiConfig {
    #[clap(long, env, default_value_t = 6969)]
    pub port: u16,

    /// When set, every route except /health requires `Authorization: Bearer <key>`
    #[clap(long, env = "API_SECRET_KEY")]
    pub secret_key: Option<String>,
}

impl ApiConfig {
    pub fn new(port: u16, secret_key: Option<String>) -> Self {
        Self { port, secret_key }
    }

    pub fn auth_enabled(&self) -> bool {
        self.secret_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}
