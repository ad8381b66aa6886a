use clap::{Parser, ValueEnum};
use reqwest::Client;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use surge::{LoadTest, LoadTestConfig, PerformanceMetrics, DEFAULT_CONCURRENCY, DEFAULT_REQUESTS};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Load test an HTTP inference endpoint and print the metrics as JSON.
#[derive(Debug, Parser)]
#[command(name = "surge", version, about)]
struct Cli {
    /// Endpoint to call; every invocation is one HTTP request.
    #[arg(env = "SURGE_URL")]
    url: String,

    /// Total number of requests.
    #[arg(short = 'n', long, env = "SURGE_REQUESTS", default_value_t = DEFAULT_REQUESTS)]
    requests: usize,

    /// Number of concurrent workers.
    #[arg(short, long, env = "SURGE_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Maximum requests per second across all workers.
    #[arg(long, env = "SURGE_TPS")]
    tps: Option<NonZeroU32>,

    /// Abort the run after this long, e.g. `30s` or `2m`.
    #[arg(long, env = "SURGE_TIMEOUT", value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Skip the CPU/memory sample.
    #[arg(long, env = "SURGE_NO_RESOURCES")]
    no_resources: bool,

    #[arg(long, value_enum, default_value_t = HttpMethod::Get)]
    method: HttpMethod,

    /// JSON body sent with every request.
    #[arg(long, value_parser = parse_json)]
    body: Option<serde_json::Value>,

    /// Name used in logs and metrics labels.
    #[arg(long, env = "SURGE_NAME", default_value = "surge")]
    name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum HttpMethod {
    Get,
    Post,
}

impl Cli {
    fn load_test_config(&self) -> LoadTestConfig {
        LoadTestConfig {
            requests: self.requests,
            concurrency: self.concurrency,
            tps_limit: self.tps,
            timeout: self.timeout,
            sample_resources: !self.no_resources,
            ..LoadTestConfig::new(&self.name)
        }
    }

    fn target(&self) -> Target {
        Target {
            url: Arc::from(self.url.as_str()),
            method: self.method,
            body: self.body.clone().map(Arc::new),
        }
    }
}

#[derive(Debug, Clone)]
struct Target {
    url: Arc<str>,
    method: HttpMethod,
    body: Option<Arc<serde_json::Value>>,
}

impl Target {
    async fn send(&self, client: &Client) -> Result<(), reqwest::Error> {
        let mut req = match self.method {
            HttpMethod::Get => client.get(&*self.url),
            HttpMethod::Post => client.post(&*self.url),
        };
        if let Some(body) = &self.body {
            req = req.json(body.as_ref());
        }

        req.send().await?.error_for_status()?;
        Ok(())
    }
}

fn parse_json(raw: &str) -> Result<serde_json::Value, serde_json::Error> {
    serde_json::from_str(raw)
}

async fn run(cli: &Cli) -> anyhow::Result<PerformanceMetrics> {
    let client = Client::builder().build()?;
    let target = cli.target();
    let func = move || {
        let client = client.clone();
        let target = target.clone();
        async move { target.send(&client).await }
    };

    let metrics = LoadTest::with_config(cli.load_test_config(), func).await?;
    Ok(metrics)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("surge=info"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("Load testing {} with {} requests", cli.url, cli.requests);

    let metrics = run(&cli).await?;
    println!("{}", serde_json::to_string_pretty(&metrics.to_map())?);
    Ok(())
}
