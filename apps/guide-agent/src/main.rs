use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use city_lookups::mock::StaticWeather;
use city_lookups::{OpenWeatherClient, UnconfiguredEvents, WeatherProvider};
use guide_session::{
    require_credential, AgentSession, GuideSettings, LLM_KEY_VAR, WEATHER_KEY_VAR,
};
use intent_router::{IntentRouter, LlmFallback, SessionContext, Utterance};
use voice_engines::plugin::{new_llm_backend, new_tts_backend, LlmBackendKind};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum WeatherBackend {
    /// Live OpenWeatherMap lookups (needs OPENWEATHER_API_KEY)
    Openweathermap,
    /// Fixed offline report
    Static,
}

#[derive(Parser)]
#[command(name = "guide-agent")]
#[command(about = "Toronto travel-guide voice agent worker")]
struct Args {
    /// Settings file (YAML); defaults to configs/guide.yaml when present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Language-model backend (groq or mock); defaults to pipeline.llm.provider
    #[arg(long)]
    llm_backend: Option<String>,

    /// Weather provider
    #[arg(long, value_enum, default_value_t = WeatherBackend::Openweathermap)]
    weather_backend: WeatherBackend,

    /// Answer a single utterance and exit
    #[arg(long)]
    say: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();
    setup_tracing();
    if let Err(e) = dotenv {
        debug!("no .env loaded: {}", e);
    }

    let args = Args::parse();

    let (settings, source) = match &args.config {
        Some(path) => (
            GuideSettings::from_file(path).context("loading settings")?,
            Some(path.clone()),
        ),
        None => GuideSettings::load_or_default().context("loading settings")?,
    };
    match &source {
        Some(path) => info!("Settings loaded from {}", path.display()),
        None => info!("Using default settings"),
    }

    // Resolve every credential before the session starts.
    let llm_kind: LlmBackendKind = args
        .llm_backend
        .as_deref()
        .unwrap_or(&settings.pipeline.llm.provider)
        .parse()?;
    let weather: Arc<dyn WeatherProvider> = match args.weather_backend {
        WeatherBackend::Openweathermap => {
            let key = require_credential(WEATHER_KEY_VAR)?;
            Arc::new(
                OpenWeatherClient::new(&settings.weather, key.expose())
                    .context("building weather client")?,
            )
        }
        WeatherBackend::Static => {
            warn!("Using static weather, reports are not live");
            Arc::new(StaticWeather::new(18.0, "clear sky"))
        }
    };
    let llm_key = if llm_kind.requires_api_key() {
        Some(require_credential(LLM_KEY_VAR)?.expose().to_string())
    } else {
        None
    };

    let llm = new_llm_backend(llm_kind, settings.pipeline.llm.clone(), llm_key)
        .context("creating language model backend")?;
    info!("LLM Backend: {:?} ({})", llm_kind, llm.model_name());
    info!("Weather Backend: {}", weather.name());

    let agent = Arc::new(settings.agent.clone());
    let fallback = Arc::new(LlmFallback::new(llm, agent.instructions.clone()));
    let router = Arc::new(
        IntentRouter::travel_guide(
            settings.router_config(),
            weather,
            Arc::new(UnconfiguredEvents),
            fallback,
        )
        .with_classifier(settings.classifier()),
    );

    let mut session = AgentSession::new(
        agent,
        router,
        SessionContext::new(settings.max_history_messages),
    );
    match new_tts_backend(settings.pipeline.tts.clone()) {
        Ok(tts) => session = session.with_tts(tts),
        Err(e) => warn!("TTS unavailable, replying as text only: {}", e),
    }
    session.start(&settings.pipeline);

    if let Some(text) = args.say {
        let reply = session.handle_utterance(&Utterance::new(text)).await?;
        println!("{}", reply.text);
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, ending session");
            let _ = shutdown_tx.send(true);
        }
    });

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let summary = session.run(stdin, &mut stdout, shutdown_rx).await?;

    info!(
        "guide-agent shutting down after {} turns ({} recovered)",
        summary.turns, summary.recovered
    );
    Ok(())
}

fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
