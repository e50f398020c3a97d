//! vela CLI — persona chat server and client.
//!
//! ```text
//! vela serve [--port 2004] [--host 127.0.0.1] [--knowledge data/knowledge.json]
//! vela ask "what's your superpower?" [--server http://localhost:2004]
//! vela speak "hello" --out hello.mp3 [--server ...]
//! vela retrieve "chess and travel" [--knowledge ...] [--max-chunks 5]
//! vela status [--server ...]
//! ```

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use vela_lib::chat::{AnswerPlan, ChatService};
use vela_lib::knowledge::{DEFAULT_KNOWLEDGE_PATH, KnowledgeBase};
use vela_lib::model::ModelClient;
use vela_lib::server::{AppState, router};
use vela_lib::speech::SpeechClient;
use vela_lib::vela_core::retrieval::{DEFAULT_MAX_CHUNKS, Selector};
use vela_lib::vela_core::types::{ModelConfig, ModelProvider, VoiceConfig};

type CliResult = Result<(), Box<dyn Error>>;

/// vela — voice-ready chat backend for a persona
#[derive(Parser)]
#[command(name = "vela", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP API
    Serve {
        /// Listen port
        #[arg(long, default_value = "2004")]
        port: u16,
        /// Listen host
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[command(flatten)]
        knowledge: KnowledgeArgs,
        #[command(flatten)]
        model: ModelArgs,
        #[command(flatten)]
        voice: VoiceArgs,
    },
    /// Ask the running server a question
    Ask {
        /// Question text
        text: String,
        /// Server URL
        #[arg(long, default_value = "http://localhost:2004")]
        server: String,
    },
    /// Synthesize text through the running server
    Speak {
        /// Text to speak
        text: String,
        /// Output file for the MP3 audio
        #[arg(long, short)]
        out: PathBuf,
        #[arg(long, default_value = "http://localhost:2004")]
        server: String,
    },
    /// Show how a question would be answered, without calling the model
    Retrieve {
        /// Question text
        text: String,
        #[command(flatten)]
        knowledge: KnowledgeArgs,
    },
    /// Get server health
    Status {
        #[arg(long, default_value = "http://localhost:2004")]
        server: String,
    },
}

#[derive(Args)]
struct KnowledgeArgs {
    /// Snippet file (JSON array of {id, text})
    #[arg(long, env = "VELA_KNOWLEDGE_PATH", default_value = DEFAULT_KNOWLEDGE_PATH)]
    knowledge: PathBuf,
    /// Maximum scored snippets per prompt (0 = unbounded)
    #[arg(long, default_value_t = DEFAULT_MAX_CHUNKS)]
    max_chunks: usize,
}

impl KnowledgeArgs {
    fn selector(&self) -> Selector {
        Selector {
            max_chunks: (self.max_chunks > 0).then_some(self.max_chunks),
            ..Default::default()
        }
    }
}

#[derive(Args)]
struct ModelArgs {
    /// Model API key
    #[arg(long, env = "VELA_MODEL_API_KEY", hide_env_values = true)]
    model_api_key: Option<String>,
    /// Model identifier
    #[arg(long, env = "VELA_MODEL", default_value = "gemini-2.0-flash")]
    model: String,
    /// Model API dialect: gemini or openai
    #[arg(long, env = "VELA_MODEL_PROVIDER", default_value = "gemini")]
    model_provider: ModelProvider,
    /// Model endpoint base URL (defaults to the provider's public API)
    #[arg(long, env = "VELA_MODEL_URL")]
    model_url: Option<String>,
    /// Sampling temperature
    #[arg(long, default_value = "0.2")]
    temperature: f32,
    /// Maximum output tokens
    #[arg(long, default_value = "512")]
    max_output_tokens: u32,
}

impl From<ModelArgs> for ModelConfig {
    fn from(args: ModelArgs) -> Self {
        Self {
            provider: args.model_provider,
            endpoint: args.model_url,
            api_key: args.model_api_key,
            model: args.model,
            temperature: args.temperature,
            max_output_tokens: args.max_output_tokens,
            ..Default::default()
        }
    }
}

#[derive(Args)]
struct VoiceArgs {
    /// Voice API key
    #[arg(long, env = "VELA_VOICE_API_KEY", hide_env_values = true)]
    voice_api_key: Option<String>,
    /// Voice identifier
    #[arg(long, env = "VELA_VOICE_ID", default_value = "21m00Tcm4TlvDq8N71oe")]
    voice_id: String,
    /// Voice endpoint base URL
    #[arg(long, env = "VELA_VOICE_URL", default_value = "https://api.elevenlabs.io")]
    voice_url: String,
}

impl From<VoiceArgs> for VoiceConfig {
    fn from(args: VoiceArgs) -> Self {
        Self {
            endpoint: args.voice_url,
            api_key: args.voice_api_key,
            voice_id: args.voice_id,
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vela_lib=info,vela=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("vela: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> CliResult {
    match command {
        Command::Serve {
            port,
            host,
            knowledge,
            model,
            voice,
        } => {
            let model = ModelClient::new(model.into())?;
            let speech = SpeechClient::new(voice.into())?;
            tracing::info!(
                provider = ?model.config().provider,
                model = %model.config().model,
                voice = %speech.config().voice_id,
                "upstreams configured"
            );
            if !model.is_configured() {
                tracing::warn!("VELA_MODEL_API_KEY not set; model-backed answers will fail");
            }
            if !speech.is_configured() {
                tracing::warn!("VELA_VOICE_API_KEY not set; /api/speak will fail");
            }

            let chat = ChatService::new(
                KnowledgeBase::new(&knowledge.knowledge),
                knowledge.selector(),
                model,
            );
            chat.warm_up();

            let app = router(AppState::new(chat, speech));
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("vela listening on {addr}");

            axum::serve(listener, app).await?;
            Ok(())
        }

        Command::Ask { text, server } => {
            let resp = reqwest::Client::new()
                .post(format!("{server}/api/chat"))
                .json(&serde_json::json!({ "text": text }))
                .send()
                .await?;
            print_response(resp).await
        }

        Command::Speak { text, out, server } => {
            let resp = reqwest::Client::new()
                .post(format!("{server}/api/speak"))
                .json(&serde_json::json!({ "text": text }))
                .send()
                .await?;
            if !resp.status().is_success() {
                return print_response(resp).await;
            }
            let audio = resp.bytes().await?;
            tokio::fs::write(&out, &audio).await?;
            println!("wrote {} bytes to {}", audio.len(), out.display());
            Ok(())
        }

        Command::Retrieve { text, knowledge } => {
            let chat = ChatService::new(
                KnowledgeBase::new(&knowledge.knowledge),
                knowledge.selector(),
                ModelClient::new(ModelConfig::default())?,
            );
            if let Some(path) = chat.knowledge().path() {
                println!("knowledge: {}", path.display());
            }
            match chat.plan(&text) {
                AnswerPlan::Canned(envelope) => {
                    println!("canned answer:");
                    println!("{}", serde_json::to_string_pretty(&envelope)?);
                }
                AnswerPlan::NoContext(envelope) => {
                    println!("no relevant context:");
                    println!("{}", serde_json::to_string_pretty(&envelope)?);
                }
                AnswerPlan::Prompt { retrieval, prompt } => {
                    println!("sources: {}", retrieval.sources.join(", "));
                    println!("\n{prompt}");
                }
            }
            Ok(())
        }

        Command::Status { server } => {
            let resp = reqwest::Client::new()
                .get(format!("{server}/health"))
                .send()
                .await?;
            print_response(resp).await
        }
    }
}

/// Print the body; non-success statuses become an error.
async fn print_response(resp: reqwest::Response) -> CliResult {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    if status.is_success() {
        println!("{body}");
        Ok(())
    } else {
        Err(format!("server returned {status}: {body}").into())
    }
}
