use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use http::{HeaderMap, HeaderValue};
use serde_json::json;
use signature_core::{HashAlgorithm, sign};
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use webhook_verifier::config::{
    ALGORITHM_VAR, Config, HEADER_VAR, MAX_BODY_BYTES_VAR, SECRET_VAR,
};
use webhook_verifier::headers;
use webhook_verifier::interceptor::{Decision, Interceptor};

// Header name used when the envelope is passed directly with --signature.
const DIRECT_SIGNATURE_HEADER: &str = "X-Webhook-Signature";

const SIGNATURE_VAR: &str = "WEBHOOK_SIGNATURE";
const HEADERS_FILE_VAR: &str = "WEBHOOK_HEADERS_FILE";
const BODY_FILE_VAR: &str = "WEBHOOK_BODY_FILE";

#[derive(Parser)]
#[command(name = "webhook-verify", version, about = "Sign and verify webhook payloads")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the `<algorithm>=<hex>` envelope for a body.
    Sign(SignArgs),
    /// Check a body against a signature envelope or captured request headers.
    Verify(VerifyArgs),
}

#[derive(Args)]
struct SignArgs {
    #[arg(long, env = SECRET_VAR, hide_env_values = true)]
    secret: String,
    #[arg(long, env = ALGORITHM_VAR, default_value = "sha256")]
    algorithm: HashAlgorithm,
    /// Read the body from this file instead of stdin.
    #[arg(long, env = BODY_FILE_VAR)]
    body_file: Option<PathBuf>,
}

// Header, secret, algorithm and body limit fall back to the environment
// through `Config`, so they carry no clap `env` binding of their own.
#[derive(Args)]
struct VerifyArgs {
    /// Envelope to check, e.g. `sha256=<hex>`.
    #[arg(long, env = SIGNATURE_VAR, conflicts_with = "headers_file")]
    signature: Option<String>,
    /// File of `Name: value` lines captured from the request.
    #[arg(long, env = HEADERS_FILE_VAR)]
    headers_file: Option<PathBuf>,
    #[arg(long)]
    header: Option<String>,
    #[arg(long)]
    secret: Option<String>,
    #[arg(long)]
    algorithm: Option<String>,
    #[arg(long)]
    max_body_bytes: Option<String>,
    #[arg(long, env = BODY_FILE_VAR)]
    body_file: Option<PathBuf>,
}

impl VerifyArgs {
    fn override_for(&self, name: &str) -> Option<String> {
        match name {
            HEADER_VAR => self.header.clone().or_else(|| {
                self.signature
                    .as_ref()
                    .map(|_| DIRECT_SIGNATURE_HEADER.to_string())
            }),
            SECRET_VAR => self.secret.clone(),
            ALGORITHM_VAR => self.algorithm.clone(),
            MAX_BODY_BYTES_VAR => self.max_body_bytes.clone(),
            _ => None,
        }
    }

    fn config(&self) -> Result<Config> {
        Config::from_lookup(|name| self.override_for(name).or_else(|| env::var(name).ok()))
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    setup_tracing();

    match Cli::parse().command {
        Command::Sign(args) => run_sign(args).await,
        Command::Verify(args) => run_verify(args).await,
    }
}

async fn run_sign(args: SignArgs) -> Result<ExitCode> {
    let body = read_body(args.body_file.as_deref()).await?;
    println!("{}", sign(&body, args.secret.as_bytes(), args.algorithm));
    Ok(ExitCode::SUCCESS)
}

async fn run_verify(args: VerifyArgs) -> Result<ExitCode> {
    let config = args.config().context("load verifier config")?;
    let interceptor = Interceptor::from_config(&config);

    let headers = match (&args.signature, &args.headers_file) {
        (Some(signature), _) => {
            let mut headers = HeaderMap::new();
            let value = HeaderValue::from_str(signature).context("invalid --signature value")?;
            headers.insert(interceptor.header_name().clone(), value);
            headers
        }
        (None, Some(path)) => headers::load(path).await?,
        (None, None) => return Err(anyhow!("either --signature or --headers-file is required")),
    };
    let body = read_body(args.body_file.as_deref()).await?;

    info!(
        header = %interceptor.header_name(),
        algorithm = %interceptor.algorithm(),
        "verifying webhook payload"
    );

    let (results_tx, mut results_rx) = mpsc::channel(1);
    interceptor.forward(&headers, body, &results_tx).await?;
    drop(results_tx);

    let decision = results_rx
        .recv()
        .await
        .context("no decision delivered")?;
    let (output, code) = render_decision(&decision, interceptor.algorithm());
    println!("{output}");
    Ok(code)
}

// `kind` is the verifier's `ErrorKind`, or null for rejections made before
// verification ran.
fn render_decision(decision: &Decision, algorithm: HashAlgorithm) -> (serde_json::Value, ExitCode) {
    match decision {
        Decision::Accepted(body) => (
            json!({"status": "ok", "algorithm": algorithm, "bytes": body.len()}),
            ExitCode::SUCCESS,
        ),
        Decision::Rejected(rejection) => (
            json!({
                "status": "rejected",
                "algorithm": algorithm,
                "error": rejection.reason(),
                "kind": rejection.verify_kind(),
                "detail": rejection.to_string(),
            }),
            ExitCode::FAILURE,
        ),
    }
}

async fn read_body(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("read body file {}", path.display())),
        None => {
            let mut body = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut body)
                .await
                .context("read body from stdin")?;
            Ok(body)
        }
    }
}

fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
