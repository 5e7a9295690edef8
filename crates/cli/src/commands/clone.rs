//! `clonekit [REQUEST]`: one agent run from request to OUTPUT.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clonekit_agent::{Interpreter, system_prompt};
use clonekit_browser::{CaptureSettings, ChromeCapture};
use clonekit_bundle::{HttpAssetSource, http_client};
use clonekit_config::AppConfig;
use clonekit_core::error::{Error, Result};
use clonekit_core::message::{Conversation, Message};
use clonekit_core::session::Session;
use clonekit_tools::Dispatcher;
use tracing::info;

const DEFAULT_REQUEST: &str = "Generate a pixel-perfect clone of the website https://www.piyushgarg.dev/";

pub async fn run(request: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = match &config_path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    }
    .map_err(|e| Error::Config {
        message: format!("Failed to load config: {e}"),
    })?;

    // Fail before launching anything
    if let Err(e) = require_api_key(&config) {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables (or put it in .env):");
        eprintln!("    GROQ_API_KEY=gsk_...        (default provider)");
        eprintln!("    OPENAI_API_KEY=sk-...");
        eprintln!("    CLONEKIT_API_KEY=...        (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err(e);
    }

    let router = clonekit_providers::router::build_from_config(&config);
    let provider = router.default().ok_or_else(|| Error::Config {
        message: format!("Provider '{}' is not configured", config.default_provider),
    })?;
    let model = clonekit_providers::router::model_for(&config);

    let capture = Arc::new(ChromeCapture::new(CaptureSettings::from(&config.capture)));
    let client = http_client(&config.tools.user_agent);
    let assets = Arc::new(HttpAssetSource::with_client(client.clone()));
    let dispatcher = Dispatcher::from_config(&config, client, capture, assets);
    let interpreter = Interpreter::from_config(&config, provider, dispatcher, model.clone());

    let prompt = system_prompt(&config.bundle.root.to_string_lossy(), config.agent.observe_limit)?;
    let mut conversation = Conversation::with_system(prompt);
    let request = request.unwrap_or_else(|| DEFAULT_REQUEST.to_string());
    conversation.push(Message::user(&request));

    info!(provider = %config.default_provider, model = %model, "Starting website cloning agent");

    let outcome = interpreter.run(&mut Session::new(), &mut conversation).await;

    println!();
    println!("{}", outcome.output);
    if let Some(root) = outcome.bundle_root {
        print_bundle_help(&root);
    }

    Ok(())
}

fn require_api_key(config: &AppConfig) -> Result<()> {
    if config.has_api_key() {
        Ok(())
    } else {
        Err(Error::Config {
            message: "No API key found. See above for setup instructions.".into(),
        })
    }
}

fn print_bundle_help(root: &Path) {
    println!();
    println!("  Your website clone is ready in {}", root.display());
    println!();
    println!("  Open {} in a browser, or serve it:", root.join("index.html").display());
    println!("    cd {} && python -m http.server 8000", root.display());
    println!("    npx http-server {}", root.display());
    println!();
}
