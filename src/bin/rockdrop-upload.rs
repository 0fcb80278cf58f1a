use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use rockdrop::client::{UploadClient, UploadedFile};
use rockdrop::core::config::UploadConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Upload files to a rockdrop server
#[derive(Parser, Debug)]
#[command(name = "rockdrop-upload")]
#[command(about = "Upload files to a rockdrop server and print their public URLs", long_about = None)]
struct Cli {
    /// Server URL
    #[arg(short = 'u', long = "url", default_value = "http://127.0.0.1:3000")]
    url: String,

    /// Turnstile token from a completed verification
    #[arg(short = 't', long = "token")]
    token: String,

    /// Content type sent with every file
    #[arg(long = "content-type")]
    content_type: Option<String>,

    /// Files to upload
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut client = UploadClient::new(&cli.url, UploadConfig::DEFAULT_MAX_FILE_SIZE)?;
    match client.fetch_config().await {
        Ok(config) => client.set_max_file_size(config.max_file_size),
        Err(e) => tracing::warn!("Could not fetch server config, using defaults: {}", e),
    }

    let mut failures = 0;
    for path in cli.files {
        let mut file = UploadedFile::from_path(path.clone())
            .await
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
        if let Some(content_type) = &cli.content_type {
            file = file.with_content_type(content_type.clone());
        }

        let result = client
            .upload(&mut file, &cli.token, |f| {
                eprint!("\r{} {:>3}%", f.file_name, f.progress);
                let _ = std::io::stderr().flush();
            })
            .await;
        eprintln!();

        match result {
            Ok(url) => println!("{}", url),
            Err(e) => {
                eprintln!("{}: {}", file.file_name, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} upload(s) failed", failures);
    }

    Ok(())
}
