use std::{env, path::PathBuf};

use anyhow::{Context, bail};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use filevault::client::{DirectorySaveTarget, HttpFileApi, Notifier, ViewController};

const USAGE: &str = "usage: filevault-cli list | upload <path> [note] | download <id> [dir]";

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn info(&self, message: &str) {
        println!("{}", message);
    }

    fn warning(&self, message: &str) {
        eprintln!("warning: {}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("error: {}", message);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let base_url = env::var("FILEVAULT_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let args: Vec<String> = env::args().skip(1).collect();

    let save_dir = match (args.first().map(String::as_str), args.get(2)) {
        (Some("download"), Some(dir)) => PathBuf::from(dir),
        _ => env::current_dir().context("Failed to resolve current directory")?,
    };

    let mut view = ViewController::new(
        HttpFileApi::new(base_url),
        ConsoleNotifier,
        DirectorySaveTarget::new(save_dir),
    );

    view.load().await?;

    match args.first().map(String::as_str) {
        Some("list") => {
            for file in view.files() {
                println!(
                    "{}  {:>10}  {}  {}  {}",
                    file.id,
                    file.file_size,
                    file.created_at.format("%Y-%m-%d %H:%M:%S"),
                    file.file_name,
                    file.note.as_deref().unwrap_or("")
                );
            }
        }
        Some("upload") => {
            let path = args.get(1).context(USAGE)?;
            view.select_file(Some(PathBuf::from(path)));
            if let Some(note) = args.get(2) {
                view.set_note(note.clone());
            }
            let record = view.upload().await?;
            println!("{}  sha256:{}", record.id, record.checksum);
        }
        Some("download") => {
            let id: Uuid = args
                .get(1)
                .context(USAGE)?
                .parse()
                .context("File ID must be a UUID")?;
            let path = view.download(id).await?;
            println!("{}", path.display());
        }
        _ => bail!(USAGE),
    }

    Ok(())
}
