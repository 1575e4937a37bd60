mod backup;
mod cli;
mod config;
mod database;
mod error;
mod log;
mod upload;

use tracing::info;

#[tokio::main]
async fn main() {
    log::init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    match cli::run(&args).await {
        Ok(result) => {
            info!(
                "Backup {} uploaded ({} bytes, sha256 {}) in {} sec, {} stale object(s) pruned",
                result.name,
                result.file_size,
                result.sha256.as_deref().unwrap_or("n/a"),
                result.duration_secs,
                result.prune.deleted.len()
            );
            println!("{}", result.name);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.code() == -1 {
                eprintln!("{}", cli::USAGE);
            }
            std::process::exit(e.code());
        }
    }
}
