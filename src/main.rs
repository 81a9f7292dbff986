use splunk_log_stream::app;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match app::main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("splunk-log-stream: {e:#}");
            ExitCode::FAILURE
        }
    }
}
