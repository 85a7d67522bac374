//! Query command - wait for an existing task from the command line.

use crate::cli::Output;
use crate::config::Settings;
use crate::generation::query;
use crate::vidu::{TaskId, ViduClient};
use anyhow::Result;

/// Poll a task until it finishes and print the result as JSON.
pub async fn run_query(task_id: &str, settings: Settings) -> Result<()> {
    let credentials = settings.credentials()?;
    let client = ViduClient::new(&credentials, settings.request_timeout())?;
    let task_id = TaskId::parse(task_id);

    let spinner = Output::spinner(&format!("Waiting for task {}...", task_id));
    let outcome = query(&client, &settings.poll_config(), task_id).await;
    spinner.finish_and_clear();

    match outcome {
        Ok(result) => {
            Output::success("Video ready");
            println!("{}", result.to_json_pretty()?);
            Ok(())
        }
        Err(e) => {
            Output::error(&e.to_tool_output());
            Err(e.into())
        }
    }
}
