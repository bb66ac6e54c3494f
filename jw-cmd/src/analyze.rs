//! One-shot analysis trigger.

use jw_client::MonitorClient;

/// Ask the server for a fresh bloom-risk evaluation and print the verdict.
pub async fn run_predict(client: &MonitorClient) -> anyhow::Result<()> {
    let result = client.predict().await?;
    println!("[{}] {} - {}", result.level.as_str(), result.zone_name, result.message);
    println!("evaluated at {}", result.timestamp.format("%Y-%m-%d %H:%M:%S"));
    Ok(())
}
