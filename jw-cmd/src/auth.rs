use jw_client::MonitorClient;

pub async fn run_login(
    client: &MonitorClient,
    username: &str,
    password: &str,
) -> anyhow::Result<()> {
    let session = client.login(username, password).await?;
    println!("Logged in as {}", session.username);
    Ok(())
}

pub fn run_logout(client: &MonitorClient) -> anyhow::Result<()> {
    client.logout()?;
    println!("Session cleared");
    Ok(())
}
