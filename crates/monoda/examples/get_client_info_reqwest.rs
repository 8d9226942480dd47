use monoda::personal::{ClientInfo, Monobank};
use reqwest::Client;
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = Client::new();
    let api_server =
        env::var("MONOBANK_URL").unwrap_or_else(|_| "https://api.monobank.ua/".to_string());
    let monobank = Monobank::new(api_server)?;
    let token = env::var("MONOBANK_TOKEN")?.parse()?;

    let req = monobank.get_client_info(&token).map(|_| "");
    let resp = client.execute(req.try_into()?).await?;

    let info: ClientInfo = resp.json().await?;

    println!("{} can reach {} accounts:", info.name, info.accounts.len());
    for account in &info.accounts {
        println!(
            "  {} [{}] balance {} (currency {})",
            account.id, account.account_type, account.balance, account.currency_code
        );
    }

    Ok(())
}
