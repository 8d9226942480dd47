use monoda::chrono::Utc;
use monoda::personal::{Monobank, Statement};
use std::env;
use ureq::tls::{TlsConfig, TlsProvider};
use ureq::Agent;

fn main() -> anyhow::Result<()> {
    let agent = Agent::from(
        Agent::config_builder()
            .tls_config(
                TlsConfig::builder()
                    .provider(TlsProvider::NativeTls)
                    .build(),
            )
            .build(),
    );
    let api_server =
        env::var("MONOBANK_URL").unwrap_or_else(|_| "https://api.monobank.ua/".to_string());
    let monobank = Monobank::new(api_server)?;

    let token = env::var("MONOBANK_TOKEN")?.parse()?;
    let account = env::args().nth(1).unwrap_or_else(|| "0".to_string()).parse()?;
    let from = Utc::now().timestamp() - 30 * 86_400;

    let mut resp = agent.run(monobank.get_statement(&token, &account, from))?;

    let statement: Statement = resp.body_mut().read_json()?;

    println!("{statement:#?}");

    Ok(())
}
