use std::io::Read;
use std::path::PathBuf;

use structopt::StructOpt;

use sparkpost_transport::{config, email::MailMessage, SparkPostTransport};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "sparkpost-send",
    about = "Send a JSON mail message through SparkPost."
)]
struct Opt {
    /// TOML config file; SPARKPOST_* environment variables override it
    #[structopt(short, long)]
    config: Option<String>,

    /// JSON message to send; read from stdin when omitted
    #[structopt(short, long, parse(from_os_str))]
    message: Option<PathBuf>,
}

fn read_message(path: Option<&PathBuf>) -> Result<String, std::io::Error> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            Ok(raw)
        }
    }
}

async fn run(opt: Opt) -> Result<String, Box<dyn std::error::Error>> {
    let config = config::load_config(opt.config.as_deref())?;

    if config.api_key.is_none() {
        log::warn!("No API key configured; SparkPost will reject the request");
    }

    let transport = SparkPostTransport::new(config)?;
    log::info!("Using {} transport v{}", transport.name(), transport.version());

    let message = MailMessage::from_json(&read_message(opt.message.as_ref())?)?;
    let result = transport.send(&message).await?;

    Ok(serde_json::to_string(&result)?)
}

#[tokio::main]
async fn main() {
    // Init logger
    env_logger::builder().format_timestamp_micros().init();

    let opt = Opt::from_args();

    match run(opt).await {
        Ok(result) => println!("{}", result),
        Err(e) => {
            log::error!("Failed to send message: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    static SAMPLE_MESSAGE_PATH: &str =
        concat!(env!("CARGO_MANIFEST_DIR"), "/resources", "/message.json");
    static SAMPLE_CONFIG_PATH: &str =
        concat!(env!("CARGO_MANIFEST_DIR"), "/resources", "/sparkpost.toml");

    #[test]
    fn sample_message_builds_transmission() {
        let path = PathBuf::from(SAMPLE_MESSAGE_PATH);
        let message = MailMessage::from_json(&read_message(Some(&path)).unwrap()).unwrap();

        let config = config::load_config(Some(SAMPLE_CONFIG_PATH)).unwrap();
        let transport = SparkPostTransport::new(config).unwrap();
        let transmission = transport.build_transmission(&message);

        let emails: Vec<_> = transmission
            .recipients
            .iter()
            .filter_map(|r| r.address.email.as_deref())
            .collect();
        assert_eq!(
            emails,
            vec!["jane@example.com", "john@example.com", "audit@example.com"]
        );
        assert_eq!(transmission.tags, Some(vec!["transactional".to_string()]));
        assert_eq!(transmission.content["attachments"].as_array().unwrap().len(), 1);
        assert_eq!(
            transmission.content["from"]["email"],
            serde_json::json!("noreply@example.com")
        );
    }
}
