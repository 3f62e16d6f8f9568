pub use clap::Parser;

use url::Url;

use common::api_key::ApiKey;

#[derive(Parser, Debug)]
#[command(name = "relay")]
#[command(about = "Hand a JSON payload to exactly one other client through an encrypted relay")]
pub struct Args {
    /// Relay to talk to
    #[arg(long, global = true, default_value = "http://localhost:3000")]
    pub remote: Url,

    /// 32 hex character identity secret (optional when the relay is on loopback)
    #[arg(long, global = true, env = "RELAY_API_KEY", hide_env_values = true)]
    pub api_key: Option<ApiKey>,

    #[command(subcommand)]
    pub command: crate::Command,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Command;

    #[test]
    fn test_remote_defaults_to_localhost() {
        let args = Args::try_parse_from(["relay", "state"]).unwrap();
        assert_eq!(args.remote.as_str(), "http://localhost:3000/");
        assert!(matches!(args.command, Command::State(_)));
    }

    #[test]
    fn test_api_key_is_validated_client_side() {
        let args = Args::try_parse_from([
            "relay",
            "fetch",
            "--api-key",
            "11112222333344445555666677778888",
        ])
        .unwrap();
        assert_eq!(
            args.api_key.unwrap().expose(),
            "11112222333344445555666677778888"
        );

        assert!(Args::try_parse_from(["relay", "fetch", "--api-key", "nope"]).is_err());
    }

    #[test]
    fn test_upload_takes_a_file() {
        let args = Args::try_parse_from([
            "relay",
            "upload",
            "sample.json",
            "--remote",
            "http://relay.example:8080",
        ])
        .unwrap();
        assert_eq!(args.remote.port(), Some(8080));
        match args.command {
            Command::Upload(upload) => assert_eq!(upload.file.to_str(), Some("sample.json")),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
