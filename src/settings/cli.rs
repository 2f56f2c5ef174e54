use super::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    about = "Account signup, login and refresh-token rotation",
    long_about = "Account signup, login and refresh-token rotation.\n\n\
        With store.backend = \"memory\" every invocation starts with empty stores, \
        so accounts and sessions do not survive between commands. Use the \
        `scenario` command to walk signup, login and reissue in one process, or \
        point the settings at the \"real\" (MySQL + Redis) backend."
)]
pub struct Cli {
    #[arg(long)]
    pub settings: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register a new identity
    Signup {
        #[arg(long)]
        identifier: String,
        #[arg(long)]
        secret: String,
        #[arg(long)]
        admin: bool,
    },
    /// Exchange credentials for a token pair
    Login {
        #[arg(long)]
        identifier: String,
        #[arg(long)]
        secret: String,
    },
    /// Rotate a refresh token into a new pair
    Reissue {
        #[arg(long)]
        access_token: String,
        #[arg(long)]
        refresh_token: String,
    },
    /// Show who an access token belongs to
    Whoami {
        #[arg(long)]
        access_token: String,
    },
    /// Drop the session bound to an access token
    Logout {
        #[arg(long)]
        access_token: String,
    },
    /// Run signup, login, reissue, a replay of the old refresh token and a
    /// second reissue in one process
    Scenario {
        #[arg(long)]
        identifier: String,
        #[arg(long)]
        secret: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn scenario_subcommand_parses() {
        let cli = Cli::try_parse_from([
            "turnstile",
            "--settings",
            "settings/dev.toml",
            "scenario",
            "--identifier",
            "alice",
            "--secret",
            "secret123",
        ])
        .unwrap();

        assert_eq!(cli.settings.as_deref(), Some("settings/dev.toml"));
        match cli.command {
            Command::Scenario { identifier, secret } => {
                assert_eq!(identifier, "alice");
                assert_eq!(secret, "secret123");
            }
            other => panic!("parsed as {other:?}"),
        }
    }

    #[test]
    fn long_help_warns_about_the_memory_backend() {
        let cmd = Cli::command();
        let long_about = cmd.get_long_about().unwrap().to_string();
        assert!(long_about.contains("do not survive between commands"));
        assert!(cmd.find_subcommand("scenario").is_some());
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
