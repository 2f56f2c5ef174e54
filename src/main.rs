use serde_json::{Value, json};
use turnstile::application_impl::run_rotation_scenario;
use turnstile::application_port::*;
use turnstile::domain_model::*;
use turnstile::logger::*;
use turnstile::server::*;
use turnstile::settings::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    debug!(?project_settings);
    let logger_config = LogConfig {
        filter: project_settings.log.filter.clone(),
    };
    logger.reload_from_config(&logger_config)?;

    let server = Server::try_new(&project_settings).await?;
    let outcome = run(cli.command, server.auth_service.as_ref()).await;
    server.shutdown().await;

    let output = outcome?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(command: Command, auth_service: &dyn AuthService) -> Result<Value, AuthError> {
    let output = match command {
        Command::Signup {
            identifier,
            secret,
            admin,
        } => {
            let authority = admin.then_some(Authority::Admin);
            let out = auth_service
                .signup(SignupInput {
                    identifier,
                    secret,
                    authority,
                })
                .await?;
            json!(out)
        }
        Command::Login { identifier, secret } => {
            let pair = auth_service
                .login(LoginInput { identifier, secret })
                .await?;
            json!(pair)
        }
        Command::Reissue {
            access_token,
            refresh_token,
        } => {
            let pair = auth_service
                .reissue(ReissueInput {
                    access_token: AccessToken(access_token),
                    refresh_token: RefreshToken(refresh_token),
                })
                .await?;
            json!(pair)
        }
        Command::Whoami { access_token } => {
            let claim = auth_service.authenticate(&access_token).await?;
            json!(claim)
        }
        Command::Logout { access_token } => {
            auth_service.logout(&access_token).await?;
            json!({ "logged_out": true })
        }
        Command::Scenario { identifier, secret } => {
            let report = run_rotation_scenario(auth_service, &identifier, &secret).await?;
            json!(report)
        }
    };
    Ok(output)
}
