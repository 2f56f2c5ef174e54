use crate::application_port::*;
use crate::domain_model::*;
use crate::logger::*;
use serde::Serialize;

/// Everything one signup -> login -> reissue -> replay -> reissue walk produced.
#[derive(Debug, Serialize)]
pub struct ScenarioReport {
    pub signup: SignupOutput,
    pub login: TokenPair,
    pub reissued: TokenPair,
    pub replay_rejected_with: String,
    pub reissued_again: TokenPair,
}

/// Drives the whole rotation lifecycle against one service instance, so it
/// works even on the process-local memory backend.
pub async fn run_rotation_scenario(
    auth_service: &dyn AuthService,
    identifier: &str,
    secret: &str,
) -> Result<ScenarioReport, AuthError> {
    let signup = auth_service
        .signup(SignupInput {
            identifier: identifier.to_string(),
            secret: secret.to_string(),
            authority: None,
        })
        .await?;

    let login = auth_service
        .login(LoginInput {
            identifier: identifier.to_string(),
            secret: secret.to_string(),
        })
        .await?;

    let first_reissue = ReissueInput {
        access_token: login.access_token.clone(),
        refresh_token: login.refresh_token.clone(),
    };
    let reissued = auth_service.reissue(first_reissue.clone()).await?;

    let replay_rejected_with = match auth_service.reissue(first_reissue).await {
        Err(AuthError::TokenMismatch) => AuthError::TokenMismatch.to_string(),
        Err(e) => return Err(e),
        Ok(_) => {
            return Err(AuthError::InternalError(
                "superseded refresh token was accepted".to_string(),
            ));
        }
    };
    debug!(%identifier, "replayed refresh token rejected");

    let reissued_again = auth_service
        .reissue(ReissueInput {
            access_token: reissued.access_token.clone(),
            refresh_token: reissued.refresh_token.clone(),
        })
        .await?;

    Ok(ScenarioReport {
        signup,
        login,
        reissued,
        replay_rejected_with,
        reissued_again,
    })
}
