use log::debug;
use serde::{Deserialize, Serialize};
use twitch_oauth2::Scope;
use url::Url;

use crate::auth::AuthError;

const AUTHORIZE_URL: &str = "https://id.twitch.tv/oauth2/authorize";
pub const TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

/// Returns the url of the page where the bot's twitch account authorizes us.
pub fn build_authorization_url(
    client_id: &str,
    redirect_uri: &str,
    scopes: &[Scope],
) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(AUTHORIZE_URL)?;

    let scope = scopes.join(" ");

    url.query_pairs_mut().extend_pairs([
        ("client_id", client_id),
        ("redirect_uri", redirect_uri),
        ("response_type", "code"),
        ("scope", scope.as_str()),
    ]);

    Ok(url)
}

#[derive(Deserialize, Debug, Clone)]
pub struct TwitchTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Trades the `code` from twitch's redirect for a user access token.
pub async fn exchange_code_for_token(
    http: &reqwest::Client,
    token_url: &str,
    code: &str,
    client_id: &str,
    client_secret: &str,
    redirect_uri: &str,
) -> Result<String, AuthError> {
    #[derive(Serialize)]
    struct OauthPostBody<'a> {
        client_id: &'a str,
        client_secret: &'a str,
        code: &'a str,
        grant_type: &'a str,
        redirect_uri: &'a str,
    }
    let body = OauthPostBody {
        client_id,
        client_secret,
        code,
        grant_type: "authorization_code",
        redirect_uri,
    };

    let response = http.post(token_url).form(&body).send().await?;

    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(AuthError::Status { status, body: text });
    }

    let token: TwitchTokenResponse = serde_json::from_str(&text)?;
    debug!(
        "got twitch access token (refresh token included: {})",
        token.refresh_token.is_some()
    );

    Ok(token.access_token)
}
