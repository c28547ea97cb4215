use crate::config::SlackConfig;
use crate::error::{ModLoggerError, Result};
use crate::metadata::{ChannelInfo, ChannelType, UserInfo};
use slack_morphism::prelude::*;
use std::sync::Arc;
use std::time::Instant;

pub struct SlackClient {
    client: Arc<SlackHyperClient>,
    token: SlackApiToken,
    app_token: SlackApiToken,
}

impl SlackClient {
    pub fn new(config: SlackConfig) -> Result<Self> {
        let connector = SlackClientHyperConnector::new()
            .map_err(|e| ModLoggerError::SlackApi(e.to_string()))?;

        let client = Arc::new(slack_morphism::SlackClient::new(connector));
        let token = SlackApiToken::new(config.bot_token.into());
        let app_token = SlackApiToken::new(config.app_token.into());

        Ok(Self {
            client,
            token,
            app_token,
        })
    }

    pub fn get_client(&self) -> Arc<SlackHyperClient> {
        self.client.clone()
    }

    pub fn get_app_token(&self) -> &SlackApiToken {
        &self.app_token
    }

    /// Check the bot token against `auth.test`
    pub async fn verify_auth(&self) -> Result<()> {
        let session = self.client.open_session(&self.token);

        let response = session
            .auth_test()
            .await
            .map_err(|e| ModLoggerError::SlackApi(e.to_string()))?;

        tracing::info!(
            bot_user_id = %response.user_id,
            team_id = %response.team_id,
            "Authenticated with Slack"
        );
        Ok(())
    }

    /// Check the app-level token by requesting a Socket Mode connection URL
    pub async fn verify_app_token(&self) -> Result<()> {
        let session = self.client.open_session(&self.app_token);

        session
            .apps_connections_open(&SlackApiAppsConnectionOpenRequest::new())
            .await
            .map_err(|e| ModLoggerError::SlackApi(e.to_string()))?;

        tracing::debug!("App token accepted for Socket Mode");
        Ok(())
    }

    /// Get channel information from Slack API
    pub async fn get_channel_info(&self, channel_id: &str) -> Result<ChannelInfo> {
        let session = self.client.open_session(&self.token);

        let request = SlackApiConversationsInfoRequest::new(SlackChannelId(channel_id.to_string()));

        let response = session
            .conversations_info(&request)
            .await
            .map_err(|e| ModLoggerError::SlackApi(e.to_string()))?;

        let channel = response.channel;

        let channel_type = if channel.flags.is_im.unwrap_or(false) {
            ChannelType::DirectMessage
        } else if channel.flags.is_mpim.unwrap_or(false) {
            ChannelType::MultiPartyDirectMessage
        } else if channel.flags.is_private.unwrap_or(false) {
            ChannelType::PrivateChannel
        } else {
            ChannelType::PublicChannel
        };

        Ok(ChannelInfo {
            name: channel.name.unwrap_or_else(|| channel_id.to_string()),
            channel_type,
            fetched_at: Instant::now(),
        })
    }

    /// Get user information from Slack API
    pub async fn get_user_info(&self, user_id: &str) -> Result<UserInfo> {
        let session = self.client.open_session(&self.token);

        let request = SlackApiUsersInfoRequest::new(SlackUserId(user_id.to_string()));

        let response = session
            .users_info(&request)
            .await
            .map_err(|e| ModLoggerError::SlackApi(e.to_string()))?;

        let user = response.user;

        Ok(UserInfo {
            name: user.name.unwrap_or_else(|| user_id.to_string()),
            real_name: user.real_name,
            display_name: user.profile.as_ref().and_then(|p| p.display_name.clone()),
            is_bot: user.flags.is_bot.unwrap_or(false),
            fetched_at: Instant::now(),
        })
    }
}
