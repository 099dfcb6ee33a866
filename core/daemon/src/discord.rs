//! Discord Rich Presence transport built on discord-sdk.
//!
//! The core crate is synchronous, so each connector owns a small tokio
//! runtime and blocks on it for every call into the SDK.

use std::sync::Arc;
use std::time::Duration;

use discord_sdk::{
    activity::{ActivityBuilder, Assets},
    wheel::{UserSpoke, UserState, Wheel},
    Discord, Subscriptions,
};
use tf2rp_core::{ConnectError, PresenceConnection, PresenceConnector, PresencePayload};
use tokio::runtime::Runtime;

/// Timeout for waiting for Discord handshake
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct DiscordConnector {
    app_id: i64,
    runtime: Arc<Runtime>,
}

impl DiscordConnector {
    pub fn new(app_id: i64) -> Result<Self, String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("discord-ipc")
            .enable_all()
            .build()
            .map_err(|e| format!("Failed to start Discord runtime: {}", e))?;
        Ok(Self {
            app_id,
            runtime: Arc::new(runtime),
        })
    }
}

impl PresenceConnector for DiscordConnector {
    type Connection = DiscordConnection;

    fn connect(&mut self) -> Result<DiscordConnection, ConnectError> {
        let (wheel, handler) = Wheel::new(Box::new(|err| {
            tracing::warn!("Discord error: {:?}", err);
        }));
        let mut user_spoke = wheel.user();

        let discord = {
            let _entered = self.runtime.enter();
            Discord::new(self.app_id, Subscriptions::ACTIVITY, Box::new(handler))
                .map_err(|e| ConnectError::Other(format!("{:?}", e)))?
        };

        tracing::info!("Discord connecting...");

        let handshake = self.runtime.block_on(tokio::time::timeout(HANDSHAKE_TIMEOUT, async {
            if user_spoke.0.changed().await.is_err() {
                return Err("Discord connection closed".to_string());
            }
            match &*user_spoke.0.borrow() {
                UserState::Connected(user) => Ok(user.username.clone()),
                UserState::Disconnected(err) => Err(format!("Discord disconnected: {:?}", err)),
            }
        }));

        let reason = match handshake {
            Ok(Ok(username)) => {
                tracing::info!(user = %username, "Discord Rich Presence connected");
                return Ok(DiscordConnection {
                    runtime: Arc::clone(&self.runtime),
                    discord: Some(discord),
                    user_spoke,
                    _wheel: wheel,
                });
            }
            Ok(Err(reason)) => reason,
            Err(_) => "Discord handshake timed out".to_string(),
        };

        self.runtime.block_on(discord.disconnect());
        Err(ConnectError::Unreachable(reason))
    }
}

pub struct DiscordConnection {
    runtime: Arc<Runtime>,
    discord: Option<Discord>,
    user_spoke: UserSpoke,
    _wheel: Wheel,
}

fn activity_for(payload: &PresencePayload) -> ActivityBuilder {
    let assets = Assets::default()
        .large(
            payload.large_icon_key.clone(),
            Some(payload.large_icon_label.clone()),
        )
        .small(
            payload.small_icon_key.clone(),
            Some(payload.small_icon_label.clone()),
        );

    ActivityBuilder::new()
        .details(payload.title.clone())
        .state(payload.subtitle.clone())
        .assets(assets)
        .start_timestamp(payload.session_start_timestamp)
}

impl PresenceConnection for DiscordConnection {
    fn update(&mut self, payload: &PresencePayload) -> Result<(), String> {
        let discord = self.discord.as_ref().ok_or("Discord is disconnected")?;
        self.runtime
            .block_on(discord.update_activity(activity_for(payload)))
            .map(|_| ())
            .map_err(|e| format!("Failed to update Discord activity: {:?}", e))
    }

    fn is_connected(&self) -> bool {
        self.discord.is_some()
            && matches!(&*self.user_spoke.0.borrow(), UserState::Connected(_))
    }

    fn disconnect(&mut self) -> Result<(), String> {
        if let Some(discord) = self.discord.take() {
            self.runtime.block_on(discord.disconnect());
            tracing::info!("Discord Rich Presence disconnected");
        }
        Ok(())
    }
}
