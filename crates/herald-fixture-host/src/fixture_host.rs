use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use herald_commands::{
    CommunityDirectory, CurrentUserAccessor, CustomStatus, Guild, HostError, MessageSink,
    OutboundMessage, StatusMutator, User, UserDirectory,
};
use serde::Serialize;
use tracing::debug;

use crate::host_fixture::HostFixture;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Public struct `SentMessage` recorded by [`FixtureHost`].
pub struct SentMessage {
    pub channel_id: String,
    pub message: OutboundMessage,
}

/// In-memory host implementing every collaborator the dispatcher consumes.
///
/// Sent messages and status mutations are recorded for inspection; lookups
/// are counted so tests can assert which collaborators an invocation touched.
#[derive(Debug)]
pub struct FixtureHost {
    fixture: HostFixture,
    sent: Mutex<Vec<SentMessage>>,
    custom_status: Mutex<Option<CustomStatus>>,
    user_lookups: AtomicUsize,
    guild_lookups: AtomicUsize,
}

impl FixtureHost {
    pub fn new(fixture: HostFixture) -> Self {
        Self {
            fixture,
            sent: Mutex::new(Vec::new()),
            custom_status: Mutex::new(None),
            user_lookups: AtomicUsize::new(0),
            guild_lookups: AtomicUsize::new(0),
        }
    }

    pub fn fixture(&self) -> &HostFixture {
        &self.fixture
    }

    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn custom_status(&self) -> Option<CustomStatus> {
        self.custom_status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn user_lookup_count(&self) -> usize {
        self.user_lookups.load(Ordering::Relaxed)
    }

    pub fn guild_lookup_count(&self) -> usize {
        self.guild_lookups.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl MessageSink for FixtureHost {
    async fn send(&self, channel_id: &str, message: OutboundMessage) -> Result<(), HostError> {
        if self.fixture.faults.fail_message_send {
            return Err(HostError::new("simulated message transport failure"));
        }
        debug!(channel_id, "fixture host recorded outbound message");
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SentMessage {
                channel_id: channel_id.to_string(),
                message,
            });
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for FixtureHost {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, HostError> {
        self.user_lookups.fetch_add(1, Ordering::Relaxed);
        if self.fixture.faults.fail_user_lookup {
            return Err(HostError::new("simulated user store failure"));
        }
        Ok(self.fixture.find_user(user_id).cloned())
    }
}

#[async_trait]
impl StatusMutator for FixtureHost {
    async fn set_custom_status(&self, status: CustomStatus) -> Result<(), HostError> {
        if self.fixture.faults.fail_status_update {
            return Err(HostError::new("simulated presence update failure"));
        }
        *self
            .custom_status
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(status);
        Ok(())
    }
}

#[async_trait]
impl CommunityDirectory for FixtureHost {
    async fn get_guild(&self, guild_id: &str) -> Result<Option<Guild>, HostError> {
        self.guild_lookups.fetch_add(1, Ordering::Relaxed);
        if self.fixture.faults.fail_guild_lookup {
            return Err(HostError::new("simulated guild store failure"));
        }
        Ok(self.fixture.find_guild(guild_id).cloned())
    }
}

impl CurrentUserAccessor for FixtureHost {
    fn current_user(&self) -> User {
        self.fixture.current_user.clone()
    }
}
