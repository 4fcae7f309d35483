use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use herald_commands::{Guild, User};
use serde::{Deserialize, Serialize};

pub const HOST_FIXTURE_SCHEMA_VERSION: u32 = 1;

fn host_fixture_schema_version() -> u32 {
    HOST_FIXTURE_SCHEMA_VERSION
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
/// Failure switches for exercising host error paths.
pub struct HostFaults {
    #[serde(default)]
    pub fail_user_lookup: bool,
    #[serde(default)]
    pub fail_guild_lookup: bool,
    #[serde(default)]
    pub fail_status_update: bool,
    #[serde(default)]
    pub fail_message_send: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Public struct `HostFixture` describing the simulated platform state.
pub struct HostFixture {
    #[serde(default = "host_fixture_schema_version")]
    pub schema_version: u32,
    pub current_user: User,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub guilds: Vec<Guild>,
    #[serde(default)]
    pub faults: HostFaults,
}

impl HostFixture {
    pub fn new(current_user: User) -> Self {
        Self {
            schema_version: HOST_FIXTURE_SCHEMA_VERSION,
            current_user,
            users: Vec::new(),
            guilds: Vec::new(),
            faults: HostFaults::default(),
        }
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.users.push(user);
        self
    }

    pub fn with_guild(mut self, guild: Guild) -> Self {
        self.guilds.push(guild);
        self
    }

    pub fn with_faults(mut self, faults: HostFaults) -> Self {
        self.faults = faults;
        self
    }

    pub fn find_user(&self, user_id: &str) -> Option<&User> {
        if self.current_user.id == user_id {
            return Some(&self.current_user);
        }
        self.users.iter().find(|user| user.id == user_id)
    }

    pub fn find_guild(&self, guild_id: &str) -> Option<&Guild> {
        self.guilds.iter().find(|guild| guild.id == guild_id)
    }
}

pub fn parse_host_fixture(raw: &str) -> Result<HostFixture> {
    let fixture = serde_json::from_str::<HostFixture>(raw).context("failed to parse host fixture")?;
    validate_host_fixture(&fixture)?;
    Ok(fixture)
}

pub fn load_host_fixture(path: &Path) -> Result<HostFixture> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read host fixture {}", path.display()))?;
    parse_host_fixture(&raw)
        .with_context(|| format!("invalid host fixture {}", path.display()))
}

pub fn validate_host_fixture(fixture: &HostFixture) -> Result<()> {
    if fixture.schema_version != HOST_FIXTURE_SCHEMA_VERSION {
        bail!(
            "unsupported host fixture schema version {} (expected {})",
            fixture.schema_version,
            HOST_FIXTURE_SCHEMA_VERSION
        );
    }
    if fixture.current_user.id.trim().is_empty() {
        bail!("host fixture current_user.id cannot be empty");
    }

    let mut user_ids = HashSet::new();
    for user in &fixture.users {
        if user.id.trim().is_empty() {
            bail!("host fixture contains a user with an empty id");
        }
        if !user_ids.insert(user.id.as_str()) {
            bail!("host fixture contains duplicate user id '{}'", user.id);
        }
    }

    let mut guild_ids = HashSet::new();
    for guild in &fixture.guilds {
        if guild.id.trim().is_empty() {
            bail!("host fixture contains a guild with an empty id");
        }
        if guild.owner_id.trim().is_empty() {
            bail!("host fixture guild '{}' has an empty owner_id", guild.id);
        }
        if !guild_ids.insert(guild.id.as_str()) {
            bail!("host fixture contains duplicate guild id '{}'", guild.id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load_host_fixture, parse_host_fixture, HOST_FIXTURE_SCHEMA_VERSION};

    const SAMPLE_FIXTURE: &str = r#"{
        "schema_version": 1,
        "current_user": {"id": "100", "username": "operator", "discriminator": "0001"},
        "users": [
            {"id": "200", "username": "ada", "discriminator": "1815", "avatar": "abc123"}
        ],
        "guilds": [
            {
                "id": "g1",
                "owner_id": "200",
                "members": [{"user_id": "200", "permissions": "8"}]
            }
        ]
    }"#;

    #[test]
    fn unit_parse_host_fixture_reads_users_guilds_and_defaults() {
        let fixture = parse_host_fixture(SAMPLE_FIXTURE).expect("fixture should parse");
        assert_eq!(fixture.schema_version, HOST_FIXTURE_SCHEMA_VERSION);
        assert_eq!(fixture.find_user("200").map(|user| user.username.as_str()), Some("ada"));
        assert_eq!(
            fixture.find_user("100").map(|user| user.username.as_str()),
            Some("operator")
        );
        assert_eq!(fixture.find_guild("g1").map(|guild| guild.members.len()), Some(1));
        assert!(!fixture.faults.fail_message_send);
        assert!(!fixture.current_user.bot);
    }

    #[test]
    fn regression_parse_host_fixture_rejects_duplicate_users() {
        let raw = r#"{
            "current_user": {"id": "100", "username": "operator"},
            "users": [
                {"id": "200", "username": "ada"},
                {"id": "200", "username": "grace"}
            ]
        }"#;
        let error = parse_host_fixture(raw).expect_err("duplicate ids must fail");
        assert!(error.to_string().contains("duplicate user id '200'"));
    }

    #[test]
    fn regression_parse_host_fixture_rejects_unsupported_schema_version() {
        let raw = r#"{"schema_version": 9, "current_user": {"id": "100", "username": "operator"}}"#;
        let error = parse_host_fixture(raw).expect_err("schema version must match");
        assert!(error
            .to_string()
            .contains("unsupported host fixture schema version 9"));
    }

    #[test]
    fn functional_load_host_fixture_reads_file_and_reports_missing_path() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let path = tempdir.path().join("host.json");
        std::fs::write(&path, SAMPLE_FIXTURE).expect("write fixture");
        let fixture = load_host_fixture(&path).expect("load fixture");
        assert_eq!(fixture.guilds.len(), 1);

        let missing = tempdir.path().join("missing.json");
        let error = load_host_fixture(&missing).expect_err("missing file");
        assert!(error.to_string().contains("failed to read host fixture"));
    }
}
