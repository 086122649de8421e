//! Process-wide wallet-connect session.
//!
//! Explicit one-shot initialization at process start: `init(&config)` must
//! be called once before any wallet interaction and fails fast when the
//! required project identifier is missing. There is no teardown.

use once_cell::sync::OnceCell;

use crate::chains::Chain;
use crate::config::{ AppMetadata, Config };
use crate::errors::{ Error, Result };
use crate::logger::{ self, LogTag };

#[derive(Debug, Clone)]
pub struct Session {
    pub project_id: String,
    pub metadata: AppMetadata,
    pub chains: Vec<Chain>,
}

impl Session {
    pub fn new(config: &Config) -> Result<Session> {
        if config.wallet_connect_project_id.trim().is_empty() {
            return Err(Error::Config("wallet-connect project id is required".to_string()));
        }
        Ok(Session {
            project_id: config.wallet_connect_project_id.clone(),
            metadata: config.metadata.clone(),
            chains: vec![Chain::Polygon, Chain::Arbitrum],
        })
    }
}

static SESSION: OnceCell<Session> = OnceCell::new();

/// Initialize the wallet-connect integration. Call exactly once at startup.
pub fn init(config: &Config) -> Result<&'static Session> {
    let session = Session::new(config)?;

    SESSION.set(session).map_err(|_|
        Error::Config("wallet-connect session already initialized".to_string())
    )?;

    let session = SESSION.get().expect("session was just set");
    logger::info(
        LogTag::System,
        &format!("🔌 Wallet-connect initialized for project {} ({} chains)", session.project_id, session.chains.len())
    );
    Ok(session)
}

/// The active session, if `init` has been called.
pub fn session() -> Option<&'static Session> {
    SESSION.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            wallet_connect_project_id: "abcdef0123456789".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_session_requires_project_id() {
        let err = Session::new(&Config::default()).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_init_is_one_shot() {
        let config = valid_config();
        // First init wins, second is rejected. (Single process-wide cell,
        // so both assertions live in one test.)
        let initialized = init(&config).unwrap();
        assert_eq!(initialized.project_id, "abcdef0123456789");
        assert_eq!(initialized.chains.len(), 2);
        assert!(session().is_some());

        assert!(init(&config).is_err());
    }
}
