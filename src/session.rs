//! Session provider and the onboarding gate
//!
//! The provider owns the signed-in session and publishes every change on a
//! `watch` channel. The gate turns the latest session plus the profile's
//! onboarded flag into the route the app should show.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info};

use crate::db::{Database, Session};
use crate::store::{AuthStore, ProfileStore};

/// Where the app should send the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Loading,
    Unauthenticated,
    OnboardingRequired,
    Ready,
}

/// Holds the current session; readers either borrow it or subscribe
pub struct SessionProvider {
    tx: watch::Sender<Option<Session>>,
}

impl SessionProvider {
    pub fn new(initial: Option<Session>) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// Start from whatever session the database has stored
    pub fn load(db: &Database) -> Result<Self> {
        Ok(Self::new(db.current_session()?))
    }

    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }

    pub fn sign_in<A: AuthStore + ?Sized>(&self, auth: &A, email: &str) -> Result<Session> {
        let session = auth.sign_in(email)?;
        self.tx.send_replace(Some(session.clone()));
        Ok(session)
    }

    pub fn sign_out<A: AuthStore + ?Sized>(&self, auth: &A) -> Result<()> {
        auth.sign_out()?;
        self.tx.send_replace(None);
        Ok(())
    }
}

/// Decide the route for a session
pub fn resolve<P: ProfileStore + ?Sized>(session: Option<&Session>, profiles: &P) -> Result<GateState> {
    let Some(session) = session else {
        return Ok(GateState::Unauthenticated);
    };

    let onboarded = profiles
        .get_profile(session.user_id)?
        .is_some_and(|p| p.is_onboarded);

    Ok(if onboarded {
        GateState::Ready
    } else {
        GateState::OnboardingRequired
    })
}

/// Current route, starting in `Loading`
pub struct Gate {
    state: watch::Sender<GateState>,
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

impl Gate {
    pub fn new() -> Self {
        let (state, _) = watch::channel(GateState::Loading);
        Self { state }
    }

    pub fn state(&self) -> GateState {
        *self.state.borrow()
    }

    pub fn watch(&self) -> watch::Receiver<GateState> {
        self.state.subscribe()
    }

    /// Resolve once and publish the result. On error the previous state is kept.
    pub fn refresh<P: ProfileStore + ?Sized>(
        &self,
        session: Option<&Session>,
        profiles: &P,
    ) -> Result<GateState> {
        let next = resolve(session, profiles)?;
        let previous = self.state.send_replace(next);
        if previous != next {
            info!("Gate: {:?} -> {:?}", previous, next);
        }
        Ok(next)
    }

    /// Re-resolve on every session change until the provider goes away.
    ///
    /// The watch channel only keeps the latest session, so a burst of
    /// sign-in/sign-out events collapses into one resolution of the final
    /// session and checks never interleave.
    pub async fn run<P: ProfileStore + ?Sized>(
        &self,
        mut sessions: watch::Receiver<Option<Session>>,
        profiles: Arc<Mutex<P>>,
    ) {
        loop {
            let session = sessions.borrow_and_update().clone();
            {
                let profiles = profiles.lock().await;
                if let Err(e) = self.refresh(session.as_ref(), &*profiles) {
                    error!("Failed to resolve session state: {:#}", e);
                }
            }

            if sessions.changed().await.is_err() {
                debug!("Session provider dropped, gate stops");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ProfileUpdate, UserProfile};
    use crate::store::UserId;

    struct OfflineProfiles;

    impl ProfileStore for OfflineProfiles {
        fn get_profile(&self, _: UserId) -> Result<Option<UserProfile>> {
            anyhow::bail!("profile service unreachable")
        }

        fn update_profile(&self, _: UserId, _: &ProfileUpdate) -> Result<()> {
            anyhow::bail!("profile service unreachable")
        }
    }

    fn db_with_user(onboarded: bool) -> (Database, UserId) {
        let db = Database::in_memory().unwrap();
        let id = db.sign_up("gate@example.com").unwrap();
        if onboarded {
            db.update_profile(id, &ProfileUpdate {
                is_onboarded: Some(true),
                ..Default::default()
            })
            .unwrap();
        }
        (db, id)
    }

    #[test]
    fn test_gate_starts_loading() {
        assert_eq!(Gate::new().state(), GateState::Loading);
    }

    #[test]
    fn test_resolve_without_session() {
        let (db, _) = db_with_user(true);
        assert_eq!(resolve(None, &db).unwrap(), GateState::Unauthenticated);
    }

    #[test]
    fn test_resolve_onboarding_required_and_ready() {
        let (db, _) = db_with_user(false);
        let provider = SessionProvider::new(None);
        provider.sign_in(&db, "gate@example.com").unwrap();
        assert_eq!(
            resolve(provider.current().as_ref(), &db).unwrap(),
            GateState::OnboardingRequired
        );

        let (db, _) = db_with_user(true);
        let session = db.sign_in("gate@example.com").unwrap();
        assert_eq!(resolve(Some(&session), &db).unwrap(), GateState::Ready);
    }

    #[test]
    fn test_session_without_profile_needs_onboarding() {
        let db = Database::in_memory().unwrap();
        let session = Session {
            token: "t".to_string(),
            user_id: 77,
            created_at: chrono::Utc::now(),
        };
        assert_eq!(resolve(Some(&session), &db).unwrap(), GateState::OnboardingRequired);
    }

    #[test]
    fn test_provider_loads_stored_session() {
        let (db, id) = db_with_user(false);
        assert!(SessionProvider::load(&db).unwrap().current().is_none());
        db.sign_in("gate@example.com").unwrap();
        let provider = SessionProvider::load(&db).unwrap();
        assert_eq!(provider.current().map(|s| s.user_id), Some(id));
    }

    #[test]
    fn test_failed_sign_in_publishes_no_session() {
        let (db, _) = db_with_user(true);
        let provider = SessionProvider::new(None);
        let gate = Gate::new();
        gate.refresh(provider.current().as_ref(), &db).unwrap();
        assert_eq!(gate.state(), GateState::Unauthenticated);

        assert!(provider.sign_in(&db, "stranger@example.com").is_err());
        assert!(provider.current().is_none());
        assert_eq!(gate.state(), GateState::Unauthenticated);
    }

    #[test]
    fn test_failed_refresh_keeps_previous_state() {
        let (db, _) = db_with_user(true);
        let session = db.sign_in("gate@example.com").unwrap();
        let gate = Gate::new();
        assert_eq!(gate.refresh(Some(&session), &db).unwrap(), GateState::Ready);

        assert!(gate.refresh(Some(&session), &OfflineProfiles).is_err());
        assert_eq!(gate.state(), GateState::Ready);

        // No session needs no profile lookup, so the failing store is not hit
        assert_eq!(
            gate.refresh(None, &OfflineProfiles).unwrap(),
            GateState::Unauthenticated
        );
    }

    #[tokio::test]
    async fn test_gate_follows_auth_events() {
        let (db, _) = db_with_user(true);
        let db = Arc::new(Mutex::new(db));
        let provider = SessionProvider::new(None);
        let gate = Arc::new(Gate::new());
        let mut states = gate.watch();

        let runner = {
            let gate = gate.clone();
            let sessions = provider.subscribe();
            let db = db.clone();
            tokio::spawn(async move { gate.run(sessions, db).await })
        };

        states.wait_for(|s| *s == GateState::Unauthenticated).await.unwrap();

        {
            let db = db.lock().await;
            provider.sign_in(&*db, "gate@example.com").unwrap();
        }
        states.wait_for(|s| *s == GateState::Ready).await.unwrap();

        {
            let db = db.lock().await;
            provider.sign_out(&*db).unwrap();
        }
        states.wait_for(|s| *s == GateState::Unauthenticated).await.unwrap();

        drop(provider);
        runner.await.unwrap();
    }

    #[tokio::test]
    async fn test_rapid_events_settle_on_last_session() {
        let (db, _) = db_with_user(false);
        let db = Arc::new(Mutex::new(db));
        let provider = SessionProvider::new(None);
        let gate = Arc::new(Gate::new());

        {
            let db = db.lock().await;
            for _ in 0..5 {
                provider.sign_in(&*db, "gate@example.com").unwrap();
                provider.sign_out(&*db).unwrap();
            }
            provider.sign_in(&*db, "gate@example.com").unwrap();
        }

        let runner = {
            let gate = gate.clone();
            let sessions = provider.subscribe();
            let db = db.clone();
            tokio::spawn(async move { gate.run(sessions, db).await })
        };

        let mut states = gate.watch();
        states
            .wait_for(|s| *s == GateState::OnboardingRequired)
            .await
            .unwrap();

        drop(provider);
        runner.await.unwrap();
        assert_eq!(gate.state(), GateState::OnboardingRequired);
    }
}
