pub mod queries;
pub mod state;
pub mod store;
pub mod update;

use log::*;
use sqlx::postgres::{PgPoolOptions, Postgres};
use state::*;
use std::sync::Arc;
use store::UpdateStore;
use tokio::sync::mpsc::Receiver;
use tokio::sync::{Mutex, Notify};
use update::results::UpdateFailure;
use update::*;

pub type Pool = sqlx::Pool<Postgres>;

pub async fn create_db_pool(conn_string: &str) -> Result<Pool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(conn_string)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Single consumer of state updates. Each update is applied to a copy of the
/// state, stored, and only then becomes visible. Updates are handled strictly
/// in the order they arrive.
pub async fn update_worker<S: UpdateStore>(
    store: S,
    state: Arc<Mutex<State>>,
    state_notify: Arc<Notify>,
    mut update_receiver: Receiver<StateUpdate>,
) {
    info!("Update state worker started");
    while let Some(upd) = update_receiver.recv().await {
        debug!("Applying state update: {:?}", upd);
        let StateUpdate {
            created,
            body,
            callback_channel,
        } = upd;
        let result = {
            let mut mstate = state.lock().await;
            let mut copy_state = mstate.clone();
            match copy_state.apply_update(created, body.clone()) {
                Ok(()) => match store.store_update(&body, created).await {
                    Ok(()) => {
                        *mstate = copy_state;
                        Ok(())
                    }
                    Err(e) => {
                        error!("Failed to store state update, reverting: {e}");
                        Err(UpdateFailure::Store(e))
                    }
                },
                Err(e) => {
                    error!("Failed to apply state update: {e}");
                    Err(UpdateFailure::Apply(e))
                }
            }
        };
        if result.is_ok() {
            state_notify.notify_waiters();
        }
        if let Some(callback) = callback_channel {
            if callback.send(result).is_err() {
                warn!("State update issuer is gone before receiving the result");
            }
        }
    }
    info!("Update state worker exited!");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::update::otp::WithdrawalOtpInfo;
    use crate::update::signup::{SignupAuth, SignupInfo};
    use chrono::prelude::*;
    use tokio::sync::mpsc;

    fn spawn_worker(store: MemoryStore) -> (Arc<Mutex<State>>, mpsc::Sender<StateUpdate>) {
        let _ = env_logger::builder().is_test(true).try_init();
        let state = Arc::new(Mutex::new(State::default()));
        let (sender, receiver) = mpsc::channel(100);
        tokio::spawn(update_worker(
            store,
            state.clone(),
            Arc::new(Notify::new()),
            receiver,
        ));
        (state, sender)
    }

    fn signup(name: &str) -> UpdateBody {
        UpdateBody::Signup(SignupInfo {
            username: name.to_owned(),
            email: format!("{name}@x.com"),
            auth: SignupAuth::Password("hash".to_owned()),
        })
    }

    #[tokio::test]
    async fn test_worker_applies_and_stores() {
        let store = MemoryStore::new();
        let (state, sender) = spawn_worker(store.clone());
        commit_update(&sender, StateUpdate::new(signup("u1")))
            .await
            .expect("signup committed");
        assert!(state.lock().await.users.contains_key("u1"));
        assert_eq!(store.bodies().await, vec![signup("u1")]);
    }

    #[tokio::test]
    async fn test_worker_reverts_on_store_failure() {
        let store = MemoryStore::new();
        let (state, sender) = spawn_worker(store.clone());
        commit_update(&sender, StateUpdate::new(signup("u1")))
            .await
            .unwrap();

        store.close();
        let now = Utc::now().naive_utc();
        let res = commit_update(
            &sender,
            StateUpdate::at(
                now,
                UpdateBody::WithdrawalOtp(WithdrawalOtpInfo {
                    user: "u1".to_owned(),
                    otp: WithdrawalOtp::new("123456", now),
                }),
            ),
        )
        .await;
        assert!(matches!(res, Err(UpdateFailure::Store(_))));
        assert_eq!(state.lock().await.users["u1"].withdrawal_otp, None);
    }

    #[tokio::test]
    async fn test_worker_rejects_invalid_update() {
        let store = MemoryStore::new();
        let (state, sender) = spawn_worker(store.clone());
        commit_update(&sender, StateUpdate::new(signup("u1")))
            .await
            .unwrap();
        let res = commit_update(&sender, StateUpdate::new(signup("u1"))).await;
        assert!(matches!(
            res,
            Err(UpdateFailure::Apply(StateUpdateErr::UserAlreadyExists(_)))
        ));
        assert_eq!(state.lock().await.users.len(), 1);
        assert_eq!(store.bodies().await.len(), 1);
    }

    #[tokio::test]
    async fn test_replay_rebuilds_state() {
        let store = MemoryStore::new();
        let (state, sender) = spawn_worker(store.clone());
        commit_update(&sender, StateUpdate::new(signup("u1")))
            .await
            .unwrap();
        for code in ["111111", "222222"] {
            let now = Utc::now().naive_utc();
            commit_update(
                &sender,
                StateUpdate::at(
                    now,
                    UpdateBody::WithdrawalOtp(WithdrawalOtpInfo {
                        user: "u1".to_owned(),
                        otp: WithdrawalOtp::new(code, now),
                    }),
                ),
            )
            .await
            .unwrap();
        }

        let replayed = queries::query_state(&store).await.unwrap();
        assert_eq!(replayed, *state.lock().await);
        assert_eq!(
            replayed.users["u1"].withdrawal_otp.as_ref().map(|o| o.code.as_str()),
            Some("222222")
        );
    }

    #[tokio::test]
    async fn test_updates_without_callback() {
        let store = MemoryStore::new();
        let (state, sender) = spawn_worker(store.clone());
        sender.send(StateUpdate::new(signup("u1"))).await.unwrap();
        // The next committed update is handled after the first one
        commit_update(&sender, StateUpdate::new(signup("u2")))
            .await
            .unwrap();
        assert_eq!(state.lock().await.users.len(), 2);
    }
}
