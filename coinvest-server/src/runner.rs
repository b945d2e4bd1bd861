use figment::Figment;
use futures::future::{AbortRegistration, Abortable, Aborted};
use log::*;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex, Notify};

use coinvest_db::queries::query_state;
use coinvest_db::store::{MemoryStore, UpdateStore};
use coinvest_db::{create_db_pool, update_worker};
use coinvest_mailer::{LogMailer, MailClient, OtpMailer};
use coinvest_public::api::serve_api;
use coinvest_public::otp::RandomOtpGenerator;
use coinvest_public::processor::LedgerWithdrawalProcessor;

use crate::Args;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("Database query error: {0}")]
    Query(#[from] coinvest_db::queries::Error),
    #[error("Public API error: {0}")]
    Api(#[from] rocket::Error),
    #[error("Server was aborted from outside")]
    Aborted,
}

/// Rocket settings with command line overrides on top
pub fn api_figment(args: &Args) -> Figment {
    let mut figment = rocket::Config::figment();
    if let Some(port) = args.api_port {
        figment = figment.merge(("port", port));
    }
    if let Some(key) = &args.api_secret_key {
        figment = figment.merge(("secret_key", key));
    }
    figment
}

fn make_mailer(args: &Args) -> Arc<dyn OtpMailer> {
    match &args.mailer_url {
        Some(url) => {
            info!("Sending mail through {url}");
            Arc::new(MailClient::new(url, &args.mailer_key, &args.mailer_sender))
        }
        None => {
            warn!("No mail provider configured, letters are written to the log");
            Arc::new(LogMailer)
        }
    }
}

pub async fn run_server(
    args: &Args,
    start_notify: Arc<Notify>,
    abort_reg: AbortRegistration,
) -> Result<(), Error> {
    if args.in_memory {
        warn!("Using in-memory storage, state is lost on exit");
        run_with_store(args, MemoryStore::new(), start_notify, abort_reg).await
    } else {
        info!("Connecting to database");
        let pool = create_db_pool(&args.dbconnect).await?;
        info!("Connected");
        run_with_store(args, pool, start_notify, abort_reg).await
    }
}

async fn run_with_store<S>(
    args: &Args,
    store: S,
    start_notify: Arc<Notify>,
    abort_reg: AbortRegistration,
) -> Result<(), Error>
where
    S: UpdateStore + 'static,
{
    info!("Reconstructing state from stored updates");
    let state = query_state(&store).await?;
    let state_mx = Arc::new(Mutex::new(state));
    let state_notify = Arc::new(Notify::new());
    let (update_sender, update_receiver) = mpsc::channel(1000);

    let update_worker_hndl = tokio::spawn(update_worker(
        store,
        state_mx.clone(),
        state_notify,
        update_receiver,
    ));

    let processor = Arc::new(LedgerWithdrawalProcessor::new(update_sender.clone()));
    let api_fut = serve_api(
        state_mx,
        update_sender,
        make_mailer(args),
        Arc::new(RandomOtpGenerator),
        processor,
        start_notify,
        api_figment(args),
    );
    let res = Abortable::new(api_fut, abort_reg).await;
    update_worker_hndl.abort();
    match res {
        Err(Aborted) => {
            info!("Logic aborted, exiting...");
            Err(Error::Aborted)
        }
        Ok(served) => Ok(served?),
    }
}
