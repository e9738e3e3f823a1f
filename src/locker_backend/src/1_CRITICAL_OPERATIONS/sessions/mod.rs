//! Connected accounts
//!
//! One session per connected account, each owning its two timers. Connecting
//! an account that already has a session tears the old one down first, which
//! is also how an account change in the wallet is handled.
//!
//! A session belongs to the principal that connected it. Only that principal
//! can read it, act through it or disconnect it.

use candid::{CandidType, Deserialize, Principal};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use crate::_2_CRITICAL_DATA::session::{RestoreReport, Session, SessionParams};
use crate::_4_RPC_ACCESS::{live_reader, LiveReader};
use crate::infrastructure::config;
use crate::infrastructure::constants::{MAX_SESSIONS, MAX_SESSIONS_PER_CALLER};
use crate::infrastructure::errors::{Result, SessionError};
use crate::infrastructure::{log, record_event, EventLevel};
use crate::infrastructure::stable_storage::{preferences, CanisterMemory};
use crate::types::{Address, LockAsset};
use super::refresh_scheduler::{start_timers, stop_timers, SchedulerHandles};

pub type LiveSession = Session<LiveReader, CanisterMemory>;

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ConnectReport {
    pub account: String,
    pub wrong_network: bool,
    pub restore: RestoreReport,
}

struct SessionEntry<S, H> {
    caller: Principal,
    session: Rc<S>,
    handles: H,
}

/// Sessions keyed by account, bounded overall and per caller
pub struct SessionRegistry<S, H> {
    sessions: BTreeMap<Address, SessionEntry<S, H>>,
    limit: usize,
    per_caller_limit: usize,
}

impl<S, H> SessionRegistry<S, H> {
    pub fn new(limit: usize, per_caller_limit: usize) -> Self {
        SessionRegistry { sessions: BTreeMap::new(), limit, per_caller_limit }
    }

    fn owned_by(&self, caller: &Principal) -> usize {
        self.sessions.values().filter(|entry| entry.caller == *caller).count()
    }

    fn check_owner(&self, caller: &Principal, account: &Address) -> Result<()> {
        match self.sessions.get(account) {
            Some(entry) if entry.caller != *caller => {
                Err(SessionError::NotSessionOwner { account: account.to_hex() }.into())
            }
            _ => Ok(()),
        }
    }

    /// Room for `caller` to hold `account`, counting a session it would replace
    pub fn check_capacity(&self, caller: &Principal, account: &Address) -> Result<()> {
        self.check_owner(caller, account)?;
        if self.sessions.contains_key(account) {
            return Ok(());
        }
        if self.sessions.len() >= self.limit {
            return Err(SessionError::TooManySessions { limit: self.limit as u64 }.into());
        }
        if self.owned_by(caller) >= self.per_caller_limit {
            return Err(SessionError::TooManySessions { limit: self.per_caller_limit as u64 }.into());
        }
        Ok(())
    }

    /// Insert, returning whatever the caller had registered for the account before
    pub fn insert(
        &mut self,
        caller: Principal,
        account: Address,
        session: Rc<S>,
        handles: H,
    ) -> Result<Option<(Rc<S>, H)>> {
        self.check_capacity(&caller, &account)?;
        let previous = self.sessions.insert(account, SessionEntry { caller, session, handles });
        Ok(previous.map(|entry| (entry.session, entry.handles)))
    }

    pub fn remove(&mut self, caller: &Principal, account: &Address) -> Result<Option<(Rc<S>, H)>> {
        self.check_owner(caller, account)?;
        Ok(self.sessions.remove(account).map(|entry| (entry.session, entry.handles)))
    }

    pub fn get(&self, caller: &Principal, account: &Address) -> Result<Rc<S>> {
        match self.sessions.get(account) {
            Some(entry) if entry.caller == *caller => Ok(Rc::clone(&entry.session)),
            Some(_) => Err(SessionError::NotSessionOwner { account: account.to_hex() }.into()),
            None => Err(SessionError::NotConnected { account: account.to_hex() }.into()),
        }
    }

    /// Accounts connected by `caller`
    pub fn accounts(&self, caller: &Principal) -> Vec<Address> {
        self.sessions
            .iter()
            .filter(|(_, entry)| entry.caller == *caller)
            .map(|(account, _)| *account)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

thread_local! {
    static SESSIONS: RefCell<SessionRegistry<LiveSession, SchedulerHandles>> =
        RefCell::new(SessionRegistry::new(MAX_SESSIONS, MAX_SESSIONS_PER_CALLER));
}

fn teardown(session: Rc<LiveSession>, handles: SchedulerHandles) {
    stop_timers(handles);
    session.clear();
}

pub async fn connect(caller: Principal, account_input: &str, narrow_viewport: bool) -> Result<ConnectReport> {
    let account = Address::parse(account_input)?;
    disconnect(caller, &account)?;
    SESSIONS.with(|s| s.borrow().check_capacity(&caller, &account))?;

    let cfg = config::current();
    let session = Rc::new(Session::new(
        SessionParams {
            account,
            factory: cfg.factory_address()?,
            expected_chain_id: cfg.chain_id,
            asset: LockAsset::PLS,
            narrow_viewport,
        },
        live_reader(&cfg),
        preferences(),
    ));

    session.check_network().await;
    if session.wrong_network() {
        log!("⚠️ {} is connected to the wrong network", account);
    }
    session.refresh_global().await;
    let restore = session.restore_vaults().await;

    // Another call may have connected the account while we were loading
    let handles = start_timers(&session);
    match SESSIONS.with(|s| s.borrow_mut().insert(caller, account, Rc::clone(&session), handles)) {
        Ok(Some((previous, previous_handles))) => teardown(previous, previous_handles),
        Ok(None) => {}
        Err(e) => {
            teardown(session, handles);
            return Err(e);
        }
    }

    record_event(EventLevel::Info, "session", format!("{} connected by {}: {}", account, caller, restore.message));
    Ok(ConnectReport {
        account: account.to_hex(),
        wrong_network: session.wrong_network(),
        restore,
    })
}

/// Cancel timers and drop the session; `false` if none existed
pub fn disconnect(caller: Principal, account: &Address) -> Result<bool> {
    match SESSIONS.with(|s| s.borrow_mut().remove(&caller, account))? {
        Some((session, handles)) => {
            teardown(session, handles);
            record_event(EventLevel::Info, "session", format!("{} disconnected", account));
            Ok(true)
        }
        None => Ok(false),
    }
}

pub fn session(caller: Principal, account_input: &str) -> Result<Rc<LiveSession>> {
    let account = Address::parse(account_input)?;
    SESSIONS.with(|s| s.borrow().get(&caller, &account))
}

pub fn connected_accounts(caller: Principal) -> Vec<String> {
    SESSIONS.with(|s| s.borrow().accounts(&caller).iter().map(Address::to_hex).collect())
}
