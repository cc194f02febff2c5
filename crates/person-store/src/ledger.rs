//! Ledger of live allocations handed across the boundary
//!
//! Every pointer the store gives out is recorded here together with the
//! domain it belongs to. Entry points consult the ledger before touching a
//! pointer, which turns double-free, use-after-free and handle/string
//! confusion into reported errors instead of heap corruption.
//!
//! The ledger only knows addresses. If the allocator hands a released
//! address back out for a new allocation in the same domain, a stale pointer
//! to the old allocation is indistinguishable from the new one.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, OnceLock};

use crate::types::{PersonLedgerStats, PersonResult};

/// Which release function owns a pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    /// A record handle, released with `person_release_record`
    Record,
    /// An info string, released with `person_release_info`
    Info,
}

impl Domain {
    fn name(self) -> &'static str {
        match self {
            Domain::Record => "person handle",
            Domain::Info => "info string",
        }
    }
}

#[derive(Default)]
struct Ledger {
    live: HashMap<usize, Domain>,
    allocated: u64,
    released: u64,
}

static LEDGER: OnceLock<Mutex<Ledger>> = OnceLock::new();

fn ledger() -> MutexGuard<'static, Ledger> {
    LEDGER
        .get_or_init(|| Mutex::new(Ledger::default()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Record a freshly issued pointer
pub fn register(addr: usize, domain: Domain) {
    let mut ledger = ledger();
    ledger.live.insert(addr, domain);
    ledger.allocated += 1;
}

/// Check that `addr` is live and belongs to `domain`
pub fn check(addr: usize, domain: Domain) -> Result<(), (PersonResult, String)> {
    classify(ledger().live.get(&addr).copied(), addr, domain)
}

/// Remove a live pointer before it is freed
///
/// On error the ledger is left untouched and the caller must not free.
pub fn retire(addr: usize, domain: Domain) -> Result<(), (PersonResult, String)> {
    let mut ledger = ledger();
    classify(ledger.live.get(&addr).copied(), addr, domain)?;
    ledger.live.remove(&addr);
    ledger.released += 1;
    Ok(())
}

/// Snapshot of the allocation counters
pub fn stats() -> PersonLedgerStats {
    let ledger = ledger();
    let live_records = ledger
        .live
        .values()
        .filter(|domain| **domain == Domain::Record)
        .count();
    PersonLedgerStats {
        allocated: ledger.allocated,
        released: ledger.released,
        live_records,
        live_strings: ledger.live.len() - live_records,
    }
}

fn classify(
    found: Option<Domain>,
    addr: usize,
    expected: Domain,
) -> Result<(), (PersonResult, String)> {
    match found {
        Some(domain) if domain == expected => Ok(()),
        Some(domain) => Err((
            PersonResult::WrongDomain,
            format!(
                "{:#x} is a {}, expected a {}",
                addr,
                domain.name(),
                expected.name()
            ),
        )),
        None => Err((
            PersonResult::UnknownPointer,
            format!("{:#x} is not a live {}", addr, expected.name()),
        )),
    }
}
