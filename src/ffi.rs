//! FFI bindings for the alcohol ledger
//!
//! This module provides C-compatible functions for driving a ledger from a
//! presentation layer written in another language. Strings are null-terminated
//! UTF-8; results are JSON. Returned strings are allocated here and must be
//! freed by the caller using `ledger_free_string`.
//!
//! A handle keeps its drinks in memory only. The host persists them by
//! calling `ledger_export` after mutations and `ledger_load` on startup.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use serde::Serialize;

use crate::config::LedgerConfig;
use crate::converter::grams_of_alcohol;
use crate::error::LedgerError;
use crate::persistence::{parse_wire_date, MemoryKeyValueStore, PersistedDrink};
use crate::tracker::DrinkTracker;
use crate::types::{DrinkEntry, EntryId, PeriodKind};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Convert a C string to a Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Convert a Rust string to a C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Read a required string argument, recording an error if it is missing
unsafe fn required_arg(ptr: *const c_char, name: &str) -> Result<String, LedgerError> {
    cstr_to_string(ptr).ok_or_else(|| LedgerError::Validation(format!("Invalid {name} string pointer")))
}

/// Serialize a result to a newly allocated JSON string, or NULL on error
fn json_result<T: Serialize>(result: Result<T, LedgerError>) -> *mut c_char {
    match result.and_then(|value| serde_json::to_string(&value).map_err(LedgerError::from)) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Map a unit result to a status code: 0 on success, -1 on error
fn status_result(result: Result<(), LedgerError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Parse an entry from `{"type", "volume", "alcoholPercentage", "date"}`.
/// Any `id` in the input is ignored.
fn parse_entry(json: &str) -> Result<DrinkEntry, LedgerError> {
    let mut record: PersistedDrink = serde_json::from_str(json)?;
    record.id = None;
    record.to_entry()
}

/// Opaque handle to a DrinkTracker
pub struct LedgerHandle {
    tracker: DrinkTracker,
}

unsafe fn handle_mut<'a>(ledger: *mut LedgerHandle) -> Result<&'a mut LedgerHandle, LedgerError> {
    if ledger.is_null() {
        return Err(LedgerError::Validation("Null ledger pointer".to_string()));
    }
    Ok(&mut *ledger)
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Create a new ledger.
///
/// # Safety
/// - `config_json` must be a valid null-terminated C string or NULL (defaults).
/// - Must be freed with `ledger_free`.
/// - Returns NULL on error; call `ledger_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn ledger_new(config_json: *const c_char) -> *mut LedgerHandle {
    clear_last_error();

    let config = match cstr_to_string(config_json) {
        Some(json) => LedgerConfig::from_json(&json),
        None => Ok(LedgerConfig::default()),
    };

    let tracker = config
        .and_then(|config| DrinkTracker::open(config, Box::new(MemoryKeyValueStore::new())));

    match tracker {
        Ok(tracker) => Box::into_raw(Box::new(LedgerHandle { tracker })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a ledger.
///
/// # Safety
/// - `ledger` must be a valid pointer returned by `ledger_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn ledger_free(ledger: *mut LedgerHandle) {
    if !ledger.is_null() {
        drop(Box::from_raw(ledger));
    }
}

/// Replace the ledger's drinks with a persisted JSON array.
///
/// # Safety
/// - `ledger` must be a valid pointer returned by `ledger_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns the number of loaded entries, or -1 on error.
#[no_mangle]
pub unsafe extern "C" fn ledger_load(ledger: *mut LedgerHandle, json: *const c_char) -> i64 {
    clear_last_error();

    let result = handle_mut(ledger).and_then(|handle| {
        let json = required_arg(json, "JSON")?;
        handle.tracker.import_json(&json)
    });

    match result {
        Ok(count) => count as i64,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Export the ledger's drinks as a persisted JSON array.
///
/// # Safety
/// - `ledger` must be a valid pointer returned by `ledger_new`.
/// - Returns a newly allocated string that must be freed with `ledger_free_string`.
/// - Returns NULL on error; call `ledger_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn ledger_export(ledger: *mut LedgerHandle) -> *mut c_char {
    clear_last_error();

    match handle_mut(ledger).and_then(|handle| handle.tracker.export_json()) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Mutations
// ============================================================================

/// Add a drink and return its id as a JSON string.
///
/// # Safety
/// - `ledger` must be a valid pointer returned by `ledger_new`.
/// - `entry_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `ledger_free_string`.
/// - Returns NULL on error; call `ledger_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn ledger_add(
    ledger: *mut LedgerHandle,
    entry_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    json_result(handle_mut(ledger).and_then(|handle| {
        let entry = parse_entry(&required_arg(entry_json, "entry")?)?;
        handle.tracker.add(entry)
    }))
}

/// Remove the drink with `id`.
///
/// # Safety
/// - `ledger` must be a valid pointer returned by `ledger_new`.
/// - `id` must be a valid null-terminated C string.
/// - Returns 0 on success, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn ledger_remove(ledger: *mut LedgerHandle, id: *const c_char) -> i32 {
    clear_last_error();

    status_result(handle_mut(ledger).and_then(|handle| {
        let id: EntryId = required_arg(id, "id")?.parse()?;
        handle.tracker.remove(id).map(|_| ())
    }))
}

/// Replace the drink with `id`.
///
/// # Safety
/// - `ledger` must be a valid pointer returned by `ledger_new`.
/// - `id` and `entry_json` must be valid null-terminated C strings.
/// - Returns 0 on success, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn ledger_update(
    ledger: *mut LedgerHandle,
    id: *const c_char,
    entry_json: *const c_char,
) -> i32 {
    clear_last_error();

    status_result(handle_mut(ledger).and_then(|handle| {
        let id: EntryId = required_arg(id, "id")?.parse()?;
        let entry = parse_entry(&required_arg(entry_json, "entry")?)?;
        handle.tracker.update(id, entry)
    }))
}

// ============================================================================
// Queries
// ============================================================================

/// Drinks logged on `date` (`YYYY-MM-DD`) as a JSON array.
///
/// # Safety
/// - `ledger` must be a valid pointer returned by `ledger_new`.
/// - `date` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `ledger_free_string`.
#[no_mangle]
pub unsafe extern "C" fn ledger_list_by_date(
    ledger: *mut LedgerHandle,
    date: *const c_char,
) -> *mut c_char {
    clear_last_error();

    json_result(handle_mut(ledger).and_then(|handle| {
        let date = parse_wire_date(&required_arg(date, "date")?)?;
        Ok(handle
            .tracker
            .list_by_date(date)
            .iter()
            .map(PersistedDrink::from)
            .collect::<Vec<_>>())
    }))
}

/// Summary of the closed interval `[start, end]` as JSON.
///
/// # Safety
/// - `ledger` must be a valid pointer returned by `ledger_new`.
/// - `start` and `end` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `ledger_free_string`.
#[no_mangle]
pub unsafe extern "C" fn ledger_summarize(
    ledger: *mut LedgerHandle,
    start: *const c_char,
    end: *const c_char,
) -> *mut c_char {
    clear_last_error();

    json_result(handle_mut(ledger).and_then(|handle| {
        let start = parse_wire_date(&required_arg(start, "start")?)?;
        let end = parse_wire_date(&required_arg(end, "end")?)?;
        Ok(handle.tracker.summarize(start, end))
    }))
}

/// Report for the `kind` period ("daily", "weekly", "monthly") containing `today`.
///
/// # Safety
/// - `ledger` must be a valid pointer returned by `ledger_new`.
/// - `kind` and `today` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `ledger_free_string`.
#[no_mangle]
pub unsafe extern "C" fn ledger_report(
    ledger: *mut LedgerHandle,
    kind: *const c_char,
    today: *const c_char,
) -> *mut c_char {
    clear_last_error();

    json_result(handle_mut(ledger).and_then(|handle| {
        let kind: PeriodKind = required_arg(kind, "kind")?.parse()?;
        let today = parse_wire_date(&required_arg(today, "today")?)?;
        handle.tracker.report(kind, today)
    }))
}

/// Severity of `total_grams` for a period kind, as a JSON string.
///
/// # Safety
/// - `ledger` must be a valid pointer returned by `ledger_new`.
/// - `kind` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `ledger_free_string`.
#[no_mangle]
pub unsafe extern "C" fn ledger_classify(
    ledger: *mut LedgerHandle,
    total_grams: f64,
    kind: *const c_char,
) -> *mut c_char {
    clear_last_error();

    json_result(handle_mut(ledger).and_then(|handle| {
        let kind: PeriodKind = required_arg(kind, "kind")?.parse()?;
        Ok(handle.tracker.classify(total_grams, kind))
    }))
}

/// Per-day buckets as a JSON object keyed by `YYYY-MM-DD`.
///
/// # Safety
/// - `ledger` must be a valid pointer returned by `ledger_new`.
/// - Returns a newly allocated string that must be freed with `ledger_free_string`.
#[no_mangle]
pub unsafe extern "C" fn ledger_bucket_by_day(ledger: *mut LedgerHandle) -> *mut c_char {
    clear_last_error();

    json_result(handle_mut(ledger).map(|handle| handle.tracker.bucket_by_day()))
}

/// Grams of alcohol for a volume and strength, without a ledger.
#[no_mangle]
pub extern "C" fn ledger_grams_of_alcohol(volume_ml: f64, percentage_abv: f64) -> f64 {
    grams_of_alcohol(volume_ml, percentage_abv)
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by ledger functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a ledger function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn ledger_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next ledger function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn ledger_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn ledger_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
