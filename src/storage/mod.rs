//!  Storage is organized through [ledger_storage::JsonFileStorage].
//!  The basic idea is:
//!   - The whole ledger is one JSON document, laid out like the extension's local storage.
//!   - Writes replace the document atomically, so readers never need a lock.
//!   - Writers take an exclusive lock on a sibling lock file for the full read-modify-write
//!     cycle, which keeps the host and the cli from losing each other's updates.

pub mod ledger_storage;
