//! Pipeline stages for convert-and-merge batches.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap
//! implementations (e.g. a different converter) without touching other
//! stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ convert ──▶ detect ──▶ merge
//! (validate,  (external   (await the  (lopdf page
//!  stage)      process)    artifact)   concatenation)
//! ```
//!
//! 1. [`input`]   — validate every upload's format, then persist each to a
//!    collision-free staging path
//! 2. [`convert`] — invoke the external converter with a bounded wait; the
//!    only stage that leaves the process
//! 3. [`detect`]  — locate the produced PDF at its deterministic path,
//!    polling until the converter's write is visible
//! 4. [`merge`]   — concatenate artifacts into one document, input order
//!    preserved

pub mod convert;
pub mod detect;
pub mod input;
pub mod merge;
