pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Failure conditions raised by the propagation layer.
///
/// `Inconsistency` is the normal "this branch is dead" signal: it is caught
/// at the nearest enclosing search alternative, triggers a rollback, and is
/// never fatal to the process. `NotImplemented` is orthogonal: it marks a
/// constraint whose filtering algorithm is intentionally absent, and it
/// escapes the search so callers can tell "infeasible" from "missing".
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("inconsistency: a variable domain became empty")]
    Inconsistency,

    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
}
