//! The ambient HTTP/CLI surface around the scoring pipeline (spec.md §5,
//! §6): request orchestration (`pipeline`), the axum router (`http`), and
//! batch-partition assignment (`partition`). None of this is CORE — it is
//! the thinnest shell the pipeline needs to be reachable at all.

pub mod http;
pub mod partition;
pub mod pipeline;
