//! The four concrete engine adapters, one per invocation style named in
//! the engine-trait table: JSON-per-line with a terminal `step_finish`
//! cost record (A), duration-costed line-stream JSON (B), a single
//! full-auto JSON blob (C), and line-stream JSON with a terminal `result`
//! usage record (D).

pub mod a;
pub mod b;
pub mod c;
pub mod d;

pub use a::EngineA;
pub use b::EngineB;
pub use c::EngineC;
pub use d::EngineD;
