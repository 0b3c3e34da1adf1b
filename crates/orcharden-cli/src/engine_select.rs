//! Resolve the `--engine`/config `engine` selector to a concrete engine
//! adapter.

use std::sync::Arc;

use orcharden_engine::Engine;
use orcharden_engine::engines::{EngineA, EngineB, EngineC, EngineD};

pub fn resolve_engine(name: &str) -> anyhow::Result<Arc<dyn Engine>> {
    match name {
        "a" => Ok(Arc::new(EngineA::new())),
        "b" => Ok(Arc::new(EngineB::new())),
        "c" => Ok(Arc::new(EngineC::new())),
        "d" => Ok(Arc::new(EngineD::new())),
        other => Err(anyhow::anyhow!(
            "unknown engine '{other}': expected one of a, b, c, d"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_all_four_letters() {
        for letter in ["a", "b", "c", "d"] {
            assert!(resolve_engine(letter).is_ok());
        }
    }

    #[test]
    fn rejects_unknown_engine_name() {
        assert!(resolve_engine("z").is_err());
    }
}
