// kickoff_core/src/filtering/passthrough.rs

use super::PositionFilter;
use crate::types::Position;

/// Returns its input unchanged. Used to disable filtering.
#[derive(Debug, Clone, Default)]
pub struct PassthroughFilter;

impl PositionFilter for PassthroughFilter {
    fn filter_position(
        &mut self,
        new: Option<&Position>,
        _old: Option<&Position>,
        _speed: Option<&Position>,
    ) -> Option<Position> {
        new.copied()
    }

    fn reset(&mut self) {
        // No-op
    }

    fn name(&self) -> &'static str {
        "Passthrough"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn test_returns_input_exactly() {
        let mut filter = PassthroughFilter;
        let p = Vector3::new(0.1, -2.5, 7.0);
        let old = Vector3::new(100.0, 100.0, 100.0);
        assert_eq!(filter.filter_position(Some(&p), Some(&old), None), Some(p));
        assert_eq!(filter.filter_position(Some(&p), None, Some(&old)), Some(p));
        assert_eq!(filter.filter_position(None, Some(&old), None), None);
    }
}
