//! Record of definition entries set or replaced by derived geometry.

use crate::definition::{DefValue, Definition};
use std::fmt;

/// How a derived value related to what the definition held before.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileKind {
    /// The key had no value
    Calculated,
    /// The key held a different value, now replaced
    Overwritten,
    /// The key held the same value, within the report threshold
    Confirmed,
}

/// One definition update.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub key: &'static str,
    pub previous: Option<DefValue>,
    pub current: DefValue,
    pub kind: ReconcileKind,
}

impl fmt::Display for Reconciliation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.previous) {
            (ReconcileKind::Calculated, _) | (_, None) => {
                write!(f, "{} calculated: {}", self.key, self.current)
            }
            (ReconcileKind::Overwritten, Some(prev)) => {
                write!(f, "{} differs: {} given, {} derived, overwriting", self.key, prev, self.current)
            }
            (ReconcileKind::Confirmed, Some(_)) => {
                write!(f, "{} confirmed: {}", self.key, self.current)
            }
        }
    }
}

/// Store `value` under `key`, always replacing what was there, and append
/// what happened to `journal`.
///
/// Numeric changes no larger than `threshold` count as confirmations.
pub fn reconcile(
    def: &mut Definition,
    key: &'static str,
    value: DefValue,
    threshold: f64,
    journal: &mut Vec<Reconciliation>,
) -> ReconcileKind {
    let previous = def.get(key).cloned();
    let kind = match (&previous, &value) {
        (None, _) => ReconcileKind::Calculated,
        (Some(DefValue::Number(old)), DefValue::Number(new)) => {
            if (old - new).abs() <= threshold {
                ReconcileKind::Confirmed
            } else {
                ReconcileKind::Overwritten
            }
        }
        (Some(old), new) if old == new => ReconcileKind::Confirmed,
        (Some(_), _) => ReconcileKind::Overwritten,
    };

    let entry = Reconciliation {
        key,
        previous,
        current: value.clone(),
        kind,
    };
    match kind {
        ReconcileKind::Calculated => {
            crate::log::info!(key, value = %entry.current, "calculated");
        }
        ReconcileKind::Overwritten => {
            crate::log::warn!("{entry}");
        }
        ReconcileKind::Confirmed => {
            crate::log::debug!(key, "confirmed");
        }
    }

    def.set(key, value);
    journal.push(entry);
    kind
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::keys;

    #[test]
    fn first_value_is_calculated() {
        let mut def = Definition::new();
        let mut journal = Vec::new();
        let kind = reconcile(&mut def, keys::TOP_TUBE_LENGTH, DefValue::Number(565.0), 0.0, &mut journal);
        assert_eq!(kind, ReconcileKind::Calculated);
        assert_eq!(def.number(keys::TOP_TUBE_LENGTH), Some(565.0));
        assert_eq!(journal[0].to_string(), "top_tube_length calculated: 565");
    }

    #[test]
    fn differing_value_overwrites() {
        let mut def = Definition::from_pairs([(keys::HEAD_ANGLE, 70.5)]);
        let mut journal = Vec::new();
        let kind = reconcile(&mut def, keys::HEAD_ANGLE, DefValue::Number(70.2), 0.0, &mut journal);
        assert_eq!(kind, ReconcileKind::Overwritten);
        assert_eq!(def.number(keys::HEAD_ANGLE), Some(70.2));
        assert_eq!(journal[0].previous, Some(DefValue::Number(70.5)));
    }

    #[test]
    fn threshold_turns_small_changes_into_confirmations() {
        let mut def = Definition::from_pairs([(keys::REACH, 380.0)]);
        let mut journal = Vec::new();
        let kind = reconcile(&mut def, keys::REACH, DefValue::Number(381.0), 1.0, &mut journal);
        assert_eq!(kind, ReconcileKind::Confirmed);
        // still written: the derived value always wins
        assert_eq!(def.number(keys::REACH), Some(381.0));
    }

    #[test]
    fn journal_keeps_every_kind_in_order() {
        let mut def = Definition::from_pairs([(keys::STACK, 610.0)]);
        let mut journal = Vec::new();
        reconcile(&mut def, keys::WHEEL_BASE, DefValue::Number(1052.0), 0.0, &mut journal);
        reconcile(&mut def, keys::STACK, DefValue::Number(612.0), 0.0, &mut journal);
        reconcile(&mut def, keys::STACK, DefValue::Number(612.0), 0.0, &mut journal);

        let kinds: Vec<_> = journal.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            [ReconcileKind::Calculated, ReconcileKind::Overwritten, ReconcileKind::Confirmed]
        );
        assert_eq!(journal[2].to_string(), "stack confirmed: 612");
    }
}
