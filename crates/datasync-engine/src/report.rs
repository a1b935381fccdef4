//! Per-pass and per-run mutation counts.

use datasync_core::EntityKind;
use serde::Serialize;

/// Outcome counts of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub kind: EntityKind,
    /// Source rows read.
    pub source_rows: usize,
    /// Target rows read.
    pub target_rows: usize,
    pub inserted: u32,
    pub updated: u32,
    pub deleted: u32,
    /// Deletes refused because the target row still has dependent data.
    pub retained: u32,
    /// Rows skipped: malformed names, unresolved parents, cancelled rows with
    /// no target counterpart.
    pub skipped: u32,
    pub unchanged: u32,
    /// Duplicate association rows dropped before matching.
    pub collapsed: u32,
    /// Associations seeded by cascading inserts.
    pub cascaded: u32,
}

impl PassReport {
    #[must_use]
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            source_rows: 0,
            target_rows: 0,
            inserted: 0,
            updated: 0,
            deleted: 0,
            retained: 0,
            skipped: 0,
            unchanged: 0,
            collapsed: 0,
            cascaded: 0,
        }
    }

    /// Number of rows that caused a write in the target.
    pub fn mutations(&self) -> u32 {
        self.inserted + self.updated + self.deleted
    }

    pub fn log(&self) {
        tracing::info!(
            kind = %self.kind,
            source_rows = self.source_rows,
            target_rows = self.target_rows,
            inserted = self.inserted,
            updated = self.updated,
            deleted = self.deleted,
            retained = self.retained,
            skipped = self.skipped,
            unchanged = self.unchanged,
            collapsed = self.collapsed,
            cascaded = self.cascaded,
            "Pass reconciled"
        );
    }
}

/// Reports of every pass of a run, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub passes: Vec<PassReport>,
}

impl RunReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pass: PassReport) {
        self.passes.push(pass);
    }

    pub fn pass(&self, kind: EntityKind) -> Option<&PassReport> {
        self.passes.iter().find(|p| p.kind == kind)
    }

    pub fn mutations(&self) -> u32 {
        self.passes.iter().map(PassReport::mutations).sum()
    }

    pub fn log(&self) {
        let sum = |f: fn(&PassReport) -> u32| self.passes.iter().map(f).sum::<u32>();
        tracing::info!(
            passes = self.passes.len(),
            inserted = sum(|p| p.inserted),
            updated = sum(|p| p.updated),
            deleted = sum(|p| p.deleted),
            retained = sum(|p| p.retained),
            skipped = sum(|p| p.skipped),
            cascaded = sum(|p| p.cascaded),
            "Run complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutations_exclude_skips_and_retained() {
        let mut pass = PassReport::new(EntityKind::Sessions);
        pass.inserted = 2;
        pass.updated = 1;
        pass.retained = 4;
        pass.skipped = 3;
        assert_eq!(pass.mutations(), 3);

        let mut run = RunReport::new();
        run.push(pass);
        run.push(PassReport::new(EntityKind::Persons));
        assert_eq!(run.mutations(), 3);
        assert_eq!(run.pass(EntityKind::Persons).unwrap().mutations(), 0);
        assert!(run.pass(EntityKind::Components).is_none());
    }

    #[test]
    fn test_serializes_kind_in_snake_case() {
        let json = serde_json::to_value(PassReport::new(EntityKind::SessionHasPerson)).unwrap();
        assert_eq!(json["kind"], "session_has_person");
    }
}
