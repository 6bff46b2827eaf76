//! SiteManager - the cluster's directory of sites
//!
//! Grounded on `original_source/src/site_manager.py`'s top-level manager
//! (the one holding all ten `Site` objects) and, for style, on the
//! teacher's `replication/failure_matrix.rs` notion of a small directory
//! struct wrapping per-node state. Owns the ten `Site`s and answers
//! "who hosts `var`" / "who, of those, is up" — the Available Copies
//! routing questions from §4.2.

use crate::model::{LogicalTime, SiteId, VariableId};
use crate::site::{build_sites, Site, VariableVersion};

/// Directory over the fixed ten-site topology.
pub struct SiteManager {
    sites: Vec<Site>,
}

impl Default for SiteManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteManager {
    pub fn new() -> Self {
        Self {
            sites: build_sites(),
        }
    }

    fn index(id: SiteId) -> usize {
        (id.value() - 1) as usize
    }

    pub fn site(&self, id: SiteId) -> &Site {
        &self.sites[Self::index(id)]
    }

    pub fn site_mut(&mut self, id: SiteId) -> &mut Site {
        &mut self.sites[Self::index(id)]
    }

    pub fn is_up(&self, id: SiteId) -> bool {
        self.site(id).is_up()
    }

    /// All sites that host `var`, per the fixed placement rule in §3.
    pub fn sites_hosting(&self, var: VariableId) -> Vec<SiteId> {
        SiteId::all().filter(|id| self.site(*id).hosts(var)).collect()
    }

    /// The subset of `sites_hosting(var)` that is currently up.
    pub fn up_sites_hosting(&self, var: VariableId) -> Vec<SiteId> {
        self.sites_hosting(var)
            .into_iter()
            .filter(|id| self.is_up(*id))
            .collect()
    }

    pub fn fail(&mut self, id: SiteId, at: LogicalTime) {
        self.site_mut(id).fail(at);
    }

    pub fn recover(&mut self, id: SiteId, at: LogicalTime) {
        self.site_mut(id).recover(at);
    }

    /// Try a snapshot read of `var` at every up site hosting it, in
    /// ascending site-id order, per §4.3.4: the first site willing to
    /// serve it wins.
    pub fn snapshot_read(
        &self,
        var: VariableId,
        start_time: LogicalTime,
    ) -> Option<(SiteId, &VariableVersion)> {
        for id in self.up_sites_hosting(var) {
            if let Ok(version) = self.site(id).snapshot_read(var, start_time) {
                return Some((id, version));
            }
        }
        None
    }

    /// Per §4.3.4 step 2: could *any* host of `var` (up or down) ever
    /// have produced a valid snapshot as of `start_time`? If not, a read
    /// that found no live site must abort rather than park.
    pub fn has_potential_host(&self, var: VariableId, start_time: LogicalTime) -> bool {
        self.sites_hosting(var)
            .into_iter()
            .any(|id| self.site(id).could_ever_serve(var, start_time))
    }

    /// Apply a committed write of `var` at every site in `sites`.
    pub fn apply_commit_at(
        &mut self,
        sites: &[SiteId],
        var: VariableId,
        value: i64,
        commit_time: LogicalTime,
        writer: crate::model::Writer,
    ) {
        for id in sites {
            self.site_mut(*id)
                .apply_commit(var, value, commit_time, writer.clone());
        }
    }

    /// Full per-site dump for the `dump` command (§4.3.9): every site in
    /// ascending id, up or down, with its hosted variables and latest
    /// stored values. A site with no hosted variables contributes no
    /// row; in this fixed topology every site hosts at least the
    /// replicated variables, so none are ever empty.
    pub fn dump(&self) -> Vec<(SiteId, Vec<(VariableId, i64)>)> {
        SiteId::all().map(|id| (id, self.site(id).dump())).collect()
    }

    /// Did site `id` fail at any point strictly after `at`? Used by the
    /// Available-Copies validation rule at `end` (§4.3.5 step 1).
    pub fn failed_after(&self, id: SiteId, at: LogicalTime) -> bool {
        self.site(id).failed_after(at)
    }
}
