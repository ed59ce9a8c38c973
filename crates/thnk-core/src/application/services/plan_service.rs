//! Plan Service - the incremental planner.
//!
//! Walks the rule graph depth-first from the requested target and returns
//! the rules that must run, dependencies before dependents. Each name is
//! visited at most once per call; the result of every visit is memoized so
//! that a shared (diamond) dependency still marks every dependent dirty.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, instrument, trace};

use crate::{
    application::ports::Filesystem,
    domain::{DomainError, Plan, Rule, Thnkfile},
    error::ThnkResult,
};

/// Computes execution plans against one Thnkfile and one filesystem view.
pub struct PlanService<'a> {
    thnkfile: &'a Thnkfile,
    filesystem: &'a dyn Filesystem,
}

/// Per-call traversal state.
struct Walk<'a> {
    /// Finished names and whether they are dirty in this call.
    visited: HashMap<String, bool>,
    /// Names currently being expanded, outermost first.
    stack: Vec<String>,
    steps: Vec<&'a Rule>,
}

impl<'a> PlanService<'a> {
    pub fn new(thnkfile: &'a Thnkfile, filesystem: &'a dyn Filesystem) -> Self {
        Self {
            thnkfile,
            filesystem,
        }
    }

    /// Plan `target`, or the first declared rule when `None`.
    ///
    /// With `force`, every reachable rule is scheduled regardless of mtimes.
    #[instrument(skip_all, fields(rule = target.unwrap_or("<default>"), force = force))]
    pub fn plan(&self, target: Option<&str>, force: bool) -> ThnkResult<Plan<'a>> {
        let target = match target {
            Some(name) => name.to_string(),
            None => self.thnkfile.default_target()?.to_string(),
        };

        let mut walk = Walk {
            visited: HashMap::new(),
            stack: Vec::new(),
            steps: Vec::new(),
        };
        self.visit(&target, None, force, &mut walk)?;

        debug!(steps = walk.steps.len(), "Plan computed");
        Ok(Plan::new(target, walk.steps))
    }

    /// A rule is a cache hit when its file exists and no need is newer.
    /// A need without a file is never older than anything.
    pub fn is_cache_hit(&self, rule: &Rule) -> bool {
        let Some(built) = self.filesystem.modified(Path::new(rule.name())) else {
            return false;
        };
        rule.needs().iter().all(|need| {
            self.filesystem
                .modified(Path::new(need))
                .is_some_and(|changed| changed <= built)
        })
    }

    /// Returns whether `name` is dirty: scheduled in this call, or
    /// downstream of something that is.
    fn visit(
        &self,
        name: &str,
        needed_by: Option<&str>,
        force: bool,
        walk: &mut Walk<'a>,
    ) -> ThnkResult<bool> {
        if let Some(&dirty) = walk.visited.get(name) {
            return Ok(dirty);
        }
        if let Some(pos) = walk.stack.iter().position(|n| n == name) {
            let mut cycle = walk.stack[pos..].to_vec();
            cycle.push(name.to_string());
            return Err(DomainError::CyclicDependency { cycle }.into());
        }

        let thnkfile: &'a Thnkfile = self.thnkfile;
        let Some(rule) = thnkfile.rule(name) else {
            if self.filesystem.exists(Path::new(name)) {
                trace!(source = name, "Source file");
                walk.visited.insert(name.to_string(), false);
                return Ok(false);
            }
            return Err(DomainError::MissingDependency {
                name: name.to_string(),
                needed_by: needed_by.map(str::to_string),
            }
            .into());
        };

        walk.stack.push(name.to_string());
        let mut upstream_dirty = false;
        for need in rule.needs() {
            upstream_dirty |= self.visit(need, Some(name), force, walk)?;
        }
        walk.stack.pop();

        let fresh = !force && !upstream_dirty && self.is_cache_hit(rule);
        let dirty = if fresh {
            false
        } else if rule.is_noop() {
            upstream_dirty
        } else {
            walk.steps.push(rule);
            true
        };
        trace!(rule = name, fresh, dirty, "Visited");

        walk.visited.insert(name.to_string(), dirty);
        Ok(dirty)
    }
}
