//! A scoped timing tree, used to profile the phases of a resynthesis pass
//! without hard-coding a logger: callers push/pop named scopes and the tree
//! reports durations through the `log` crate when printed.

use std::time::{Duration, Instant};

use log::{log, Level};

/// The hierarchy of scopes, and the time consumed by each one.
pub struct TimingTree {
    name: String,
    level: Level,
    enter_time: Instant,
    exit_time: Option<Instant>,
    children: Vec<TimingTree>,
}

impl Default for TimingTree {
    fn default() -> Self {
        TimingTree::new("root", Level::Debug)
    }
}

impl TimingTree {
    pub fn new(root_name: &str, level: Level) -> Self {
        Self {
            name: root_name.to_string(),
            level,
            enter_time: Instant::now(),
            exit_time: None,
            children: vec![],
        }
    }

    fn is_open(&self) -> bool {
        self.exit_time.is_none()
    }

    /// A description of the stack of currently-open scopes.
    pub fn open_stack(&self) -> String {
        let mut stack = Vec::new();
        self.open_stack_helper(&mut stack);
        stack.join(" > ")
    }

    fn open_stack_helper(&self, stack: &mut Vec<String>) {
        if self.is_open() {
            stack.push(self.name.clone());
            if let Some(last_child) = self.children.last() {
                last_child.open_stack_helper(stack);
            }
        }
    }

    /// Open a named child scope under the deepest currently-open scope.
    pub fn push(&mut self, ctx: &str, mut level: Level) {
        assert!(self.is_open(), "cannot push onto a closed timing scope");

        // A scope's log level is never weaker than its parent's.
        level = level.max(self.level);

        if let Some(last_child) = self.children.last_mut() {
            if last_child.is_open() {
                last_child.push(ctx, level);
                return;
            }
        }

        self.children.push(TimingTree {
            name: ctx.to_string(),
            level,
            enter_time: Instant::now(),
            exit_time: None,
            children: vec![],
        });
    }

    /// Close the deepest open scope from this tree.
    pub fn pop(&mut self) {
        assert!(self.is_open(), "cannot pop a closed timing scope");

        if let Some(last_child) = self.children.last_mut() {
            if last_child.is_open() {
                last_child.pop();
                return;
            }
        }

        self.exit_time = Some(Instant::now());
    }

    fn duration(&self) -> Duration {
        self.exit_time
            .unwrap_or_else(Instant::now)
            .duration_since(self.enter_time)
    }

    /// Drop children whose duration is below `min_delta`, recursively.
    pub fn filter(&self, min_delta: Duration) -> Self {
        Self {
            name: self.name.clone(),
            level: self.level,
            enter_time: self.enter_time,
            exit_time: self.exit_time,
            children: self
                .children
                .iter()
                .filter(|c| c.duration() >= min_delta)
                .map(|c| c.filter(min_delta))
                .collect(),
        }
    }

    pub fn print(&self) {
        self.print_helper(0);
    }

    fn print_helper(&self, depth: usize) {
        let prefix = "| ".repeat(depth);
        log!(
            self.level,
            "{}{:.4}s to {}",
            prefix,
            self.duration().as_secs_f64(),
            self.name
        );
        for child in &self.children {
            child.print_helper(depth + 1);
        }
    }
}

/// Times the evaluation of `$exp` as a named scope of `$timing_tree`.
#[macro_export]
macro_rules! timed {
    ($timing_tree:expr, $level:expr, $ctx:expr, $exp:expr) => {{
        $timing_tree.push($ctx, $level);
        let res = $exp;
        $timing_tree.pop();
        res
    }};
    ($timing_tree:expr, $ctx:expr, $exp:expr) => {{
        $timing_tree.push($ctx, log::Level::Debug);
        let res = $exp;
        $timing_tree.pop();
        res
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_nest_and_close() {
        let mut tree = TimingTree::new("root", Level::Debug);
        tree.push("phase a", Level::Debug);
        tree.push("phase a.1", Level::Debug);
        tree.pop();
        tree.pop();
        assert!(!tree.is_open());
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].children.len(), 1);
    }
}
